use std::sync::Arc;

use chess_core::TimeControl;

use crate::{
    domain::{
        GameId, InvitationId, ServiceError, UserId, game::GameService,
        invitation::InvitationService,
    },
    ports::color::ColorPicker,
    processes::game_timeout_runner::GameTimeoutRunner,
    workflow::gameplay::save_game::SaveGameWorkflow,
};

#[async_trait::async_trait]
pub trait AcceptInvitationUseCase {
    /// Starts the game of the invitation and returns its id.
    async fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
    ) -> Result<GameId, ServiceError>;
}

pub struct AcceptInvitationUseCaseImpl<
    I: InvitationService,
    G: GameService,
    C: ColorPicker,
    S: SaveGameWorkflow,
    GT: GameTimeoutRunner,
> {
    invitation_service: Arc<I>,
    game_service: Arc<G>,
    color_picker: Arc<C>,
    save_game_workflow: Arc<S>,
    game_timeout_runner: Arc<GT>,
    time_control: TimeControl,
}

impl<I: InvitationService, G: GameService, C: ColorPicker, S: SaveGameWorkflow, GT: GameTimeoutRunner>
    AcceptInvitationUseCaseImpl<I, G, C, S, GT>
{
    pub fn new(
        invitation_service: Arc<I>,
        game_service: Arc<G>,
        color_picker: Arc<C>,
        save_game_workflow: Arc<S>,
        game_timeout_runner: Arc<GT>,
        time_control: TimeControl,
    ) -> Self {
        Self {
            invitation_service,
            game_service,
            color_picker,
            save_game_workflow,
            game_timeout_runner,
            time_control,
        }
    }
}

#[async_trait::async_trait]
impl<
    I: InvitationService + Send + Sync + 'static,
    G: GameService + Send + Sync + 'static,
    C: ColorPicker + Send + Sync + 'static,
    S: SaveGameWorkflow + Send + Sync + 'static,
    GT: GameTimeoutRunner + Send + Sync + 'static,
> AcceptInvitationUseCase for AcceptInvitationUseCaseImpl<I, G, C, S, GT>
{
    async fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
    ) -> Result<GameId, ServiceError> {
        let now = chrono::Utc::now();
        let (_, game) =
            self.invitation_service
                .accept_invitation(invitation_id, by, now, |invitation| {
                    let inviter_white = self.color_picker.inviter_plays_white();
                    let (white, black) = if inviter_white {
                        (invitation.from.clone(), invitation.to.clone())
                    } else {
                        (invitation.to.clone(), invitation.from.clone())
                    };
                    let game =
                        self.game_service
                            .create_game(white, black, self.time_control.clone(), now);
                    log::info!(
                        "Colour draw for invitation {}: inviter {} plays {}, game {}",
                        invitation.id,
                        invitation.from.name,
                        if inviter_white { "white" } else { "black" },
                        game.id
                    );
                    game
                })?;

        let game_id = game.id;
        self.save_game_workflow.save_game(game).await;
        GameTimeoutRunner::schedule_game_timeout_check(self.game_timeout_runner.clone(), game_id);
        Ok(game_id)
    }
}
