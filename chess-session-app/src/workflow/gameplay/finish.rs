use std::sync::Arc;

use chess_core::{GameStatus, MaybeTimeout, ResultReason};

use crate::{
    domain::{GAME_OVER_TIMEOUT, GameId, ServiceError, UserId, result::ResultService},
    workflow::gameplay::{GameView, save_game::SaveGameWorkflow},
};

#[async_trait::async_trait]
pub trait FinishGameUseCase {
    /// Ends a game with a caller-asserted outcome, e.g. an agreed draw. `acting_user`, when
    /// given, must be one of the two players.
    async fn finish_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        reason: ResultReason,
        acting_user: Option<UserId>,
    ) -> Result<GameView, ServiceError>;
}

pub struct FinishGameUseCaseImpl<R: ResultService, S: SaveGameWorkflow> {
    result_service: Arc<R>,
    save_game_workflow: Arc<S>,
}

impl<R: ResultService, S: SaveGameWorkflow> FinishGameUseCaseImpl<R, S> {
    pub fn new(result_service: Arc<R>, save_game_workflow: Arc<S>) -> Self {
        Self {
            result_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<R: ResultService + Send + Sync + 'static, S: SaveGameWorkflow + Send + Sync + 'static>
    FinishGameUseCase for FinishGameUseCaseImpl<R, S>
{
    async fn finish_game(
        &self,
        game_id: GameId,
        status: GameStatus,
        reason: ResultReason,
        acting_user: Option<UserId>,
    ) -> Result<GameView, ServiceError> {
        let now = chrono::Utc::now();
        match self
            .result_service
            .finish_game(game_id, status, reason, acting_user, now)?
        {
            MaybeTimeout::Result(game) => {
                let view = GameView::from(&game, now);
                self.save_game_workflow.save_game(game).await;
                Ok(view)
            }
            MaybeTimeout::Timeout(game) => {
                self.save_game_workflow.save_game(game).await;
                Err(ServiceError::invalid_state(GAME_OVER_TIMEOUT))
            }
        }
    }
}
