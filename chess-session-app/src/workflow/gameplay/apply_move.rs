use std::sync::Arc;

use chess_core::MaybeTimeout;

use crate::{
    domain::{GAME_OVER_TIMEOUT, GameId, ServiceError, UserId, moves::MoveService},
    workflow::gameplay::save_game::SaveGameWorkflow,
};

#[async_trait::async_trait]
pub trait ApplyMoveUseCase {
    /// Returns the number of moves in the game after the move was applied.
    async fn apply_move(
        &self,
        game_id: GameId,
        user: UserId,
        notation: &str,
    ) -> Result<usize, ServiceError>;
}

pub struct ApplyMoveUseCaseImpl<M: MoveService, S: SaveGameWorkflow> {
    move_service: Arc<M>,
    save_game_workflow: Arc<S>,
}

impl<M: MoveService, S: SaveGameWorkflow> ApplyMoveUseCaseImpl<M, S> {
    pub fn new(move_service: Arc<M>, save_game_workflow: Arc<S>) -> Self {
        Self {
            move_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<M: MoveService + Send + Sync + 'static, S: SaveGameWorkflow + Send + Sync + 'static>
    ApplyMoveUseCase for ApplyMoveUseCaseImpl<M, S>
{
    async fn apply_move(
        &self,
        game_id: GameId,
        user: UserId,
        notation: &str,
    ) -> Result<usize, ServiceError> {
        let now = chrono::Utc::now();
        match self.move_service.apply_move(game_id, user, notation, now)? {
            MaybeTimeout::Result(game) => {
                let move_count = game.moves.len();
                self.save_game_workflow.save_game(game).await;
                Ok(move_count)
            }
            MaybeTimeout::Timeout(game) => {
                let is_participant = game.side_of(user).is_some();
                self.save_game_workflow.save_game(game).await;
                if !is_participant {
                    return Err(ServiceError::Forbidden);
                }
                Err(ServiceError::invalid_state(GAME_OVER_TIMEOUT))
            }
        }
    }
}
