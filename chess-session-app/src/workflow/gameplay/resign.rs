use std::sync::Arc;

use chess_core::MaybeTimeout;

use crate::{
    domain::{GAME_OVER_TIMEOUT, GameId, ServiceError, UserId, result::ResultService},
    workflow::gameplay::{GameView, save_game::SaveGameWorkflow},
};

#[async_trait::async_trait]
pub trait ResignUseCase {
    async fn resign(&self, game_id: GameId, user: UserId) -> Result<GameView, ServiceError>;
}

pub struct ResignUseCaseImpl<R: ResultService, S: SaveGameWorkflow> {
    result_service: Arc<R>,
    save_game_workflow: Arc<S>,
}

impl<R: ResultService, S: SaveGameWorkflow> ResignUseCaseImpl<R, S> {
    pub fn new(result_service: Arc<R>, save_game_workflow: Arc<S>) -> Self {
        Self {
            result_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<R: ResultService + Send + Sync + 'static, S: SaveGameWorkflow + Send + Sync + 'static>
    ResignUseCase for ResignUseCaseImpl<R, S>
{
    async fn resign(&self, game_id: GameId, user: UserId) -> Result<GameView, ServiceError> {
        let now = chrono::Utc::now();
        match self.result_service.resign(game_id, user, now)? {
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
