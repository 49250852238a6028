use std::sync::Arc;

use crate::{
    domain::{
        GameId, ServiceError,
        clock::{CheckTimeoutResult, ClockService},
    },
    workflow::gameplay::{GameView, save_game::SaveGameWorkflow},
};

#[async_trait::async_trait]
pub trait GetGameUseCase {
    async fn get_game(&self, game_id: GameId) -> Result<GameView, ServiceError>;
}

pub struct GetGameUseCaseImpl<C: ClockService, S: SaveGameWorkflow> {
    clock_service: Arc<C>,
    save_game_workflow: Arc<S>,
}

impl<C: ClockService, S: SaveGameWorkflow> GetGameUseCaseImpl<C, S> {
    pub fn new(clock_service: Arc<C>, save_game_workflow: Arc<S>) -> Self {
        Self {
            clock_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<C: ClockService + Send + Sync + 'static, S: SaveGameWorkflow + Send + Sync + 'static>
    GetGameUseCase for GetGameUseCaseImpl<C, S>
{
    async fn get_game(&self, game_id: GameId) -> Result<GameView, ServiceError> {
        let now = chrono::Utc::now();
        match self.clock_service.check_timeout(game_id, now) {
            CheckTimeoutResult::GameNotFound => Err(ServiceError::NotFound),
            CheckTimeoutResult::TimedOut(game) => {
                let view = GameView::from(&game, now);
                self.save_game_workflow.save_game(game).await;
                Ok(view)
            }
            CheckTimeoutResult::Running(game) | CheckTimeoutResult::NotActive(game) => {
                Ok(GameView::from(game, now))
            }
        }
    }
}
