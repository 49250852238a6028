use std::sync::Arc;

use crate::{domain::game::Game, ports::persistence::GameRepository};

/// Write-through of a game snapshot. The in-memory store stays authoritative, so a failed
/// write is logged and otherwise ignored.
#[async_trait::async_trait]
pub trait SaveGameWorkflow {
    async fn save_game(&self, game: Game);
}

pub struct SaveGameWorkflowImpl<R: GameRepository> {
    game_repository: Arc<R>,
}

impl<R: GameRepository> SaveGameWorkflowImpl<R> {
    pub fn new(game_repository: Arc<R>) -> Self {
        Self { game_repository }
    }
}

#[async_trait::async_trait]
impl<R: GameRepository + Send + Sync + 'static> SaveGameWorkflow for SaveGameWorkflowImpl<R> {
    async fn save_game(&self, game: Game) {
        let game_id = game.id;
        let revision = game.revision();
        if let Err(e) = self.game_repository.save_game(game).await {
            log::error!(
                "Failed to persist game {} at revision {}: {}",
                game_id,
                revision,
                e
            );
        }
    }
}
