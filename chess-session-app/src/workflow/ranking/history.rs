use std::sync::Arc;

use crate::domain::{
    UserId,
    game::GameService,
    ranking::{HistoryEntry, RankingService},
};

pub trait GameHistoryUseCase {
    /// Finished games of `user` from their point of view, newest first.
    fn history(&self, user: UserId) -> Vec<HistoryEntry>;
}

pub struct GameHistoryUseCaseImpl<G: GameService, R: RankingService> {
    game_service: Arc<G>,
    ranking_service: Arc<R>,
}

impl<G: GameService, R: RankingService> GameHistoryUseCaseImpl<G, R> {
    pub fn new(game_service: Arc<G>, ranking_service: Arc<R>) -> Self {
        Self {
            game_service,
            ranking_service,
        }
    }
}

impl<G: GameService, R: RankingService> GameHistoryUseCase for GameHistoryUseCaseImpl<G, R> {
    fn history(&self, user: UserId) -> Vec<HistoryEntry> {
        let finished = self.game_service.finished_games();
        self.ranking_service.history(user, &finished)
    }
}
