use std::sync::Arc;

use crate::domain::{
    game::GameService,
    ranking::{RankEntry, RankingService},
};

pub trait RankingsUseCase {
    fn rankings(&self) -> Vec<RankEntry>;
}

pub struct RankingsUseCaseImpl<G: GameService, R: RankingService> {
    game_service: Arc<G>,
    ranking_service: Arc<R>,
}

impl<G: GameService, R: RankingService> RankingsUseCaseImpl<G, R> {
    pub fn new(game_service: Arc<G>, ranking_service: Arc<R>) -> Self {
        Self {
            game_service,
            ranking_service,
        }
    }
}

impl<G: GameService, R: RankingService> RankingsUseCase for RankingsUseCaseImpl<G, R> {
    fn rankings(&self) -> Vec<RankEntry> {
        let finished = self.game_service.finished_games();
        self.ranking_service.rankings(&finished)
    }
}
