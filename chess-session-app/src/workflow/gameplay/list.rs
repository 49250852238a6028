use std::sync::Arc;

use crate::{
    domain::{
        UserId,
        clock::{CheckTimeoutResult, ClockService},
        game::GameService,
    },
    workflow::gameplay::{GameView, save_game::SaveGameWorkflow},
};

#[async_trait::async_trait]
pub trait ListGamesUseCase {
    /// Active and finished games of `user`, newest first.
    async fn list_games(&self, user: UserId) -> Vec<GameView>;
}

pub struct ListGamesUseCaseImpl<G: GameService, C: ClockService, S: SaveGameWorkflow> {
    game_service: Arc<G>,
    clock_service: Arc<C>,
    save_game_workflow: Arc<S>,
}

impl<G: GameService, C: ClockService, S: SaveGameWorkflow> ListGamesUseCaseImpl<G, C, S> {
    pub fn new(game_service: Arc<G>, clock_service: Arc<C>, save_game_workflow: Arc<S>) -> Self {
        Self {
            game_service,
            clock_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<
    G: GameService + Send + Sync + 'static,
    C: ClockService + Send + Sync + 'static,
    S: SaveGameWorkflow + Send + Sync + 'static,
> ListGamesUseCase for ListGamesUseCaseImpl<G, C, S>
{
    async fn list_games(&self, user: UserId) -> Vec<GameView> {
        let now = chrono::Utc::now();
        let games = self.game_service.list_games_of(user);
        let mut views = Vec::with_capacity(games.len());
        for game in games {
            if !game.is_active() {
                views.push(GameView::from(game, now));
                continue;
            }
            match self.clock_service.check_timeout(game.id, now) {
                CheckTimeoutResult::TimedOut(game) => {
                    views.push(GameView::from(&game, now));
                    self.save_game_workflow.save_game(game).await;
                }
                CheckTimeoutResult::Running(game) | CheckTimeoutResult::NotActive(game) => {
                    views.push(GameView::from(game, now));
                }
                CheckTimeoutResult::GameNotFound => {}
            }
        }
        views
    }
}
