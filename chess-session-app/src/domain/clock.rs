use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    GameId,
    game::{Game, GameService},
    result::finalize_timeout,
};

pub enum CheckTimeoutResult {
    GameNotFound,
    NotActive(Game),
    TimedOut(Game),
    Running(Game),
}

/// Server-authoritative enforcement of the time budgets.
pub trait ClockService {
    fn check_timeout(&self, game_id: GameId, now: DateTime<Utc>) -> CheckTimeoutResult;
    /// Ends every active game whose side to move has run out of time.
    fn sweep(&self, now: DateTime<Utc>) -> Vec<Game>;
}

pub struct ClockServiceImpl<G: GameService> {
    game_service: Arc<G>,
}

impl<G: GameService> ClockServiceImpl<G> {
    pub fn new(game_service: Arc<G>) -> Self {
        Self { game_service }
    }
}

impl<G: GameService> ClockService for ClockServiceImpl<G> {
    fn check_timeout(&self, game_id: GameId, now: DateTime<Utc>) -> CheckTimeoutResult {
        self.game_service
            .with_game(game_id, |game| {
                if !game.is_active() {
                    return CheckTimeoutResult::NotActive(game.clone());
                }
                if !game.is_flagged(now) {
                    return CheckTimeoutResult::Running(game.clone());
                }
                match finalize_timeout(game, now) {
                    Ok(()) => CheckTimeoutResult::TimedOut(game.clone()),
                    Err(_) => CheckTimeoutResult::NotActive(game.clone()),
                }
            })
            .unwrap_or(CheckTimeoutResult::GameNotFound)
    }

    fn sweep(&self, now: DateTime<Utc>) -> Vec<Game> {
        self.game_service
            .active_game_ids()
            .into_iter()
            .filter_map(|game_id| match self.check_timeout(game_id, now) {
                CheckTimeoutResult::TimedOut(game) => Some(game),
                _ => None,
            })
            .collect()
    }
}
