use std::{sync::Arc, time::Duration};

use chess_core::Side;
use chrono::{DateTime, Utc};

use crate::{
    domain::{
        GameId,
        clock::{CheckTimeoutResult, ClockService},
    },
    workflow::gameplay::save_game::SaveGameWorkflow,
};

const FLAG_CHECK_GRACE: Duration = Duration::from_millis(100);

pub enum ObserveOutcome {
    Finished,
    Continue(Duration),
}

#[async_trait::async_trait]
pub trait ObserveGameTimeoutUseCase {
    async fn tick(&self, game_id: GameId, now: DateTime<Utc>) -> ObserveOutcome;
    /// Returns how many games were ended by timeout.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;
}

pub struct ObserveGameTimeoutUseCaseImpl<C: ClockService, S: SaveGameWorkflow> {
    clock_service: Arc<C>,
    save_game_workflow: Arc<S>,
}

impl<C: ClockService, S: SaveGameWorkflow> ObserveGameTimeoutUseCaseImpl<C, S> {
    pub fn new(clock_service: Arc<C>, save_game_workflow: Arc<S>) -> Self {
        Self {
            clock_service,
            save_game_workflow,
        }
    }
}

#[async_trait::async_trait]
impl<C: ClockService + Send + Sync + 'static, S: SaveGameWorkflow + Send + Sync + 'static>
    ObserveGameTimeoutUseCase for ObserveGameTimeoutUseCaseImpl<C, S>
{
    async fn tick(&self, game_id: GameId, now: DateTime<Utc>) -> ObserveOutcome {
        match self.clock_service.check_timeout(game_id, now) {
            CheckTimeoutResult::TimedOut(game) => {
                self.save_game_workflow.save_game(game).await;
                ObserveOutcome::Finished
            }
            CheckTimeoutResult::Running(game) => {
                let remaining = game.time_remaining(now);
                let remaining_ms = match game.side_to_move() {
                    Side::White => remaining.white_ms,
                    Side::Black => remaining.black_ms,
                };
                ObserveOutcome::Continue(Duration::from_millis(remaining_ms) + FLAG_CHECK_GRACE)
            }
            CheckTimeoutResult::NotActive(_) | CheckTimeoutResult::GameNotFound => {
                ObserveOutcome::Finished
            }
        }
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let timed_out = self.clock_service.sweep(now);
        let count = timed_out.len();
        for game in timed_out {
            self.save_game_workflow.save_game(game).await;
        }
        count
    }
}
