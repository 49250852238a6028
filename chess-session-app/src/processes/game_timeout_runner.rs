use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    domain::GameId,
    workflow::gameplay::timeout::{ObserveGameTimeoutUseCase, ObserveOutcome},
};

pub trait GameTimeoutRunner {
    fn schedule_game_timeout_check(this: Arc<Self>, game_id: GameId);
}

/// One task per active game that wakes up when the side to move would run out of time.
pub struct GameTimeoutRunnerImpl<O: ObserveGameTimeoutUseCase + Send + Sync + 'static> {
    observer: Arc<O>,
    shutdown: CancellationToken,
}

impl<O: ObserveGameTimeoutUseCase + Send + Sync + 'static> GameTimeoutRunner
    for GameTimeoutRunnerImpl<O>
{
    fn schedule_game_timeout_check(this: Arc<Self>, game_id: GameId) {
        tokio::spawn(async move {
            Self::run(this, game_id).await;
        });
    }
}

impl<O: ObserveGameTimeoutUseCase + Send + Sync + 'static> GameTimeoutRunnerImpl<O> {
    pub fn new(observer: Arc<O>, shutdown: CancellationToken) -> Self {
        Self { observer, shutdown }
    }

    async fn run(this: Arc<Self>, game_id: GameId) {
        loop {
            let now = chrono::Utc::now();
            match this.observer.tick(game_id, now).await {
                ObserveOutcome::Finished => return,
                ObserveOutcome::Continue(delay) => {
                    tokio::select! {
                        _ = this.shutdown.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
