use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::workflow::gameplay::timeout::ObserveGameTimeoutUseCase;

/// Periodic timeout check over all active games, backing up the per-game runners.
pub struct ClockSweepJob<O: ObserveGameTimeoutUseCase> {
    observer: Arc<O>,
    period: Duration,
    shutdown: CancellationToken,
}

impl<O: ObserveGameTimeoutUseCase + Send + Sync + 'static> ClockSweepJob<O> {
    pub fn new(observer: Arc<O>, period: Duration, shutdown: CancellationToken) -> Self {
        Self {
            observer,
            period,
            shutdown,
        }
    }

    pub async fn run(&self) {
        log::info!("Clock sweep running every {:?}", self.period);
        let mut interval = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            let timed_out = self.observer.sweep(chrono::Utc::now()).await;
            if timed_out > 0 {
                log::info!("Clock sweep ended {} game(s) by timeout", timed_out);
            }
        }
        log::info!("Clock sweep stopped");
    }
}
