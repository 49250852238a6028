use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::domain::invitation::InvitationService;

pub struct InvitationCleanupJob<I: InvitationService> {
    invitation_service: Arc<I>,
    period: Duration,
    shutdown: CancellationToken,
}

impl<I: InvitationService + Send + Sync + 'static> InvitationCleanupJob<I> {
    pub fn new(invitation_service: Arc<I>, period: Duration, shutdown: CancellationToken) -> Self {
        Self {
            invitation_service,
            period,
            shutdown,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            let now = chrono::Utc::now();
            let expired = self.invitation_service.expire_stale(now);
            if !expired.is_empty() {
                log::debug!("Expired {} stale invitation(s)", expired.len());
            }
            let pruned = self.invitation_service.prune_resolved(now);
            if pruned > 0 {
                log::debug!("Dropped {} resolved invitation(s)", pruned);
            }
        }
        log::info!("Invitation cleanup stopped");
    }
}
