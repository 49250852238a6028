use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::domain::{GameId, InvitationId, ServiceError, UserId, UserRef, game::Game};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invitation {
    pub id: InvitationId,
    pub from: UserRef,
    pub to: UserRef,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    /// Set once the invitation was accepted.
    pub game_id: Option<GameId>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn involves(&self, user: UserId) -> bool {
        self.from.id == user || self.to.id == user
    }

    fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.status == InvitationStatus::Pending && now.signed_duration_since(self.created_at) >= ttl
    }

    fn is_prunable(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.resolved_at
            .is_some_and(|resolved_at| now.signed_duration_since(resolved_at) >= ttl)
    }
}

pub trait InvitationService {
    fn create_invitation(
        &self,
        from: UserRef,
        to: UserRef,
        now: DateTime<Utc>,
    ) -> Result<Invitation, ServiceError>;
    /// Accepts a pending invitation. `start_game` runs under the registry lock, so the game
    /// exists exactly when the invitation reads as accepted.
    fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
        now: DateTime<Utc>,
        start_game: impl FnOnce(&Invitation) -> Game,
    ) -> Result<(Invitation, Game), ServiceError>;
    fn decline_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Invitation, ServiceError>;
    fn get_invitation(&self, invitation_id: InvitationId, now: DateTime<Utc>) -> Option<Invitation>;
    fn list_invitations(&self, user: UserId, now: DateTime<Utc>) -> Vec<Invitation>;
    fn expire_stale(&self, now: DateTime<Utc>) -> Vec<Invitation>;
    /// Forgets invitations resolved at least one TTL ago. Returns how many were dropped.
    fn prune_resolved(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct UserPair(UserId, UserId);

impl UserPair {
    fn new(a: UserId, b: UserId) -> Self {
        if a <= b { UserPair(a, b) } else { UserPair(b, a) }
    }
}

struct InvitationRegistry {
    invitations: HashMap<InvitationId, Invitation>,
    pending_by_pair: HashMap<UserPair, InvitationId>,
    invitations_by_user: HashMap<UserId, HashSet<InvitationId>>,
    next_invitation_id: u32,
}

impl InvitationRegistry {
    fn new() -> Self {
        Self {
            invitations: HashMap::new(),
            pending_by_pair: HashMap::new(),
            invitations_by_user: HashMap::new(),
            next_invitation_id: 1,
        }
    }

    fn increment_invitation_id(&mut self) -> InvitationId {
        let invitation_id = InvitationId::new(self.next_invitation_id);
        self.next_invitation_id += 1;
        invitation_id
    }

    fn add_invitation(&mut self, make: impl FnOnce(InvitationId) -> Invitation) -> Invitation {
        let invitation = make(self.increment_invitation_id());
        self.pending_by_pair.insert(
            UserPair::new(invitation.from.id, invitation.to.id),
            invitation.id,
        );
        for user in [invitation.from.id, invitation.to.id] {
            self.invitations_by_user
                .entry(user)
                .or_default()
                .insert(invitation.id);
        }
        self.invitations.insert(invitation.id, invitation.clone());
        invitation
    }

    /// Moves a pending invitation out of the pair index into `status`.
    fn resolve(
        &mut self,
        invitation_id: InvitationId,
        status: InvitationStatus,
        now: DateTime<Utc>,
    ) {
        let Some(invitation) = self.invitations.get_mut(&invitation_id) else {
            return;
        };
        invitation.status = status;
        invitation.resolved_at = Some(now);
        let pair = UserPair::new(invitation.from.id, invitation.to.id);
        if self.pending_by_pair.get(&pair) == Some(&invitation_id) {
            self.pending_by_pair.remove(&pair);
        }
    }

    fn remove_invitation(&mut self, invitation_id: InvitationId) {
        let Some(invitation) = self.invitations.remove(&invitation_id) else {
            return;
        };
        for user in [invitation.from.id, invitation.to.id] {
            if let Some(ids) = self.invitations_by_user.get_mut(&user) {
                ids.remove(&invitation_id);
                if ids.is_empty() {
                    self.invitations_by_user.remove(&user);
                }
            }
        }
    }

    /// Lazily expires the invitation; returns it when this call expired it.
    fn refresh(
        &mut self,
        invitation_id: InvitationId,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Option<Invitation> {
        let is_stale = self
            .invitations
            .get(&invitation_id)
            .is_some_and(|invitation| invitation.is_stale(now, ttl));
        if !is_stale {
            return None;
        }
        self.resolve(invitation_id, InvitationStatus::Expired, now);
        let expired = self.invitations.get(&invitation_id).cloned();
        if let Some(invitation) = &expired {
            log::info!(
                "Invitation {} from {} to {} expired",
                invitation.id,
                invitation.from.name,
                invitation.to.name
            );
        }
        expired
    }

    fn pending_for_pair(&self, pair: UserPair) -> Option<InvitationId> {
        self.pending_by_pair.get(&pair).copied()
    }

    /// Guards shared by accept and decline: exists, addressed to `by`, still pending.
    fn check_resolvable(
        &mut self,
        invitation_id: InvitationId,
        by: UserId,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Result<Invitation, ServiceError> {
        let addressee = self
            .invitations
            .get(&invitation_id)
            .map(|invitation| invitation.to.id)
            .ok_or(ServiceError::NotFound)?;
        if addressee != by {
            return Err(ServiceError::Forbidden);
        }
        self.refresh(invitation_id, now, ttl);
        let invitation = self
            .invitations
            .get(&invitation_id)
            .cloned()
            .ok_or(ServiceError::NotFound)?;
        if invitation.status != InvitationStatus::Pending {
            return Err(ServiceError::invalid_state(format!(
                "invitation is {}",
                invitation.status.as_str()
            )));
        }
        Ok(invitation)
    }
}

pub struct InvitationServiceImpl {
    registry: Mutex<InvitationRegistry>,
    ttl: TimeDelta,
}

impl InvitationServiceImpl {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            registry: Mutex::new(InvitationRegistry::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }
}

impl InvitationService for InvitationServiceImpl {
    fn create_invitation(
        &self,
        from: UserRef,
        to: UserRef,
        now: DateTime<Utc>,
    ) -> Result<Invitation, ServiceError> {
        if from.id == to.id {
            return Err(ServiceError::invalid_request("cannot invite yourself"));
        }
        let pair = UserPair::new(from.id, to.id);
        let mut registry = self.registry.lock();
        if let Some(existing) = registry.pending_for_pair(pair) {
            registry.refresh(existing, now, self.ttl);
            if registry.pending_for_pair(pair).is_some() {
                return Err(ServiceError::Conflict);
            }
        }
        let invitation = registry.add_invitation(|id| Invitation {
            id,
            from,
            to,
            status: InvitationStatus::Pending,
            created_at: now,
            game_id: None,
            resolved_at: None,
        });
        log::info!(
            "Invitation {} created from {} to {}",
            invitation.id,
            invitation.from.name,
            invitation.to.name
        );
        Ok(invitation)
    }

    fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
        now: DateTime<Utc>,
        start_game: impl FnOnce(&Invitation) -> Game,
    ) -> Result<(Invitation, Game), ServiceError> {
        let mut registry = self.registry.lock();
        let pending = registry.check_resolvable(invitation_id, by, now, self.ttl)?;
        let game = start_game(&pending);
        registry.resolve(invitation_id, InvitationStatus::Accepted, now);
        let accepted = registry
            .invitations
            .get_mut(&invitation_id)
            .map(|invitation| {
                invitation.game_id = Some(game.id);
                invitation.clone()
            })
            .ok_or(ServiceError::NotFound)?;
        log::info!("Invitation {} accepted, game {}", invitation_id, game.id);
        Ok((accepted, game))
    }

    fn decline_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Invitation, ServiceError> {
        let mut registry = self.registry.lock();
        registry.check_resolvable(invitation_id, by, now, self.ttl)?;
        registry.resolve(invitation_id, InvitationStatus::Declined, now);
        log::info!("Invitation {} declined", invitation_id);
        registry
            .invitations
            .get(&invitation_id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    fn get_invitation(&self, invitation_id: InvitationId, now: DateTime<Utc>) -> Option<Invitation> {
        let mut registry = self.registry.lock();
        registry.refresh(invitation_id, now, self.ttl);
        registry.invitations.get(&invitation_id).cloned()
    }

    fn list_invitations(&self, user: UserId, now: DateTime<Utc>) -> Vec<Invitation> {
        let mut registry = self.registry.lock();
        let ids: Vec<InvitationId> = registry
            .invitations_by_user
            .get(&user)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        let mut invitations: Vec<Invitation> = ids
            .into_iter()
            .filter_map(|id| {
                registry.refresh(id, now, self.ttl);
                registry.invitations.get(&id).cloned()
            })
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        invitations
    }

    fn expire_stale(&self, now: DateTime<Utc>) -> Vec<Invitation> {
        let mut registry = self.registry.lock();
        let pending: Vec<InvitationId> = registry.pending_by_pair.values().copied().collect();
        pending
            .into_iter()
            .filter_map(|id| registry.refresh(id, now, self.ttl))
            .collect()
    }

    fn prune_resolved(&self, now: DateTime<Utc>) -> usize {
        let mut registry = self.registry.lock();
        let prunable: Vec<InvitationId> = registry
            .invitations
            .values()
            .filter(|invitation| invitation.is_prunable(now, self.ttl))
            .map(|invitation| invitation.id)
            .collect();
        for invitation_id in &prunable {
            registry.remove_invitation(*invitation_id);
        }
        prunable.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeDelta;

    use super::*;
    use crate::domain::game::{
        GameService, GameServiceImpl,
        tests::{alice, blitz, bob},
    };

    fn service() -> InvitationServiceImpl {
        InvitationServiceImpl::new(Duration::from_secs(60))
    }

    #[test]
    fn test_cannot_invite_self() {
        let a = alice();
        let result = service().create_invitation(a.clone(), a, Utc::now());
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[test]
    fn test_one_pending_invitation_per_pair_in_either_direction() {
        let service = service();
        let (a, b) = (alice(), bob());
        let now = Utc::now();

        let first = service.create_invitation(a.clone(), b.clone(), now).unwrap();
        assert_eq!(first.status, InvitationStatus::Pending);
        assert!(matches!(
            service.create_invitation(a.clone(), b.clone(), now),
            Err(ServiceError::Conflict)
        ));
        assert!(matches!(
            service.create_invitation(b.clone(), a.clone(), now),
            Err(ServiceError::Conflict)
        ));

        service.decline_invitation(first.id, b.id, now).unwrap();
        assert!(service.create_invitation(b, a, now).is_ok());
    }

    #[test]
    fn test_accept_guards() {
        let service = service();
        let games = GameServiceImpl::new();
        let (a, b) = (alice(), bob());
        let now = Utc::now();
        let invitation = service.create_invitation(a.clone(), b.clone(), now).unwrap();
        let start = |inv: &Invitation| {
            games.create_game(inv.from.clone(), inv.to.clone(), blitz(), now)
        };

        assert!(matches!(
            service.accept_invitation(InvitationId::new(99), b.id, now, start),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            service.accept_invitation(invitation.id, a.id, now, start),
            Err(ServiceError::Forbidden)
        ));
        assert!(games.active_game_ids().is_empty());

        let (accepted, game) = service.accept_invitation(invitation.id, b.id, now, start).unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);
        assert_eq!(accepted.game_id, Some(game.id));
        assert_eq!(games.active_game_ids(), vec![game.id]);

        assert!(matches!(
            service.accept_invitation(invitation.id, b.id, now, start),
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            service.decline_invitation(invitation.id, b.id, now),
            Err(ServiceError::InvalidState(_))
        ));
        assert_eq!(games.active_game_ids().len(), 1);
    }

    #[test]
    fn test_expired_invitation_cannot_be_resolved() {
        let service = service();
        let (a, b) = (alice(), bob());
        let now = Utc::now();
        let invitation = service.create_invitation(a.clone(), b.clone(), now).unwrap();
        let later = now + TimeDelta::seconds(61);

        let declined = service.decline_invitation(invitation.id, b.id, later);

        assert!(matches!(declined, Err(ServiceError::InvalidState(msg)) if msg == "invitation is expired"));
        assert_eq!(
            service.get_invitation(invitation.id, later).unwrap().status,
            InvitationStatus::Expired
        );
        assert!(service.create_invitation(a, b, later).is_ok());
    }

    #[test]
    fn test_expire_stale_sweeps_only_old_pending() {
        let service = service();
        let now = Utc::now();
        let old = service.create_invitation(alice(), bob(), now).unwrap();
        let fresh = service
            .create_invitation(alice(), bob(), now + TimeDelta::seconds(30))
            .unwrap();

        let expired = service.expire_stale(now + TimeDelta::seconds(70));

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);
        assert_eq!(
            service.get_invitation(fresh.id, now + TimeDelta::seconds(70)).unwrap().status,
            InvitationStatus::Pending
        );
        assert!(service.expire_stale(now + TimeDelta::seconds(70)).is_empty());
    }

    #[test]
    fn test_prune_drops_only_long_resolved_invitations() {
        let service = service();
        let (a, b, c) = (alice(), bob(), UserRef::new(UserId::new(), "carol"));
        let now = Utc::now();
        let declined = service.create_invitation(a.clone(), b.clone(), now).unwrap();
        service.decline_invitation(declined.id, b.id, now).unwrap();
        let pending = service
            .create_invitation(a.clone(), c.clone(), now + TimeDelta::seconds(30))
            .unwrap();

        assert_eq!(service.prune_resolved(now + TimeDelta::seconds(59)), 0);
        assert_eq!(service.prune_resolved(now + TimeDelta::seconds(60)), 1);

        let later = now + TimeDelta::seconds(60);
        assert!(service.get_invitation(declined.id, later).is_none());
        assert!(service.list_invitations(b.id, later).is_empty());
        let remaining = service.list_invitations(a.id, later);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, pending.id);
        assert_eq!(remaining[0].status, InvitationStatus::Pending);
    }

    #[test]
    fn test_list_invitations_newest_first() {
        let service = service();
        let (a, b, c) = (alice(), bob(), UserRef::new(UserId::new(), "carol"));
        let now = Utc::now();
        let first = service.create_invitation(a.clone(), b.clone(), now).unwrap();
        let second = service
            .create_invitation(c.clone(), a.clone(), now + TimeDelta::seconds(1))
            .unwrap();
        service.create_invitation(b.clone(), c.clone(), now).unwrap();

        let listed = service.list_invitations(a.id, now + TimeDelta::seconds(2));

        let ids: Vec<InvitationId> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(listed.iter().all(|i| i.involves(a.id)));
    }
}
