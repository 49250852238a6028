use std::sync::Arc;

use crate::{
    domain::{UserId, invitation::InvitationService},
    workflow::invitation::InvitationView,
};

pub trait ListInvitationsUseCase {
    /// Invitations sent or received by `user`, newest first.
    fn list_invitations(&self, user: UserId) -> Vec<InvitationView>;
}

pub struct ListInvitationsUseCaseImpl<I: InvitationService> {
    invitation_service: Arc<I>,
}

impl<I: InvitationService> ListInvitationsUseCaseImpl<I> {
    pub fn new(invitation_service: Arc<I>) -> Self {
        Self { invitation_service }
    }
}

impl<I: InvitationService> ListInvitationsUseCase for ListInvitationsUseCaseImpl<I> {
    fn list_invitations(&self, user: UserId) -> Vec<InvitationView> {
        self.invitation_service
            .list_invitations(user, chrono::Utc::now())
            .into_iter()
            .map(InvitationView::from)
            .collect()
    }
}
