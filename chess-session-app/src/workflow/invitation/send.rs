use std::sync::Arc;

use crate::{
    domain::{ServiceError, UserRef, invitation::InvitationService},
    workflow::invitation::InvitationView,
};

pub trait SendInvitationUseCase {
    fn send_invitation(&self, from: UserRef, to: UserRef) -> Result<InvitationView, ServiceError>;
}

pub struct SendInvitationUseCaseImpl<I: InvitationService> {
    invitation_service: Arc<I>,
}

impl<I: InvitationService> SendInvitationUseCaseImpl<I> {
    pub fn new(invitation_service: Arc<I>) -> Self {
        Self { invitation_service }
    }
}

impl<I: InvitationService> SendInvitationUseCase for SendInvitationUseCaseImpl<I> {
    fn send_invitation(&self, from: UserRef, to: UserRef) -> Result<InvitationView, ServiceError> {
        self.invitation_service
            .create_invitation(from, to, chrono::Utc::now())
            .map(InvitationView::from)
    }
}
