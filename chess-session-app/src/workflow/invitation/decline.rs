use std::sync::Arc;

use crate::{
    domain::{InvitationId, ServiceError, UserId, invitation::InvitationService},
    workflow::invitation::InvitationView,
};

pub trait DeclineInvitationUseCase {
    fn decline_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
    ) -> Result<InvitationView, ServiceError>;
}

pub struct DeclineInvitationUseCaseImpl<I: InvitationService> {
    invitation_service: Arc<I>,
}

impl<I: InvitationService> DeclineInvitationUseCaseImpl<I> {
    pub fn new(invitation_service: Arc<I>) -> Self {
        Self { invitation_service }
    }
}

impl<I: InvitationService> DeclineInvitationUseCase for DeclineInvitationUseCaseImpl<I> {
    fn decline_invitation(
        &self,
        invitation_id: InvitationId,
        by: UserId,
    ) -> Result<InvitationView, ServiceError> {
        self.invitation_service
            .decline_invitation(invitation_id, by, chrono::Utc::now())
            .map(InvitationView::from)
    }
}
