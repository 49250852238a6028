use std::borrow::Borrow;

use chrono::{DateTime, Utc};

use crate::domain::{
    GameId, InvitationId, UserRef,
    invitation::{Invitation, InvitationStatus},
};

pub mod accept;
pub mod cleanup;
pub mod decline;
pub mod list;
pub mod send;

#[derive(Clone, Debug, PartialEq)]
pub struct InvitationView {
    pub id: InvitationId,
    pub from: UserRef,
    pub to: UserRef,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub game_id: Option<GameId>,
}

impl<T: Borrow<Invitation>> From<T> for InvitationView {
    fn from(invitation: T) -> Self {
        let invitation = invitation.borrow();
        InvitationView {
            id: invitation.id,
            from: invitation.from.clone(),
            to: invitation.to.clone(),
            status: invitation.status,
            created_at: invitation.created_at,
            game_id: invitation.game_id,
        }
    }
}
