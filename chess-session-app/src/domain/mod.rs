pub mod clock;
pub mod game;
pub mod invitation;
pub mod moves;
pub mod ranking;
pub mod result;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

/// A portal user as seen by the session manager: its id and the display name at the time
/// it was referenced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        UserRef {
            id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u32);

impl GameId {
    pub fn new(id: u32) -> Self {
        GameId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvitationId(u32);

impl InvitationId {
    pub fn new(id: u32) -> Self {
        InvitationId(id)
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-visible failures of every session operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("conflict")]
    Conflict,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        ServiceError::InvalidState(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ServiceError::InvalidRequest(msg.into())
    }
}

pub const NOT_YOUR_TURN: &str = "not your turn";
pub const GAME_OVER_TIMEOUT: &str = "game over: timeout";
pub const GAME_ALREADY_FINISHED: &str = "game already finished";

#[derive(Debug, Clone, Error)]
pub enum RepoError {
    #[error("storage error: {0}")]
    StorageError(String),
}
