use std::borrow::Borrow;

use chess_core::{GameStatus, ResultReason, Side};
use chrono::{DateTime, Utc};

use crate::domain::{GameId, UserRef, game::Game};

pub mod apply_move;
pub mod finish;
pub mod get;
pub mod list;
pub mod resign;
pub mod save_game;
pub mod timeout;

/// A game as handed to callers, with the clocks evaluated at the time of the read.
#[derive(Clone, Debug, PartialEq)]
pub struct GameView {
    pub id: GameId,
    pub white: UserRef,
    pub black: UserRef,
    pub moves: Vec<String>,
    pub status: GameStatus,
    pub result_reason: Option<ResultReason>,
    /// `None` once the game is over.
    pub side_to_move: Option<Side>,
    pub white_time_ms: u64,
    pub black_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub last_move_at: DateTime<Utc>,
}

impl GameView {
    pub fn from(game: impl Borrow<Game>, now: DateTime<Utc>) -> Self {
        let game = game.borrow();
        let remaining = game.time_remaining(now);
        GameView {
            id: game.id,
            white: game.white.clone(),
            black: game.black.clone(),
            moves: game.moves.clone(),
            status: game.status,
            result_reason: game.result_reason,
            side_to_move: game.is_active().then(|| game.side_to_move()),
            white_time_ms: remaining.white_ms,
            black_time_ms: remaining.black_ms,
            created_at: game.created_at,
            last_move_at: game.last_move_at(),
        }
    }
}
