use std::time::Duration;

use chess_core::{GameClock, GameStatus, ResultReason, TimeControl};
use chess_session_app::domain::{GameId, UserId, UserRef, game::Game};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// On-disk shape of a game: the move log as an ordered list of notations, everything else
/// as scalar fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEntity {
    pub id: u32,
    pub revision: u64,
    pub white_id: Uuid,
    pub white_name: String,
    pub black_id: Uuid,
    pub black_name: String,
    pub moves: Vec<String>,
    pub status: String,
    pub result_reason: Option<String>,
    pub initial_time_ms: u64,
    pub increment_ms: u64,
    pub white_time_ms: u64,
    pub black_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub last_move_at: DateTime<Utc>,
}

impl GameEntity {
    pub fn from_game(game: &Game) -> Self {
        GameEntity {
            id: game.id.value(),
            revision: game.revision(),
            white_id: game.white.id.0,
            white_name: game.white.name.clone(),
            black_id: game.black.id.0,
            black_name: game.black.name.clone(),
            moves: game.moves.clone(),
            status: game.status.as_str().to_string(),
            result_reason: game.result_reason.map(|reason| reason.as_str().to_string()),
            initial_time_ms: game.time_control.initial_ms(),
            increment_ms: game.time_control.increment_ms(),
            white_time_ms: game.clock.white_ms,
            black_time_ms: game.clock.black_ms,
            created_at: game.created_at,
            last_move_at: game.clock.last_move_at,
        }
    }

    pub fn into_game(self) -> Result<Game, String> {
        let status: GameStatus = self.status.parse().map_err(|e| format!("{}", e))?;
        let result_reason = self
            .result_reason
            .map(|reason| reason.parse::<ResultReason>())
            .transpose()
            .map_err(|e| format!("{}", e))?;
        if status.is_active() != result_reason.is_none()
            || result_reason.is_some_and(|reason| !reason.allows(status))
        {
            return Err(format!(
                "status {} does not match result reason {:?}",
                self.status, result_reason
            ));
        }
        Ok(Game {
            id: GameId::new(self.id),
            white: UserRef::new(UserId(self.white_id), self.white_name),
            black: UserRef::new(UserId(self.black_id), self.black_name),
            moves: self.moves,
            status,
            result_reason,
            time_control: TimeControl::new(
                Duration::from_millis(self.initial_time_ms),
                Duration::from_millis(self.increment_ms),
            ),
            clock: GameClock {
                white_ms: self.white_time_ms,
                black_ms: self.black_time_ms,
                last_move_at: self.last_move_at,
            },
            created_at: self.created_at,
        })
    }
}
