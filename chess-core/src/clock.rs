use chrono::{DateTime, Utc};

use crate::{Side, TimeControl};

/// Milliseconds between `since` and `now`, zero if `now` is earlier.
pub fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    now.signed_duration_since(since).num_milliseconds().max(0) as u64
}

/// Stored budgets of both sides plus the instant the running clock was last punched.
///
/// Only the side to move loses time; its live budget is the stored budget minus the time
/// elapsed since `last_move_at`, clamped at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameClock {
    pub white_ms: u64,
    pub black_ms: u64,
    pub last_move_at: DateTime<Utc>,
}

impl GameClock {
    pub fn new(time_control: &TimeControl, started_at: DateTime<Utc>) -> Self {
        GameClock {
            white_ms: time_control.initial_ms(),
            black_ms: time_control.initial_ms(),
            last_move_at: started_at,
        }
    }

    pub fn stored(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_ms,
            Side::Black => self.black_ms,
        }
    }

    fn stored_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::White => &mut self.white_ms,
            Side::Black => &mut self.black_ms,
        }
    }

    pub fn remaining(&self, side: Side, to_move: Side, now: DateTime<Utc>) -> u64 {
        let stored = self.stored(side);
        if side != to_move {
            return stored;
        }
        stored.saturating_sub(elapsed_ms(self.last_move_at, now))
    }

    pub fn remaining_both(&self, to_move: Side, now: DateTime<Utc>) -> (u64, u64) {
        (
            self.remaining(Side::White, to_move, now),
            self.remaining(Side::Black, to_move, now),
        )
    }

    pub fn is_flagged(&self, to_move: Side, now: DateTime<Utc>) -> bool {
        self.remaining(to_move, to_move, now) == 0
    }

    /// Charges the mover for its thinking time, credits the increment and restarts the
    /// clock for the opponent.
    pub fn punch(&mut self, mover: Side, now: DateTime<Utc>, increment_ms: u64) {
        let elapsed = elapsed_ms(self.last_move_at, now);
        let remaining = self.stored_mut(mover);
        *remaining = remaining.saturating_sub(elapsed).saturating_add(increment_ms);
        self.last_move_at = now;
    }

    /// Freezes the clock at game end. `last_move_at` keeps pointing at the last move.
    pub fn stop(&mut self, to_move: Side, now: DateTime<Utc>) {
        let elapsed = elapsed_ms(self.last_move_at, now);
        let remaining = self.stored_mut(to_move);
        *remaining = remaining.saturating_sub(elapsed);
    }
}
