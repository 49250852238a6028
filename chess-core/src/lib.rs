mod clock;

use std::{str::FromStr, time::Duration};

pub use clock::{GameClock, elapsed_ms};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Side to move after `ply_count` half-moves have been played.
    pub fn to_move(ply_count: usize) -> Side {
        if ply_count % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Active,
    WhiteWon,
    BlackWon,
    Draw,
}

impl GameStatus {
    pub fn win_for(side: Side) -> GameStatus {
        match side {
            Side::White => GameStatus::WhiteWon,
            Side::Black => GameStatus::BlackWon,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == GameStatus::Active
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            GameStatus::WhiteWon => Some(Side::White),
            GameStatus::BlackWon => Some(Side::Black),
            GameStatus::Active | GameStatus::Draw => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::WhiteWon => "white_won",
            GameStatus::BlackWon => "black_won",
            GameStatus::Draw => "draw",
        }
    }
}

impl FromStr for GameStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GameStatus::Active),
            "white_won" => Ok(GameStatus::WhiteWon),
            "black_won" => Ok(GameStatus::BlackWon),
            "draw" => Ok(GameStatus::Draw),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultReason {
    Checkmate,
    Stalemate,
    Resignation,
    DrawAgreement,
    InsufficientMaterial,
    FiftyMove,
    ThreefoldRepetition,
    Timeout,
}

impl ResultReason {
    pub const ALL: [ResultReason; 8] = [
        ResultReason::Checkmate,
        ResultReason::Stalemate,
        ResultReason::Resignation,
        ResultReason::DrawAgreement,
        ResultReason::InsufficientMaterial,
        ResultReason::FiftyMove,
        ResultReason::ThreefoldRepetition,
        ResultReason::Timeout,
    ];

    /// Decisive reasons produce a winner, all others a draw.
    pub fn is_decisive(&self) -> bool {
        matches!(
            self,
            ResultReason::Checkmate | ResultReason::Resignation | ResultReason::Timeout
        )
    }

    /// Whether a game may end with `status` for this reason.
    pub fn allows(&self, status: GameStatus) -> bool {
        match status {
            GameStatus::Active => false,
            GameStatus::Draw => !self.is_decisive(),
            GameStatus::WhiteWon | GameStatus::BlackWon => self.is_decisive(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultReason::Checkmate => "checkmate",
            ResultReason::Stalemate => "stalemate",
            ResultReason::Resignation => "resignation",
            ResultReason::DrawAgreement => "draw_agreement",
            ResultReason::InsufficientMaterial => "insufficient_material",
            ResultReason::FiftyMove => "fifty_move",
            ResultReason::ThreefoldRepetition => "threefold_repetition",
            ResultReason::Timeout => "timeout",
        }
    }
}

impl FromStr for ResultReason {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Classification of a position reported by a rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalState {
    None,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMove,
    ThreefoldRepetition,
}

impl TerminalState {
    /// Final status and reason when `mover` produced this position.
    pub fn outcome(&self, mover: Side) -> Option<(GameStatus, ResultReason)> {
        match self {
            TerminalState::None => None,
            TerminalState::Checkmate => {
                Some((GameStatus::win_for(mover), ResultReason::Checkmate))
            }
            TerminalState::Stalemate => Some((GameStatus::Draw, ResultReason::Stalemate)),
            TerminalState::InsufficientMaterial => {
                Some((GameStatus::Draw, ResultReason::InsufficientMaterial))
            }
            TerminalState::FiftyMove => Some((GameStatus::Draw, ResultReason::FiftyMove)),
            TerminalState::ThreefoldRepetition => {
                Some((GameStatus::Draw, ResultReason::ThreefoldRepetition))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeControl {
    pub initial: Duration,
    pub increment: Duration,
}

impl TimeControl {
    pub fn new(initial: Duration, increment: Duration) -> Self {
        TimeControl { initial, increment }
    }

    pub fn is_valid(&self) -> bool {
        !self.initial.is_zero()
    }

    pub fn initial_ms(&self) -> u64 {
        self.initial.as_millis() as u64
    }

    pub fn increment_ms(&self) -> u64 {
        self.increment.as_millis() as u64
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl {
            initial: Duration::from_secs(600),
            increment: Duration::ZERO,
        }
    }
}

pub enum MaybeTimeout<R, T> {
    Result(R),
    Timeout(T),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_to_move_follows_ply_parity() {
        assert_eq!(Side::to_move(0), Side::White);
        assert_eq!(Side::to_move(1), Side::Black);
        assert_eq!(Side::to_move(2), Side::White);
        assert_eq!(Side::to_move(41), Side::Black);
    }

    #[test]
    fn test_terminal_outcomes() {
        assert_eq!(TerminalState::None.outcome(Side::White), None);
        assert_eq!(
            TerminalState::Checkmate.outcome(Side::Black),
            Some((GameStatus::BlackWon, ResultReason::Checkmate))
        );
        assert_eq!(
            TerminalState::Stalemate.outcome(Side::White),
            Some((GameStatus::Draw, ResultReason::Stalemate))
        );
        assert_eq!(
            TerminalState::ThreefoldRepetition.outcome(Side::Black),
            Some((GameStatus::Draw, ResultReason::ThreefoldRepetition))
        );
    }

    #[test]
    fn test_reason_status_consistency() {
        assert!(ResultReason::Resignation.allows(GameStatus::WhiteWon));
        assert!(!ResultReason::Resignation.allows(GameStatus::Draw));
        assert!(ResultReason::DrawAgreement.allows(GameStatus::Draw));
        assert!(!ResultReason::FiftyMove.allows(GameStatus::BlackWon));
        assert!(!ResultReason::Timeout.allows(GameStatus::Active));
    }

    #[test]
    fn test_names_parse_back() {
        for reason in ResultReason::ALL {
            assert_eq!(reason.as_str().parse::<ResultReason>(), Ok(reason));
        }
        assert_eq!("white_won".parse::<GameStatus>(), Ok(GameStatus::WhiteWon));
        assert!("resigned".parse::<ResultReason>().is_err());
    }

    #[test]
    fn test_time_control_validation() {
        assert!(TimeControl::default().is_valid());
        assert_eq!(TimeControl::default().initial_ms(), 600_000);
        assert!(!TimeControl::new(Duration::ZERO, Duration::from_secs(2)).is_valid());
    }
}
