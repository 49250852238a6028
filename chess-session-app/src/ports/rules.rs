use chess_core::TerminalState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct IllegalMove {
    pub reason: String,
}

impl IllegalMove {
    pub fn new(reason: impl Into<String>) -> Self {
        IllegalMove {
            reason: reason.into(),
        }
    }
}

/// Move legality and position classification. Both operations are pure: the position is
/// rebuilt from the move log on every call.
pub trait RulesEngine {
    type Position;

    fn validate(
        &self,
        move_history: &[String],
        notation: &str,
    ) -> Result<Self::Position, IllegalMove>;

    fn terminal_state(&self, position: &Self::Position) -> TerminalState;
}

#[cfg(test)]
pub mod fake {
    use super::*;

    /// Accepts any move except `"illegal"`. A move ending in `#` mates, `"stalemate"`
    /// stalemates and `"repeat"` triggers threefold repetition.
    pub struct ScriptedRulesEngine;

    impl RulesEngine for ScriptedRulesEngine {
        type Position = String;

        fn validate(
            &self,
            _move_history: &[String],
            notation: &str,
        ) -> Result<Self::Position, IllegalMove> {
            if notation == "illegal" {
                return Err(IllegalMove::new("scripted rejection"));
            }
            Ok(notation.to_string())
        }

        fn terminal_state(&self, position: &Self::Position) -> TerminalState {
            if position.ends_with('#') {
                TerminalState::Checkmate
            } else if position == "stalemate" {
                TerminalState::Stalemate
            } else if position == "repeat" {
                TerminalState::ThreefoldRepetition
            } else {
                TerminalState::None
            }
        }
    }
}
