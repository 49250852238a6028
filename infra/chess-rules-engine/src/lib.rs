use std::fmt;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Piece};
use chess_core::TerminalState;
use chess_session_app::ports::rules::{IllegalMove, RulesEngine};

mod notation;

pub use notation::{parse_move, to_san};

const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;
const FIFTY_MOVE_PLIES: u32 = 100;
const REPETITION_LIMIT: usize = 3;

/// A position reached by replaying a move log from the standard start position, with the
/// counters board state alone does not carry.
#[derive(Clone)]
pub struct ChessPosition {
    board: Board,
    /// Plies since the last capture or pawn move.
    halfmove_clock: u32,
    /// Hashes of every position of the game, the current one last.
    history: Vec<u64>,
}

impl ChessPosition {
    pub fn start() -> Self {
        let board = Board::default();
        ChessPosition {
            history: vec![board.get_hash()],
            board,
            halfmove_clock: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.history.iter().filter(|hash| **hash == current).count()
    }

    fn play(&mut self, notation: &str) -> Result<(), IllegalMove> {
        let mv = parse_move(&self.board, notation)
            .ok_or_else(|| IllegalMove::new(format!("{} is not a legal move here", notation)))?;
        self.apply(mv);
        Ok(())
    }

    fn apply(&mut self, mv: ChessMove) {
        let is_pawn_move = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn);
        let is_capture = self.board.piece_on(mv.get_dest()).is_some()
            || (is_pawn_move && mv.get_source().get_file() != mv.get_dest().get_file());
        self.board = self.board.make_move_new(mv);
        if is_pawn_move || is_capture {
            self.halfmove_clock = 0;
            // Earlier positions can never recur.
            self.history.clear();
        } else {
            self.halfmove_clock += 1;
        }
        self.history.push(self.board.get_hash());
    }

    fn has_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy =
            *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy.popcnt() > 0 {
            return false;
        }
        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);
        if (knights | bishops).popcnt() <= 1 {
            return true;
        }
        if knights.popcnt() > 0 {
            return false;
        }
        let on_light = bishops & BitBoard::new(LIGHT_SQUARES);
        on_light == bishops || on_light.popcnt() == 0
    }
}

impl fmt::Debug for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChessPosition")
            .field("fen", &self.board.to_string())
            .field("halfmove_clock", &self.halfmove_clock)
            .finish()
    }
}

/// Standard chess rules backed by the `chess` crate's move generator.
pub struct ChessRulesEngine;

impl ChessRulesEngine {
    pub fn replay(&self, moves: &[String]) -> Result<ChessPosition, IllegalMove> {
        let mut position = ChessPosition::start();
        for (ply, notation) in moves.iter().enumerate() {
            if let Err(e) = position.play(notation) {
                log::warn!("Stored move {} ({}) does not replay: {}", ply + 1, notation, e);
                return Err(IllegalMove::new(format!(
                    "move history does not replay at move {}",
                    ply + 1
                )));
            }
        }
        Ok(position)
    }
}

impl RulesEngine for ChessRulesEngine {
    type Position = ChessPosition;

    fn validate(
        &self,
        move_history: &[String],
        notation: &str,
    ) -> Result<ChessPosition, IllegalMove> {
        let mut position = self.replay(move_history)?;
        position.play(notation.trim())?;
        Ok(position)
    }

    fn terminal_state(&self, position: &ChessPosition) -> TerminalState {
        match position.board.status() {
            BoardStatus::Checkmate => return TerminalState::Checkmate,
            BoardStatus::Stalemate => return TerminalState::Stalemate,
            BoardStatus::Ongoing => {}
        }
        if position.has_insufficient_material() {
            TerminalState::InsufficientMaterial
        } else if position.repetitions() >= REPETITION_LIMIT {
            TerminalState::ThreefoldRepetition
        } else if position.halfmove_clock >= FIFTY_MOVE_PLIES {
            TerminalState::FiftyMove
        } else {
            TerminalState::None
        }
    }
}
