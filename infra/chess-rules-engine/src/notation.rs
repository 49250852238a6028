use std::str::FromStr;

use chess::{Board, ChessMove, MoveGen, Piece, Square};

/// Resolves a submitted move against the legal moves of `board`. Accepts SAN (`Nf3`, `exd5`,
/// `O-O`, `e8=Q`, with or without check marks and annotations) and UCI (`g1f3`, `e7e8q`).
pub fn parse_move(board: &Board, notation: &str) -> Option<ChessMove> {
    let legal: Vec<ChessMove> = MoveGen::new_legal(board).collect();
    if let Some(uci) = parse_uci(notation) {
        return legal.into_iter().find(|mv| *mv == uci);
    }
    let wanted = normalize_san(notation);
    legal.into_iter().find(|mv| {
        let san = to_san(board, *mv);
        san == wanted || san.replace('=', "") == wanted
    })
}

fn parse_uci(notation: &str) -> Option<ChessMove> {
    if !notation.is_ascii() || !(notation.len() == 4 || notation.len() == 5) {
        return None;
    }
    let source = Square::from_str(&notation[0..2]).ok()?;
    let dest = Square::from_str(&notation[2..4]).ok()?;
    let promotion = match notation.get(4..5) {
        None => None,
        Some("q") => Some(Piece::Queen),
        Some("r") => Some(Piece::Rook),
        Some("b") => Some(Piece::Bishop),
        Some("n") => Some(Piece::Knight),
        Some(_) => return None,
    };
    Some(ChessMove::new(source, dest, promotion))
}

fn normalize_san(notation: &str) -> String {
    notation
        .trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
}

fn piece_letter(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "",
        Piece::Knight => "N",
        Piece::Bishop => "B",
        Piece::Rook => "R",
        Piece::Queen => "Q",
        Piece::King => "K",
    }
}

fn file_char(square: Square) -> char {
    (b'a' + square.get_file().to_index() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.get_rank().to_index() as u8) as char
}

/// SAN without check or mate suffix.
pub fn to_san(board: &Board, mv: ChessMove) -> String {
    let source = mv.get_source();
    let dest = mv.get_dest();
    let Some(piece) = board.piece_on(source) else {
        return mv.to_string();
    };

    if piece == Piece::King {
        let from_file = source.get_file().to_index();
        let to_file = dest.get_file().to_index();
        if to_file == from_file + 2 {
            return "O-O".to_string();
        }
        if to_file + 2 == from_file {
            return "O-O-O".to_string();
        }
    }

    let is_capture = board.piece_on(dest).is_some()
        || (piece == Piece::Pawn && source.get_file() != dest.get_file());

    let mut san = String::new();
    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(source));
        }
    } else {
        san.push_str(piece_letter(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }
    if is_capture {
        san.push('x');
    }
    san.push(file_char(dest));
    san.push(rank_char(dest));
    if let Some(promotion) = mv.get_promotion() {
        san.push('=');
        san.push_str(piece_letter(promotion));
    }
    san
}

fn disambiguation(board: &Board, mv: ChessMove, piece: Piece) -> String {
    let source = mv.get_source();
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|other| {
            other.get_dest() == mv.get_dest()
                && other.get_source() != source
                && board.piece_on(other.get_source()) == Some(piece)
        })
        .map(|other| other.get_source())
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| sq.get_file() != source.get_file()) {
        return file_char(source).to_string();
    }
    if rivals.iter().all(|sq| sq.get_rank() != source.get_rank()) {
        return rank_char(source).to_string();
    }
    format!("{}{}", file_char(source), rank_char(source))
}
