//////////////////////////
// rules.rs
//////////////////////////
//
// Piece geometry only. Nothing here knows about check or whose turn it is.

use crate::board::Board;
use crate::types::*;

const KNIGHT_MOVES: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub fn is_geometrically_legal(board: &Board, from: Square, to: Square, moving: Color) -> bool {
    check_geometry(board, from, to, moving).is_ok()
}

/// Same as [`is_geometrically_legal`] but says why a move was refused.
pub fn check_geometry(board: &Board, from: Square, to: Square, moving: Color) -> Result<(), MoveError> {
    if !from.is_on_board() || !to.is_on_board() {
        return Err(MoveError::OutOfBounds);
    }
    let piece = board.get(from).ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != moving {
        return Err(MoveError::WrongColor);
    }
    // Covers from == to as well, since `from` holds our own piece.
    if let Some(dest) = board.get(to) {
        if dest.color == moving {
            return Err(MoveError::IllegalPieceMove(piece.piece_type));
        }
    }

    let ok = match piece.piece_type {
        PieceType::Pawn => is_valid_pawn_move(board, from, to, moving),
        PieceType::Knight => is_valid_knight_move(from, to),
        PieceType::Bishop => is_valid_bishop_move(board, from, to),
        PieceType::Rook => is_valid_rook_move(board, from, to),
        PieceType::Queen => is_valid_queen_move(board, from, to),
        PieceType::King => is_valid_king_move(from, to),
    };
    if ok {
        Ok(())
    } else {
        Err(MoveError::IllegalPieceMove(piece.piece_type))
    }
}

fn deltas(from: Square, to: Square) -> (i32, i32) {
    (to.row as i32 - from.row as i32, to.col as i32 - from.col as i32)
}

fn is_valid_pawn_move(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let direction = color.forward();
    let (dr, dc) = deltas(from, to);

    // Straight pushes never capture
    if dc == 0 {
        if dr == direction {
            return board.is_empty(to);
        }
        if dr == 2 * direction && from.row == color.pawn_home_row() {
            let between = Square::new((from.row as i32 + direction) as usize, from.col);
            return board.is_empty(between) && board.is_empty(to);
        }
        return false;
    }

    // Diagonal only onto an enemy piece
    if dc.abs() == 1 && dr == direction {
        return matches!(board.get(to), Some(target) if target.color != color);
    }

    false
}

fn is_valid_knight_move(from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    KNIGHT_MOVES.contains(&(dr, dc))
}

fn is_valid_bishop_move(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    dr.abs() == dc.abs() && dr != 0 && path_clear(board, from, to)
}

fn is_valid_rook_move(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    (dr == 0) != (dc == 0) && path_clear(board, from, to)
}

fn is_valid_queen_move(board: &Board, from: Square, to: Square) -> bool {
    is_valid_bishop_move(board, from, to) || is_valid_rook_move(board, from, to)
}

fn is_valid_king_move(from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    dr.abs().max(dc.abs()) == 1
}

/// Walks from `from` towards `to` one unit step at a time and fails on the
/// first occupied square strictly between them. Endpoints are not inspected.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = deltas(from, to);
    let step = (dr.signum(), dc.signum());

    let mut current = from;
    loop {
        current = match current.offset(step.0, step.1) {
            Some(sq) => sq,
            None => return false,
        };
        if current == to {
            return true;
        }
        if !board.is_empty(current) {
            return false;
        }
    }
}
