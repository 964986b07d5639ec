//////////////////////////
// game.rs
//////////////////////////

use log::debug;

use crate::board::Board;
use crate::history::MoveHistory;
use crate::rules;
use crate::types::*;

/// One game: the board, whose turn it is, the current status and the
/// undo/redo history. All mutation goes through `apply_move`, `undo`,
/// `redo` and `reset`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEngine {
    board: Board,
    side_to_move: Color,
    status: GameStatus,
    history: MoveHistory,
}

impl Default for GameEngine {
    fn default() -> Self {
        GameEngine::new()
    }
}

impl GameEngine {
    pub fn new() -> Self {
        GameEngine {
            board: Board::standard(),
            side_to_move: Color::White,
            status: GameStatus::InProgress,
            history: MoveHistory::new(),
        }
    }

    /// Starts a game from an arbitrary position. Positions with more than
    /// one king of a color are refused; a missing king is tolerated.
    pub fn from_position(board: Board, side_to_move: Color) -> Result<Self, ParseError> {
        for color in [Color::White, Color::Black] {
            let kings = board.count_kings(color);
            if kings > 1 {
                return Err(ParseError::Position(format!("{} has {} kings", color, kings)));
            }
        }
        let mut engine = GameEngine {
            board,
            side_to_move,
            status: GameStatus::InProgress,
            history: MoveHistory::new(),
        };
        engine.status = engine.evaluate_status(side_to_move);
        Ok(engine)
    }

    pub fn from_fen(placement: &str, side_to_move: Color) -> Result<Self, ParseError> {
        GameEngine::from_position(Board::from_fen(placement)?, side_to_move)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn reset(&mut self) {
        *self = GameEngine::new();
    }

    pub fn apply_request(&mut self, mv: MoveRequest) -> Result<GameStatus, MoveError> {
        self.apply_move(mv.from, mv.to)
    }

    /// Plays `from -> to` for the side to move.
    ///
    /// Illegal moves leave the game untouched. Taking the enemy king ends the
    /// game on the spot without touching the board or the history.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<GameStatus, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let mover = self.side_to_move;
        rules::check_geometry(&self.board, from, to, mover)?;
        if !self.leaves_king_safe(from, to, mover) {
            return Err(MoveError::WouldCauseCheck);
        }
        let piece = self.board.get(from).ok_or(MoveError::NoPieceAtSource)?;

        if let Some(target) = self.board.get(to) {
            if target.piece_type == PieceType::King && target.color != mover {
                debug!("{} captured the king on {}", mover, to);
                self.status = GameStatus::KingCaptured { winner: mover };
                return Ok(self.status);
            }
        }

        let captured = self.board.relocate(from, to);
        self.history.record(Move {
            from,
            to,
            piece_moved: piece,
            piece_captured: captured,
            turn: mover,
        });
        self.side_to_move = mover.opposite();
        self.status = self.evaluate_status(self.side_to_move);
        debug!("{} played {}{} -> {:?}", mover, from, to, self.status);
        Ok(self.status)
    }

    /// Reverts the move at the cursor. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.history.step_back() else {
            return false;
        };
        self.board.set(mv.from, Some(mv.piece_moved));
        self.board.set(mv.to, mv.piece_captured);
        self.side_to_move = mv.turn;
        self.status = self.evaluate_status(self.side_to_move);
        true
    }

    /// Replays the move after the cursor. History is trusted, nothing is re-validated.
    pub fn redo(&mut self) -> bool {
        let Some(mv) = self.history.step_forward() else {
            return false;
        };
        self.board.set(mv.to, Some(mv.piece_moved));
        self.board.set(mv.from, None);
        self.side_to_move = mv.turn.opposite();
        self.status = self.evaluate_status(self.side_to_move);
        true
    }

    /// Destinations the piece on `from` may legally move to right now.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        if self.status.is_over() {
            return Vec::new();
        }
        match self.board.get(from) {
            Some(piece) if piece.color == self.side_to_move => Square::all()
                .filter(|to| self.can_move_without_check(from, *to, piece.color))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every legal move for `color`, scanning squares in row-major order.
    pub fn legal_moves(&self, color: Color) -> Vec<MoveRequest> {
        let mut moves = Vec::new();
        for (from, _) in self.board.squares_of(color) {
            for to in Square::all() {
                if self.can_move_without_check(from, to, color) {
                    moves.push(MoveRequest::new(from, to));
                }
            }
        }
        moves
    }

    /// Geometric legality plus the self-check filter.
    pub fn can_move_without_check(&self, from: Square, to: Square, color: Color) -> bool {
        rules::is_geometrically_legal(&self.board, from, to, color)
            && self.leaves_king_safe(from, to, color)
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        king_in_check(&self.board, color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_king_in_check(color) && !self.has_legal_move(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_king_in_check(color) && !self.has_legal_move(color)
    }

    fn has_legal_move(&self, color: Color) -> bool {
        self.board.squares_of(color).any(|(from, _)| {
            Square::all().any(|to| self.can_move_without_check(from, to, color))
        })
    }

    // The live board is never touched: the move is tried on a copy.
    fn leaves_king_safe(&self, from: Square, to: Square, color: Color) -> bool {
        let mut scratch = self.board;
        scratch.relocate(from, to);
        !king_in_check(&scratch, color)
    }

    fn evaluate_status(&self, color: Color) -> GameStatus {
        let in_check = self.is_king_in_check(color);
        let has_moves = self.has_legal_move(color);
        match (in_check, has_moves) {
            (true, false) => GameStatus::Checkmate { winner: color.opposite() },
            (true, true) => GameStatus::Check(color),
            (false, false) => GameStatus::Stalemate,
            (false, true) => GameStatus::InProgress,
        }
    }
}

/// Whether any enemy piece could move onto `color`'s king. A board without
/// that king is never in check.
pub fn king_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_square(color) else {
        return false;
    };
    let enemy = color.opposite();
    board
        .squares_of(enemy)
        .any(|(from, _)| rules::is_geometrically_legal(board, from, king, enemy))
}
