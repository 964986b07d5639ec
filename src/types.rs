//////////////////////////
// types.rs
//////////////////////////

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BOARD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Direction a pawn of this color advances in, in rows.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_home_row(&self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err(ParseError::Color(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }

    pub fn symbol(&self) -> &'static str {
        match (self.piece_type, self.color) {
            (PieceType::Pawn, Color::White) => "♙",
            (PieceType::Pawn, Color::Black) => "♟",
            (PieceType::Knight, Color::White) => "♘",
            (PieceType::Knight, Color::Black) => "♞",
            (PieceType::Bishop, Color::White) => "♗",
            (PieceType::Bishop, Color::Black) => "♝",
            (PieceType::Rook, Color::White) => "♖",
            (PieceType::Rook, Color::Black) => "♜",
            (PieceType::Queen, Color::White) => "♕",
            (PieceType::Queen, Color::Black) => "♛",
            (PieceType::King, Color::White) => "♔",
            (PieceType::King, Color::Black) => "♚",
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn fen_char(&self) -> char {
        let c = match self.piece_type {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Piece { piece_type, color })
    }
}

/// A board coordinate. Row 0 is Black's back rank, row 7 is White's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub const fn new(row: usize, col: usize) -> Self {
        Square { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Square reached by stepping `(dr, dc)`, or `None` when it falls off the board.
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Square> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square::new(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        let file = (b'a' + self.col as u8) as char;
        write!(f, "{}{}", file, BOARD_SIZE - self.row)
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Square(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ParseError::Square(s.to_string()));
        }
        Ok(Square::new(
            BOARD_SIZE - (rank - b'0') as usize,
            (file - b'a') as usize,
        ))
    }
}

/// A requested move: just the two squares, nothing resolved against a board yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
}

impl MoveRequest {
    pub const fn new(from: Square, to: Square) -> Self {
        MoveRequest { from, to }
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for MoveRequest {
    type Err = ParseError;

    // Coordinate notation, e.g. "e2e4" or "e2-e4".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
        if cleaned.len() != 4 || !cleaned.is_ascii() {
            return Err(ParseError::Move(s.to_string()));
        }
        let from = cleaned[0..2].parse().map_err(|_| ParseError::Move(s.to_string()))?;
        let to = cleaned[2..4].parse().map_err(|_| ParseError::Move(s.to_string()))?;
        Ok(MoveRequest { from, to })
    }
}

/// A move as recorded in history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece_moved: Piece,
    pub piece_captured: Option<Piece>,
    /// Side to move when the move was made.
    pub turn: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// The given side is in check and has at least one reply.
    Check(Color),
    Checkmate { winner: Color },
    Stalemate,
    KingCaptured { winner: Color },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate | GameStatus::KingCaptured { .. }
        )
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::KingCaptured { winner } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "In progress"),
            GameStatus::Check(color) => write!(f, "Check! {} is in check", color),
            GameStatus::Checkmate { winner } => write!(f, "Checkmate! {} wins!", winner),
            GameStatus::Stalemate => write!(f, "Stalemate! The game is drawn"),
            GameStatus::KingCaptured { winner } => {
                write!(f, "Game Over! {} wins by capturing the King!", winner)
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Move is out of bounds")]
    OutOfBounds,
    #[error("No piece at starting square")]
    NoPieceAtSource,
    #[error("That's not your piece")]
    WrongColor,
    #[error("{0:?} cannot move like that")]
    IllegalPieceMove(PieceType),
    #[error("Move would put or leave king in check")]
    WouldCauseCheck,
    #[error("The game is over")]
    GameOver,
    #[error("It is not your turn")]
    NotYourTurn,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square '{0}', expected something like 'e2'")]
    Square(String),
    #[error("invalid move '{0}', expected something like 'e2e4'")]
    Move(String),
    #[error("invalid color '{0}', expected 'white' or 'black'")]
    Color(String),
    #[error("invalid FEN placement: {0}")]
    Fen(String),
    #[error("invalid position: {0}")]
    Position(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_parse_from_algebraic() {
        assert_eq!("e2".parse::<Square>(), Ok(Square::new(6, 4)));
        assert_eq!("a8".parse::<Square>(), Ok(Square::new(0, 0)));
        assert_eq!("H1".parse::<Square>(), Ok(Square::new(7, 7)));
        assert!("i1".parse::<Square>().is_err());
        assert!("e9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn squares_print_as_algebraic() {
        assert_eq!(Square::new(6, 4).to_string(), "e2");
        assert_eq!(Square::new(0, 7).to_string(), "h8");
    }

    #[test]
    fn move_requests_accept_dash_separator() {
        let mv: MoveRequest = "e2-e4".parse().unwrap();
        assert_eq!(mv, MoveRequest::new(Square::new(6, 4), Square::new(4, 4)));
        assert_eq!(mv.to_string(), "e2e4");
        assert!("e2e".parse::<MoveRequest>().is_err());
        assert!("é2e4".parse::<MoveRequest>().is_err());
    }

    #[test]
    fn offset_stays_on_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 2), Some(Square::new(1, 2)));
        assert_eq!(Square::new(7, 7).offset(1, 1), None);
    }

    #[test]
    fn fen_chars_round_trip() {
        for c in "pnbrqkPNBRQK".chars() {
            assert_eq!(Piece::from_fen_char(c).map(|p| p.fen_char()), Some(c));
        }
        assert_eq!(Piece::from_fen_char('x'), None);
    }
}
