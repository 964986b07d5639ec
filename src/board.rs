//////////////////////////
// board.rs
//////////////////////////

use std::fmt;

use crate::types::*;

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// The 8x8 grid. Indexed `[row][col]`, row 0 being Black's back rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn standard() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (col, piece_type) in back_rank.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(*piece_type, Color::Black));
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[7][col] = Some(Piece::new(*piece_type, Color::White));
        }
        board
    }

    /// Builds a board from the piece-placement field of a FEN string.
    pub fn from_fen(placement: &str) -> Result<Self, ParseError> {
        // Tolerate a full FEN record by only looking at its first field.
        let placement = placement.split_whitespace().next().unwrap_or("");
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseError::Fen(format!(
                "expected {} rows, found {}",
                BOARD_SIZE,
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, text) in rows.iter().enumerate() {
            let mut col = 0;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(c)
                        .ok_or_else(|| ParseError::Fen(format!("unknown piece '{}'", c)))?;
                    if col >= BOARD_SIZE {
                        return Err(ParseError::Fen(format!("row {} is too long", row + 1)));
                    }
                    board.squares[row][col] = Some(piece);
                    col += 1;
                }
            }
            if col != BOARD_SIZE {
                return Err(ParseError::Fen(format!(
                    "row {} covers {} squares",
                    row + 1,
                    col
                )));
            }
        }
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for row in 0..BOARD_SIZE {
            let mut gap = 0;
            for col in 0..BOARD_SIZE {
                match self.squares[row][col] {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if row + 1 < BOARD_SIZE {
                out.push('/');
            }
        }
        out
    }

    /// Piece on `sq`; off-board squares read as empty.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_on_board() {
            self.squares[sq.row][sq.col]
        } else {
            None
        }
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Writes `piece` into `sq`. Off-board writes are ignored.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_on_board() {
            self.squares[sq.row][sq.col] = piece;
        }
    }

    /// Moves whatever sits on `from` onto `to` and returns what was on `to`.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let moving = self.get(from);
        let captured = self.get(to);
        self.set(to, moving);
        self.set(from, None);
        captured
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|sq| {
            self.get(*sq) == Some(Piece::new(PieceType::King, color))
        })
    }

    /// Occupied squares of `color`, in row-major order.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.get(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    pub fn count_kings(&self, color: Color) -> usize {
        self.squares_of(color)
            .filter(|(_, piece)| piece.piece_type == PieceType::King)
            .count()
    }

    /// Text diagram, White at the bottom. `paint` receives every square with
    /// its symbol and returns what to print there.
    pub fn render<F>(&self, mut paint: F) -> String
    where
        F: FnMut(Square, &str) -> String,
    {
        let files: Vec<String> = (0..BOARD_SIZE)
            .map(|col| ((b'a' + col as u8) as char).to_string())
            .collect();
        let files = files.join(" ");
        let rule = "-".repeat(BOARD_SIZE * 2 - 1);

        let mut out = format!("  {}\n  {}\n", files, rule);
        for row in 0..BOARD_SIZE {
            out.push_str(&format!("{} ", BOARD_SIZE - row));
            for col in 0..BOARD_SIZE {
                let sq = Square::new(row, col);
                let symbol = self.get(sq).map_or("·", |p| p.symbol());
                out.push_str(&paint(sq, symbol));
                out.push(' ');
            }
            out.push_str(&format!("{}\n", BOARD_SIZE - row));
        }
        out.push_str(&format!("  {}\n  {}", rule, files));
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, symbol| symbol.to_string()))
    }
}
