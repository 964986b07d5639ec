//////////////////////////
// history.rs
//////////////////////////

use crate::types::Move;

/// Moves played so far plus a cursor marking the displayed position.
///
/// The cursor counts applied moves: `0` is the starting position and
/// `len()` is the most recent one. Recording a move while the cursor is
/// behind the end throws the redo tail away.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveHistory {
    moves: Vec<Move>,
    cursor: usize,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mv: Move) {
        self.moves.truncate(self.cursor);
        self.moves.push(mv);
        self.cursor = self.moves.len();
    }

    /// Steps the cursor back and returns the move that was undone.
    pub fn step_back(&mut self) -> Option<Move> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.moves[self.cursor])
    }

    /// Steps the cursor forward and returns the move to replay.
    pub fn step_forward(&mut self) -> Option<Move> {
        let mv = *self.moves.get(self.cursor)?;
        self.cursor += 1;
        Some(mv)
    }

    /// Move at the cursor, i.e. the one to highlight.
    pub fn last(&self) -> Option<&Move> {
        self.cursor.checked_sub(1).and_then(|i| self.moves.get(i))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the move at the cursor, `None` before the first move.
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.moves.len()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.cursor = 0;
    }
}
