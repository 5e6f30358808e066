use crate::domain::board::{Board, BoardId};
use std::collections::HashMap;

/// Boards rendered on one page load. Boards are optional per page, so lookups
/// for absent ids are not errors.
#[derive(Debug, Default)]
pub struct Page {
    boards: HashMap<BoardId, Board>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.insert(board);
        self
    }

    pub fn insert(&mut self, board: Board) {
        self.boards.insert(board.id.clone(), board);
    }

    pub fn board(&self, id: &BoardId) -> Option<&Board> {
        self.boards.get(id)
    }

    /// Hands the board over to a single owner
    pub fn take_board(&mut self, id: &BoardId) -> Option<Board> {
        self.boards.remove(id)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}
