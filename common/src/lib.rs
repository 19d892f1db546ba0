//! A minesweeper player that reasons with propositional sentences.
//!
//! Each revealed cell becomes a [`Sentence`] ("exactly `count` of these
//! cells are mines"). The [`Agent`] folds new sentences into its knowledge
//! base and propagates them to a fixed point, so it only ever moves on
//! cells it has proven safe, falling back to a random guess otherwise.

use std::fmt;

pub mod agent;
pub mod board;
pub mod error;
pub mod game;
pub mod oracle;
pub mod sentence;

pub use agent::Agent;
pub use board::Board;
pub use error::{GameError, KnowledgeError};
pub use game::{Game, GameConfig, GameState, Step};
pub use sentence::Sentence;

/// A `(row, col)` coordinate on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    pub fn in_bounds(&self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All cells within one row and column of `cell`, excluding the cell
/// itself and anything past the board edges.
pub fn neighbors(cell: Cell, height: usize, width: usize) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dr: isize| {
        (-1..=1).filter_map(move |dc: isize| {
            if dr == 0 && dc == 0 {
                return None;
            }
            let row = cell.row.checked_add_signed(dr)?;
            let col = cell.col.checked_add_signed(dc)?;
            Cell::new(row, col).in_bounds(height, width).then_some(Cell::new(row, col))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner cell (0,0) should have 3 neighbors
        let corner: Vec<Cell> = neighbors(Cell::new(0, 0), 3, 3).collect();
        assert_eq!(corner, vec![Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]);

        // Center cell (1,1) should have 8 neighbors
        assert_eq!(neighbors(Cell::new(1, 1), 3, 3).count(), 8);

        // Edge cell (0,1) should have 5 neighbors
        assert_eq!(neighbors(Cell::new(0, 1), 3, 3).count(), 5);

        // Far corner of a non-square grid
        assert_eq!(neighbors(Cell::new(1, 4), 2, 5).count(), 3);
    }

    #[test]
    fn test_cell_bounds_and_display() {
        let cell = Cell::new(2, 7);
        assert!(cell.in_bounds(3, 8));
        assert!(!cell.in_bounds(2, 8));
        assert!(!cell.in_bounds(3, 7));
        assert_eq!(cell.to_string(), "(2, 7)");
    }
}
