use crate::error::GameError;
use crate::{Cell, neighbors};
use itertools::iproduct;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;
use std::fmt;

/// Ground truth for one game: where the mines are.
///
/// The agent never looks inside; it only learns neighbour counts through
/// [`Board::nearby_mines`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    mines: BTreeSet<Cell>,
}

impl Board {
    /// Places `mines` mines uniformly at random. At least one cell must stay
    /// safe.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if mines >= cell_count(height, width)? {
            return Err(GameError::Config(format!(
                "{mines} mines leave no safe cell on a {height}x{width} board"
            )));
        }
        let mines = iproduct!(0..height, 0..width)
            .map(|(row, col)| Cell::new(row, col))
            .choose_multiple(rng, mines)
            .into_iter()
            .collect();
        Ok(Board {
            height,
            width,
            mines,
        })
    }

    /// A board with a fixed mine layout.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, GameError> {
        let board = Board {
            height,
            width,
            mines: mines.into_iter().collect(),
        };
        board.check()?;
        Ok(board)
    }

    /// Checks the layout a deserialized board cannot vouch for: the grid
    /// size fits in a `usize`, every mine is on the grid and at least one
    /// cell is safe.
    pub fn check(&self) -> Result<(), GameError> {
        let (height, width) = (self.height, self.width);
        if let Some(&cell) = self.mines.iter().find(|c| !c.in_bounds(height, width)) {
            return Err(GameError::OutOfBounds {
                cell,
                height,
                width,
            });
        }
        if self.mines.len() >= cell_count(height, width)? {
            return Err(GameError::Config(format!(
                "{} mines leave no safe cell on a {height}x{width} board",
                self.mines.len()
            )));
        }
        Ok(())
    }

    /// Number of cells that hold no mine.
    pub fn safe_cells(&self) -> Result<usize, GameError> {
        cell_count(self.height, self.width)?
            .checked_sub(self.mines.len())
            .ok_or_else(|| GameError::Config("more mines than cells".to_string()))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines adjacent to `cell`, not counting the cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        neighbors(cell, self.height, self.width)
            .filter(|n| self.mines.contains(n))
            .count()
    }

    /// All mines have been flagged, and nothing else.
    pub fn won(&self, flags: &BTreeSet<Cell>) -> bool {
        *flags == self.mines
    }
}

/// `height * width`, or a config error when the product overflows.
pub fn cell_count(height: usize, width: usize) -> Result<usize, GameError> {
    height
        .checked_mul(width)
        .ok_or_else(|| GameError::Config(format!("a {height}x{width} board is too large")))
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "--".repeat(self.width) + "-";
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_mine(Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}
