use crate::Cell;
use crate::error::KnowledgeError;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// `count <= cells.len()` holds for every value of this type. Mutations that
/// would break it report a [`KnowledgeError::Contradiction`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::Contradiction(format!(
                "{count} mines cannot fit in {} cells",
                cells.len()
            )));
        }
        Ok(Sentence { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when there are as many mines as cells.
    pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
        (self.cells.len() == self.count).then_some(&self.cells)
    }

    /// Every cell is safe when the sentence owes no mines.
    pub fn known_safes(&self) -> Option<&BTreeSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Removes a cell known to be a mine, discounting it from `count`.
    /// Returns whether the sentence mentioned the cell.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(KnowledgeError::Contradiction(format!(
                "{cell} is a mine but {self} owes none"
            )));
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell known to be safe. Returns whether the sentence
    /// mentioned the cell.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == self.cells.len() {
            return Err(KnowledgeError::Contradiction(format!(
                "{cell} is safe but every cell of {self} is a mine"
            )));
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    /// Strict subset test: fewer cells, all of them shared.
    pub fn is_subset_of(&self, other: &Sentence) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// Subset resolution. When `self` is contained in `other`, the mines of
    /// `other` not accounted for by `self` lie in the remaining cells.
    pub fn difference(&self, other: &Sentence) -> Result<Sentence, KnowledgeError> {
        let count = other.count.checked_sub(self.count).ok_or_else(|| {
            KnowledgeError::Contradiction(format!("{self} owes more mines than its superset {other}"))
        })?;
        Sentence::new(other.cells.difference(&self.cells).copied(), count)
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Cell {
        Cell::new(row, col)
    }

    #[test]
    fn test_new_rejects_overfull_count() {
        // More mines than cells can never be satisfied
        let result = Sentence::new([c(0, 0)], 2);
        assert!(matches!(result, Err(KnowledgeError::Contradiction(_))));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Sentence::new([c(0, 0), c(1, 1)], 1).unwrap();
        let b = Sentence::new([c(1, 1), c(0, 0)], 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Sentence::new([c(0, 0), c(1, 1)], 2).unwrap());
    }

    #[test]
    fn test_known_mines_by_pigeonhole() {
        let sentence = Sentence::new([c(0, 0), c(0, 1)], 2).unwrap();
        assert_eq!(sentence.known_mines().map(|s| s.len()), Some(2));
        assert_eq!(sentence.known_safes(), None);

        let partial = Sentence::new([c(0, 0), c(0, 1)], 1).unwrap();
        assert_eq!(partial.known_mines(), None);
    }

    #[test]
    fn test_known_safes_with_zero_count() {
        let sentence = Sentence::new([c(2, 2), c(2, 3), c(3, 3)], 0).unwrap();
        let safes = sentence.known_safes().unwrap();
        assert!(safes.contains(&c(2, 3)));
        assert_eq!(sentence.known_mines(), None);
    }

    #[test]
    fn test_empty_sentence_is_both_resolved_states() {
        let sentence = Sentence::new(Vec::<Cell>::new(), 0).unwrap();
        assert!(sentence.known_mines().unwrap().is_empty());
        assert!(sentence.known_safes().unwrap().is_empty());
    }

    #[test]
    fn test_mark_mine_discounts() {
        let mut sentence = Sentence::new([c(0, 0), c(0, 1), c(1, 0)], 2).unwrap();
        assert!(sentence.mark_mine(c(0, 1)).unwrap());
        assert_eq!(sentence.count(), 1);
        assert_eq!(sentence.cells().len(), 2);

        // Cells outside the sentence leave it untouched
        assert!(!sentence.mark_mine(c(5, 5)).unwrap());
        assert_eq!(sentence.count(), 1);
    }

    #[test]
    fn test_mark_safe_keeps_count() {
        let mut sentence = Sentence::new([c(0, 0), c(0, 1), c(1, 0)], 1).unwrap();
        assert!(sentence.mark_safe(c(1, 0)).unwrap());
        assert_eq!(sentence.count(), 1);
        assert_eq!(sentence.cells().len(), 2);
        assert!(!sentence.mark_safe(c(1, 0)).unwrap());
    }

    #[test]
    fn test_marks_that_break_the_invariant_are_contradictions() {
        let mut none_owed = Sentence::new([c(0, 0)], 0).unwrap();
        assert!(none_owed.mark_mine(c(0, 0)).is_err());

        let mut all_mines = Sentence::new([c(0, 0), c(0, 1)], 2).unwrap();
        assert!(all_mines.mark_safe(c(0, 1)).is_err());
        // A failed mark leaves the sentence as it was
        assert_eq!(all_mines.cells().len(), 2);
    }

    #[test]
    fn test_subset_difference() {
        let small = Sentence::new([c(0, 0), c(0, 1)], 1).unwrap();
        let big = Sentence::new([c(0, 0), c(0, 1), c(0, 2)], 1).unwrap();
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(!small.is_subset_of(&small));

        let derived = small.difference(&big).unwrap();
        assert_eq!(derived, Sentence::new([c(0, 2)], 0).unwrap());
    }

    #[test]
    fn test_display() {
        let sentence = Sentence::new([c(1, 0), c(0, 2)], 1).unwrap();
        assert_eq!(sentence.to_string(), "{(0, 2), (1, 0)} = 1");
    }
}
