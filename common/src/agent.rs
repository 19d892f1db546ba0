use crate::error::KnowledgeError;
use crate::sentence::Sentence;
use crate::{Cell, neighbors};
use itertools::iproduct;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// The minesweeper player. Owns everything it has learned about the board
/// and only ever moves on cells it can prove safe, unless asked to guess.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Agent {
    height: usize,
    width: usize,
    /// Cells already revealed, one per observation.
    moves_made: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    /// Live sentences. None of them mentions a cell in `mines` or `safes`.
    knowledge: Vec<Sentence>,
}

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: BTreeSet::new(),
            mines: BTreeSet::new(),
            safes: BTreeSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub fn knowledge(&self) -> &[Sentence] {
        &self.knowledge
    }

    /// Records `cell` as a mine and removes it from every live sentence.
    /// Does not check bounds or propagate; `add_knowledge` does both.
    pub(crate) fn mark_mine(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if self.safes.contains(&cell) {
            return Err(KnowledgeError::Contradiction(format!(
                "{cell} is already known to be safe"
            )));
        }
        self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell)?;
        }
        Ok(())
    }

    /// Records `cell` as safe and removes it from every live sentence.
    pub(crate) fn mark_safe(&mut self, cell: Cell) -> Result<(), KnowledgeError> {
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::Contradiction(format!(
                "{cell} is already known to be a mine"
            )));
        }
        self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell)?;
        }
        Ok(())
    }

    /// Ingests one observation: `cell` was revealed safely and `count` of its
    /// neighbours are mines.
    ///
    /// The update is all-or-nothing. On error the agent is left exactly as it
    /// was before the call.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }

        let mut next = self.clone();
        match next.observe(cell, count) {
            Ok(()) => {
                *self = next;
                Ok(())
            }
            Err(e) => {
                warn!(%cell, count, error = %e, "observation rejected");
                Err(e)
            }
        }
    }

    fn observe(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        let neighborhood: Vec<Cell> = neighbors(cell, self.height, self.width).collect();
        if count > neighborhood.len() {
            return Err(KnowledgeError::Contradiction(format!(
                "{cell} reports {count} mines but has {} neighbours",
                neighborhood.len()
            )));
        }
        debug!(%cell, count, "observation");

        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let mut remaining = count;
        let mut unknown = Vec::with_capacity(neighborhood.len());
        for neighbor in neighborhood {
            if self.mines.contains(&neighbor) {
                remaining = remaining.checked_sub(1).ok_or_else(|| {
                    KnowledgeError::Contradiction(format!(
                        "{cell} reports {count} mines but more neighbours are known mines"
                    ))
                })?;
            } else if !self.safes.contains(&neighbor) {
                unknown.push(neighbor);
            }
        }
        self.knowledge.push(Sentence::new(unknown, remaining)?);

        self.propagate()?;
        Ok(())
    }

    /// Runs resolution, cleanup and subset resolution until a pass changes
    /// nothing. Subset resolution compares every ordered pair of live
    /// sentences, so each pass is quadratic in the size of the knowledge base.
    /// Returns the number of passes.
    fn propagate(&mut self) -> Result<usize, KnowledgeError> {
        let mut passes = 0;
        loop {
            passes += 1;
            let resolved = self.resolve()?;
            self.cleanup()?;
            let derived = self.derive_subsets()?;
            trace!(pass = passes, resolved, derived, live = self.knowledge.len(), "propagation pass");
            if resolved == 0 && derived == 0 {
                break;
            }
        }
        debug!(
            passes,
            mines = self.mines.len(),
            safes = self.safes.len(),
            live = self.knowledge.len(),
            "knowledge converged"
        );
        Ok(passes)
    }

    /// Removes every sentence whose cells are all mines or all safe and
    /// marks those cells globally. Returns the number of sentences resolved.
    fn resolve(&mut self) -> Result<usize, KnowledgeError> {
        let snapshot = std::mem::take(&mut self.knowledge);
        let mut new_mines = BTreeSet::new();
        let mut new_safes = BTreeSet::new();
        let mut resolved = 0;

        for sentence in snapshot {
            if let Some(cells) = sentence.known_mines() {
                new_mines.extend(cells.iter().copied());
            } else if let Some(cells) = sentence.known_safes() {
                new_safes.extend(cells.iter().copied());
            } else {
                self.knowledge.push(sentence);
                continue;
            }
            resolved += 1;
        }

        for cell in new_mines {
            if !self.mines.contains(&cell) {
                self.mark_mine(cell)?;
            }
        }
        for cell in new_safes {
            if !self.safes.contains(&cell) {
                self.mark_safe(cell)?;
            }
        }
        Ok(resolved)
    }

    /// Drops sentences that carry no information: empty ones and duplicates.
    fn cleanup(&mut self) -> Result<(), KnowledgeError> {
        let snapshot = std::mem::take(&mut self.knowledge);
        let mut seen: HashMap<BTreeSet<Cell>, usize> = HashMap::with_capacity(snapshot.len());

        for sentence in snapshot {
            if sentence.is_empty() {
                if sentence.count() != 0 {
                    return Err(KnowledgeError::Contradiction(format!(
                        "no cells left to hold {} mines",
                        sentence.count()
                    )));
                }
                continue;
            }
            match seen.get(sentence.cells()) {
                Some(&count) if count == sentence.count() => {}
                Some(&count) => {
                    return Err(KnowledgeError::Contradiction(format!(
                        "{sentence} conflicts with a sentence owing {count}"
                    )));
                }
                None => {
                    seen.insert(sentence.cells().clone(), sentence.count());
                    self.knowledge.push(sentence);
                }
            }
        }
        Ok(())
    }

    /// Adds `B - A` for every live pair where `A` is strictly contained in
    /// `B`. Returns how many new sentences were added; they are resolved by
    /// the next pass.
    fn derive_subsets(&mut self) -> Result<usize, KnowledgeError> {
        let mut derived: Vec<Sentence> = Vec::new();
        for (a, b) in iproduct!(&self.knowledge, &self.knowledge) {
            if !a.is_subset_of(b) {
                continue;
            }
            let sentence = a.difference(b)?;
            if !self.knowledge.contains(&sentence) && !derived.contains(&sentence) {
                derived.push(sentence);
            }
        }
        let added = derived.len();
        self.knowledge.extend(derived);
        Ok(added)
    }

    /// A revealed-safe cell that has not been played yet, if any.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// A uniformly random cell that is neither played nor a known mine.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = iproduct!(0..self.height, 0..self.width)
            .map(|(row, col)| Cell::new(row, col))
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }
}
