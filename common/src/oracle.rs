//! Exhaustive audit of a knowledge base with a SAT solver.
//!
//! The agent's propagation is sound but not complete: subset resolution
//! misses deductions that need several overlapping sentences at once. The
//! oracle encodes every live sentence as CNF and asks, for each cell, which
//! values remain satisfiable. Nothing here feeds back into move selection.

use crate::Cell;
use crate::sentence::Sentence;
use itertools::Itertools;
use std::collections::BTreeMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// What the knowledge base entails about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entailment {
    /// Every model makes this cell a mine.
    Mine,
    /// Every model makes this cell safe.
    Safe,
    /// Models exist either way.
    Open,
}

/// Classifies every cell mentioned by `sentences`.
///
/// Fails when the sentences cannot all hold at once.
pub fn entailments(sentences: &[Sentence]) -> anyhow::Result<BTreeMap<Cell, Entailment>> {
    let mut solver = Solver::new();
    let mut var_map: BTreeMap<Cell, Var> = BTreeMap::new();
    for sentence in sentences {
        for &cell in sentence.cells() {
            var_map.entry(cell).or_insert_with(|| solver.new_var());
        }
    }

    let mut formula = CnfFormula::new();
    for sentence in sentences {
        let lits: Vec<Lit> = sentence
            .cells()
            .iter()
            .map(|cell| Lit::from_var(var_map[cell], true))
            .collect();
        encode_exactly(&mut formula, &lits, sentence.count());
    }
    solver.add_formula(&formula);

    if !solver.solve()? {
        anyhow::bail!("knowledge base is unsatisfiable");
    }

    let mut result = BTreeMap::new();
    for (&cell, &var) in &var_map {
        let mine_possible = satisfiable_with(&mut solver, Lit::from_var(var, true))?;
        let safe_possible = satisfiable_with(&mut solver, Lit::from_var(var, false))?;
        let entailment = match (mine_possible, safe_possible) {
            (true, true) => Entailment::Open,
            (true, false) => Entailment::Mine,
            (false, true) => Entailment::Safe,
            (false, false) => anyhow::bail!("{cell} can be neither mine nor safe"),
        };
        result.insert(cell, entailment);
    }
    Ok(result)
}

fn satisfiable_with(solver: &mut Solver, lit: Lit) -> anyhow::Result<bool> {
    solver.assume(&[lit]);
    let result = solver.solve();
    solver.assume(&[]);
    Ok(result?)
}

/// Exactly `k` of `lits` are true. Sentences span at most eight cells, so
/// the direct encoding over combinations stays small: every `k + 1` subset
/// has a false literal and every `n - k + 1` subset has a true one.
fn encode_exactly(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    let n = lits.len();
    if k < n {
        for combo in lits.iter().combinations(k + 1) {
            let clause: Vec<Lit> = combo.into_iter().map(|&lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }
    if k > 0 {
        for combo in lits.iter().copied().combinations(n - k + 1) {
            formula.add_clause(&combo);
        }
    }
}
