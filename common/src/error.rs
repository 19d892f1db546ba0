use crate::Cell;

/// Faults raised while ingesting observations into the knowledge base.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("cell {cell} lies outside the {height}x{width} grid")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },
    /// The accumulated facts can no longer all be true. Only reachable with
    /// untruthful observations.
    #[error("contradiction: {0}")]
    Contradiction(String),
}

/// Faults raised by the board and the turn loop around the agent.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cell {cell} lies outside the {height}x{width} grid")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },
    #[error("game already finished")]
    Finished,
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bcs::Error),
}
