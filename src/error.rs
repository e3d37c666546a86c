//! Error type shared by the distance table, the colony and both drivers.

use thiserror::Error;

/// Errors raised by the ACO kernel.
///
/// The first three variants form the *numerical degeneracy* class
/// (see [`AcoError::is_degenerate`]): they come from geometry or pheromone
/// values that make the transition rule or the deposit undefined. The batch
/// driver recovers from them by resetting the pheromone matrix; the
/// frame-stepped driver hands them back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcoError {
    /// Two distinct nodes are at distance zero, so `1 / d` is undefined.
    #[error("zero distance between nodes {from} and {to}")]
    DegenerateDistance { from: usize, to: usize },

    /// A completed path has zero total length, so `1 / length` is undefined.
    #[error("agent {agent} completed a zero-length path")]
    DegeneratePath { agent: usize },

    /// Every candidate weight out of `node` underflowed to zero (or the sum
    /// overflowed), so the roulette wheel cannot be normalized.
    #[error("transition weights out of node {node} are not normalizable")]
    VanishingPheromone { node: usize },

    /// The configuration or node count cannot drive a colony.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A table or matrix has a different size than the colony expects.
    #[error("dimension mismatch: expected {expected} nodes, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A distance entry is negative, non-finite or asymmetric.
    #[error("invalid distance {value} between nodes {from} and {to}")]
    InvalidDistance { from: usize, to: usize, value: f64 },

    /// A supplied path is not a prefix of a permutation of `[0, N)`.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An agent standing on `node` was asked to hop with no unvisited node
    /// left.
    ///
    /// The colony never does this; seeing it means a caller drove an agent
    /// past completion.
    #[error("no unvisited node left after node {node}")]
    ExhaustedCandidates { node: usize },

    /// The background batch thread could not be started or panicked.
    #[error("batch worker failed: {0}")]
    WorkerFailed(String),
}

impl AcoError {
    /// Whether this error belongs to the recoverable numerical-degeneracy class.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            AcoError::DegenerateDistance { .. }
                | AcoError::DegeneratePath { .. }
                | AcoError::VanishingPheromone { .. }
        )
    }
}
