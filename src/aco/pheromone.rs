//! Directed pheromone matrix.

use crate::error::AcoError;

/// Value every entry starts from and is reset to.
pub const INITIAL_PHEROMONE: f64 = 1.0;

/// `N x N` matrix of positive desirability weights.
///
/// Directed: `get(i, j)` need not equal `get(j, i)`, because deposits follow
/// the order in which an agent traversed an edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PheromoneMatrix {
    n: usize,
    data: Vec<f64>,
}

impl PheromoneMatrix {
    /// Creates a uniform matrix with every entry at [`INITIAL_PHEROMONE`].
    pub fn new(n: usize) -> Self {
        Self {
            n,
            data: vec![INITIAL_PHEROMONE; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    /// The weights out of `node`.
    pub fn row(&self, node: usize) -> &[f64] {
        &self.data[node * self.n..(node + 1) * self.n]
    }

    /// Multiplies every entry by `rate`.
    pub fn evaporate(&mut self, rate: f64) {
        for value in &mut self.data {
            *value *= rate;
        }
    }

    /// Adds `amount` to the directed edge `from -> to`.
    #[inline]
    pub fn deposit(&mut self, from: usize, to: usize, amount: f64) {
        self.data[from * self.n + to] += amount;
    }

    /// Restores every entry to [`INITIAL_PHEROMONE`].
    pub fn reset(&mut self) {
        self.data.fill(INITIAL_PHEROMONE);
    }

    /// Smallest and largest entry, for diagnostics.
    pub fn bounds(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub(crate) fn check_len(&self, n: usize) -> Result<(), AcoError> {
        if n != self.n {
            return Err(AcoError::DimensionMismatch {
                expected: self.n,
                found: n,
            });
        }
        Ok(())
    }
}
