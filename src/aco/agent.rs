//! Single-agent path construction.
//!
//! An [`Agent`] grows a Hamiltonian path one hop at a time. Each hop is
//! either a uniform random move or a roulette-wheel draw weighted by
//! `tau(i, j)^alpha * (1 / d(i, j))^beta`.
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a
//!   Colony of Cooperating Agents"

use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::distance::DistanceTable;
use crate::error::AcoError;
use crate::random::unit_draw;
use rand::Rng;

/// One stochastic path-construction process.
///
/// The path always holds distinct node ids and starts from a single node;
/// it is complete once it holds all `N` nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    path: Vec<usize>,
    visited: Vec<bool>,
}

impl Agent {
    /// Creates an agent standing on `start`.
    ///
    /// # Panics
    /// Panics if `start >= node_count`.
    pub fn new(node_count: usize, start: usize) -> Self {
        assert!(
            start < node_count,
            "start node {start} out of range for {node_count} nodes"
        );
        let mut visited = vec![false; node_count];
        visited[start] = true;
        let mut path = Vec::with_capacity(node_count);
        path.push(start);
        Self { path, visited }
    }

    /// Rebuilds an agent from a known (possibly partial) path.
    pub fn with_path(node_count: usize, path: Vec<usize>) -> Result<Self, AcoError> {
        if path.is_empty() {
            return Err(AcoError::InvalidPath("path must not be empty".into()));
        }
        let mut visited = vec![false; node_count];
        for &node in &path {
            if node >= node_count {
                return Err(AcoError::InvalidPath(format!(
                    "node {node} out of range for {node_count} nodes"
                )));
            }
            if visited[node] {
                return Err(AcoError::InvalidPath(format!("node {node} repeats")));
            }
            visited[node] = true;
        }
        Ok(Self { path, visited })
    }

    /// The nodes visited so far, in order.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// The node the agent currently stands on.
    pub fn current(&self) -> usize {
        // Paths are never empty: both constructors seed at least one node.
        self.path[self.path.len() - 1]
    }

    pub fn node_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_complete(&self) -> bool {
        self.path.len() == self.visited.len()
    }

    pub fn has_visited(&self, node: usize) -> bool {
        self.visited[node]
    }

    /// Unvisited nodes in ascending id order.
    pub fn unvisited(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.visited.len()).filter(move |&node| !self.visited[node])
    }

    /// Extends the path by exactly one unvisited node and returns it.
    ///
    /// With probability `config.random_move_probability` the node is picked
    /// uniformly; otherwise it is drawn by [`roulette_select`] over the
    /// normalized transition weights.
    ///
    /// # Errors
    ///
    /// - [`AcoError::DegenerateDistance`] if a candidate sits at distance 0.
    /// - [`AcoError::VanishingPheromone`] if the weights cannot be normalized.
    /// - [`AcoError::ExhaustedCandidates`] if the path is already complete.
    pub fn advance_hop<R: Rng>(
        &mut self,
        distances: &DistanceTable,
        pheromones: &PheromoneMatrix,
        config: &AcoConfig,
        rng: &mut R,
    ) -> Result<usize, AcoError> {
        let n = self.node_count();
        if distances.len() != n {
            return Err(AcoError::DimensionMismatch {
                expected: n,
                found: distances.len(),
            });
        }
        pheromones.check_len(n)?;

        let current = self.current();
        let candidates: Vec<usize> = self.unvisited().collect();
        if candidates.is_empty() {
            return Err(AcoError::ExhaustedCandidates { node: current });
        }

        let next = if rng.random::<f64>() < config.random_move_probability {
            candidates[rng.random_range(0..candidates.len())]
        } else {
            let probabilities = transition_probabilities(
                current,
                &candidates,
                distances,
                pheromones,
                config.alpha,
                config.beta,
            )?;
            roulette_select(&candidates, &probabilities, unit_draw(rng))
                .ok_or(AcoError::ExhaustedCandidates { node: current })?
        };

        self.visited[next] = true;
        self.path.push(next);
        Ok(next)
    }

    /// Sum of consecutive hop distances along the path built so far.
    pub fn path_length(&self, distances: &DistanceTable) -> f64 {
        self.path
            .windows(2)
            .map(|hop| distances.get(hop[0], hop[1]))
            .sum()
    }
}

/// Normalized transition probabilities from `current` to each candidate.
fn transition_probabilities(
    current: usize,
    candidates: &[usize],
    distances: &DistanceTable,
    pheromones: &PheromoneMatrix,
    alpha: f64,
    beta: f64,
) -> Result<Vec<f64>, AcoError> {
    let mut weights = Vec::with_capacity(candidates.len());
    for &candidate in candidates {
        let d = distances.get(current, candidate);
        if d == 0.0 {
            return Err(AcoError::DegenerateDistance {
                from: current,
                to: candidate,
            });
        }
        let tau = pheromones.get(current, candidate).powf(alpha);
        let eta = (1.0 / d).powf(beta);
        weights.push(tau * eta);
    }

    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(AcoError::VanishingPheromone { node: current });
    }
    for w in &mut weights {
        *w /= total;
    }
    Ok(weights)
}

/// Roulette-wheel selection over consecutive left-open intervals.
///
/// `probabilities` partition `(0, 1]` in candidate order: candidate `i`
/// owns `(p_0 + .. + p_{i-1}, p_0 + .. + p_i]`. The candidate whose interval
/// contains `draw` is returned, so a draw landing exactly on a boundary
/// belongs to the earlier candidate. The interval of the last candidate with
/// a positive probability is closed at `1.0` regardless of accumulated
/// rounding; zero-probability candidates own empty intervals and are never
/// returned.
///
/// A single candidate is returned for any draw. Returns `None` only when
/// `draw` lies outside `(0, 1]`, the inputs are empty, or no probability is
/// positive.
///
/// # Examples
///
/// ```
/// use u_aco::aco::roulette_select;
///
/// assert_eq!(roulette_select(&[4, 9], &[0.5, 0.5], 0.5), Some(4));
/// assert_eq!(roulette_select(&[4, 9], &[0.5, 0.5], 0.50001), Some(9));
/// ```
pub fn roulette_select(candidates: &[usize], probabilities: &[f64], draw: f64) -> Option<usize> {
    debug_assert_eq!(candidates.len(), probabilities.len());
    if candidates.len() == 1 {
        return Some(candidates[0]);
    }

    let last = probabilities.iter().rposition(|&p| p > 0.0)?;
    let mut lower = 0.0;
    let weighted = candidates.iter().zip(probabilities).take(last + 1);
    for (i, (&candidate, &p)) in weighted.enumerate() {
        let upper = if i == last { 1.0_f64.max(lower) } else { lower + p };
        if lower < draw && draw <= upper {
            return Some(candidate);
        }
        lower = upper;
    }
    None
}
