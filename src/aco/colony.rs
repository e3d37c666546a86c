//! Colony: one population of agents per generation plus the pheromone
//! matrix that persists across generations.

use super::agent::Agent;
use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::distance::DistanceTable;
use crate::error::AcoError;
use crate::random::rng_from;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

/// A path together with its total length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub path: Vec<usize>,
    pub length: f64,
}

/// Orchestrates agent populations and owns the pheromone matrix.
///
/// A generation is `spawn_generation` followed by `run_generation`; the
/// matrix is only written once every agent has completed its path, so a
/// failing generation leaves it untouched.
///
/// # Examples
///
/// ```
/// use u_aco::aco::{AcoConfig, Colony};
/// use u_aco::DistanceTable;
///
/// let distances = DistanceTable::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])
/// .unwrap();
///
/// let mut colony = Colony::new(3, AcoConfig::default().with_ant_multiplier(2.0).with_seed(7)).unwrap();
/// colony.spawn_generation();
/// colony.run_generation(&distances).unwrap();
///
/// let best = colony.best_route(&distances).unwrap();
/// assert_eq!(best.path.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Colony {
    config: AcoConfig,
    node_count: usize,
    pheromones: PheromoneMatrix,
    agents: Vec<Agent>,
    best: Option<Route>,
    generation: usize,
    rng: StdRng,
}

impl Colony {
    /// Creates a colony for `node_count` nodes.
    ///
    /// Fails fast if the configuration is invalid, `node_count < 2`, or the
    /// ant multiplier rounds to an empty population.
    pub fn new(node_count: usize, config: AcoConfig) -> Result<Self, AcoError> {
        config.validate_for(node_count)?;
        let rng = rng_from(config.seed);
        Ok(Self {
            node_count,
            pheromones: PheromoneMatrix::new(node_count),
            agents: Vec::new(),
            best: None,
            generation: 0,
            rng,
            config,
        })
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn pheromones(&self) -> &PheromoneMatrix {
        &self.pheromones
    }

    /// The current population.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Best route over every committed generation.
    pub fn best_so_far(&self) -> Option<&Route> {
        self.best.as_ref()
    }

    /// Number of generations whose pheromone update has been committed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Replaces the population with fresh agents on random start nodes.
    pub fn spawn_generation(&mut self) {
        let count = self.config.agent_count(self.node_count);
        let n = self.node_count;
        let rng = &mut self.rng;
        self.agents = (0..count)
            .map(|_| Agent::new(n, rng.random_range(0..n)))
            .collect();
    }

    /// Advances every incomplete agent by one hop.
    pub fn advance_agents(&mut self, distances: &DistanceTable) -> Result<(), AcoError> {
        self.check_table(distances)?;
        for agent in self.agents.iter_mut().filter(|a| !a.is_complete()) {
            agent.advance_hop(distances, &self.pheromones, &self.config, &mut self.rng)?;
        }
        Ok(())
    }

    /// Completes every agent's path, then evaporates and deposits.
    ///
    /// From freshly spawned agents this is exactly `N - 1` hops each.
    pub fn run_generation(&mut self, distances: &DistanceTable) -> Result<(), AcoError> {
        self.check_table(distances)?;
        while self.agents.iter().any(|a| !a.is_complete()) {
            self.advance_agents(distances)?;
        }
        self.update_pheromones(distances)
    }

    /// Evaporates every entry, then deposits `1 / length` along each agent's
    /// directed hops.
    ///
    /// Deposits are computed before any write, so a zero-length path
    /// ([`AcoError::DegeneratePath`]) leaves the matrix unchanged.
    pub fn update_pheromones(&mut self, distances: &DistanceTable) -> Result<(), AcoError> {
        self.check_table(distances)?;
        let lengths = self.path_lengths(distances);
        let mut deposits = Vec::with_capacity(lengths.len());
        for (agent, &length) in lengths.iter().enumerate() {
            if length == 0.0 {
                return Err(AcoError::DegeneratePath { agent });
            }
            deposits.push(1.0 / length);
        }

        self.pheromones.evaporate(self.config.evaporation_rate);
        for (agent, deposit) in self.agents.iter().zip(deposits) {
            for hop in agent.path().windows(2) {
                self.pheromones.deposit(hop[0], hop[1], deposit);
            }
        }
        self.generation += 1;

        let (lo, hi) = self.pheromones.bounds();
        debug!(
            generation = self.generation,
            agents = self.agents.len(),
            pheromone_min = lo,
            pheromone_max = hi,
            "pheromone update committed"
        );
        Ok(())
    }

    /// Shortest path in the current population.
    ///
    /// Ties go to the agent that comes first in population order. Returns
    /// `None` when no generation has been spawned.
    pub fn best_route(&self, distances: &DistanceTable) -> Option<Route> {
        let lengths = self.path_lengths(distances);
        let mut best: Option<(usize, f64)> = None;
        for (i, &length) in lengths.iter().enumerate() {
            match best {
                Some((_, best_length)) if length >= best_length => {}
                _ => best = Some((i, length)),
            }
        }
        best.map(|(i, length)| Route {
            path: self.agents[i].path().to_vec(),
            length,
        })
    }

    /// Replaces the best-so-far record if `route` is strictly shorter.
    ///
    /// Returns whether the record changed.
    pub fn record_best(&mut self, route: Route) -> bool {
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| route.length < best.length);
        if improved {
            self.best = Some(route);
        }
        improved
    }

    /// Restores the pheromone matrix to its uniform initial state.
    pub fn reset_pheromones(&mut self) {
        self.pheromones.reset();
    }

    /// Drops the population, pheromone history and best record.
    pub fn reset(&mut self) {
        self.agents.clear();
        self.pheromones.reset();
        self.best = None;
        self.generation = 0;
    }

    fn check_table(&self, distances: &DistanceTable) -> Result<(), AcoError> {
        if distances.len() != self.node_count {
            return Err(AcoError::DimensionMismatch {
                expected: self.node_count,
                found: distances.len(),
            });
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn path_lengths(&self, distances: &DistanceTable) -> Vec<f64> {
        use rayon::prelude::*;
        self.agents
            .par_iter()
            .map(|agent| agent.path_length(distances))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn path_lengths(&self, distances: &DistanceTable) -> Vec<f64> {
        self.agents
            .iter()
            .map(|agent| agent.path_length(distances))
            .collect()
    }
}
