//! ACO configuration.

use crate::error::AcoError;

/// Largest population a single generation may spawn.
pub const MAX_AGENT_COUNT: usize = 1 << 20;

/// Configuration for an ant colony.
///
/// Fixed for the lifetime of a [`Colony`](super::Colony).
///
/// # Examples
///
/// ```
/// use u_aco::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_ant_multiplier(1.0)
///     .with_evaporation_rate(0.5)
///     .with_alpha(1.0)
///     .with_beta(2.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.agent_count(10), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoConfig {
    /// Agents per generation, as a multiple of the node count.
    ///
    /// The population is `round(N * ant_multiplier)`.
    pub ant_multiplier: f64,

    /// Factor applied to every pheromone entry each generation, in (0, 1].
    ///
    /// Lower values forget faster.
    pub evaporation_rate: f64,

    /// Probability that a hop ignores pheromone and distance entirely and
    /// picks a uniformly random unvisited node.
    pub random_move_probability: f64,

    /// Exponent on the pheromone term of the transition rule.
    pub alpha: f64,

    /// Exponent on the inverse-distance term of the transition rule.
    pub beta: f64,

    /// Generation budget for batch and frame-stepped runs.
    pub max_iterations: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            ant_multiplier: 0.5,
            evaporation_rate: 0.4,
            random_move_probability: 0.3,
            alpha: 2.0,
            beta: 3.0,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn with_ant_multiplier(mut self, multiplier: f64) -> Self {
        self.ant_multiplier = multiplier;
        self
    }

    pub fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    pub fn with_random_move_probability(mut self, p: f64) -> Self {
        self.random_move_probability = p;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for the animated front end: a handful of generations, each
    /// one watched as it happens.
    pub fn interactive() -> Self {
        Self {
            max_iterations: 3,
            ..Self::default()
        }
    }

    /// Number of agents spawned per generation for `node_count` nodes.
    pub fn agent_count(&self, node_count: usize) -> usize {
        (node_count as f64 * self.ant_multiplier).round() as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AcoError> {
        if !self.ant_multiplier.is_finite() || self.ant_multiplier <= 0.0 {
            return Err(invalid(format!(
                "ant_multiplier must be positive, got {}",
                self.ant_multiplier
            )));
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate <= 1.0) {
            return Err(invalid(format!(
                "evaporation_rate must be in (0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.random_move_probability) {
            return Err(invalid(format!(
                "random_move_probability must be in [0, 1], got {}",
                self.random_move_probability
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(invalid(format!("alpha must be >= 0, got {}", self.alpha)));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(invalid(format!("beta must be >= 0, got {}", self.beta)));
        }
        Ok(())
    }

    /// Validates the configuration against a concrete node count.
    pub fn validate_for(&self, node_count: usize) -> Result<(), AcoError> {
        self.validate()?;
        if node_count < 2 {
            return Err(invalid(format!(
                "a colony needs at least 2 nodes, got {node_count}"
            )));
        }
        let population = node_count as f64 * self.ant_multiplier;
        if population.round() > MAX_AGENT_COUNT as f64 {
            return Err(invalid(format!(
                "ant_multiplier {} yields more than {MAX_AGENT_COUNT} agents for {node_count} nodes",
                self.ant_multiplier
            )));
        }
        if self.agent_count(node_count) == 0 {
            return Err(invalid(format!(
                "ant_multiplier {} yields no agents for {node_count} nodes",
                self.ant_multiplier
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> AcoError {
    AcoError::InvalidConfiguration(message)
}
