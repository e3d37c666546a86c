//! Ant Colony Optimization (ACO) for open Hamiltonian paths.
//!
//! A population of agents builds paths hop by hop, biased by a directed
//! pheromone matrix and by inverse distance. After every generation the
//! matrix evaporates and each agent deposits `1 / length` along the edges
//! it traversed, in traversal order.
//!
//! # Key Types
//!
//! - [`AcoConfig`]: colony parameters (population, evaporation, exponents)
//! - [`Agent`]: one path-construction process
//! - [`PheromoneMatrix`]: directed desirability weights
//! - [`Colony`]: population management and the pheromone update
//! - [`AcoRunner`] / [`BatchWorker`]: run-to-completion scheduling
//! - [`FrameStepper`]: one generation per frame, with agent animation
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a
//!   Colony of Cooperating Agents", *IEEE Trans. SMC-B* 26(1), 29-41
//! - Dorigo & Stützle (2004), *Ant Colony Optimization*

mod agent;
mod colony;
mod config;
pub mod motion;
mod pheromone;
mod runner;
mod stepper;

pub use agent::{roulette_select, Agent};
pub use colony::{Colony, Route};
pub use config::{AcoConfig, MAX_AGENT_COUNT};
pub use pheromone::{PheromoneMatrix, INITIAL_PHEROMONE};
pub use runner::{AcoResult, AcoRunner, BatchWorker};
pub use stepper::{FrameStepper, StepOutcome, StepperState};
