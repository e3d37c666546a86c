//! Ant Colony Optimization kernel for interactive routing.
//!
//! Solves Travelling-Salesman-style open paths over a symmetric distance
//! table with an Ant System metaheuristic, under two scheduling
//! disciplines:
//!
//! - **Batch**: generations run back-to-back until an iteration budget is
//!   spent, optionally on a background thread with cooperative
//!   cancellation. Numerically degenerate generations are discarded and
//!   the pheromone matrix is reset.
//! - **Frame-stepped**: one generation per external tick, with agents
//!   animated along their paths between ticks. Errors go back to the
//!   caller.
//!
//! # Architecture
//!
//! The crate owns only the optimization kernel. Windowing, input handling
//! and drawing belong to the caller, which supplies a [`DistanceTable`]
//! (and, for animation, node [`Point`]s) and reads back routes, agent
//! paths and the pheromone matrix.
//!
//! This is a heuristic: no optimality is claimed.

pub mod aco;
pub mod distance;
pub mod error;
pub mod random;

pub use distance::{grid_layout, DistanceTable, Point};
pub use error::AcoError;
