//! Frame-stepped execution for live animation.
//!
//! The caller's frame loop drives everything synchronously:
//!
//! ```text
//! Idle --step--> Generating --ok--> Animating --advance_agents_visually*--> Idle
//!                    |                                  |
//!                    +--err--> Idle        cancel ------+--> Idle
//! ```
//!
//! A generation only touches the pheromone matrix once it has completed,
//! so cancelling or failing at any point leaves the matrix as it was.

use super::colony::{Colony, Route};
use super::config::AcoConfig;
use super::motion::{AgentMotion, DEFAULT_STEP_FRACTION};
use crate::distance::{DistanceTable, Point};
use crate::error::AcoError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the frame-stepped driver currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// Ready for the next generation, or halted.
    Idle,
    /// A generation is being built.
    ///
    /// [`FrameStepper::step`] enters and leaves this state within one call,
    /// so callers on the frame loop only ever observe `Idle` or `Animating`.
    Generating,
    /// Agents are walking the paths of the last generation.
    Animating,
}

/// What a call to [`FrameStepper::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Cancelled: nothing was done.
    NoWork,
    /// The previous generation is still being animated.
    Busy,
    /// A generation was committed.
    Generated {
        /// Committed generations so far, this one included.
        generation: usize,
        /// Shortest path of this generation.
        route: Route,
        /// Whether `route` replaced the best-so-far record.
        improved: bool,
    },
    /// The generation budget is spent; carries the best route found.
    Finished(Option<Route>),
}

/// Runs one generation per external tick and animates agents in between.
///
/// # Usage
///
/// ```
/// use u_aco::aco::{AcoConfig, FrameStepper, StepOutcome};
/// use u_aco::{DistanceTable, Point};
///
/// let points = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 3.0)];
/// let distances = DistanceTable::from_points(&points);
/// let mut stepper = FrameStepper::new(3, AcoConfig::interactive().with_seed(1))
///     .unwrap()
///     .with_step_fraction(0.5);
///
/// loop {
///     match stepper.step(&distances).unwrap() {
///         StepOutcome::Finished(best) => {
///             assert!(best.is_some());
///             break;
///         }
///         _ => while !stepper.advance_agents_visually() {
///             let _sprites = stepper.agent_positions(&points).unwrap();
///         },
///     }
/// }
/// ```
#[derive(Debug)]
pub struct FrameStepper {
    colony: Colony,
    state: StepperState,
    cancel: Arc<AtomicBool>,
    motions: Vec<AgentMotion>,
    step_fraction: f64,
    max_generations: usize,
}

impl FrameStepper {
    /// Creates a stepper for `node_count` nodes.
    ///
    /// The generation budget is `config.max_iterations`.
    pub fn new(node_count: usize, config: AcoConfig) -> Result<Self, AcoError> {
        let max_generations = config.max_iterations;
        Ok(Self {
            colony: Colony::new(node_count, config)?,
            state: StepperState::Idle,
            cancel: Arc::new(AtomicBool::new(false)),
            motions: Vec::new(),
            step_fraction: DEFAULT_STEP_FRACTION,
            max_generations,
        })
    }

    /// Sets the fraction of a hop covered per animation frame, in (0, 1].
    pub fn with_step_fraction(mut self, fraction: f64) -> Self {
        self.step_fraction = fraction;
        self
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Committed generations.
    pub fn generation(&self) -> usize {
        self.colony.generation()
    }

    pub fn best_so_far(&self) -> Option<&Route> {
        self.colony.best_so_far()
    }

    /// Per-agent animation state of the last generation.
    pub fn motions(&self) -> &[AgentMotion] {
        &self.motions
    }

    /// Shared cancellation flag.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Halts the run: drops the animation and returns to `Idle`.
    ///
    /// Every later `step` is a no-op until [`restart`](Self::restart).
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.halt();
        info!(generation = self.generation(), "frame-stepped run cancelled");
    }

    /// Clears cancellation and starts over with a fresh pheromone matrix.
    pub fn restart(&mut self) {
        self.cancel.store(false, Ordering::Release);
        self.colony.reset();
        self.halt();
    }

    /// Resets the pheromone matrix, keeping the generation count and best
    /// route. The usual response to a degenerate generation.
    pub fn reset_pheromones(&mut self) {
        self.colony.reset_pheromones();
    }

    /// Runs one full generation, unless cancelled, still animating, or out
    /// of budget.
    ///
    /// # Errors
    /// Degenerate geometry is returned as-is; there is no retry. The
    /// pheromone matrix is unchanged and the stepper is back to `Idle`, so
    /// the caller may [`reset_pheromones`](Self::reset_pheromones) and step
    /// again, or [`cancel`](Self::cancel).
    pub fn step(&mut self, distances: &DistanceTable) -> Result<StepOutcome, AcoError> {
        if self.is_cancelled() {
            self.halt();
            return Ok(StepOutcome::NoWork);
        }
        if self.state == StepperState::Animating {
            return Ok(StepOutcome::Busy);
        }
        if self.colony.generation() >= self.max_generations {
            self.halt();
            return Ok(StepOutcome::Finished(self.colony.best_so_far().cloned()));
        }

        self.state = StepperState::Generating;
        self.colony.spawn_generation();
        if let Err(err) = self.colony.run_generation(distances) {
            warn!(
                generation = self.colony.generation() + 1,
                error = %err,
                "generation failed, nothing committed"
            );
            self.halt();
            return Err(err);
        }

        let Some(route) = self.colony.best_route(distances) else {
            self.halt();
            return Err(AcoError::InvalidConfiguration(
                "colony spawned no agents".into(),
            ));
        };
        let improved = self.colony.record_best(route.clone());
        let generation = self.colony.generation();
        debug!(generation, length = route.length, improved, "generation committed");

        self.motions = self
            .colony
            .agents()
            .iter()
            .map(|agent| AgentMotion::new(agent.path().to_vec(), self.step_fraction))
            .collect();
        self.state = StepperState::Animating;

        Ok(StepOutcome::Generated {
            generation,
            route,
            improved,
        })
    }

    /// Moves every agent one frame along its path.
    ///
    /// Returns `true` once every agent has reached the end of its path (or
    /// there is nothing to animate), at which point the stepper is `Idle`
    /// and the next [`step`](Self::step) may run. Reaching an intermediate
    /// node returns `false`; per-hop arrival is visible through
    /// [`motions`](Self::motions) and [`AgentMotion::last_node`].
    pub fn advance_agents_visually(&mut self) -> bool {
        if self.state != StepperState::Animating {
            return true;
        }
        if self.is_cancelled() {
            self.halt();
            return true;
        }
        for motion in &mut self.motions {
            motion.advance();
        }
        let arrived = self.motions.iter().all(AgentMotion::has_arrived);
        if arrived {
            self.state = StepperState::Idle;
        }
        arrived
    }

    /// Screen position of every animated agent.
    pub fn agent_positions(&self, positions: &[Point]) -> Result<Vec<Point>, AcoError> {
        if positions.len() != self.colony.node_count() {
            return Err(AcoError::DimensionMismatch {
                expected: self.colony.node_count(),
                found: positions.len(),
            });
        }
        Ok(self.motions.iter().map(|m| m.position(positions)).collect())
    }

    fn halt(&mut self) {
        self.motions.clear();
        self.state = StepperState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (Vec<Point>, DistanceTable) {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let table = DistanceTable::from_points(&points);
        (points, table)
    }

    fn stepper(budget: usize) -> FrameStepper {
        let config = AcoConfig::default()
            .with_ant_multiplier(1.0)
            .with_max_iterations(budget)
            .with_seed(17);
        FrameStepper::new(4, config).unwrap().with_step_fraction(0.5)
    }

    #[test]
    fn test_step_then_animate() {
        let (points, distances) = square();
        let mut stepper = stepper(3);
        assert_eq!(stepper.state(), StepperState::Idle);

        let outcome = stepper.step(&distances).unwrap();
        assert_ne!(stepper.state(), StepperState::Generating);
        assert!(matches!(
            outcome,
            StepOutcome::Generated { generation: 1, .. }
        ));
        assert_eq!(stepper.state(), StepperState::Animating);
        assert_eq!(stepper.motions().len(), 4);

        // Busy until every agent has walked its path.
        assert_eq!(stepper.step(&distances).unwrap(), StepOutcome::Busy);

        // 3 hops at 2 frames each.
        let mut frames = 0;
        while !stepper.advance_agents_visually() {
            frames += 1;
            assert_eq!(stepper.agent_positions(&points).unwrap().len(), 4);
        }
        assert_eq!(frames, 5);
        assert_eq!(stepper.state(), StepperState::Idle);
    }

    #[test]
    fn test_intermediate_hops_do_not_finish_animation() {
        let (_, distances) = square();
        let mut stepper = stepper(3);
        stepper.step(&distances).unwrap();
        let paths: Vec<Vec<usize>> = stepper
            .colony()
            .agents()
            .iter()
            .map(|a| a.path().to_vec())
            .collect();

        // Two frames at 0.5 complete the first hop of every agent.
        assert!(!stepper.advance_agents_visually());
        assert!(!stepper.advance_agents_visually());
        for (motion, path) in stepper.motions().iter().zip(&paths) {
            assert_eq!(motion.last_node(), Some(path[1]));
            assert!(!motion.has_arrived());
        }
        assert_eq!(stepper.state(), StepperState::Animating);
    }

    #[test]
    fn test_budget_finishes() {
        let (_, distances) = square();
        let mut stepper = stepper(2);

        for expected in 1..=2 {
            match stepper.step(&distances).unwrap() {
                StepOutcome::Generated { generation, .. } => assert_eq!(generation, expected),
                other => panic!("unexpected outcome {other:?}"),
            }
            while !stepper.advance_agents_visually() {}
        }

        match stepper.step(&distances).unwrap() {
            StepOutcome::Finished(Some(best)) => {
                assert_eq!(best.path.len(), 4);
                assert_eq!(Some(&best), stepper.best_so_far());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_cancel_before_step_leaves_pheromones() {
        let (_, distances) = square();
        let mut stepper = stepper(5);
        let before = stepper.colony().pheromones().clone();

        stepper.cancel_handle().store(true, Ordering::Release);
        assert_eq!(stepper.step(&distances).unwrap(), StepOutcome::NoWork);
        assert_eq!(stepper.colony().pheromones(), &before);
        assert_eq!(stepper.generation(), 0);
        assert_eq!(stepper.state(), StepperState::Idle);
    }

    #[test]
    fn test_cancel_during_animation() {
        let (_, distances) = square();
        let mut stepper = stepper(5);
        stepper.step(&distances).unwrap();
        let committed = stepper.colony().pheromones().clone();

        stepper.cancel();
        assert_eq!(stepper.state(), StepperState::Idle);
        assert!(stepper.motions().is_empty());
        assert!(stepper.advance_agents_visually());
        assert_eq!(stepper.step(&distances).unwrap(), StepOutcome::NoWork);
        assert_eq!(stepper.colony().pheromones(), &committed);
    }

    #[test]
    fn test_restart_clears_cancel() {
        let (_, distances) = square();
        let mut stepper = stepper(5);
        stepper.step(&distances).unwrap();
        stepper.cancel();
        stepper.restart();

        assert!(!stepper.is_cancelled());
        assert_eq!(stepper.generation(), 0);
        assert!(stepper.best_so_far().is_none());
        assert!(matches!(
            stepper.step(&distances).unwrap(),
            StepOutcome::Generated { generation: 1, .. }
        ));
    }

    #[test]
    fn test_degenerate_generation_propagates() {
        let distances = DistanceTable::from_rows(vec![vec![0.0; 4]; 4]).unwrap();
        let mut stepper = stepper(5);
        let before = stepper.colony().pheromones().clone();

        let err = stepper.step(&distances).unwrap_err();
        assert!(err.is_degenerate());
        assert_eq!(stepper.state(), StepperState::Idle);
        assert_eq!(stepper.colony().pheromones(), &before);
        assert_eq!(stepper.generation(), 0);
    }

    #[test]
    fn test_agent_positions_dimension_check() {
        let (points, distances) = square();
        let mut stepper = stepper(1);
        stepper.step(&distances).unwrap();
        assert!(stepper.agent_positions(&points[..3]).is_err());

        let sprites = stepper.agent_positions(&points).unwrap();
        for (sprite, agent) in sprites.iter().zip(stepper.colony().agents()) {
            assert_eq!(*sprite, points[agent.path()[0]]);
        }
    }
}
