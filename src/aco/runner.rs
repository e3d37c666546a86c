//! Batch execution: generations back-to-back until the budget runs out.
//!
//! Numerically degenerate generations (see [`AcoError::is_degenerate`]) are
//! discarded: the pheromone matrix is reset to uniform and the loop moves
//! on. The discarded generation still counts toward the iteration budget.

use super::colony::{Colony, Route};
use super::config::AcoConfig;
use crate::distance::DistanceTable;
use crate::error::AcoError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Result of a batch ACO run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcoResult {
    /// Best route over all surviving generations, `None` if every
    /// generation degenerated.
    pub best: Option<Route>,

    /// Generations executed, degenerate ones included.
    pub iterations: usize,

    /// Generations discarded because of numerical degeneracy.
    pub degenerate_iterations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best-so-far length after each surviving generation.
    pub length_history: Vec<f64>,
}

impl AcoResult {
    fn empty() -> Self {
        Self {
            best: None,
            iterations: 0,
            degenerate_iterations: 0,
            cancelled: false,
            length_history: Vec::new(),
        }
    }
}

/// Executes ACO in batch mode.
///
/// # Usage
///
/// ```
/// use u_aco::aco::{AcoConfig, AcoRunner};
/// use u_aco::DistanceTable;
///
/// let distances = DistanceTable::from_rows(vec![
///     vec![0.0, 8.0, 7.0, 4.0],
///     vec![8.0, 0.0, 5.0, 7.0],
///     vec![7.0, 5.0, 0.0, 9.0],
///     vec![4.0, 7.0, 9.0, 0.0],
/// ])
/// .unwrap();
///
/// let config = AcoConfig::default().with_max_iterations(50).with_seed(42);
/// let result = AcoRunner::run(&distances, &config).unwrap();
/// assert_eq!(result.iterations, 50);
/// assert!(result.best.is_some());
/// ```
pub struct AcoRunner;

impl AcoRunner {
    /// Runs `config.max_iterations` generations on a fresh colony.
    pub fn run(distances: &DistanceTable, config: &AcoConfig) -> Result<AcoResult, AcoError> {
        Self::run_with_cancel(distances, config, None)
    }

    /// Runs with an optional cancellation token, polled once per generation.
    ///
    /// When the flag is set the run stops before the next generation and
    /// returns the best route found so far.
    pub fn run_with_cancel(
        distances: &DistanceTable,
        config: &AcoConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AcoResult, AcoError> {
        let mut colony = Colony::new(distances.len(), config.clone())?;
        Self::run_to_completion(
            &mut colony,
            distances,
            config.max_iterations,
            cancel.as_deref(),
        )
    }

    /// Drives an existing colony for `iterations` generations.
    ///
    /// The colony's best-so-far record carries across calls, so repeated
    /// calls keep improving the same result.
    ///
    /// # Errors
    /// Degenerate generations are recovered locally. Any other error
    /// (dimension mismatch, exhausted candidates) aborts the run.
    pub fn run_to_completion(
        colony: &mut Colony,
        distances: &DistanceTable,
        iterations: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<AcoResult, AcoError> {
        info!(
            nodes = distances.len(),
            iterations, "starting batch ant colony run"
        );
        let mut result = AcoResult::empty();

        for _ in 0..iterations {
            if is_cancelled(cancel) {
                result.cancelled = true;
                break;
            }
            run_iteration(colony, distances, &mut result)?;
        }

        finish(colony, result)
    }
}

/// One generation of the batch loop, recovering from degeneracy.
fn run_iteration(
    colony: &mut Colony,
    distances: &DistanceTable,
    result: &mut AcoResult,
) -> Result<(), AcoError> {
    colony.spawn_generation();
    match colony.run_generation(distances) {
        Ok(()) => {
            if let Some(route) = colony.best_route(distances) {
                if colony.record_best(route) {
                    debug!(
                        iteration = result.iterations,
                        length = colony.best_so_far().map(|r| r.length),
                        "new best route"
                    );
                }
            }
            if let Some(best) = colony.best_so_far() {
                result.length_history.push(best.length);
            }
        }
        Err(err) if err.is_degenerate() => {
            warn!(
                iteration = result.iterations,
                error = %err,
                "degenerate generation discarded, pheromones reset"
            );
            colony.reset_pheromones();
            result.degenerate_iterations += 1;
        }
        Err(err) => return Err(err),
    }
    result.iterations += 1;
    Ok(())
}

fn finish(colony: &Colony, mut result: AcoResult) -> Result<AcoResult, AcoError> {
    result.best = colony.best_so_far().cloned();
    info!(
        iterations = result.iterations,
        degenerate = result.degenerate_iterations,
        cancelled = result.cancelled,
        best_length = result.best.as_ref().map(|r| r.length),
        "batch ant colony run finished"
    );
    Ok(result)
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Acquire))
}

/// A batch run on a dedicated background thread.
///
/// The distance table is shared with its editor through a lock. The worker
/// holds a read guard for the duration of each generation, so an edit lands
/// between generations and never in the middle of one.
///
/// ```no_run
/// use std::sync::{Arc, RwLock};
/// use u_aco::aco::{AcoConfig, BatchWorker};
/// use u_aco::{DistanceTable, Point};
///
/// let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(6.0, 0.0)];
/// let table = Arc::new(RwLock::new(DistanceTable::from_points(&points)));
///
/// let worker = BatchWorker::spawn(Arc::clone(&table), AcoConfig::default()).unwrap();
/// // ... later, e.g. on a key press:
/// let result = worker.cancel_and_join().unwrap();
/// println!("{:?}", result.best);
/// ```
pub struct BatchWorker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<AcoResult, AcoError>>,
}

impl BatchWorker {
    /// Validates the configuration against the current table and starts the
    /// worker thread.
    pub fn spawn(
        distances: Arc<RwLock<DistanceTable>>,
        config: AcoConfig,
    ) -> Result<Self, AcoError> {
        let node_count = distances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let iterations = config.max_iterations;
        let mut colony = Colony::new(node_count, config)?;

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("aco-batch".into())
            .spawn(move || {
                info!(nodes = node_count, iterations, "batch worker started");
                let mut result = AcoResult::empty();
                for _ in 0..iterations {
                    if flag.load(Ordering::Acquire) {
                        result.cancelled = true;
                        info!(iteration = result.iterations, "batch worker cancelled");
                        break;
                    }
                    let table = distances.read().unwrap_or_else(PoisonError::into_inner);
                    run_iteration(&mut colony, &table, &mut result)?;
                }
                finish(&colony, result)
            })
            .map_err(|e| AcoError::WorkerFailed(e.to_string()))?;

        Ok(Self { cancel, handle })
    }

    /// Asks the worker to stop before its next generation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Shared cancellation flag, for callers that signal from elsewhere.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns its result.
    pub fn join(self) -> Result<AcoResult, AcoError> {
        self.handle
            .join()
            .map_err(|_| AcoError::WorkerFailed("batch worker panicked".into()))?
    }

    /// Cancels the worker and waits for it to exit.
    pub fn cancel_and_join(self) -> Result<AcoResult, AcoError> {
        self.cancel();
        self.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Point;

    fn six_nodes() -> DistanceTable {
        DistanceTable::from_rows(vec![
            vec![0.0, 8.0, 7.0, 4.0, 6.0, 4.0],
            vec![8.0, 0.0, 5.0, 7.0, 11.0, 5.0],
            vec![7.0, 5.0, 0.0, 9.0, 6.0, 7.0],
            vec![4.0, 7.0, 9.0, 0.0, 5.0, 6.0],
            vec![6.0, 11.0, 6.0, 5.0, 0.0, 3.0],
            vec![4.0, 5.0, 7.0, 6.0, 3.0, 0.0],
        ])
        .unwrap()
    }

    fn ring(n: usize) -> DistanceTable {
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let theta = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(100.0 * theta.cos(), 100.0 * theta.sin())
            })
            .collect();
        DistanceTable::from_points(&points)
    }

    #[test]
    fn test_run_finds_route() {
        let distances = six_nodes();
        let config = AcoConfig::default().with_max_iterations(200).with_seed(42);
        let result = AcoRunner::run(&distances, &config).unwrap();

        assert_eq!(result.iterations, 200);
        assert!(!result.cancelled);
        let best = result.best.unwrap();
        let mut sorted = best.path.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..6).collect::<Vec<_>>());

        let recomputed: f64 = best.path.windows(2).map(|w| distances.get(w[0], w[1])).sum();
        assert!((recomputed - best.length).abs() < 1e-12);
    }

    #[test]
    fn test_history_non_increasing() {
        let config = AcoConfig::default().with_max_iterations(100).with_seed(7);
        let result = AcoRunner::run(&ring(10), &config).unwrap();

        assert_eq!(
            result.length_history.len(),
            result.iterations - result.degenerate_iterations
        );
        for window in result.length_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best length should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_zero_distance_never_crashes() {
        let mut distances = six_nodes();
        distances.set(0, 1, 0.0).unwrap();
        let config = AcoConfig::default().with_max_iterations(1000).with_seed(3);

        let result = AcoRunner::run(&distances, &config).unwrap();

        assert_eq!(result.iterations, 1000, "degenerate generations count");
        assert!(result.degenerate_iterations > 0);
        assert!(result.degenerate_iterations < 1000);
        assert!(result.best.is_some());
    }

    #[test]
    fn test_fully_degenerate_yields_no_route() {
        let distances = DistanceTable::from_rows(vec![vec![0.0; 4]; 4]).unwrap();
        let config = AcoConfig::default().with_max_iterations(50).with_seed(5);

        let result = AcoRunner::run(&distances, &config).unwrap();

        assert_eq!(result.iterations, 50);
        assert_eq!(result.degenerate_iterations, 50);
        assert!(result.best.is_none());
        assert!(result.length_history.is_empty());
    }

    #[test]
    fn test_cancel_before_start() {
        let config = AcoConfig::default().with_max_iterations(1000).with_seed(1);
        let cancel = Arc::new(AtomicBool::new(true));

        let result = AcoRunner::run_with_cancel(&six_nodes(), &config, Some(cancel)).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert!(result.best.is_none());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = AcoConfig::default().with_evaporation_rate(2.0);
        assert!(matches!(
            AcoRunner::run(&six_nodes(), &config),
            Err(AcoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_run_to_completion_keeps_best_across_calls() {
        let distances = ring(8);
        let mut colony = Colony::new(8, AcoConfig::default().with_seed(13)).unwrap();

        let first = AcoRunner::run_to_completion(&mut colony, &distances, 20, None).unwrap();
        let second = AcoRunner::run_to_completion(&mut colony, &distances, 20, None).unwrap();

        let a = first.best.unwrap().length;
        let b = second.best.unwrap().length;
        assert!(b <= a);
        assert_eq!(colony.generation(), 40);
    }

    #[test]
    fn test_worker_runs_to_budget() {
        let table = Arc::new(RwLock::new(six_nodes()));
        let config = AcoConfig::default().with_max_iterations(100).with_seed(21);

        let worker = BatchWorker::spawn(Arc::clone(&table), config).unwrap();
        let result = worker.join().unwrap();

        assert_eq!(result.iterations, 100);
        assert!(!result.cancelled);
        assert!(result.best.is_some());
    }

    #[test]
    fn test_worker_cancellation() {
        let table = Arc::new(RwLock::new(ring(30)));
        let config = AcoConfig::default()
            .with_max_iterations(10_000_000)
            .with_seed(2);

        let worker = BatchWorker::spawn(table, config).unwrap();
        let result = worker.cancel_and_join().unwrap();

        assert!(result.cancelled);
        assert!(result.iterations < 10_000_000);
    }

    #[test]
    fn test_worker_sees_edits_between_generations() {
        // Every node coincides, so no generation on this table can commit.
        let table = Arc::new(RwLock::new(
            DistanceTable::from_rows(vec![vec![0.0; 4]; 4]).unwrap(),
        ));
        let config = AcoConfig::default().with_max_iterations(50_000).with_seed(8);

        let worker = BatchWorker::spawn(Arc::clone(&table), config).unwrap();
        let spread = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        ];
        *table.write().unwrap() = DistanceTable::from_points(&spread);
        let result = worker.join().unwrap();

        let edited = table.read().unwrap();
        let best = result.best.expect("generations after the edit commit a route");
        let recomputed: f64 = best.path.windows(2).map(|w| edited.get(w[0], w[1])).sum();
        assert!((recomputed - best.length).abs() < 1e-9);
        assert!((best.length - 30.0).abs() < 1e-9);
        assert!(result.degenerate_iterations < result.iterations);
    }

    #[test]
    fn test_worker_rejects_invalid_config() {
        let table = Arc::new(RwLock::new(six_nodes()));
        let config = AcoConfig::default().with_ant_multiplier(-1.0);
        assert!(BatchWorker::spawn(table, config).is_err());
    }
}
