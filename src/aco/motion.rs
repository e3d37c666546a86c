//! On-screen movement of agents along their completed paths.
//!
//! Movement is measured in frames: each call to [`AgentMotion::advance`]
//! covers a fixed fraction of the current hop, so every hop takes the same
//! number of frames regardless of its length.

use crate::distance::Point;

/// Fraction of a hop covered per frame unless configured otherwise.
pub const DEFAULT_STEP_FRACTION: f64 = 0.05;

/// Converts a per-frame fraction of a hop into a whole number of frames.
pub(crate) fn frames_per_hop(step_fraction: f64) -> usize {
    if step_fraction.is_nan() || step_fraction <= 0.0 {
        return 1;
    }
    (1.0 / step_fraction.min(1.0)).ceil().max(1.0) as usize
}

/// Visual progress of one agent along its path.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMotion {
    path: Vec<usize>,
    hop: usize,
    frame: usize,
    frames_per_hop: usize,
}

impl AgentMotion {
    /// Starts a motion on the first node of `path`.
    pub fn new(path: Vec<usize>, step_fraction: f64) -> Self {
        Self {
            path,
            hop: 0,
            frame: 0,
            frames_per_hop: frames_per_hop(step_fraction),
        }
    }

    /// The node the agent last stood on.
    pub fn last_node(&self) -> Option<usize> {
        self.path.get(self.hop).copied()
    }

    /// The node the agent is walking toward, `None` once it has arrived.
    pub fn next_node(&self) -> Option<usize> {
        self.path.get(self.hop + 1).copied()
    }

    /// Whether the agent has reached the final node of its path.
    pub fn has_arrived(&self) -> bool {
        self.next_node().is_none()
    }

    /// Fraction of the current hop already covered, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.frame as f64 / self.frames_per_hop as f64
    }

    /// Moves one frame toward the next node.
    ///
    /// Returns `true` when this frame reached that node.
    pub fn advance(&mut self) -> bool {
        if self.has_arrived() {
            return false;
        }
        self.frame += 1;
        if self.frame >= self.frames_per_hop {
            self.frame = 0;
            self.hop += 1;
            return true;
        }
        false
    }

    /// Current screen position, interpolated between node positions.
    ///
    /// # Panics
    /// Panics if `positions` does not cover every node on the path.
    pub fn position(&self, positions: &[Point]) -> Point {
        let Some(from) = self.last_node() else {
            return Point::default();
        };
        let origin = positions[from];
        match self.next_node() {
            Some(to) => {
                let target = positions[to];
                let t = self.progress();
                Point::new(
                    origin.x + (target.x - origin.x) * t,
                    origin.y + (target.y - origin.y) * t,
                )
            }
            None => origin,
        }
    }
}
