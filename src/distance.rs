//! Node geometry and the symmetric distance table consumed by the solver.
//!
//! The table is owned by whoever edits the graph. The solver only reads it,
//! once per hop decision, and never mutates it.

use crate::error::AcoError;
use rand::Rng;

/// Tolerance used when checking `d[i][j] == d[j][i]`.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Side length of the grid used by [`grid_layout`].
const GRID_CELLS: usize = 8;

/// A node position in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint of the segment to `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Symmetric `N x N` matrix of non-negative distances.
///
/// Stored flattened in row-major order. The diagonal is kept at zero and is
/// never read by the solver.
///
/// # Examples
///
/// ```
/// use u_aco::DistanceTable;
///
/// let table = DistanceTable::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])
/// .unwrap();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.get(0, 2), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceTable {
    n: usize,
    data: Vec<f64>,
}

impl DistanceTable {
    /// Builds a table from explicit rows, validating shape, sign and symmetry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AcoError> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in &rows {
            if row.len() != n {
                return Err(AcoError::DimensionMismatch {
                    expected: n,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        for i in 0..n {
            for j in 0..n {
                let value = data[i * n + j];
                if i == j {
                    continue;
                }
                check_entry(i, j, value)?;
                if (value - data[j * n + i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(AcoError::InvalidDistance {
                        from: i,
                        to: j,
                        value,
                    });
                }
            }
        }

        Ok(Self { n, data })
    }

    /// Builds the pairwise Euclidean table for a set of node positions.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_to(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between `from` and `to`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    /// The distances out of `node`.
    pub fn row(&self, node: usize) -> &[f64] {
        &self.data[node * self.n..(node + 1) * self.n]
    }

    /// Writes `d[a][b]` and `d[b][a]`.
    pub fn set(&mut self, a: usize, b: usize, distance: f64) -> Result<(), AcoError> {
        if a >= self.n || b >= self.n {
            return Err(AcoError::DimensionMismatch {
                expected: self.n,
                found: a.max(b) + 1,
            });
        }
        if a == b {
            return Ok(());
        }
        check_entry(a, b, distance)?;
        self.data[a * self.n + b] = distance;
        self.data[b * self.n + a] = distance;
        Ok(())
    }

    /// Recomputes the row and column of `node` after it has been moved.
    ///
    /// `points` holds the current position of every node, including the
    /// moved one.
    pub fn relocate(&mut self, node: usize, points: &[Point]) -> Result<(), AcoError> {
        if points.len() != self.n {
            return Err(AcoError::DimensionMismatch {
                expected: self.n,
                found: points.len(),
            });
        }
        if node >= self.n {
            return Err(AcoError::DimensionMismatch {
                expected: self.n,
                found: node + 1,
            });
        }
        for other in 0..self.n {
            if other == node {
                continue;
            }
            let d = points[node].distance_to(&points[other]);
            self.data[node * self.n + other] = d;
            self.data[other * self.n + node] = d;
        }
        Ok(())
    }
}

fn check_entry(from: usize, to: usize, value: f64) -> Result<(), AcoError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AcoError::InvalidDistance { from, to, value });
    }
    Ok(())
}

/// Places `count` nodes on distinct random cells of an 8x8 grid.
///
/// Cell `(i, j)` maps to `padding + radius + (padding + 2 * radius) * (i, j)`,
/// so neighbouring nodes never overlap.
pub fn grid_layout<R: Rng>(
    count: usize,
    padding: f64,
    radius: f64,
    rng: &mut R,
) -> Result<Vec<Point>, AcoError> {
    let cells = GRID_CELLS * GRID_CELLS;
    if count > cells {
        return Err(AcoError::InvalidConfiguration(format!(
            "grid layout holds at most {cells} nodes, got {count}"
        )));
    }
    let pitch = padding + radius * 2.0;
    let origin = padding + radius;
    Ok(rand::seq::index::sample(rng, cells, count)
        .into_iter()
        .map(|cell| {
            let (i, j) = (cell % GRID_CELLS, cell / GRID_CELLS);
            Point::new(origin + pitch * i as f64, origin + pitch * j as f64)
        })
        .collect())
}
