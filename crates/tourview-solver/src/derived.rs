//! Data prepared before a solve: coordinates and candidate lists.

use tourview_core::{PointSet, SolveError};
use tourview_settings::SolverConfig;
use tracing::debug;

use crate::cancel::CancellationFlag;

/// Node coordinates and nearest-neighbour lists over a point set.
///
/// Nodes are addressed by position in the point set. `tour_index` maps a
/// position back to the index a `Tour` uses (`id - 1`). Distances are computed
/// on demand; only the candidate lists are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedData {
    coords: Vec<(f64, f64)>,
    candidates: usize,
    neighbours: Vec<usize>,
    tour_indices: Vec<usize>,
}

impl DerivedData {
    /// Builds the data, checking `cancel` once per node.
    pub fn build(
        points: &PointSet,
        config: &SolverConfig,
        cancel: &CancellationFlag,
    ) -> Result<Self, SolveError> {
        let dimension = points.len();
        if dimension == 0 {
            return Err(SolveError::solver("problem has no nodes"));
        }

        let tour_indices = points
            .iter()
            .map(|p| {
                p.tour_index().ok_or_else(|| {
                    SolveError::solver(format!("node id {} cannot appear in a tour", p.id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

        let k = config.nearest_neighbour_factor.min(dimension - 1);
        let mut neighbours = candidate_storage(dimension, k)?;
        let mut row: Vec<usize> = reserve(dimension)?;
        for i in 0..dimension {
            cancel.checkpoint()?;
            row.clear();
            row.extend((0..dimension).filter(|&j| j != i));
            let closer = |a: &usize, b: &usize| {
                squared(coords[i], coords[*a])
                    .total_cmp(&squared(coords[i], coords[*b]))
                    .then(a.cmp(b))
            };
            if k < row.len() {
                row.select_nth_unstable_by(k, closer);
                row.truncate(k);
            }
            row.sort_unstable_by(closer);
            neighbours.extend_from_slice(&row);
        }

        debug!(dimension, neighbours = k, "Built derived data");
        Ok(Self {
            coords,
            candidates: k,
            neighbours,
            tour_indices,
        })
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        let (a, b) = (self.coords[from], self.coords[to]);
        (a.0 - b.0).hypot(a.1 - b.1)
    }

    /// Nearest nodes to `node`, closest first.
    pub fn neighbours(&self, node: usize) -> &[usize] {
        let start = node * self.candidates;
        &self.neighbours[start..start + self.candidates]
    }

    pub fn tour_index(&self, node: usize) -> usize {
        self.tour_indices[node]
    }

    /// Length of the closed cycle through `order` (positions).
    pub fn cycle_length(&self, order: &[usize]) -> f64 {
        if order.len() < 2 {
            return 0.0;
        }
        let open: f64 = order
            .windows(2)
            .map(|pair| self.distance(pair[0], pair[1]))
            .sum();
        open + self.distance(order[order.len() - 1], order[0])
    }
}

#[inline]
fn squared(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Room for `k` candidates per node, or an error if it cannot be had.
fn candidate_storage(dimension: usize, k: usize) -> Result<Vec<usize>, SolveError> {
    let len = dimension.checked_mul(k).ok_or_else(|| {
        SolveError::solver(format!(
            "{dimension} nodes with {k} candidates each is too large"
        ))
    })?;
    reserve(len)
}

fn reserve<T>(len: usize) -> Result<Vec<T>, SolveError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|e| SolveError::solver(format!("cannot allocate {len} entries: {e}")))?;
    Ok(storage)
}
