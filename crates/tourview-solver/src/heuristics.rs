//! Built-in solvers
//!
//! Greedy nearest-neighbour construction, optionally followed by 2-opt
//! improvement over the candidate lists. Tours are closed: the start node is
//! repeated at the end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tourview_core::{Solution, SolveError, Tour};
use tourview_settings::{AlgorithmType, SolverConfig};
use tracing::debug;

use crate::derived::DerivedData;
use crate::solver::{SolveContext, Solver, SolverFactory};

/// Nodes visited between cancellation checks
const CHECK_INTERVAL: usize = 256;

/// Smallest improvement a 2-opt move must make to be applied
const IMPROVEMENT_EPSILON: f64 = 1e-10;

/// Creates the solver named by `SolverConfig::algorithm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSolverFactory;

impl SolverFactory for BuiltinSolverFactory {
    fn create(&self, config: &SolverConfig) -> Result<Arc<dyn Solver>, SolveError> {
        Ok(match config.algorithm {
            AlgorithmType::NearestNeighbour => Arc::new(NearestNeighbourSolver::default()),
            AlgorithmType::TwoOpt => Arc::new(TwoOptSolver::default()),
        })
    }
}

#[derive(Debug, Default)]
pub struct NearestNeighbourSolver {
    stopped: AtomicBool,
}

impl Solver for NearestNeighbourSolver {
    fn solve(
        &self,
        data: &DerivedData,
        config: &SolverConfig,
        ctx: &SolveContext,
    ) -> Result<Solution, SolveError> {
        let order = nearest_neighbour_order(data, config.start_index, ctx, &self.stopped)?;
        Ok(to_solution(data, &order))
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct TwoOptSolver {
    stopped: AtomicBool,
}

impl Solver for TwoOptSolver {
    fn solve(
        &self,
        data: &DerivedData,
        config: &SolverConfig,
        ctx: &SolveContext,
    ) -> Result<Solution, SolveError> {
        let deadline = config.time_limit.map(|limit| Instant::now() + limit);
        let mut order = nearest_neighbour_order(data, config.start_index, ctx, &self.stopped)?;
        let initial = data.cycle_length(&order);

        let mut position = vec![0; order.len()];
        for (i, &node) in order.iter().enumerate() {
            position[node] = i;
        }

        let mut passes = 0;
        while passes < config.max_iterations {
            interrupted(ctx, &self.stopped)?;
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!(passes, "2-opt time limit reached");
                break;
            }
            ctx.report(
                format!("2-opt pass {}", passes + 1),
                Some(passes as f64 / config.max_iterations as f64),
            );
            passes += 1;
            if !improve_pass(data, &mut order, &mut position, ctx, &self.stopped)? {
                break;
            }
        }

        let solution = to_solution(data, &order);
        debug!(
            passes,
            initial,
            improved = solution.tour_length,
            "2-opt finished"
        );
        Ok(solution)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

fn interrupted(ctx: &SolveContext, stopped: &AtomicBool) -> Result<(), SolveError> {
    if stopped.load(Ordering::Acquire) {
        return Err(SolveError::Cancelled);
    }
    ctx.checkpoint()
}

fn nearest_neighbour_order(
    data: &DerivedData,
    start: usize,
    ctx: &SolveContext,
    stopped: &AtomicBool,
) -> Result<Vec<usize>, SolveError> {
    let n = data.dimension();
    if start >= n {
        return Err(SolveError::solver(format!(
            "start index {} is out of range for {} nodes",
            start, n
        )));
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = start;
    visited[current] = true;
    order.push(current);

    for step in 1..n {
        if step % CHECK_INTERVAL == 0 {
            interrupted(ctx, stopped)?;
            ctx.report("Building nearest neighbour tour", Some(step as f64 / n as f64));
        }

        let next = data
            .neighbours(current)
            .iter()
            .copied()
            .find(|&c| !visited[c])
            .or_else(|| {
                (0..n)
                    .filter(|&c| !visited[c])
                    .min_by(|&a, &b| data.distance(current, a).total_cmp(&data.distance(current, b)))
            });

        // every unvisited node is reachable by the full scan
        let Some(next) = next else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    interrupted(ctx, stopped)?;
    Ok(order)
}

/// One first-improvement pass over every tour edge. Returns whether any move
/// was applied.
fn improve_pass(
    data: &DerivedData,
    order: &mut [usize],
    position: &mut [usize],
    ctx: &SolveContext,
    stopped: &AtomicBool,
) -> Result<bool, SolveError> {
    let n = order.len();
    if n < 4 {
        return Ok(false);
    }

    let mut improved = false;
    for i in 0..n {
        if i % CHECK_INTERVAL == 0 {
            interrupted(ctx, stopped)?;
        }

        let a = order[i];
        let b = order[(i + 1) % n];
        let ab = data.distance(a, b);

        for &c in data.neighbours(a) {
            let ac = data.distance(a, c);
            if ac >= ab {
                break;
            }
            let j = position[c];
            let d = order[(j + 1) % n];
            if d == a || c == b {
                continue;
            }

            let delta = ac + data.distance(b, d) - ab - data.distance(c, d);
            if delta < -IMPROVEMENT_EPSILON {
                let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                order[lo + 1..=hi].reverse();
                for (k, &node) in order.iter().enumerate().take(hi + 1).skip(lo + 1) {
                    position[node] = k;
                }
                improved = true;
                break;
            }
        }
    }
    Ok(improved)
}

fn to_solution(data: &DerivedData, order: &[usize]) -> Solution {
    let mut indices: Vec<usize> = order.iter().map(|&node| data.tour_index(node)).collect();
    if indices.len() > 1 {
        indices.push(indices[0]);
    }
    Solution::new(Tour::new(indices), data.cycle_length(order))
}
