//! # TourView Solver
//!
//! Runs one solve at a time on a worker thread and reports its lifecycle
//! back to the presentation thread through a channel.
//!
//! - [`cancel`]: the shared cancellation flag
//! - [`solver`]: the `Solver` and `SolverFactory` capabilities
//! - [`derived`]: nearest-neighbour lists built before solving
//! - [`heuristics`]: built-in nearest-neighbour and 2-opt solvers
//! - [`orchestrator`]: the task state machine

pub mod cancel;
pub mod derived;
pub mod heuristics;
pub mod orchestrator;
pub mod solver;

pub use cancel::CancellationFlag;
pub use derived::DerivedData;
pub use heuristics::{BuiltinSolverFactory, NearestNeighbourSolver, TwoOptSolver};
pub use orchestrator::{TaskEvent, TaskId, TaskNotification, TaskOrchestrator, TaskState};
pub use solver::{SolveContext, Solver, SolverFactory};
