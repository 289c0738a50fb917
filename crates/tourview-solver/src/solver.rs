//! Solver capabilities consumed by the orchestrator.

use std::sync::Arc;

use tourview_core::{Solution, SolveError};
use tourview_settings::SolverConfig;

use crate::cancel::CancellationFlag;
use crate::derived::DerivedData;

/// A tour construction algorithm.
///
/// `solve` runs on the worker thread. `stop` may be called once from the
/// presentation thread while `solve` is running, or after it has returned,
/// and must not block.
pub trait Solver: Send + Sync {
    fn solve(
        &self,
        data: &DerivedData,
        config: &SolverConfig,
        ctx: &SolveContext,
    ) -> Result<Solution, SolveError>;

    fn stop(&self);
}

/// Creates the solver for one solve request.
pub trait SolverFactory: Send + Sync {
    fn create(&self, config: &SolverConfig) -> Result<Arc<dyn Solver>, SolveError>;
}

impl<F> SolverFactory for F
where
    F: Fn(&SolverConfig) -> Result<Arc<dyn Solver>, SolveError> + Send + Sync,
{
    fn create(&self, config: &SolverConfig) -> Result<Arc<dyn Solver>, SolveError> {
        self(config)
    }
}

type ProgressFn = Box<dyn Fn(String, Option<f64>) + Send>;

/// What a running solver may consult or report through.
pub struct SolveContext {
    cancel: CancellationFlag,
    progress: ProgressFn,
}

impl SolveContext {
    pub fn new(
        cancel: CancellationFlag,
        progress: impl Fn(String, Option<f64>) + Send + 'static,
    ) -> Self {
        Self {
            cancel,
            progress: Box::new(progress),
        }
    }

    /// Context with a fresh flag that discards progress.
    pub fn detached() -> Self {
        Self::new(CancellationFlag::new(), |_, _| {})
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn checkpoint(&self) -> Result<(), SolveError> {
        self.cancel.checkpoint()
    }

    /// Report progress; `fraction` is in `[0, 1]` when known.
    pub fn report(&self, message: impl Into<String>, fraction: Option<f64>) {
        (self.progress)(message.into(), fraction.map(|f| f.clamp(0.0, 1.0)));
    }
}

impl std::fmt::Debug for SolveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveContext")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
