//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tourview_core::SolveError;

/// Shared flag set by the orchestrator and polled by the worker.
///
/// Cloning shares the flag. Setting it is advisory: nothing stops a worker
/// that never looks at it.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(SolveError::Cancelled)` once the flag is set.
    pub fn checkpoint(&self) -> Result<(), SolveError> {
        if self.is_cancelled() {
            Err(SolveError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancellationFlag::new();
        let worker_view = flag.clone();
        assert_eq!(worker_view.checkpoint(), Ok(()));

        flag.cancel();
        assert!(worker_view.is_cancelled());
        assert_eq!(worker_view.checkpoint(), Err(SolveError::Cancelled));
    }
}
