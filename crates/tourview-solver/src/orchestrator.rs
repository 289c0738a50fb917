//! Solve task orchestration
//!
//! One solve at a time runs on a dedicated worker thread. Everything the
//! presentation side needs to know arrives as [`TaskEvent`]s on a single
//! channel, drained on the presentation thread:
//!
//! ```text
//! Idle --start--> Initializing --data ready--> Running --> Succeeded
//!                                                     \--> Failed
//!                  (any state) --cancel--> Cancelled
//! ```
//!
//! Cancelling sets the shared flag, stops the active solver and reports
//! `Cancelled` at once. Anything the worker sends for that task afterwards is
//! discarded, so no notification follows `Cancelled`.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tourview_core::{PointSet, Solution, SolveError};
use tourview_settings::SolverConfig;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cancel::CancellationFlag;
use crate::derived::DerivedData;
use crate::solver::{SolveContext, Solver, SolverFactory};

/// Lifecycle state of the current (or last) solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    Idle,
    Initializing,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Initializing | Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Identity of one `start()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskNotification {
    Initializing,
    Running,
    Progress {
        message: String,
        fraction: Option<f64>,
    },
    Succeeded(Solution),
    Failed(SolveError),
    Cancelled,
}

impl TaskNotification {
    /// State this notification moves the task into; `None` for progress.
    pub fn state(&self) -> Option<TaskState> {
        match self {
            Self::Initializing => Some(TaskState::Initializing),
            Self::Running => Some(TaskState::Running),
            Self::Progress { .. } => None,
            Self::Succeeded(_) => Some(TaskState::Succeeded),
            Self::Failed(_) => Some(TaskState::Failed),
            Self::Cancelled => Some(TaskState::Cancelled),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_some_and(|s| s.is_terminal())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvent {
    pub task: TaskId,
    pub notification: TaskNotification,
}

type SolverSlot = Arc<Mutex<Option<Arc<dyn Solver>>>>;

struct ActiveTask {
    id: TaskId,
    cancel: CancellationFlag,
    solver: SolverSlot,
}

/// Owns the worker lifecycle for one solve at a time.
///
/// Not shared across threads: create it, start solves and drain events on
/// the presentation thread.
pub struct TaskOrchestrator {
    sender: Sender<TaskEvent>,
    receiver: Receiver<TaskEvent>,
    local: VecDeque<TaskEvent>,
    active: Option<ActiveTask>,
    state: TaskState,
}

impl TaskOrchestrator {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            local: VecDeque::new(),
            active: None,
            state: TaskState::Idle,
        }
    }

    /// State as of the last delivered notification.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Whether a started task has not yet reached a terminal state.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_task(&self) -> Option<TaskId> {
        self.active.as_ref().map(|task| task.id)
    }

    /// Start solving `points` on a new worker thread.
    ///
    /// Rejected with `AlreadyRunning` while a previous task is in flight.
    pub fn start(
        &mut self,
        points: PointSet,
        config: SolverConfig,
        factory: Arc<dyn SolverFactory>,
    ) -> Result<TaskId, SolveError> {
        if self.active.is_some() {
            return Err(SolveError::AlreadyRunning);
        }

        let id = TaskId::new();
        let cancel = CancellationFlag::new();
        let solver: SolverSlot = Arc::new(Mutex::new(None));

        let worker = Worker {
            id,
            points,
            config,
            factory,
            cancel: cancel.clone(),
            solver: Arc::clone(&solver),
            sender: self.sender.clone(),
        };
        std::thread::Builder::new()
            .name("tourview-solve".to_string())
            .spawn(move || worker.run())
            .map_err(|e| SolveError::WorkerSpawn {
                reason: e.to_string(),
            })?;

        debug!(task = %id, "Solve started");
        self.active = Some(ActiveTask { id, cancel, solver });
        Ok(id)
    }

    /// Cancel the active task. Returns `false` when nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(task) = self.active.take() else {
            return false;
        };

        task.cancel.cancel();
        let solver = task.solver.lock().take();
        if let Some(solver) = solver {
            solver.stop();
        }

        info!(task = %task.id, "Solve cancelled");
        self.state = TaskState::Cancelled;
        self.local.push_back(TaskEvent {
            task: task.id,
            notification: TaskNotification::Cancelled,
        });
        true
    }

    /// Take every notification available now, in order, without blocking.
    pub fn drain(&mut self) -> Vec<TaskEvent> {
        let mut events: Vec<TaskEvent> = self.local.drain(..).collect();
        while let Ok(event) = self.receiver.try_recv() {
            if self.accept(&event) {
                events.push(event);
            }
        }
        events
    }

    /// Wait up to `timeout` for the next notification.
    pub fn poll(&mut self, timeout: Duration) -> Option<TaskEvent> {
        if let Some(event) = self.local.pop_front() {
            return Some(event);
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) => {
                    if self.accept(&event) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    /// Apply a worker event to the state machine; `false` drops it.
    fn accept(&mut self, event: &TaskEvent) -> bool {
        let Some(task) = &self.active else {
            return false;
        };
        if task.id != event.task {
            return false;
        }

        if let Some(next) = event.notification.state() {
            debug!(task = %event.task, from = %self.state, to = %next, "Task state changed");
            self.state = next;
            if next.is_terminal() {
                self.active = None;
            }
        }
        true
    }
}

impl Default for TaskOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskOrchestrator {
    fn drop(&mut self) {
        if let Some(task) = self.active.take() {
            task.cancel.cancel();
            if let Some(solver) = task.solver.lock().take() {
                solver.stop();
            }
        }
    }
}

/// Everything the worker thread owns for one task
struct Worker {
    id: TaskId,
    points: PointSet,
    config: SolverConfig,
    factory: Arc<dyn SolverFactory>,
    cancel: CancellationFlag,
    solver: SolverSlot,
    sender: Sender<TaskEvent>,
}

impl Worker {
    fn run(self) {
        self.send(TaskNotification::Initializing);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.solve()));
        self.solver.lock().take();

        let notification = match outcome {
            Ok(Ok(solution)) => {
                debug!(task = %self.id, length = solution.tour_length, "Solve succeeded");
                TaskNotification::Succeeded(solution)
            }
            Ok(Err(SolveError::Cancelled)) => TaskNotification::Cancelled,
            Ok(Err(e)) => {
                error!(task = %self.id, error = %e, "Solve failed");
                TaskNotification::Failed(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(task = %self.id, %message, "Solver panicked");
                TaskNotification::Failed(SolveError::WorkerPanicked { message })
            }
        };
        self.send(notification);
    }

    fn solve(&self) -> Result<Solution, SolveError> {
        let data = DerivedData::build(&self.points, &self.config, &self.cancel)?;
        self.cancel.checkpoint()?;

        let solver = self.factory.create(&self.config)?;
        *self.solver.lock() = Some(Arc::clone(&solver));
        // a cancel that ran before registration found no solver to stop
        self.cancel.checkpoint()?;

        self.send(TaskNotification::Running);

        let sender = self.sender.clone();
        let task = self.id;
        let ctx = SolveContext::new(self.cancel.clone(), move |message, fraction| {
            let _ = sender.send(TaskEvent {
                task,
                notification: TaskNotification::Progress { message, fraction },
            });
        });
        solver.solve(&data, &self.config, &ctx)
    }

    fn send(&self, notification: TaskNotification) {
        // the orchestrator may be gone; nothing left to tell
        let _ = self.sender.send(TaskEvent {
            task: self.id,
            notification,
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
