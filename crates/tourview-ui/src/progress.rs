//! Progress surface
//!
//! A passive view of the running solve. It only changes when the session
//! hands it a [`TaskEvent`]; it never talks to the orchestrator itself.

use tourview_solver::{TaskEvent, TaskId, TaskNotification, TaskState};
use tracing::debug;

pub const INITIALIZING_TEXT: &str = "Initializing data...";
pub const SOLVING_TEXT: &str = "Solving problem...";

/// What a progress dialog would show for the current solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSurface {
    visible: bool,
    text: String,
    detail: Option<String>,
    fraction: Option<f64>,
    task: Option<TaskId>,
    state: TaskState,
    last_error: Option<String>,
}

impl ProgressSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Latest solver progress message, if any
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Completed fraction; `None` shows an indeterminate bar
    pub fn fraction(&self) -> Option<f64> {
        self.fraction
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    /// Message of the last failed solve, until the next one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The cancel button is only offered while a solve is in flight.
    pub fn can_cancel(&self) -> bool {
        self.visible && self.state.is_in_flight()
    }

    /// Update from one orchestrator notification.
    pub fn apply(&mut self, event: &TaskEvent) {
        match &event.notification {
            TaskNotification::Initializing => {
                self.show(event.task, INITIALIZING_TEXT);
                self.last_error = None;
            }
            TaskNotification::Running => self.show(event.task, SOLVING_TEXT),
            TaskNotification::Progress { message, fraction } => {
                if self.task != Some(event.task) {
                    return;
                }
                self.detail = Some(message.clone());
                self.fraction = *fraction;
            }
            TaskNotification::Succeeded(_) | TaskNotification::Cancelled => self.hide(),
            TaskNotification::Failed(e) => {
                self.hide();
                self.last_error = Some(format!("Failed to solve: {e}"));
            }
        }
        if let Some(state) = event.notification.state() {
            self.state = state;
        }
        debug!(task = %event.task, state = %self.state, visible = self.visible, "Progress surface updated");
    }

    fn show(&mut self, task: TaskId, text: &str) {
        if self.task != Some(task) {
            self.detail = None;
            self.fraction = None;
        }
        self.visible = true;
        self.task = Some(task);
        self.text = text.to_string();
    }

    fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
        self.detail = None;
        self.fraction = None;
    }
}
