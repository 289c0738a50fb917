//! # TourView UI
//!
//! The presentation side of the viewer: a [`ViewerSession`] owns the drawing
//! surface, the current problem and solution, and the solve orchestrator,
//! and a [`ProgressSurface`] mirrors the state of the running solve.

pub mod error;
pub mod file_ops;
pub mod progress;
pub mod session;

pub use error::SessionError;
pub use file_ops::{format_comment, save_solution, FileProblemLoader, ProblemLoader};
pub use progress::ProgressSurface;
pub use session::{ProblemInfo, ViewerSession};
