//! Session errors

use thiserror::Error;
use tourview_core::{Error as CoreError, GeometryError, ProblemError, RenderError, SolveError};
use tourview_settings::ParameterError;
use tourview_visualizer::ExportError;

/// Errors surfaced by [`crate::ViewerSession`] operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No problem is loaded")]
    NoProblem,

    #[error("No solution to save")]
    NoSolution,

    #[error("Invalid solver parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<GeometryError> for SessionError {
    fn from(e: GeometryError) -> Self {
        SessionError::Core(e.into())
    }
}

impl From<ProblemError> for SessionError {
    fn from(e: ProblemError) -> Self {
        SessionError::Core(e.into())
    }
}

impl From<RenderError> for SessionError {
    fn from(e: RenderError) -> Self {
        SessionError::Core(e.into())
    }
}

impl From<SolveError> for SessionError {
    fn from(e: SolveError) -> Self {
        SessionError::Core(e.into())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Core(e.into())
    }
}

impl SessionError {
    /// Whether the error was caused by what the user supplied: a bad file,
    /// an empty point set or malformed parameters
    pub fn is_input_error(&self) -> bool {
        match self {
            SessionError::Parameters(_) => true,
            SessionError::Core(e) => e.is_input_error(),
            _ => false,
        }
    }

    /// Whether the error reflects an application defect rather than bad input
    pub fn is_defect(&self) -> bool {
        matches!(self, SessionError::Core(e) if e.is_defect())
    }
}
