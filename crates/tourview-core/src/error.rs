//! Error handling for TourView
//!
//! Provides error types for all layers of the application:
//! - Geometry errors (bounding box and projection)
//! - Problem errors (loading and parsing problem files)
//! - Render errors (tour/point consistency)
//! - Solve errors (task orchestration and solver failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised while deriving a bounding box or a viewport transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The point set has no points, so no bounding box exists
    #[error("Cannot compute bounds of an empty point set")]
    EmptyDomain,

    /// Viewport dimensions must both be strictly positive
    #[error("Invalid viewport {width}x{height}: dimensions must be > 0")]
    InvalidViewport {
        /// The requested width.
        width: f64,
        /// The requested height.
        height: f64,
    },

    /// A point carries a NaN or infinite coordinate
    #[error("Point {id} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The id of the offending point.
        id: usize,
    },

    /// The points span more than a finite `f64` can hold on some axis
    #[error("Point coordinates span an unrepresentable range ({width} x {height})")]
    UnboundedRange {
        /// Horizontal extent.
        width: f64,
        /// Vertical extent.
        height: f64,
    },

    /// The affine transform has a zero scale and cannot be inverted.
    ///
    /// The degenerate-range guard makes this unreachable for valid input;
    /// seeing it means the projector itself is broken.
    #[error("Transform is not invertible (scale {scale_x} x {scale_y})")]
    NonInvertibleTransform {
        /// Horizontal scale factor.
        scale_x: f64,
        /// Vertical scale factor.
        scale_y: f64,
    },
}

/// Problem file error type
///
/// Represents errors related to reading and parsing problem files.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// The file could not be read
    #[error("Can't read problem file {path}: {reason}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// Invalid syntax on a specific line
    #[error("Invalid syntax at line {line_number}: {reason}")]
    InvalidSyntax {
        /// The line number where the error occurred.
        line_number: usize,
        /// The reason for the syntax error.
        reason: String,
    },

    /// The problem has no node coordinates and can't be displayed
    #[error("Problem {name} has no node coordinates and can't be displayed")]
    MissingCoordinates {
        /// The problem name.
        name: String,
    },

    /// Declared dimension does not match the number of coordinates read
    #[error("Dimension mismatch: header declares {declared}, found {found} nodes")]
    DimensionMismatch {
        /// Value of the DIMENSION header.
        declared: usize,
        /// Number of coordinate rows.
        found: usize,
    },

    /// Two coordinate rows share one id
    #[error("Duplicate node id {id} at line {line_number}")]
    DuplicateNode {
        /// The duplicated id.
        id: usize,
        /// Line of the second occurrence.
        line_number: usize,
    },
}

/// Render error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A tour entry does not resolve to any point id
    #[error("Tour position {position} references index {index}, which matches no point id")]
    UnknownTourIndex {
        /// Position inside the tour.
        position: usize,
        /// The zero-based index found there.
        index: usize,
    },
}

/// Solve error type
///
/// Represents errors raised by the task orchestrator or by a solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// A solve is already initializing or running on this orchestrator
    #[error("A solve is already in progress")]
    AlreadyRunning,

    /// The solve observed the cancellation flag and stopped early
    #[error("Solve cancelled")]
    Cancelled,

    /// The solver reported a failure
    #[error("Solver failed: {message}")]
    Solver {
        /// The failure message.
        message: String,
    },

    /// The solver panicked on the worker thread
    #[error("Solver panicked: {message}")]
    WorkerPanicked {
        /// The panic payload, when it was a string.
        message: String,
    },

    /// The worker thread could not be started
    #[error("Failed to spawn solve worker: {reason}")]
    WorkerSpawn {
        /// The OS error text.
        reason: String,
    },
}

impl SolveError {
    /// Create a solver failure from a message
    pub fn solver(message: impl Into<String>) -> Self {
        SolveError::Solver {
            message: message.into(),
        }
    }
}

/// Main error type for TourView
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Problem file error
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Solve error
    #[error(transparent)]
    Solve(#[from] SolveError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is a user input error (bad file or empty data)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Problem(_)
                | Error::Io(_)
                | Error::Geometry(GeometryError::EmptyDomain)
                | Error::Geometry(GeometryError::InvalidViewport { .. })
                | Error::Geometry(GeometryError::NonFiniteCoordinate { .. })
                | Error::Geometry(GeometryError::UnboundedRange { .. })
        )
    }

    /// Check if this error is a defect in the application rather than bad input
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Error::Geometry(GeometryError::NonInvertibleTransform { .. }) | Error::Render(_)
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GeometryError::EmptyDomain.to_string(),
            "Cannot compute bounds of an empty point set"
        );
        assert_eq!(
            RenderError::UnknownTourIndex {
                position: 3,
                index: 41
            }
            .to_string(),
            "Tour position 3 references index 41, which matches no point id"
        );
        assert_eq!(SolveError::solver("boom").to_string(), "Solver failed: boom");
    }

    #[test]
    fn test_error_classification() {
        let err: Error = GeometryError::EmptyDomain.into();
        assert!(err.is_input_error());
        assert!(!err.is_defect());

        let err: Error = GeometryError::NonInvertibleTransform {
            scale_x: 0.0,
            scale_y: 1.0,
        }
        .into();
        assert!(err.is_defect());
        assert!(!err.is_input_error());

        let err: Error = GeometryError::UnboundedRange {
            width: f64::INFINITY,
            height: 1.0,
        }
        .into();
        assert!(err.is_input_error());

        let err: Error = SolveError::AlreadyRunning.into();
        assert!(!err.is_defect());
        assert!(!err.is_input_error());
    }
}
