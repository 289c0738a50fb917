//! # TourView Core
//!
//! Core types and errors for TourView.
//! Provides the point/tour data model shared by the projection, rendering
//! and solving crates, plus the TSPLIB coordinate reader.

pub mod data;
pub mod error;

pub use data::{
    tsplib::{parse_tsplib, read_tsplib},
    Point, PointSet, Problem, Solution, Tour,
};

pub use error::{Error, GeometryError, ProblemError, RenderError, Result, SolveError};
