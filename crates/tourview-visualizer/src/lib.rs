//! # TourView Visualizer
//!
//! Projects problem-space point sets onto a fixed-size viewport and draws
//! them, either as unconnected markers or as a solved tour.
//!
//! The projection lives in [`viewport`], the drawing contract and its two
//! surfaces in [`surface`], and the renderers in [`renderer`].

pub mod export;
pub mod renderer;
pub mod surface;
pub mod viewport;

pub use export::{save_png, ExportError};
pub use renderer::{draw_solved, draw_unsolved, MapGeometry};
pub use surface::{DrawCommand, DrawingSurface, PixmapSurface, RecordingSurface};
pub use viewport::{Affine, BoundingBox, CoordinateProjector, Transform, Viewport};
