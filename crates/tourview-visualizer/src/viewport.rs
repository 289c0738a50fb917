//! Bounding box and coordinate projection.
//!
//! Handles conversion between problem space (the coordinates stored in the
//! problem file, arbitrary magnitude and origin) and viewport space (pixels of
//! the drawing surface, (0,0) at top-left).
//!
//! The projector builds a viewport-to-problem mapping and installs its
//! inverse, so renderers issue primitives in problem coordinates and the
//! surface maps them to pixels:
//!
//! ```text
//! problem_x = view_x * scale_x + min_x
//! view_x    = (problem_x - min_x) / scale_x
//! ```

use std::fmt;

use tourview_core::{GeometryError, PointSet};
use tracing::debug;

/// Only axes whose minimum exceeds this value have the minimum subtracted
/// when computing the origin shift.
const ORIGIN_SHIFT_THRESHOLD: f64 = 1.0;

/// Axis-aligned bounds of a point set in problem space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Computes the bounds in a single pass.
    ///
    /// Fails with `EmptyDomain` for an empty set, with
    /// `NonFiniteCoordinate` if any point carries NaN or infinity, and with
    /// `UnboundedRange` if the extent along an axis overflows.
    pub fn compute(points: &PointSet) -> Result<Self, GeometryError> {
        let mut iter = points.iter();
        let first = iter.next().ok_or(GeometryError::EmptyDomain)?;
        if !first.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate { id: first.id });
        }

        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for point in iter {
            if !point.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { id: point.id });
            }
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_y = bounds.max_y.max(point.y);
        }
        if !(bounds.width().is_finite() && bounds.height().is_finite()) {
            return Err(GeometryError::UnboundedRange {
                width: bounds.width(),
                height: bounds.height(),
            });
        }
        Ok(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Size of the drawing area in pixels. Both dimensions are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GeometryError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Axis-aligned affine map: `(x, y) -> (x * scale_x + translate_x, y * scale_y + translate_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Translate by `(tx, ty)` after scaling by `(sx, sy)`.
    pub fn scale_then_translate(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
            translate_x: tx,
            translate_y: ty,
        }
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale_x + self.translate_x,
            y * self.scale_y + self.translate_y,
        )
    }

    /// Maps a length along each axis (no translation).
    #[inline]
    pub fn apply_len(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.scale_x, dy * self.scale_y)
    }

    pub fn is_invertible(&self) -> bool {
        self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.scale_x != 0.0
            && self.scale_y != 0.0
            && (1.0 / self.scale_x).is_finite()
            && (1.0 / self.scale_y).is_finite()
    }

    pub fn inverse(&self) -> Result<Affine, GeometryError> {
        if !self.is_invertible() {
            return Err(GeometryError::NonInvertibleTransform {
                scale_x: self.scale_x,
                scale_y: self.scale_y,
            });
        }
        let sx = 1.0 / self.scale_x;
        let sy = 1.0 / self.scale_y;
        Ok(Affine {
            scale_x: sx,
            scale_y: sy,
            translate_x: -self.translate_x * sx,
            translate_y: -self.translate_y * sy,
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Immutable projection between problem space and viewport space.
///
/// Built once per (point set, viewport) pair by [`CoordinateProjector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// viewport -> problem
    forward: Affine,
    /// problem -> viewport, the map surfaces install
    inverse: Affine,
    origin_shift: (f64, f64),
}

impl Transform {
    /// Problem units per viewport pixel along x.
    pub fn scale_x(&self) -> f64 {
        self.forward.scale_x
    }

    /// Problem units per viewport pixel along y.
    pub fn scale_y(&self) -> f64 {
        self.forward.scale_y
    }

    /// Amount subtracted from each axis before scaling. Zero for an axis
    /// whose minimum is at or below 1.0.
    pub fn origin_shift(&self) -> (f64, f64) {
        self.origin_shift
    }

    /// The viewport-to-problem map as constructed.
    pub fn forward(&self) -> Affine {
        self.forward
    }

    /// The problem-to-viewport map that renderers install on a surface.
    pub fn installed(&self) -> Affine {
        self.inverse
    }

    pub fn to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
        self.inverse.apply(x, y)
    }

    pub fn to_problem(&self, view_x: f64, view_y: f64) -> (f64, f64) {
        self.forward.apply(view_x, view_y)
    }
}

/// Builds transforms that fit a bounding box into a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateProjector {
    min_draw_size: f64,
}

impl CoordinateProjector {
    /// `min_draw_size` is the range substituted for an axis with no extent.
    pub fn new(min_draw_size: f64) -> Self {
        Self { min_draw_size }
    }

    pub fn min_draw_size(&self) -> f64 {
        self.min_draw_size
    }

    pub fn build_transform(
        &self,
        bounds: &BoundingBox,
        viewport: &Viewport,
    ) -> Result<Transform, GeometryError> {
        let (shift_x, min_x, scale_x) = self.axis(bounds.min_x, bounds.max_x, viewport.width());
        let (shift_y, min_y, scale_y) = self.axis(bounds.min_y, bounds.max_y, viewport.height());

        // translate(shift + shifted_min) composed with scale
        let forward =
            Affine::scale_then_translate(scale_x, scale_y, shift_x + min_x, shift_y + min_y);
        let inverse = forward.inverse()?;

        debug!(
            bounds = %bounds,
            width = viewport.width(),
            height = viewport.height(),
            scale_x,
            scale_y,
            "Built viewport transform"
        );

        Ok(Transform {
            forward,
            inverse,
            origin_shift: (shift_x, shift_y),
        })
    }

    /// Returns `(shift, shifted_min, scale)` for one axis.
    ///
    /// A range too small to give an invertible scale is treated like a zero
    /// range and replaced by `min_draw_size`.
    fn axis(&self, min: f64, max: f64, extent: f64) -> (f64, f64, f64) {
        let shift = if min > ORIGIN_SHIFT_THRESHOLD { min } else { 0.0 };
        let shifted_min = min - shift;
        let shifted_max = max - shift;
        let scale = (shifted_max - shifted_min) / extent;
        if usable_scale(scale) {
            (shift, shifted_min, scale)
        } else {
            (shift, shifted_min, self.min_draw_size / extent)
        }
    }
}

fn usable_scale(scale: f64) -> bool {
    scale.is_normal() && scale > 0.0 && (1.0 / scale).is_finite()
}

impl Default for CoordinateProjector {
    fn default() -> Self {
        Self::new(5.0)
    }
}
