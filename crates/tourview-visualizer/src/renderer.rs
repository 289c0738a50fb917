//! Point and tour renderers
//!
//! Both renderers take the same [`MapGeometry`]: the bounds and transform
//! computed once for the current point set and viewport. They only touch the
//! surface.

use tourview_core::{GeometryError, Point, PointSet, RenderError, Tour};
use tracing::trace;

use crate::surface::DrawingSurface;
use crate::viewport::{BoundingBox, CoordinateProjector, Transform, Viewport};

/// Geometry shared by the unsolved and solved renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGeometry {
    bounds: BoundingBox,
    transform: Transform,
}

impl MapGeometry {
    /// Project `points` onto `viewport`.
    pub fn new(
        points: &PointSet,
        viewport: &Viewport,
        projector: &CoordinateProjector,
    ) -> Result<Self, GeometryError> {
        let bounds = BoundingBox::compute(points)?;
        let transform = projector.build_transform(&bounds, viewport)?;
        Ok(Self { bounds, transform })
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// Draw every point as a square marker, in point set order.
///
/// `marker_size_px` is the marker edge in viewport pixels; it is scaled into
/// problem units so markers look the same for any coordinate magnitude.
pub fn draw_unsolved<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    geometry: &MapGeometry,
    points: &PointSet,
    marker_size_px: f64,
) {
    let transform = geometry.transform();
    let width = marker_size_px * transform.scale_x();
    let height = marker_size_px * transform.scale_y();

    clean(surface);
    surface.set_transform(transform.installed());
    for point in points {
        surface.fill_rect(point.x - width / 2.0, point.y - height / 2.0, width, height);
    }
    trace!(points = points.len(), "Drew unsolved map");
}

/// Draw the tour as an open polyline through its points, in tour order.
///
/// Every tour index is resolved before the surface is touched; an index that
/// matches no point id leaves the surface unchanged and returns an error.
pub fn draw_solved<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    geometry: &MapGeometry,
    points: &PointSet,
    tour: &Tour,
) -> Result<(), RenderError> {
    let path = resolve_tour(points, tour)?;
    let transform = geometry.transform();

    clean(surface);
    surface.set_transform(transform.installed());
    surface.set_stroke_width(transform.scale_x().max(transform.scale_y()));
    for pair in path.windows(2) {
        surface.stroke_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y);
    }
    trace!(segments = path.len().saturating_sub(1), "Drew solved map");
    Ok(())
}

/// Drop the previous map's transform and clear the whole surface.
fn clean<S: DrawingSurface + ?Sized>(surface: &mut S) {
    surface.reset_transform();
    surface.clear();
}

fn resolve_tour<'a>(points: &'a PointSet, tour: &Tour) -> Result<Vec<&'a Point>, RenderError> {
    tour.indices()
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            points
                .resolve(index)
                .ok_or(RenderError::UnknownTourIndex { position, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn square() -> PointSet {
        PointSet::new(vec![
            Point::new(1, 0.0, 0.0),
            Point::new(2, 10.0, 0.0),
            Point::new(3, 10.0, 10.0),
            Point::new(4, 0.0, 10.0),
        ])
    }

    fn geometry(points: &PointSet) -> MapGeometry {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        MapGeometry::new(points, &viewport, &CoordinateProjector::default()).unwrap()
    }

    #[test]
    fn test_unsolved_draws_one_marker_per_point() {
        let points = square();
        let geometry = geometry(&points);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        draw_unsolved(&mut surface, &geometry, &points, 2.0);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::ResetTransform);
        assert_eq!(commands[1], DrawCommand::Clear);
        assert_eq!(
            commands[2],
            DrawCommand::SetTransform(geometry.transform().installed())
        );
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::FillRect { .. })),
            4
        );
        match commands[3] {
            DrawCommand::FillRect { width, height, .. } => {
                assert!((width - 0.025).abs() < 1e-12);
                assert!((height - 2.0 * 10.0 / 600.0).abs() < 1e-12);
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_solved_draws_open_path() {
        let points = square();
        let geometry = geometry(&points);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let tour = Tour::new(vec![0, 1, 2, 3]);
        draw_solved(&mut surface, &geometry, &points, &tour).unwrap();

        assert_eq!(
            surface.commands()[3],
            DrawCommand::SetStrokeWidth(10.0 / 600.0)
        );
        let lines: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::StrokeLine { x0, y0, x1, y1 } => Some((x0, y0, x1, y1)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                (0.0, 0.0, 10.0, 0.0),
                (10.0, 0.0, 10.0, 10.0),
                (10.0, 10.0, 0.0, 10.0)
            ]
        );
    }

    #[test]
    fn test_solved_trivial_tour_only_clears() {
        let points = square();
        let geometry = geometry(&points);
        for tour in [Tour::new(vec![]), Tour::new(vec![2])] {
            let mut surface = RecordingSurface::new(800.0, 600.0);
            draw_solved(&mut surface, &geometry, &points, &tour).unwrap();
            assert_eq!(
                &surface.commands()[..2],
                &[DrawCommand::ResetTransform, DrawCommand::Clear]
            );
            assert_eq!(
                surface.count(|c| matches!(c, DrawCommand::StrokeLine { .. })),
                0
            );
        }
    }

    #[test]
    fn test_unknown_index_fails_before_drawing() {
        let points = square();
        let geometry = geometry(&points);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let tour = Tour::new(vec![0, 1, 7, 3]);

        assert_eq!(
            draw_solved(&mut surface, &geometry, &points, &tour),
            Err(RenderError::UnknownTourIndex {
                position: 2,
                index: 7
            })
        );
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_resolves_by_id_not_position() {
        let points = PointSet::new(vec![Point::new(2, 5.0, 5.0), Point::new(1, 1.0, 1.0)]);
        let geometry = geometry(&points);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        draw_solved(&mut surface, &geometry, &points, &Tour::new(vec![0, 1])).unwrap();
        assert_eq!(
            surface.commands().last(),
            Some(&DrawCommand::StrokeLine {
                x0: 1.0,
                y0: 1.0,
                x1: 5.0,
                y1: 5.0
            })
        );
    }
}
