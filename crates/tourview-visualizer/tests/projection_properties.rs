//! Property tests for the viewport projection

use proptest::prelude::*;
use tourview_core::{GeometryError, Point, PointSet};
use tourview_visualizer::{BoundingBox, CoordinateProjector, Viewport};

fn point_sets() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop_oneof![
        prop::collection::vec((-1.0e6..1.0e6f64, -1.0e6..1.0e6f64), 1..64),
        prop::collection::vec((0.0..2.0f64, 0.0..2.0f64), 1..16),
        // extents too small for an invertible scale
        prop::collection::vec((0.0..1.0e-306f64, 0.0..1.0e-306f64), 1..16),
        // one axis collapsed
        (0.0..1.0e4f64, prop::collection::vec(-1.0e4..1.0e4f64, 1..16))
            .prop_map(|(x, ys)| ys.into_iter().map(|y| (x, y)).collect()),
    ]
}

fn to_point_set(coords: &[(f64, f64)]) -> PointSet {
    PointSet::new(
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(i + 1, x, y))
            .collect(),
    )
}

proptest! {
    #[test]
    fn projection_round_trips(
        coords in point_sets(),
        width in 1.0..4000.0f64,
        height in 1.0..4000.0f64,
    ) {
        let points = to_point_set(&coords);
        let bounds = BoundingBox::compute(&points).unwrap();
        let viewport = Viewport::new(width, height).unwrap();
        let transform = CoordinateProjector::default()
            .build_transform(&bounds, &viewport)
            .unwrap();

        prop_assert!(transform.scale_x() > 0.0);
        prop_assert!(transform.scale_y() > 0.0);

        for point in &points {
            let (vx, vy) = transform.to_viewport(point.x, point.y);
            let (px, py) = transform.to_problem(vx, vy);
            let tol_x = 1e-9 * (1.0 + point.x.abs() + bounds.width());
            let tol_y = 1e-9 * (1.0 + point.y.abs() + bounds.height());
            prop_assert!((px - point.x).abs() <= tol_x, "x {} -> {} -> {}", point.x, vx, px);
            prop_assert!((py - point.y).abs() <= tol_y, "y {} -> {} -> {}", point.y, vy, py);
        }
    }

    #[test]
    fn projected_points_stay_inside_viewport(
        coords in point_sets(),
        width in 1.0..4000.0f64,
        height in 1.0..4000.0f64,
    ) {
        let points = to_point_set(&coords);
        let bounds = BoundingBox::compute(&points).unwrap();
        let viewport = Viewport::new(width, height).unwrap();
        let transform = CoordinateProjector::default()
            .build_transform(&bounds, &viewport)
            .unwrap();

        for point in &points {
            let (vx, vy) = transform.to_viewport(point.x, point.y);
            prop_assert!(vx >= -1e-6 && vx <= width * (1.0 + 1e-9) + 1e-6);
            prop_assert!(vy >= -1e-6 && vy <= height * (1.0 + 1e-9) + 1e-6);
        }
    }

    #[test]
    fn bounding_box_contains_every_point(coords in point_sets()) {
        let points = to_point_set(&coords);
        let bounds = BoundingBox::compute(&points).unwrap();
        prop_assert!(bounds.min_x <= bounds.max_x);
        prop_assert!(bounds.min_y <= bounds.max_y);
        for point in &points {
            prop_assert!(point.x >= bounds.min_x && point.x <= bounds.max_x);
            prop_assert!(point.y >= bounds.min_y && point.y <= bounds.max_y);
        }
    }

    #[test]
    fn overflowing_extent_is_rejected(
        left in 1.0e308..f64::MAX,
        right in 1.0e308..f64::MAX,
        y in -1.0e4..1.0e4f64,
    ) {
        let points = to_point_set(&[(-left, y), (right, y)]);
        let result = BoundingBox::compute(&points);
        prop_assert!(
            matches!(result, Err(GeometryError::UnboundedRange { .. })),
            "{:?}",
            result
        );
    }
}
