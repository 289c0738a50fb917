use tempfile::TempDir;
use tourview_core::{Point, PointSet, Tour};
use tourview_settings::RenderSettings;
use tourview_visualizer::{
    draw_solved, draw_unsolved, save_png, CoordinateProjector, DrawingSurface, MapGeometry,
    PixmapSurface,
};

fn triangle() -> PointSet {
    PointSet::new(vec![
        Point::new(1, 100.0, 100.0),
        Point::new(2, 300.0, 100.0),
        Point::new(3, 200.0, 250.0),
    ])
}

#[test]
fn test_unsolved_markers_reach_the_pixmap() {
    let settings = RenderSettings::default();
    let mut surface = PixmapSurface::new(200, 150, &settings).unwrap();
    let points = triangle();
    let geometry = MapGeometry::new(
        &points,
        &surface.viewport().unwrap(),
        &CoordinateProjector::new(settings.min_draw_size),
    )
    .unwrap();

    draw_unsolved(&mut surface, &geometry, &points, 4.0);

    // (200, 250) is the bottom-centre corner of the box
    assert_eq!(surface.pixel(99, 148), Some([0, 0, 0, 255]));
    assert_eq!(surface.pixel(50, 75), Some([255, 255, 255, 255]));
}

#[test]
fn test_save_png_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("solved.png");

    let settings = RenderSettings::default();
    let mut surface = PixmapSurface::new(120, 90, &settings).unwrap();
    let points = triangle();
    let geometry = MapGeometry::new(
        &points,
        &surface.viewport().unwrap(),
        &CoordinateProjector::default(),
    )
    .unwrap();
    draw_solved(&mut surface, &geometry, &points, &Tour::new(vec![0, 1, 2, 0])).unwrap();

    save_png(&surface, &path).unwrap();

    let loaded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(loaded.dimensions(), (120, 90));
    assert_eq!(loaded, surface.to_rgb_image());
}

#[test]
fn test_save_png_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let surface = PixmapSurface::new(10, 10, &RenderSettings::default()).unwrap();
    assert!(save_png(&surface, &dir.path().join("missing").join("out.png")).is_err());
}
