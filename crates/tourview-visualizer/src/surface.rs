//! Drawing surfaces.
//!
//! Renderers talk to a [`DrawingSurface`]: a small primitive set (clear,
//! filled rectangle, stroked line) plus an installable transform and stroke
//! width. Coordinates passed to primitives are in the space of the installed
//! transform; stroke widths are in that space too.
//!
//! [`PixmapSurface`] rasterizes with tiny-skia. [`RecordingSurface`] keeps the
//! command stream, for headless inspection.

use image::{Rgb, RgbImage};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke};
use tourview_core::GeometryError;
use tourview_settings::{RenderSettings, Rgba};

use crate::viewport::{Affine, Viewport};

/// Primitive drawing contract consumed by the renderers.
pub trait DrawingSurface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Current drawing area as a validated viewport.
    fn viewport(&self) -> Result<Viewport, GeometryError> {
        Viewport::new(self.width(), self.height())
    }

    /// Replace the backing store with one of a new size. Contents are lost.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), GeometryError>;

    /// Fill the whole surface with the background colour.
    fn clear(&mut self);

    fn set_transform(&mut self, transform: Affine);
    fn reset_transform(&mut self);
    fn set_stroke_width(&mut self, width: f64);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64);
}

fn to_color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, GeometryError> {
    Pixmap::new(width, height).ok_or(GeometryError::InvalidViewport {
        width: width as f64,
        height: height as f64,
    })
}

/// Raster surface backed by a tiny-skia pixmap.
///
/// Primitives are mapped to pixel space before rasterizing so that a
/// non-uniform transform does not distort stroke thickness.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Affine,
    stroke_width: f64,
    background: Color,
    foreground: Color,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32, settings: &RenderSettings) -> Result<Self, GeometryError> {
        let mut surface = Self {
            pixmap: new_pixmap(width, height)?,
            transform: Affine::IDENTITY,
            stroke_width: 1.0,
            background: to_color(settings.background),
            foreground: to_color(settings.foreground),
        };
        surface.clear();
        Ok(surface)
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixmap.height()
    }

    /// RGBA of the pixel at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Copy the surface into an RGB image, dropping alpha.
    ///
    /// Pixels are demultiplied first so a translucent background keeps its
    /// colour instead of darkening.
    pub fn to_rgb_image(&self) -> RgbImage {
        let width = self.pixmap.width();
        let pixels = self.pixmap.pixels();
        RgbImage::from_fn(width, self.pixmap.height(), |x, y| {
            let color = pixels[(y * width + x) as usize].demultiply();
            Rgb([color.red(), color.green(), color.blue()])
        })
    }

    fn paint(&self, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.foreground);
        paint.anti_alias = anti_alias;
        paint
    }
}

impl DrawingSurface for PixmapSurface {
    fn width(&self) -> f64 {
        self.pixmap.width() as f64
    }

    fn height(&self) -> f64 {
        self.pixmap.height() as f64
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), GeometryError> {
        self.pixmap = new_pixmap(width, height)?;
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.fill(self.background);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0) = self.transform.apply(x, y);
        let (x1, y1) = self.transform.apply(x + width, y + height);
        let left = x0.min(x1) as f32;
        let top = y0.min(y1) as f32;
        // never thinner than one pixel
        let right = (x0.max(x1) as f32).max(left + 1.0);
        let bottom = (y0.max(y1) as f32).max(top + 1.0);

        if let Some(rect) = Rect::from_ltrb(left, top, right, bottom) {
            let paint = self.paint(false);
            self.pixmap
                .fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
        }
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let (px0, py0) = self.transform.apply(x0, y0);
        let (px1, py1) = self.transform.apply(x1, y1);

        let (sx, sy) = self.transform.apply_len(1.0, 1.0);
        let width_px = (self.stroke_width * sx.abs().min(sy.abs())).max(1.0) as f32;

        let mut pb = PathBuilder::new();
        pb.move_to(px0 as f32, py0 as f32);
        pb.line_to(px1 as f32, py1 as f32);
        if let Some(path) = pb.finish() {
            let paint = self.paint(true);
            let stroke = Stroke {
                width: width_px,
                ..Default::default()
            };
            self.pixmap.stroke_path(
                &path,
                &paint,
                &stroke,
                tiny_skia::Transform::identity(),
                None,
            );
        }
    }
}

/// One primitive call captured by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    SetTransform(Affine),
    ResetTransform,
    SetStrokeWidth(f64),
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    StrokeLine {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
}

/// Surface that records primitives instead of drawing them.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidViewport {
                width: width as f64,
                height: height as f64,
            });
        }
        self.width = width as f64;
        self.height = height as f64;
        self.commands.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn reset_transform(&mut self) {
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::SetStrokeWidth(width));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.commands
            .push(DrawCommand::StrokeLine { x0, y0, x1, y1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixmap_rejects_zero_size() {
        assert!(PixmapSurface::new(0, 10, &RenderSettings::default()).is_err());
    }

    #[test]
    fn test_clear_fills_background() {
        let surface = PixmapSurface::new(4, 3, &RenderSettings::default()).unwrap();
        assert_eq!(surface.pixel(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_rect_uses_transform() {
        let mut surface = PixmapSurface::new(20, 20, &RenderSettings::default()).unwrap();
        surface.set_transform(Affine::scale_then_translate(10.0, 10.0, 0.0, 0.0));
        surface.fill_rect(1.0, 1.0, 0.4, 0.4);
        assert_eq!(surface.pixel(12, 12), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_stroke_line_draws_pixels() {
        let mut surface = PixmapSurface::new(20, 20, &RenderSettings::default()).unwrap();
        surface.set_stroke_width(2.0);
        surface.stroke_line(0.0, 10.0, 20.0, 10.0);
        let [r, _, _, _] = surface.pixel(10, 10).unwrap();
        assert!(r < 128);
        assert_eq!(surface.pixel(10, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_rgb_image_matches_size() {
        let surface = PixmapSurface::new(7, 5, &RenderSettings::default()).unwrap();
        let image = surface.to_rgb_image();
        assert_eq!(image.dimensions(), (7, 5));
        assert_eq!(image.get_pixel(6, 4), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_rgb_image_of_translucent_background() {
        let settings = RenderSettings {
            background: Rgba {
                r: 200,
                g: 100,
                b: 50,
                a: 128,
            },
            ..RenderSettings::default()
        };
        let surface = PixmapSurface::new(3, 3, &settings).unwrap();
        let Rgb([r, g, b]) = *surface.to_rgb_image().get_pixel(1, 1);
        assert!(r.abs_diff(200) <= 1, "red {r}");
        assert!(g.abs_diff(100) <= 1, "green {g}");
        assert!(b.abs_diff(50) <= 1, "blue {b}");
    }

    #[test]
    fn test_recording_surface_resize() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.clear();
        surface.resize(30, 40).unwrap();
        assert!(surface.commands().is_empty());
        assert_eq!(surface.viewport().unwrap().width(), 30.0);
        assert!(surface.resize(0, 1).is_err());
    }
}
