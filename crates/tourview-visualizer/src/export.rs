//! Image export

use std::path::Path;

use image::ImageFormat;
use thiserror::Error;
use tracing::info;

use crate::surface::PixmapSurface;

/// Errors raised while writing an image
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Save the surface contents as a PNG file.
pub fn save_png(surface: &PixmapSurface, path: &Path) -> Result<(), ExportError> {
    surface
        .to_rgb_image()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Image {
            path: path.display().to_string(),
            source,
        })?;
    info!(
        path = %path.display(),
        width = surface.pixel_width(),
        height = surface.pixel_height(),
        "Saved image"
    );
    Ok(())
}
