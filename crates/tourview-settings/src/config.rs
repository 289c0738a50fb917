//! Configuration and settings management for TourView
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - UI preferences (viewport size, poll interval, recent files)
//! - Render settings (marker size, colors, degenerate-range size)
//! - Solver defaults (algorithm and parameter form prefill)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};
use crate::parameters::{AlgorithmType, SolverConfig};

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Drawing area width in pixels
    pub viewport_width: u32,
    /// Drawing area height in pixels
    pub viewport_height: u32,
    /// Problem comments are wrapped at this many characters
    pub comment_wrap_width: usize,
    /// How often the presentation loop drains task notifications
    pub poll_interval_ms: u64,
    /// Number of recent files to keep
    pub max_recent_files: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            comment_wrap_width: 40,
            poll_interval_ms: 50,
            max_recent_files: 10,
        }
    }
}

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Settings for drawing points and tours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Range substituted for an axis whose points all share one coordinate
    pub min_draw_size: f64,
    /// Point marker edge length in device pixels
    pub marker_size_px: f64,
    pub background: Rgba,
    pub foreground: Rgba,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            min_draw_size: 5.0,
            marker_size_px: 2.0,
            background: Rgba::WHITE,
            foreground: Rgba::BLACK,
        }
    }
}

/// Defaults used to prefill the solver parameter form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverDefaults {
    pub algorithm: AlgorithmType,
    /// Fixed candidate list length; `None` sizes it from the problem
    pub nearest_neighbour_factor: Option<usize>,
    pub max_iterations: u32,
    pub time_limit_secs: Option<f64>,
}

impl Default for SolverDefaults {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmType::default(),
            nearest_neighbour_factor: None,
            max_iterations: 1000,
            time_limit_secs: None,
        }
    }
}

impl SolverDefaults {
    /// Solver configuration for a problem of `dimension` nodes
    pub fn config_for(&self, dimension: usize) -> SolverConfig {
        let mut config = SolverConfig::defaults_for(self.algorithm, dimension);
        if let Some(factor) = self.nearest_neighbour_factor {
            config.nearest_neighbour_factor = factor;
        }
        config.max_iterations = self.max_iterations;
        config.time_limit = self
            .time_limit_secs
            .and_then(|secs| std::time::Duration::try_from_secs_f64(secs).ok());
        config
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// UI preferences
    pub ui: UiSettings,
    /// Point and tour drawing
    pub render: RenderSettings,
    /// Solver parameter defaults
    pub solver: SolverDefaults,
    /// Recent files list
    pub recent_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui.viewport_width == 0 {
            return Err(ConfigError::out_of_range(
                "ui.viewport_width",
                self.ui.viewport_width,
            ));
        }
        if self.ui.viewport_height == 0 {
            return Err(ConfigError::out_of_range(
                "ui.viewport_height",
                self.ui.viewport_height,
            ));
        }
        if self.ui.comment_wrap_width == 0 {
            return Err(ConfigError::out_of_range(
                "ui.comment_wrap_width",
                self.ui.comment_wrap_width,
            ));
        }
        if self.ui.poll_interval_ms == 0 {
            return Err(ConfigError::out_of_range(
                "ui.poll_interval_ms",
                self.ui.poll_interval_ms,
            ));
        }

        if !(self.render.min_draw_size.is_finite() && self.render.min_draw_size > 0.0) {
            return Err(ConfigError::out_of_range(
                "render.min_draw_size",
                self.render.min_draw_size,
            ));
        }
        if !(self.render.marker_size_px.is_finite() && self.render.marker_size_px > 0.0) {
            return Err(ConfigError::out_of_range(
                "render.marker_size_px",
                self.render.marker_size_px,
            ));
        }

        if self.solver.nearest_neighbour_factor == Some(0) {
            return Err(ConfigError::out_of_range(
                "solver.nearest_neighbour_factor",
                0,
            ));
        }
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::out_of_range("solver.max_iterations", 0));
        }
        if let Some(secs) = self.solver.time_limit_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::out_of_range("solver.time_limit_secs", secs));
            }
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.ui.max_recent_files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ui.viewport_width, 800);
        assert_eq!(config.render.min_draw_size, 5.0);
    }

    #[test]
    fn test_validate_rejects_zero_viewport() {
        let mut config = Config::default();
        config.ui.viewport_height = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange {
                key: "ui.viewport_height".to_string(),
                value: "0".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_render_sizes() {
        let mut config = Config::default();
        config.render.min_draw_size = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.marker_size_px = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recent_files_dedupe_and_truncate() {
        let mut config = Config::default();
        config.ui.max_recent_files = 2;
        config.add_recent_file(PathBuf::from("a.tsp"));
        config.add_recent_file(PathBuf::from("b.tsp"));
        config.add_recent_file(PathBuf::from("a.tsp"));
        config.add_recent_file(PathBuf::from("c.tsp"));
        assert_eq!(
            config.recent_files,
            vec![PathBuf::from("c.tsp"), PathBuf::from("a.tsp")]
        );
    }

    #[test]
    fn test_solver_defaults_config_for() {
        let defaults = SolverDefaults {
            algorithm: AlgorithmType::NearestNeighbour,
            nearest_neighbour_factor: Some(7),
            max_iterations: 12,
            time_limit_secs: Some(2.0),
        };
        let config = defaults.config_for(100);
        assert_eq!(config.algorithm, AlgorithmType::NearestNeighbour);
        assert_eq!(config.nearest_neighbour_factor, 7);
        assert_eq!(config.max_iterations, 12);
        assert_eq!(config.time_limit, Some(Duration::from_secs(2)));

        let sized = SolverDefaults::default().config_for(10);
        assert_eq!(sized.nearest_neighbour_factor, 9);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[ui]\nviewport_width = 1024\n").unwrap();
        assert_eq!(config.ui.viewport_width, 1024);
        assert_eq!(config.ui.viewport_height, 600);
        assert_eq!(config.render, RenderSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        assert_eq!(
            format_of(Path::new("settings.yaml")),
            Err(ConfigError::UnsupportedFormat("yaml".to_string()))
        );
        assert!(format_of(Path::new("settings")).is_err());
    }
}
