//! TourView Settings Crate
//!
//! Handles application configuration, solver parameter validation and
//! settings persistence.

pub mod config;
pub mod error;
pub mod parameters;
pub mod persistence;

pub use config::{Config, RenderSettings, Rgba, SolverDefaults, UiSettings};
pub use error::{ConfigError, ParameterError, SettingsError, SettingsResult};
pub use parameters::{AlgorithmType, RawParameters, SolverConfig};
pub use persistence::SettingsPersistence;
