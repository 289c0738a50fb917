//! # TourView
//!
//! A viewer for travelling salesman point sets and their computed tours.
//!
//! ## Architecture
//!
//! TourView is organized as a workspace with multiple crates:
//!
//! 1. **tourview-core** - Points, tours, problems, TSPLIB reader, errors
//! 2. **tourview-settings** - Configuration, solver parameters, persistence
//! 3. **tourview-visualizer** - Projection onto the viewport and map rendering
//! 4. **tourview-solver** - Built-in solvers and the solve task orchestrator
//! 5. **tourview-ui** - Viewer session, progress surface, file operations
//! 6. **tourview** - Main binary that integrates all crates

pub use tourview_core::{Error, Point, PointSet, Problem, Result, Solution, Tour};
pub use tourview_settings::{Config, RawParameters, SettingsPersistence, SolverConfig};
pub use tourview_solver::{TaskOrchestrator, TaskState};
pub use tourview_ui::{FileProblemLoader, ProgressSurface, SessionError, ViewerSession};
pub use tourview_visualizer::{CoordinateProjector, PixmapSurface};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, with thread names and line numbers
/// - RUST_LOG environment variable support, INFO otherwise
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    // Windows release builds log to a file next to the executable
    #[cfg(all(target_os = "windows", not(debug_assertions)))]
    {
        use std::fs::OpenOptions;

        let log_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::path::PathBuf::from("."));

        let log_file = log_dir.join("tourview.log");

        match OpenOptions::new().create(true).append(true).open(&log_file) {
            Ok(file) => {
                let fmt_layer = fmt::layer()
                    .with_writer(file)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty();

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .try_init()?;
            }
            Err(_) => {
                tracing_subscriber::registry().with(env_filter).try_init()?;
            }
        }
    }

    #[cfg(not(all(target_os = "windows", not(debug_assertions))))]
    {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
