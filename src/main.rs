use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use tourview::{
    init_logging, FileProblemLoader, PixmapSurface, SessionError, SettingsPersistence, TaskState,
    ViewerSession, BUILD_DATE, VERSION,
};
use tourview_settings::AlgorithmType;
use tracing::{error, info, warn};

/// Draw a TSPLIB problem, solve it and draw the tour.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// TSPLIB problem file.
    file: PathBuf,

    /// Drawing area width in pixels. Defaults to the configured size.
    #[arg(long)]
    width: Option<u32>,

    /// Drawing area height in pixels. Defaults to the configured size.
    #[arg(long)]
    height: Option<u32>,

    /// Solver: "nn" for nearest neighbour or "2opt".
    #[arg(long, value_name = "NAME")]
    algorithm: Option<AlgorithmType>,

    /// Length of each node's candidate list.
    #[arg(long, value_name = "N")]
    nn_factor: Option<String>,

    /// Upper bound on 2-opt improvement passes.
    #[arg(long, value_name = "N")]
    max_iterations: Option<String>,

    /// Zero-based index of the first node of the tour.
    #[arg(long, value_name = "INDEX")]
    start_index: Option<String>,

    /// Stop improving after this many seconds.
    #[arg(long, value_name = "SECS")]
    time_limit: Option<String>,

    /// Save the unsolved map as PNG.
    #[arg(long, value_name = "PATH")]
    unsolved_image: Option<PathBuf>,

    /// Save the solved map as PNG.
    #[arg(long, value_name = "PATH")]
    solved_image: Option<PathBuf>,

    /// Save the solution as text.
    #[arg(long, value_name = "PATH")]
    solution: Option<PathBuf>,

    /// Cancel the solve if it is still running after this many seconds.
    #[arg(long, value_name = "SECS")]
    cancel_after: Option<f64>,

    /// Settings file (.toml or .json). Defaults to the user config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Args::parse();
    info!(version = VERSION, built = BUILD_DATE, "Starting TourView");

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => SettingsPersistence::default_path()?,
    };
    let mut settings = SettingsPersistence::load_or_default(config_path);
    let config = settings.config().clone();

    let width = args.width.unwrap_or(config.ui.viewport_width);
    let height = args.height.unwrap_or(config.ui.viewport_height);
    let surface = PixmapSurface::new(width, height, &config.render)?;
    let mut session = ViewerSession::new(surface, &config);

    if !session
        .open_problem(&FileProblemLoader::new(&args.file))
        .map_err(reported)?
    {
        bail!("no problem selected");
    }
    if let Some(info) = session.info() {
        println!("{} ({} nodes)", info.name, info.dimension);
        if !info.comment.is_empty() {
            println!("{}", info.comment);
        }
    }

    settings.config_mut().add_recent_file(args.file.clone());
    if let Err(e) = settings.save() {
        warn!(error = %e, "Could not save settings");
    }

    if let Some(path) = &args.unsolved_image {
        session
            .save_image(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }

    let mut raw = session.default_parameters().map_err(reported)?;
    if let Some(algorithm) = args.algorithm {
        raw.algorithm = algorithm;
    }
    if let Some(value) = args.nn_factor {
        raw.nearest_neighbour_factor = value;
    }
    if let Some(value) = args.max_iterations {
        raw.max_iterations = value;
    }
    if let Some(value) = args.start_index {
        raw.start_index = value;
    }
    if let Some(value) = args.time_limit {
        raw.time_limit_secs = value;
    }

    let cancel_after = args
        .cancel_after
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("--cancel-after must be a non-negative number of seconds")?;
    let poll_interval = Duration::from_millis(config.ui.poll_interval_ms);

    session.solve(&raw).map_err(reported)?;
    let started = Instant::now();
    while session.is_solving() {
        if cancel_after.is_some_and(|limit| started.elapsed() >= limit) {
            session.cancel_solve();
            break;
        }
        session.wait(poll_interval).map_err(reported)?;
    }

    match session.solve_state() {
        TaskState::Succeeded => {
            if let Some(info) = session.info() {
                if let Some(length) = info.solution_length {
                    println!("Tour length: {length}");
                }
            }
            if let Some(path) = &args.solution {
                session
                    .save_solution(path)
                    .with_context(|| format!("saving {}", path.display()))?;
            }
            if let Some(path) = &args.solved_image {
                session
                    .save_image(path)
                    .with_context(|| format!("saving {}", path.display()))?;
            }
        }
        TaskState::Cancelled => println!("Solve cancelled"),
        TaskState::Failed => {
            let message = session.progress().last_error().unwrap_or("Failed to solve");
            bail!("{message}");
        }
        state => bail!("solve ended in unexpected state {state}"),
    }

    Ok(())
}

/// Log a session error by kind before it ends the run.
fn reported(e: SessionError) -> anyhow::Error {
    if e.is_defect() {
        error!(error = %e, "Internal error, please report it");
    } else if e.is_input_error() {
        warn!(error = %e, "Rejected input");
    }
    e.into()
}
