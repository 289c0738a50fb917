//! Viewer session
//!
//! The controller of the presentation context. It owns the drawing surface,
//! the loaded problem and its projection, the last solution and the solve
//! orchestrator. Every method runs on the presentation thread; solve
//! notifications reach it only through [`ViewerSession::pump`] or
//! [`ViewerSession::wait`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tourview_core::{Problem, Solution};
use tourview_settings::{Config, RawParameters, RenderSettings, SolverConfig, SolverDefaults};
use tourview_solver::{
    BuiltinSolverFactory, SolverFactory, TaskEvent, TaskId, TaskNotification, TaskOrchestrator,
    TaskState,
};
use tourview_visualizer::{
    draw_solved, draw_unsolved, save_png, CoordinateProjector, DrawingSurface, MapGeometry,
    PixmapSurface,
};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::file_ops::{self, format_comment, ProblemLoader};
use crate::progress::ProgressSurface;

/// Summary shown next to the map
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInfo {
    pub name: String,
    pub dimension: usize,
    /// Comment wrapped for display
    pub comment: String,
    /// Length of the displayed tour, once solved
    pub solution_length: Option<f64>,
}

pub struct ViewerSession<S: DrawingSurface> {
    surface: S,
    projector: CoordinateProjector,
    render: RenderSettings,
    comment_wrap_width: usize,
    solver_defaults: SolverDefaults,
    orchestrator: TaskOrchestrator,
    factory: Arc<dyn SolverFactory>,
    progress: ProgressSurface,
    problem: Option<Problem>,
    geometry: Option<MapGeometry>,
    solution: Option<Solution>,
    info: Option<ProblemInfo>,
}

impl<S: DrawingSurface> ViewerSession<S> {
    pub fn new(surface: S, config: &Config) -> Self {
        Self {
            surface,
            projector: CoordinateProjector::new(config.render.min_draw_size),
            render: config.render.clone(),
            comment_wrap_width: config.ui.comment_wrap_width,
            solver_defaults: config.solver.clone(),
            orchestrator: TaskOrchestrator::new(),
            factory: Arc::new(BuiltinSolverFactory),
            progress: ProgressSurface::new(),
            problem: None,
            geometry: None,
            solution: None,
            info: None,
        }
    }

    /// Use `factory` instead of the built-in solvers.
    pub fn with_factory(mut self, factory: Arc<dyn SolverFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn progress(&self) -> &ProgressSurface {
        &self.progress
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn geometry(&self) -> Option<&MapGeometry> {
        self.geometry.as_ref()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn info(&self) -> Option<&ProblemInfo> {
        self.info.as_ref()
    }

    pub fn solve_state(&self) -> TaskState {
        self.orchestrator.state()
    }

    pub fn is_solving(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// Load a problem and show it unsolved.
    ///
    /// Returns `false` when the loader had nothing selected; the current view
    /// is left alone. A load or projection error also leaves it alone.
    pub fn open_problem(&mut self, loader: &dyn ProblemLoader) -> Result<bool, SessionError> {
        let Some(problem) = loader.load()? else {
            debug!("No problem selected");
            return Ok(false);
        };
        let geometry = MapGeometry::new(&problem.points, &self.surface.viewport()?, &self.projector)?;

        if self.orchestrator.is_busy() {
            info!("Cancelling running solve for new problem");
            self.cancel_solve();
        }

        draw_unsolved(
            &mut self.surface,
            &geometry,
            &problem.points,
            self.render.marker_size_px,
        );
        info!(
            name = %problem.name,
            nodes = problem.dimension(),
            bounds = %geometry.bounds(),
            "Opened problem"
        );

        self.info = Some(ProblemInfo {
            name: problem.name.clone(),
            dimension: problem.dimension(),
            comment: format_comment(&problem.comment, self.comment_wrap_width),
            solution_length: None,
        });
        self.geometry = Some(geometry);
        self.solution = None;
        self.problem = Some(problem);
        Ok(true)
    }

    /// Resize the drawing area and redraw what is shown.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        self.surface.resize(width, height)?;
        self.redraw()
    }

    /// Rebuild the projection for the current surface size and draw the
    /// current problem, solved if a solution is present.
    pub fn redraw(&mut self) -> Result<(), SessionError> {
        let Some(problem) = &self.problem else {
            self.surface.clear();
            return Ok(());
        };
        let geometry = MapGeometry::new(&problem.points, &self.surface.viewport()?, &self.projector)?;
        match &self.solution {
            Some(solution) => {
                draw_solved(&mut self.surface, &geometry, &problem.points, &solution.tour)?
            }
            None => draw_unsolved(
                &mut self.surface,
                &geometry,
                &problem.points,
                self.render.marker_size_px,
            ),
        }
        self.geometry = Some(geometry);
        Ok(())
    }

    /// Parameter form prefill for the loaded problem
    pub fn default_parameters(&self) -> Result<RawParameters, SessionError> {
        let problem = self.problem.as_ref().ok_or(SessionError::NoProblem)?;
        Ok(self.solver_defaults.config_for(problem.dimension()).to_raw())
    }

    /// Validate `raw` and start solving the loaded problem.
    pub fn solve(&mut self, raw: &RawParameters) -> Result<TaskId, SessionError> {
        let config = SolverConfig::from_raw(raw)?;
        self.solve_with_config(config)
    }

    pub fn solve_with_config(&mut self, config: SolverConfig) -> Result<TaskId, SessionError> {
        let problem = self.problem.as_ref().ok_or(SessionError::NoProblem)?;
        let task = self.orchestrator.start(
            problem.points.clone(),
            config,
            Arc::clone(&self.factory),
        )?;
        info!(task = %task, name = %problem.name, "Solving problem");
        Ok(task)
    }

    /// Cancel the running solve. The progress surface is dismissed at once.
    pub fn cancel_solve(&mut self) -> bool {
        if !self.orchestrator.cancel() {
            return false;
        }
        for event in self.orchestrator.drain() {
            self.progress.apply(&event);
        }
        true
    }

    /// Handle every notification available now.
    pub fn pump(&mut self) -> Result<Vec<TaskEvent>, SessionError> {
        let events = self.orchestrator.drain();
        for event in &events {
            self.handle(event)?;
        }
        Ok(events)
    }

    /// Wait up to `timeout` for one notification and handle it.
    pub fn wait(&mut self, timeout: Duration) -> Result<Option<TaskEvent>, SessionError> {
        let Some(event) = self.orchestrator.poll(timeout) else {
            return Ok(None);
        };
        self.handle(&event)?;
        Ok(Some(event))
    }

    fn handle(&mut self, event: &TaskEvent) -> Result<(), SessionError> {
        self.progress.apply(event);
        match &event.notification {
            TaskNotification::Succeeded(solution) => self.show_solution(solution.clone())?,
            TaskNotification::Failed(e) => warn!(task = %event.task, error = %e, "Solve failed"),
            _ => {}
        }
        Ok(())
    }

    fn show_solution(&mut self, solution: Solution) -> Result<(), SessionError> {
        let (Some(problem), Some(geometry)) = (&self.problem, &self.geometry) else {
            return Err(SessionError::NoProblem);
        };
        draw_solved(&mut self.surface, geometry, &problem.points, &solution.tour)?;
        info!(length = solution.tour_length, "Solution displayed");
        if let Some(info) = &mut self.info {
            info.solution_length = Some(solution.tour_length);
        }
        self.solution = Some(solution);
        Ok(())
    }

    /// Write the displayed solution as text.
    pub fn save_solution(&self, path: &Path) -> Result<(), SessionError> {
        let problem = self.problem.as_ref().ok_or(SessionError::NoProblem)?;
        let solution = self.solution.as_ref().ok_or(SessionError::NoSolution)?;
        file_ops::save_solution(path, problem, solution)?;
        Ok(())
    }
}

impl ViewerSession<PixmapSurface> {
    /// Save the map as currently drawn.
    pub fn save_image(&self, path: &Path) -> Result<(), SessionError> {
        save_png(&self.surface, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourview_core::{Point, PointSet, ProblemError};
    use tourview_visualizer::{DrawCommand, RecordingSurface};

    struct Fixed(Option<Problem>);

    impl ProblemLoader for Fixed {
        fn load(&self) -> Result<Option<Problem>, ProblemError> {
            Ok(self.0.clone())
        }
    }

    fn square() -> Problem {
        Problem::new(
            "square",
            "four corners of a square",
            PointSet::new(vec![
                Point::new(1, 0.0, 0.0),
                Point::new(2, 10.0, 0.0),
                Point::new(3, 10.0, 10.0),
                Point::new(4, 0.0, 10.0),
            ]),
        )
    }

    fn session() -> ViewerSession<RecordingSurface> {
        ViewerSession::new(RecordingSurface::new(800.0, 600.0), &Config::default())
    }

    #[test]
    fn test_open_draws_unsolved_and_fills_info() {
        let mut session = session();
        assert!(session.open_problem(&Fixed(Some(square()))).unwrap());

        let fills = session
            .surface()
            .count(|c| matches!(c, DrawCommand::FillRect { .. }));
        assert_eq!(fills, 4);

        let info = session.info().unwrap();
        assert_eq!(info.name, "square");
        assert_eq!(info.dimension, 4);
        assert_eq!(info.solution_length, None);
        assert!(session.solution().is_none());
    }

    #[test]
    fn test_no_selection_keeps_view() {
        let mut session = session();
        session.open_problem(&Fixed(Some(square()))).unwrap();
        let before = session.surface().commands().len();

        assert!(!session.open_problem(&Fixed(None)).unwrap());
        assert_eq!(session.surface().commands().len(), before);
        assert_eq!(session.problem().unwrap().name, "square");
    }

    #[test]
    fn test_empty_problem_rejected_without_state_change() {
        let mut session = session();
        let empty = Problem::new("empty", "", PointSet::default());
        let err = session.open_problem(&Fixed(Some(empty))).unwrap_err();
        assert!(matches!(err, SessionError::Core(_)));
        assert!(!err.is_defect());
        assert!(session.problem().is_none());
        assert!(session.surface().commands().is_empty());
    }

    #[test]
    fn test_solve_without_problem() {
        let mut session = session();
        assert!(matches!(
            session.default_parameters(),
            Err(SessionError::NoProblem)
        ));
        let raw = RawParameters::default();
        assert!(session.solve(&raw).is_err());
    }

    #[test]
    fn test_resize_redraws_with_new_transform() {
        let mut session = session();
        session.open_problem(&Fixed(Some(square()))).unwrap();
        let before = *session.geometry().unwrap().transform();

        session.surface_mut().take_commands();
        session.resize(400, 300).unwrap();

        let after = *session.geometry().unwrap().transform();
        assert!((after.scale_x() - 2.0 * before.scale_x()).abs() < 1e-12);
        assert_eq!(
            &session.surface().commands()[..2],
            &[DrawCommand::ResetTransform, DrawCommand::Clear]
        );
        assert_eq!(
            session
                .surface()
                .count(|c| matches!(c, DrawCommand::FillRect { .. })),
            4
        );
    }
}
