//! One maze plus one agent, driven the way an interactive front end would:
//! generate, pick endpoints, train, run.

use std::sync::atomic::AtomicBool;

use qmaze::{Cell, MazeGraph, QLearningSolver, TrainOutcome, TrainingConfig, MAX_STATES};
use rand::Rng;
use tracing::info;

use crate::error::CliError;

#[derive(Debug, Default)]
pub struct Session {
    maze: Option<MazeGraph>,
    solver: QLearningSolver,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maze(&self) -> Option<&MazeGraph> {
        self.maze.as_ref()
    }

    pub fn solver(&self) -> &QLearningSolver {
        &self.solver
    }

    /// Carve a new maze and start a fresh agent for it.
    ///
    /// Mazes with more than [`MAX_STATES`] cells are refused up front, since
    /// the agent could not be built for them.
    pub fn generate_maze<R: Rng + ?Sized>(
        &mut self,
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<&MazeGraph, CliError> {
        if rows.checked_mul(cols).map_or(true, |cells| cells > MAX_STATES) {
            return Err(CliError::MazeTooLarge {
                rows,
                cols,
                max: MAX_STATES,
            });
        }

        let maze = MazeGraph::generate(rows, cols, rng)?;
        info!("Generated {}x{} maze", rows, cols);
        self.maze = Some(maze);
        self.reset_agent()?;
        self.maze.as_ref().ok_or(CliError::MazeNotGenerated)
    }

    fn maze_mut(&mut self) -> Result<&mut MazeGraph, CliError> {
        self.maze.as_mut().ok_or(CliError::MazeNotGenerated)
    }

    /// Moving the start keeps what the agent learned.
    pub fn set_start(&mut self, cell: Cell) -> Result<(), CliError> {
        let maze = self.maze_mut()?;
        maze.set_start(cell)?;
        maze.set_path(None);
        Ok(())
    }

    /// Moving the goal invalidates the agent.
    pub fn set_end(&mut self, cell: Cell) -> Result<(), CliError> {
        let maze = self.maze_mut()?;
        maze.set_end(cell)?;
        maze.set_path(None);
        self.reset_agent()
    }

    /// Throw away the agent and build a new one for the current maze.
    pub fn reset_agent(&mut self) -> Result<(), CliError> {
        self.solver = QLearningSolver::new();
        self.solver.initialize(self.maze.as_ref())?;
        Ok(())
    }

    pub fn train<R: Rng + ?Sized>(
        &mut self,
        config: &TrainingConfig,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<TrainOutcome, CliError> {
        config.validate()?;
        let maze = self.maze.as_ref().ok_or(CliError::MazeNotGenerated)?;
        if maze.end().is_none() {
            return Err(CliError::GoalNotSet);
        }

        Ok(self.solver.train_with_cancel(config, rng, cancel)?)
    }

    /// Solve from the maze's start cell and cache the path on the maze.
    pub fn run_agent(&mut self) -> Result<&[Cell], CliError> {
        if !self.solver.is_trained() {
            return Err(CliError::NotTrained);
        }
        let maze = self.maze.as_mut().ok_or(CliError::MazeNotGenerated)?;
        let start = maze.start().ok_or(CliError::StartNotSet)?;

        let path = self.solver.solve(start);
        maze.set_path(Some(path));
        Ok(maze.path().unwrap_or(&[]))
    }
}
