use qmaze::{Cell, MazeGraph, TrainOutcome};
use serde::Serialize;

/// Machine-readable summary of one run, printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rows: usize,
    pub cols: usize,
    pub seed: u64,
    pub start: Cell,
    pub goal: Cell,
    pub outcome: &'static str,
    pub epochs: usize,
    pub trained: bool,
    pub path: Vec<Cell>,
    pub reached_goal: bool,
    /// True when the learned path is the maze's unique start-to-goal path.
    pub shortest: bool,
}

impl Report {
    pub fn new(
        maze: &MazeGraph,
        seed: u64,
        start: Cell,
        goal: Cell,
        outcome: &TrainOutcome,
    ) -> Self {
        let (rows, cols) = maze.dimensions();
        let path = maze.path().map(<[Cell]>::to_vec).unwrap_or_default();
        let reached_goal = path.last() == Some(&goal);
        let shortest = reached_goal && path == maze.tree_path(start, goal);

        Self {
            rows,
            cols,
            seed,
            start,
            goal,
            outcome: outcome_name(outcome),
            epochs: outcome.epochs(),
            trained: outcome.is_converged(),
            path,
            reached_goal,
            shortest,
        }
    }
}

pub fn outcome_name(outcome: &TrainOutcome) -> &'static str {
    match outcome {
        TrainOutcome::NotReady => "not_ready",
        TrainOutcome::Converged { .. } => "converged",
        TrainOutcome::EpochLimit { .. } => "epoch_limit",
        TrainOutcome::Cancelled { .. } => "cancelled",
    }
}
