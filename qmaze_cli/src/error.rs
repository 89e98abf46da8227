use std::path::PathBuf;

use qmaze::{MazeError, SolverError};

/// Everything the shell can report back to the user.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("maze is not generated; generate a maze first")]
    MazeNotGenerated,

    #[error("a {rows}x{cols} maze is too large; at most {max} cells are supported")]
    MazeTooLarge { rows: usize, cols: usize, max: usize },

    #[error("end point not specified; pass --goal ROW,COL")]
    GoalNotSet,

    #[error("start point not specified; pass --start ROW,COL")]
    StartNotSet,

    #[error("agent not trained; train the agent before running it")]
    NotTrained,

    #[error(transparent)]
    Maze(#[from] MazeError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("training task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
