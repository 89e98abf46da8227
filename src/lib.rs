//! Perfect-maze generation and a tabular Q-learning maze solver.
//!
//! - [`maze`]: spanning-tree mazes over rectangular grids
//! - [`qlearning`]: random-walk Q-learning and greedy path extraction
//! - [`config`]: training and maze parameters
//! - [`error`]: structural and configuration errors

#[path = "core/config.rs"]
pub mod config;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/maze.rs"]
pub mod maze;

#[path = "core/qlearning.rs"]
pub mod qlearning;

pub use config::{MazeConfig, TrainingConfig};
pub use error::{MazeError, SolverError};
pub use maze::{Cell, MazeGraph};
pub use qlearning::{QLearningSolver, SolverStatus, TrainOutcome, MAX_STATES};
