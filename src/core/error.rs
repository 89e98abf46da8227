// Error types for the maze and solver cores.
//
// "Not ready" conditions (no goal, untrained solver) are not errors; they are
// reported through `SolverStatus` / `TrainOutcome` / empty paths instead.

use crate::maze::Cell;

/// Structural errors raised while building or editing a maze.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("maze dimensions must be positive (got {rows}x{cols})")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("cell {cell} is outside a {rows}x{cols} maze")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },

    #[error("cell {0} cannot be connected to itself")]
    SelfLoop(Cell),

    #[error("cells {0} and {1} are not grid neighbors and cannot be connected")]
    NotAdjacent(Cell, Cell),

    #[error("edge set is not a spanning tree: {edges} edges over {cells} cells, {reached} reachable from the root")]
    NotSpanningTree {
        edges: usize,
        cells: usize,
        reached: usize,
    },
}

/// Errors raised by the Q-learning solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    #[error("maze has {states} cells; the solver tables support at most {max}")]
    TooLarge { states: usize, max: usize },
}
