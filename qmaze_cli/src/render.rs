//! Text rendering of a maze with its markers.
//!
//! ```text
//! +---+---+
//! | S   * |
//! +---+   +
//! |     G |
//! +---+---+
//! ```

use std::collections::HashSet;

use qmaze::{Cell, MazeGraph};

const GOAL: &str = " G ";
const START: &str = " S ";
const SELECTED: &str = " # ";
const PATH: &str = " * ";
const EMPTY: &str = "   ";

fn mark(maze: &MazeGraph, on_path: &HashSet<Cell>, cell: Cell) -> &'static str {
    // Later markers cover earlier ones: path, selection, start, goal.
    if maze.end() == Some(cell) {
        GOAL
    } else if maze.start() == Some(cell) {
        START
    } else if maze.selected() == Some(cell) {
        SELECTED
    } else if on_path.contains(&cell) {
        PATH
    } else {
        EMPTY
    }
}

pub fn render(maze: &MazeGraph) -> String {
    let (rows, cols) = maze.dimensions();
    let on_path: HashSet<Cell> = maze
        .path()
        .map(|p| p.iter().copied().collect())
        .unwrap_or_default();

    let mut out = String::with_capacity((2 * rows + 1) * (4 * cols + 2));
    for _ in 0..cols {
        out.push_str("+---");
    }
    out.push_str("+\n");

    for row in 0..rows {
        out.push('|');
        for col in 0..cols {
            let cell = Cell::new(row, col);
            out.push_str(mark(maze, &on_path, cell));
            let open = col + 1 < cols && maze.is_connected(cell, Cell::new(row, col + 1));
            out.push(if open { ' ' } else { '|' });
        }
        out.push('\n');

        for col in 0..cols {
            let cell = Cell::new(row, col);
            let open = row + 1 < rows && maze.is_connected(cell, Cell::new(row + 1, col));
            out.push('+');
            out.push_str(if open { EMPTY } else { "---" });
        }
        out.push_str("+\n");
    }

    out
}
