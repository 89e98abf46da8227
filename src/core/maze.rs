//! Perfect-maze generation over a 4-connected rectangular grid.
//!
//! A maze is stored as a spanning tree over the grid graph: an explicit edge
//! list (in carve order) plus an adjacency list indexed by state
//! `row * cols + col`. Every pair of cells is joined by exactly one simple
//! path along tree edges.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// A grid cell, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if `other` shares an edge with this cell in the grid graph.
    pub fn is_grid_neighbor(self, other: Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// Probe order for unvisited neighbors while carving: left, right, down, up.
const OFFSETS: [(isize, isize); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

#[derive(Debug, Clone)]
pub struct MazeGraph {
    rows: usize,
    cols: usize,
    /// Tree edges as (state, state), in the order they were added.
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
    start: Option<Cell>,
    end: Option<Cell>,
    selected: Option<Cell>,
    path: Option<Vec<Cell>>,
}

impl MazeGraph {
    fn empty(rows: usize, cols: usize) -> Result<Self, MazeError> {
        let cells = rows
            .checked_mul(cols)
            .filter(|&n| n > 0)
            .ok_or(MazeError::InvalidDimensions { rows, cols })?;

        Ok(Self {
            rows,
            cols,
            edges: Vec::with_capacity(cells - 1),
            adjacency: vec![Vec::new(); cells],
            start: None,
            end: None,
            selected: None,
            path: None,
        })
    }

    /// Carve a new `rows x cols` perfect maze with a randomized backtracker.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let mut maze = Self::empty(rows, cols)?;
        maze.carve(rng)?;
        Ok(maze)
    }

    /// Same as [`MazeGraph::generate`] with a `StdRng` seeded from `seed`.
    pub fn generate_seeded(rows: usize, cols: usize, seed: u64) -> Result<Self, MazeError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(rows, cols, &mut rng)
    }

    /// Replace this maze with a freshly carved one.
    ///
    /// Start, end, selection and cached path are cleared along with the old
    /// structure. On error the current maze is left untouched.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<(), MazeError> {
        *self = Self::generate(rows, cols, rng)?;
        Ok(())
    }

    /// Build a maze from an explicit list of tree edges.
    ///
    /// Every edge must join two in-bounds grid neighbors, and the full set
    /// must form a spanning tree of the grid.
    pub fn from_edges<I>(rows: usize, cols: usize, edges: I) -> Result<Self, MazeError>
    where
        I: IntoIterator<Item = (Cell, Cell)>,
    {
        let mut maze = Self::empty(rows, cols)?;
        for (a, b) in edges {
            maze.connect(a, b)?;
        }
        maze.verify_spanning_tree()?;
        Ok(maze)
    }

    fn carve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), MazeError> {
        let mut visited = vec![false; self.cell_count()];
        let mut current = Cell::new(0, 0);
        visited[0] = true;

        let mut stack = vec![current];
        let mut unvisited = self.cell_count() - 1;
        let mut candidates: Vec<Cell> = Vec::with_capacity(OFFSETS.len());

        while unvisited > 0 {
            candidates.clear();
            candidates.extend(
                self.grid_neighbors(current)
                    .filter(|&c| !visited[self.state_of(c)]),
            );

            if candidates.is_empty() {
                // Backtrack. The root stays reachable on the stack until every
                // cell has been visited.
                let Some(prev) = stack.pop() else {
                    break;
                };
                current = prev;
                continue;
            }

            let next = candidates[rng.gen_range(0..candidates.len())];
            self.connect(current, next)?;
            visited[self.state_of(next)] = true;
            stack.push(current);
            current = next;
            unvisited -= 1;
        }

        self.verify_spanning_tree()
    }

    /// Add a tree edge between two cells.
    fn connect(&mut self, a: Cell, b: Cell) -> Result<(), MazeError> {
        self.ensure_in_bounds(a)?;
        self.ensure_in_bounds(b)?;
        if a == b {
            return Err(MazeError::SelfLoop(a));
        }
        if !a.is_grid_neighbor(b) {
            return Err(MazeError::NotAdjacent(a, b));
        }

        let (sa, sb) = (self.state_of(a), self.state_of(b));
        self.edges.push((sa, sb));
        self.adjacency[sa].push(sb);
        self.adjacency[sb].push(sa);
        Ok(())
    }

    fn verify_spanning_tree(&self) -> Result<(), MazeError> {
        let cells = self.cell_count();
        let mut seen = vec![false; cells];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut reached = 1;

        while let Some(s) = queue.pop_front() {
            for &n in &self.adjacency[s] {
                if !seen[n] {
                    seen[n] = true;
                    reached += 1;
                    queue.push_back(n);
                }
            }
        }

        if self.edges.len() != cells - 1 || reached != cells {
            return Err(MazeError::NotSpanningTree {
                edges: self.edges.len(),
                cells,
                reached,
            });
        }
        Ok(())
    }

    fn grid_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let row = cell.row.checked_add_signed(dr)?;
            let col = cell.col.checked_add_signed(dc)?;
            (row < self.rows && col < self.cols).then_some(Cell::new(row, col))
        })
    }

    fn ensure_in_bounds(&self, cell: Cell) -> Result<(), MazeError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                cell,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Linear state index of an in-bounds cell.
    #[inline]
    pub fn state_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    #[inline]
    pub fn cell_of(&self, state: usize) -> Cell {
        Cell::new(state / self.cols, state % self.cols)
    }

    /// Tree edges as state pairs, in the order they were carved.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Tree edges as cell pairs.
    pub fn cell_adjacency(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| (self.cell_of(a), self.cell_of(b)))
    }

    /// States joined to `state` by a tree edge. Empty for unknown states.
    pub fn neighbor_states(&self, state: usize) -> &[usize] {
        self.adjacency.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cells joined to `cell` by a tree edge.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let states: &[usize] = if self.contains(cell) {
            self.neighbor_states(self.state_of(cell))
        } else {
            &[]
        };
        states.iter().map(|&s| self.cell_of(s))
    }

    /// True if there is no wall between `a` and `b`.
    pub fn is_connected(&self, a: Cell, b: Cell) -> bool {
        self.contains(a)
            && self.contains(b)
            && self.neighbor_states(self.state_of(a)).contains(&self.state_of(b))
    }

    /// The unique tree path from `from` to `to`, both ends included.
    ///
    /// Empty if either cell is out of bounds.
    pub fn tree_path(&self, from: Cell, to: Cell) -> Vec<Cell> {
        if !self.contains(from) || !self.contains(to) {
            return Vec::new();
        }

        let (src, dst) = (self.state_of(from), self.state_of(to));
        let mut parent: Vec<Option<usize>> = vec![None; self.cell_count()];
        parent[src] = Some(src);
        let mut queue = VecDeque::from([src]);

        while let Some(s) = queue.pop_front() {
            if s == dst {
                break;
            }
            for &n in &self.adjacency[s] {
                if parent[n].is_none() {
                    parent[n] = Some(s);
                    queue.push_back(n);
                }
            }
        }

        let mut path = vec![to];
        let mut s = dst;
        while s != src {
            match parent[s] {
                Some(p) => {
                    s = p;
                    path.push(self.cell_of(s));
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    pub fn set_start(&mut self, cell: Cell) -> Result<(), MazeError> {
        self.ensure_in_bounds(cell)?;
        self.start = Some(cell);
        Ok(())
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    pub fn set_end(&mut self, cell: Cell) -> Result<(), MazeError> {
        self.ensure_in_bounds(cell)?;
        self.end = Some(cell);
        Ok(())
    }

    pub fn end(&self) -> Option<Cell> {
        self.end
    }

    /// Forget both endpoints and the cached path.
    pub fn clear_endpoints(&mut self) {
        self.start = None;
        self.end = None;
        self.path = None;
    }

    pub fn select(&mut self, cell: Cell) -> Result<(), MazeError> {
        self.ensure_in_bounds(cell)?;
        self.selected = Some(cell);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Cache the last computed solution for display.
    pub fn set_path(&mut self, path: Option<Vec<Cell>>) {
        self.path = path;
    }

    pub fn path(&self) -> Option<&[Cell]> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Union-find over state indices, used to prove acyclicity.
    struct Uf {
        p: Vec<usize>,
    }

    impl Uf {
        fn new(n: usize) -> Self {
            Self { p: (0..n).collect() }
        }

        fn find(&mut self, x: usize) -> usize {
            if self.p[x] != x {
                let r = self.find(self.p[x]);
                self.p[x] = r;
            }
            self.p[x]
        }

        /// Returns false if `a` and `b` were already joined.
        fn unite(&mut self, a: usize, b: usize) -> bool {
            let (a, b) = (self.find(a), self.find(b));
            if a == b {
                return false;
            }
            self.p[b] = a;
            true
        }
    }

    fn assert_perfect(maze: &MazeGraph) {
        let n = maze.cell_count();
        assert_eq!(maze.edges().len(), n - 1);

        let mut uf = Uf::new(n);
        for &(a, b) in maze.edges() {
            assert!(maze.cell_of(a).is_grid_neighbor(maze.cell_of(b)));
            assert!(uf.unite(a, b), "cycle through {a} - {b}");
        }
        let root = uf.find(0);
        assert!((0..n).all(|s| uf.find(s) == root));
    }

    #[test]
    fn generated_mazes_are_spanning_trees() {
        for rows in 1..=6 {
            for cols in 1..=6 {
                for seed in 0..4 {
                    let maze = MazeGraph::generate_seeded(rows, cols, seed).unwrap();
                    assert_eq!(maze.dimensions(), (rows, cols));
                    assert_perfect(&maze);
                }
            }
        }

        let big = MazeGraph::generate_seeded(40, 25, 99).unwrap();
        assert_perfect(&big);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = MazeGraph::generate_seeded(9, 7, 123).unwrap();
        let b = MazeGraph::generate_seeded(9, 7, 123).unwrap();
        assert_eq!(a.edges(), b.edges());

        let c = MazeGraph::generate_seeded(9, 7, 124).unwrap();
        assert_ne!(a.edges(), c.edges());
    }

    #[test]
    fn single_cell_has_no_edges() {
        let maze = MazeGraph::generate_seeded(1, 1, 0).unwrap();
        assert!(maze.edges().is_empty());
        assert_eq!(maze.neighbors(Cell::new(0, 0)).count(), 0);
    }

    #[test]
    fn single_row_is_a_corridor() {
        let maze = MazeGraph::generate_seeded(1, 5, 3).unwrap();
        for col in 0..4 {
            assert!(maze.is_connected(Cell::new(0, col), Cell::new(0, col + 1)));
        }

        let maze = MazeGraph::generate_seeded(4, 1, 3).unwrap();
        for row in 0..3 {
            assert!(maze.is_connected(Cell::new(row, 0), Cell::new(row + 1, 0)));
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            MazeGraph::generate_seeded(0, 3, 1).unwrap_err(),
            MazeError::InvalidDimensions { rows: 0, cols: 3 }
        );
        assert!(MazeGraph::generate_seeded(3, 0, 1).is_err());
    }

    #[test]
    fn adjacency_is_symmetric() {
        let maze = MazeGraph::generate_seeded(5, 5, 8).unwrap();
        for s in 0..maze.cell_count() {
            for &n in maze.neighbor_states(s) {
                assert!(maze.neighbor_states(n).contains(&s));
            }
        }
        for (a, b) in maze.cell_adjacency() {
            assert!(maze.is_connected(a, b));
            assert!(maze.is_connected(b, a));
        }
    }

    #[test]
    fn from_edges_rejects_invalid_structure() {
        let c = Cell::new;

        assert_eq!(
            MazeGraph::from_edges(2, 2, [(c(0, 0), c(0, 0))]).unwrap_err(),
            MazeError::SelfLoop(c(0, 0))
        );
        assert_eq!(
            MazeGraph::from_edges(2, 2, [(c(0, 0), c(1, 1))]).unwrap_err(),
            MazeError::NotAdjacent(c(0, 0), c(1, 1))
        );
        assert!(matches!(
            MazeGraph::from_edges(2, 2, [(c(1, 1), c(2, 1))]),
            Err(MazeError::OutOfBounds { .. })
        ));

        // Too few edges.
        assert!(matches!(
            MazeGraph::from_edges(2, 2, [(c(0, 0), c(0, 1)), (c(0, 1), c(1, 1))]),
            Err(MazeError::NotSpanningTree { edges: 2, cells: 4, reached: 3 })
        ));

        // Right count, but a duplicated edge leaves (1, 0) unreachable.
        assert!(matches!(
            MazeGraph::from_edges(
                2,
                2,
                [
                    (c(0, 0), c(0, 1)),
                    (c(0, 1), c(1, 1)),
                    (c(1, 1), c(0, 1)),
                ]
            ),
            Err(MazeError::NotSpanningTree { reached: 3, .. })
        ));

        let ok = MazeGraph::from_edges(
            2,
            2,
            [(c(0, 0), c(0, 1)), (c(0, 1), c(1, 1)), (c(1, 1), c(1, 0))],
        )
        .unwrap();
        assert_perfect(&ok);
    }

    #[test]
    fn endpoints_are_bounds_checked() {
        let mut maze = MazeGraph::generate_seeded(3, 4, 1).unwrap();
        assert!(maze.set_start(Cell::new(3, 0)).is_err());
        assert!(maze.set_end(Cell::new(0, 4)).is_err());
        assert_eq!(maze.start(), None);
        assert_eq!(maze.end(), None);

        maze.set_start(Cell::new(2, 3)).unwrap();
        maze.set_end(Cell::new(0, 0)).unwrap();
        assert_eq!(maze.start(), Some(Cell::new(2, 3)));
        assert_eq!(maze.end(), Some(Cell::new(0, 0)));

        maze.set_path(Some(vec![Cell::new(2, 3)]));
        maze.clear_endpoints();
        assert_eq!(maze.start(), None);
        assert_eq!(maze.end(), None);
        assert!(maze.path().is_none());
    }

    #[test]
    fn regenerate_replaces_structure_and_markers() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut maze = MazeGraph::generate(3, 3, &mut rng).unwrap();
        maze.set_end(Cell::new(2, 2)).unwrap();
        maze.select(Cell::new(1, 1)).unwrap();

        maze.regenerate(4, 2, &mut rng).unwrap();
        assert_eq!(maze.dimensions(), (4, 2));
        assert_eq!(maze.end(), None);
        assert_eq!(maze.selected(), None);
        assert_perfect(&maze);

        assert!(maze.regenerate(0, 2, &mut rng).is_err());
        assert_eq!(maze.dimensions(), (4, 2));
    }

    #[test]
    fn tree_path_follows_edges() {
        let maze = MazeGraph::generate_seeded(6, 6, 11).unwrap();
        let from = Cell::new(0, 0);
        let to = Cell::new(5, 5);
        let path = maze.tree_path(from, to);

        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        for w in path.windows(2) {
            assert!(maze.is_connected(w[0], w[1]));
        }
        assert_eq!(maze.tree_path(from, from), vec![from]);
        assert!(maze.tree_path(from, Cell::new(6, 0)).is_empty());
    }
}
