//! Tabular Q-learning over the tree edges of a [`MazeGraph`].
//!
//! States are cells (`row * cols + col`); an action is a move along a tree
//! edge, so the learned table is a dense `states x states` matrix where only
//! edge entries ever change. Training runs random-walk episodes that end at
//! the goal, applying the Bellman update
//!
//! ```text
//! Q[s][s'] = R[s][s'] + gamma * max(Q[s'][n] for n in neighbors(s'))
//! ```
//!
//! after every step, and rescales the table by its maximum after each epoch.
//! A path is extracted by walking greedily along the highest-valued edge.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::TrainingConfig;
use crate::error::SolverError;
use crate::maze::{Cell, MazeGraph};

/// Reward for a pair of states with no tree edge between them.
const NO_EDGE: f64 = -1.0;
/// Reward for an ordinary move.
const STEP: f64 = 0.0;
/// Reward for a move into the goal (and for staying on it).
const GOAL: f64 = 1.0;

/// Best-next-value used when a state has no neighbors.
const EMPTY_MAX: f64 = -1.0;

/// Largest maze (in cells) the dense `states x states` tables are built for.
/// At this size each table holds 16M entries (128 MiB).
pub const MAX_STATES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// No maze with a goal has been supplied yet.
    Uninitialized,
    Untrained,
    Trained,
}

/// How a call to [`QLearningSolver::train`] ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainOutcome {
    /// The solver has not been initialized; nothing was done.
    NotReady,
    /// The per-epoch change dropped below the threshold.
    Converged { epochs: usize, diff: f64 },
    /// `max_epochs` was reached first.
    EpochLimit { epochs: usize, diff: f64 },
    /// The cancellation flag was raised between epochs.
    Cancelled { epochs: usize },
}

impl TrainOutcome {
    /// Epochs run by this call.
    pub fn epochs(&self) -> usize {
        match *self {
            TrainOutcome::NotReady => 0,
            TrainOutcome::Converged { epochs, .. }
            | TrainOutcome::EpochLimit { epochs, .. }
            | TrainOutcome::Cancelled { epochs } => epochs,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, TrainOutcome::Converged { .. })
    }
}

#[derive(Debug, Clone)]
struct Tables {
    rows: usize,
    cols: usize,
    num_states: usize,
    goal: usize,
    /// Row-major `num_states x num_states`.
    reward: Vec<f64>,
    /// Row-major `num_states x num_states`.
    q: Vec<f64>,
    /// Tree neighbors per state, in maze edge order. This order decides ties.
    neighbors: Vec<Vec<usize>>,
}

impl Tables {
    fn build(maze: &MazeGraph, goal_cell: Cell) -> Result<Self, SolverError> {
        let (rows, cols) = maze.dimensions();
        let n = maze.cell_count();
        let entries = n
            .checked_mul(n)
            .filter(|_| n <= MAX_STATES)
            .ok_or(SolverError::TooLarge {
                states: n,
                max: MAX_STATES,
            })?;
        let mut reward = vec![NO_EDGE; entries];
        let mut neighbors = vec![Vec::new(); n];

        for &(a, b) in maze.edges() {
            if a == b {
                continue;
            }
            reward[a * n + b] = STEP;
            reward[b * n + a] = STEP;
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        let goal = maze.state_of(goal_cell);
        for i in 0..n {
            if reward[i * n + goal] != NO_EDGE {
                reward[i * n + goal] = GOAL;
            }
        }
        reward[goal * n + goal] = GOAL;

        Ok(Self {
            rows,
            cols,
            num_states: n,
            goal,
            reward,
            q: vec![0.0; entries],
            neighbors,
        })
    }

    #[inline]
    fn at(&self, s: usize, t: usize) -> usize {
        s * self.num_states + t
    }

    fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    fn state_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    fn cell_of(&self, state: usize) -> Cell {
        Cell::new(state / self.cols, state % self.cols)
    }

    fn best_next_value(&self, state: usize) -> f64 {
        self.neighbors[state]
            .iter()
            .map(|&n| self.q[self.at(state, n)])
            .fold(EMPTY_MAX, f64::max)
    }

    /// One random walk from a uniformly drawn state until the goal is reached.
    fn run_episode<R: Rng + ?Sized>(&mut self, gamma: f64, rng: &mut R) {
        let mut current = rng.gen_range(0..self.num_states);

        while current != self.goal {
            let options = &self.neighbors[current];
            if options.is_empty() {
                // Only possible on a disconnected graph, which a maze never is.
                break;
            }
            let next = options[rng.gen_range(0..options.len())];

            let idx = self.at(current, next);
            let value = self.reward[idx] + gamma * self.best_next_value(next);
            self.q[idx] = value;
            current = next;
        }
    }

    /// Divide the table by its maximum. Skipped when the maximum is not
    /// positive (nothing learned yet, or a maze with no edges).
    fn normalize(&mut self) -> bool {
        let max = self.q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > 0.0 && max.is_finite()) {
            return false;
        }
        for v in &mut self.q {
            *v /= max;
        }
        true
    }
}

/// Q-learning agent for a single maze and goal.
///
/// Re-run [`initialize`](Self::initialize) whenever the maze or its goal
/// changes; that discards everything learned so far. Repeated calls to
/// [`train`](Self::train) continue from the current table.
#[derive(Debug, Clone, Default)]
pub struct QLearningSolver {
    tables: Option<Tables>,
    trained: bool,
    epochs_trained: usize,
}

impl QLearningSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and initialize a solver, or `None` if the maze has no goal.
    pub fn from_maze(maze: &MazeGraph) -> Result<Option<Self>, SolverError> {
        let mut solver = Self::new();
        Ok(match solver.initialize(Some(maze))? {
            SolverStatus::Uninitialized => None,
            _ => Some(solver),
        })
    }

    /// Build the reward table and neighbor index from `maze` and reset the
    /// Q-table.
    ///
    /// Does nothing when `maze` is `None` or has no end cell set; the caller
    /// is expected to retry once both exist. A maze with more than
    /// [`MAX_STATES`] cells is rejected and leaves the solver untouched.
    pub fn initialize(
        &mut self,
        maze: Option<&MazeGraph>,
    ) -> Result<SolverStatus, SolverError> {
        let Some(maze) = maze else {
            return Ok(self.status());
        };
        let Some(goal) = maze.end() else {
            debug!("Solver not initialized: maze has no goal");
            return Ok(self.status());
        };

        self.tables = Some(Tables::build(maze, goal)?);
        self.trained = false;
        self.epochs_trained = 0;
        debug!(
            "Solver initialized: {} states, goal {}",
            maze.cell_count(),
            goal
        );
        Ok(self.status())
    }

    pub fn status(&self) -> SolverStatus {
        match (&self.tables, self.trained) {
            (None, _) => SolverStatus::Uninitialized,
            (Some(_), false) => SolverStatus::Untrained,
            (Some(_), true) => SolverStatus::Trained,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Train until the per-epoch change drops below
    /// `config.min_change_per_epoch` (or `config.max_epochs` is hit).
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        config: &TrainingConfig,
        rng: &mut R,
    ) -> Result<TrainOutcome, SolverError> {
        self.run(config, rng, None)
    }

    /// Like [`train`](Self::train), but stops early once `cancel` is set.
    ///
    /// The flag is checked before every epoch, so a cancelled run keeps
    /// whatever the completed epochs learned.
    pub fn train_with_cancel<R: Rng + ?Sized>(
        &mut self,
        config: &TrainingConfig,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<TrainOutcome, SolverError> {
        self.run(config, rng, Some(cancel))
    }

    fn run<R: Rng + ?Sized>(
        &mut self,
        config: &TrainingConfig,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<TrainOutcome, SolverError> {
        config.validate()?;
        let Some(tables) = self.tables.as_mut() else {
            return Ok(TrainOutcome::NotReady);
        };

        info!(
            "Training: gamma={} min_change={} episodes/epoch={}",
            config.gamma, config.min_change_per_epoch, config.episodes_per_epoch
        );

        let mut previous = tables.q.clone();
        let mut epochs = 0usize;

        loop {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                warn!("Training cancelled after {} epochs", epochs);
                return Ok(TrainOutcome::Cancelled { epochs });
            }

            previous.copy_from_slice(&tables.q);
            for _ in 0..config.episodes_per_epoch {
                tables.run_episode(config.gamma, rng);
            }
            if !tables.normalize() {
                debug!("Skipping normalization: table maximum is not positive");
            }

            let diff: f64 = tables
                .q
                .iter()
                .zip(&previous)
                .map(|(q, p)| (q - p).abs())
                .sum();

            epochs += 1;
            self.epochs_trained += 1;
            debug!("In epoch {}, difference is {}", self.epochs_trained, diff);

            if diff < config.min_change_per_epoch {
                self.trained = true;
                info!("Training converged after {} epochs (diff {})", epochs, diff);
                return Ok(TrainOutcome::Converged { epochs, diff });
            }

            if config.max_epochs.is_some_and(|max| epochs >= max) {
                warn!(
                    "Training stopped at the {} epoch cap (diff {})",
                    epochs, diff
                );
                return Ok(TrainOutcome::EpochLimit { epochs, diff });
            }
        }
    }

    /// Greedy path from `start` towards the goal, `start` included.
    ///
    /// Empty if the solver is not trained or `start` is outside the maze.
    /// Stops early once the path holds as many cells as the maze, so a poorly
    /// converged table can yield a path that never reaches the goal.
    pub fn solve(&self, start: Cell) -> Vec<Cell> {
        if !self.trained {
            return Vec::new();
        }
        let Some(t) = &self.tables else {
            return Vec::new();
        };
        if !t.contains(start) {
            warn!("Solve requested from {} which is outside the maze", start);
            return Vec::new();
        }

        let mut path = vec![start];
        let mut current = t.state_of(start);

        while current != t.goal && path.len() < t.num_states {
            let Some((&first, rest)) = t.neighbors[current].split_first() else {
                break;
            };

            let mut best = first;
            let mut best_q = t.q[t.at(current, first)];
            for &candidate in rest {
                let q = t.q[t.at(current, candidate)];
                if q > best_q {
                    best = candidate;
                    best_q = q;
                }
            }

            current = best;
            path.push(t.cell_of(current));
        }

        path
    }

    /// Number of states, or 0 before initialization.
    pub fn num_states(&self) -> usize {
        self.tables.as_ref().map_or(0, |t| t.num_states)
    }

    pub fn goal_state(&self) -> Option<usize> {
        self.tables.as_ref().map(|t| t.goal)
    }

    pub fn goal(&self) -> Option<Cell> {
        self.tables.as_ref().map(|t| t.cell_of(t.goal))
    }

    /// Epochs run since the last initialization, across all `train` calls.
    pub fn epochs_trained(&self) -> usize {
        self.epochs_trained
    }

    pub fn reward(&self, from: usize, to: usize) -> Option<f64> {
        let t = self.tables.as_ref()?;
        (from < t.num_states && to < t.num_states).then(|| t.reward[t.at(from, to)])
    }

    pub fn q_value(&self, from: usize, to: usize) -> Option<f64> {
        let t = self.tables.as_ref()?;
        (from < t.num_states && to < t.num_states).then(|| t.q[t.at(from, to)])
    }

    pub fn neighbors(&self, state: usize) -> &[usize] {
        self.tables
            .as_ref()
            .and_then(|t| t.neighbors.get(state))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
