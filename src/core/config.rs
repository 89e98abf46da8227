#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Parameters for a Q-learning training run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainingConfig {
    /// Discount factor applied to the best next-state value. Must be in [0, 1].
    pub gamma: f64,

    /// Training stops once the summed absolute Q change over one epoch drops
    /// below this value. Must be > 0.
    pub min_change_per_epoch: f64,

    /// Random-walk episodes run per epoch before the convergence check.
    pub episodes_per_epoch: usize,

    /// Optional hard cap on epochs per `train` call.
    ///
    /// `None` trains until convergence, however long that takes.
    pub max_epochs: Option<usize>,
}

impl TrainingConfig {
    pub const DEFAULT_GAMMA: f64 = 0.8;
    pub const DEFAULT_MIN_CHANGE: f64 = 0.001;
    pub const DEFAULT_EPISODES_PER_EPOCH: usize = 10;

    pub fn new(gamma: f64, min_change_per_epoch: f64) -> Self {
        Self {
            gamma,
            min_change_per_epoch,
            ..Default::default()
        }
    }

    pub fn with_episodes_per_epoch(mut self, episodes: usize) -> Self {
        self.episodes_per_epoch = episodes;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: Option<usize>) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.gamma.is_finite() || !(0.0..=1.0).contains(&self.gamma) {
            return Err(SolverError::InvalidConfig(format!(
                "gamma must be in [0, 1] (got {})",
                self.gamma
            )));
        }
        if !self.min_change_per_epoch.is_finite() || self.min_change_per_epoch <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "min_change_per_epoch must be finite and > 0 (got {})",
                self.min_change_per_epoch
            )));
        }
        if self.episodes_per_epoch == 0 {
            return Err(SolverError::InvalidConfig(
                "episodes_per_epoch must be >= 1".to_string(),
            ));
        }
        if self.max_epochs == Some(0) {
            return Err(SolverError::InvalidConfig(
                "max_epochs must be >= 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            gamma: Self::DEFAULT_GAMMA,
            min_change_per_epoch: Self::DEFAULT_MIN_CHANGE,
            episodes_per_epoch: Self::DEFAULT_EPISODES_PER_EPOCH,
            max_epochs: None,
        }
    }
}

/// Maze dimensions and an optional RNG seed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MazeConfig {
    pub rows: usize,
    pub cols: usize,
    /// `None` draws a seed from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            seed: None,
        }
    }
}
