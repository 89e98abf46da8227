//! Shell configuration: built-in defaults, overlaid by an optional JSON file,
//! overlaid by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use qmaze::{Cell, MazeConfig, TrainingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CliError;
use crate::paths::AppPaths;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub maze: MazeConfig,
    pub training: TrainingConfig,
    /// Defaults to the top-left cell.
    pub start: Option<Cell>,
    /// Defaults to the bottom-right cell.
    pub goal: Option<Cell>,
}

impl ShellConfig {
    /// Load from `explicit` if given (it must exist), otherwise from the
    /// default location if a file is there, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>, paths: &AppPaths) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match paths.config_file() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
            path: PathBuf::from(path),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
            path: PathBuf::from(path),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn start_cell(&self) -> Cell {
        self.start.unwrap_or(Cell::new(0, 0))
    }

    pub fn goal_cell(&self) -> Cell {
        self.goal.unwrap_or(Cell::new(
            self.maze.rows.saturating_sub(1),
            self.maze.cols.saturating_sub(1),
        ))
    }
}

/// Parse `ROW,COL` (whitespace around either number is ignored).
pub fn parse_cell(s: &str) -> Result<Cell, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL but got {s:?}"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad row {row:?}: {e}"))?;
    let col = col
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad column {col:?}: {e}"))?;
    Ok(Cell::new(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_cells() {
        assert_eq!(parse_cell("2,3"), Ok(Cell::new(2, 3)));
        assert_eq!(parse_cell(" 0 , 11 "), Ok(Cell::new(0, 11)));
        assert!(parse_cell("2;3").is_err());
        assert!(parse_cell("-1,3").is_err());
        assert!(parse_cell("a,b").is_err());
    }

    #[test]
    fn default_endpoints_are_corners() {
        let mut config = ShellConfig::default();
        config.maze.rows = 4;
        config.maze.cols = 7;
        assert_eq!(config.start_cell(), Cell::new(0, 0));
        assert_eq!(config.goal_cell(), Cell::new(3, 6));

        config.goal = Some(Cell::new(1, 1));
        assert_eq!(config.goal_cell(), Cell::new(1, 1));
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let dir = scratch_dir("qmaze_partial_config_test");
        let path = dir.join("config.json");
        fs::write(
            &path,
            r#"{"maze": {"rows": 3, "seed": 9}, "training": {"gamma": 0.5}, "goal": {"row": 2, "col": 0}}"#,
        )
        .unwrap();

        let config = ShellConfig::from_file(&path).unwrap();
        assert_eq!(config.maze.rows, 3);
        assert_eq!(config.maze.cols, 6);
        assert_eq!(config.maze.seed, Some(9));
        assert_eq!(config.training.gamma, 0.5);
        assert_eq!(config.training.episodes_per_epoch, 10);
        assert_eq!(config.goal, Some(Cell::new(2, 0)));
        assert_eq!(config.start, None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_location_is_optional() {
        let dir = scratch_dir("qmaze_default_location_test");
        let paths = AppPaths::with_config_dir(dir.join("missing"));
        assert_eq!(ShellConfig::load(None, &paths).unwrap(), ShellConfig::default());

        let paths = AppPaths::with_config_dir(dir.clone());
        fs::write(dir.join("config.json"), r#"{"maze": {"cols": 2}}"#).unwrap();
        assert_eq!(ShellConfig::load(None, &paths).unwrap().maze.cols, 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_file_must_exist_and_parse() {
        let dir = scratch_dir("qmaze_explicit_config_test");
        let paths = AppPaths::with_config_dir(dir.clone());

        let missing = dir.join("nope.json");
        assert!(matches!(
            ShellConfig::load(Some(&missing), &paths),
            Err(CliError::ConfigIo { .. })
        ));

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            ShellConfig::load(Some(&broken), &paths),
            Err(CliError::ConfigParse { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
