//! Cross-platform application paths

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: Option<PathBuf>,
}

impl AppPaths {
    pub fn new() -> Self {
        Self {
            config_dir: dirs::config_dir().map(|base| base.join("qmaze")),
        }
    }

    #[cfg(test)]
    pub fn with_config_dir(dir: PathBuf) -> Self {
        Self {
            config_dir: Some(dir),
        }
    }

    pub fn config_dir(&self) -> Option<&PathBuf> {
        self.config_dir.as_ref()
    }

    /// Default config location; may not exist.
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join("config.json"))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
