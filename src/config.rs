//! # Tracker Configuration
//!
//! Where the tracker keeps its files and how deep its request queue is.
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! root = "orders"
//! placed_dir = "ordered"
//! in_progress_dir = "progressing"
//! done_dir = "collected"
//! counter_file = "orderCounter.txt"
//! channel_capacity = 32
//! ```

use crate::model::OrderState;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Base directory holding the state directories and the counter file.
    pub root: PathBuf,
    pub placed_dir: String,
    pub in_progress_dir: String,
    pub done_dir: String,
    pub counter_file: String,
    /// Capacity of the tracker request queue.
    pub channel_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("orders"),
            placed_dir: "ordered".to_string(),
            in_progress_dir: "progressing".to_string(),
            done_dir: "collected".to_string(),
            counter_file: "orderCounter.txt".to_string(),
            channel_capacity: 32,
        }
    }
}

impl TrackerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Directory holding records in `state`.
    pub fn state_dir(&self, state: OrderState) -> PathBuf {
        let name = match state {
            OrderState::Placed => &self.placed_dir,
            OrderState::InProgress => &self.in_progress_dir,
            OrderState::Done => &self.done_dir,
        };
        self.root.join(name)
    }

    pub fn counter_path(&self) -> PathBuf {
        self.root.join(&self.counter_file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1".into()));
        }
        let dirs = [&self.placed_dir, &self.in_progress_dir, &self.done_dir];
        for (i, dir) in dirs.iter().enumerate() {
            if dir.is_empty() || dir.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!("bad state directory name: {dir:?}")));
            }
            if dirs[..i].contains(dir) {
                return Err(ConfigError::Invalid(format!("state directory {dir:?} used twice")));
            }
        }
        if self.counter_file.is_empty() || dirs.contains(&&self.counter_file) {
            return Err(ConfigError::Invalid(format!(
                "bad counter file name: {:?}",
                self.counter_file
            )));
        }
        Ok(())
    }
}
