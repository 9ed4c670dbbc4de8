//! Runtime settings
//!
//! Defaults, overlaid by an optional TOML file, overlaid by CLI flags.
//!
//! ```toml
//! log_level = "debug"
//!
//! [queue]
//! queue_num = 0
//! copy_range = 65535
//! ```

use crate::cli::Args;
use hostblock_queue::QueueConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("can't read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: Option<String>,
    pub queue: QueueConfig,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load the config file named by `args`, then apply CLI overrides
    pub fn resolve(args: &Args) -> Result<Self, SettingsError> {
        let mut settings = match &args.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        settings.apply(args);
        Ok(settings)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(queue_num) = args.queue_num {
            self.queue.queue_num = queue_num;
        }
        if let Some(copy_range) = args.copy_range {
            self.queue.copy_range = copy_range;
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
