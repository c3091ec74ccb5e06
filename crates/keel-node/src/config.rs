//! Guard configuration for a Keel node.
//!
//! Provides [`GuardConfig`] with defaults for the network, reorg depth and
//! logging. Values are layered: built-in defaults, then an optional TOML
//! file, then `KEEL_*` environment variables (`KEEL_NETWORK`,
//! `KEEL_REORG_DEPTH`, `KEEL_LOG_LEVEL`, `KEEL_LOG_FORMAT`).

use std::path::{Path, PathBuf};

use keel_consensus::CheckpointGuard;
use keel_core::constants::{BLOCK_TEMP_CHECKPOINT_DEPTH, NetworkType};
use keel_core::error::KeelError;
use serde::{Deserialize, Serialize};

/// Configuration for the checkpoint guard and its host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Active network; selects the checkpoint table.
    pub network: NetworkType,
    /// Maximum tolerated reorganization depth (`BLOCK_TEMP_CHECKPOINT_DEPTH`).
    pub reorg_depth: u64,
    /// Log level filter string (e.g. "info", "debug", "keel_consensus=trace").
    pub log_level: String,
    /// Log output format: "text" or "json".
    pub log_format: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::default(),
            reorg_depth: BLOCK_TEMP_CHECKPOINT_DEPTH,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl GuardConfig {
    /// Default config file location: `<config dir>/keel/keel.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keel")
            .join("keel.toml")
    }

    /// Load defaults, then `path` if given (must exist), then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`KeelError::Config`] if the file is missing or unreadable,
    /// or a value fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self, KeelError> {
        Self::build(path).map_err(|e| KeelError::Config(e.to_string()))
    }

    fn build(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("network", defaults.network.name())?
            .set_default("reorg_depth", defaults.reorg_depth)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?;
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(config::Environment::with_prefix("KEEL").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Build the checkpoint guard this configuration describes.
    pub fn guard(&self) -> CheckpointGuard {
        CheckpointGuard::new(self.network, self.reorg_depth)
    }
}
