//! Configuration loading and validation.
//!
//! All sections use `#[serde(default)]` so a minimal or empty config
//! file is valid. There is no user-facing configuration surface beyond
//! this file: the embedder points [`FiregateConfig::load`] at a TOML
//! path it owns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiregateConfig {
    /// Decision dispatch knobs.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Logging knobs.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decision dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    /// Upper bound on a single authority query, in milliseconds. A slow
    /// or hung authority must not stall the privileged host path.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl DecisionConfig {
    /// The query timeout as a [`Duration`].
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated JSON log files. Console-only when unset.
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_dir: None,
        }
    }
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl FiregateConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }
}
