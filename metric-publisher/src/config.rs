//! Runtime configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime configuration data.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The function's logging config, which uses Rust's `env_logger` directives.
    #[serde(default = "crate::config::default_rust_log")]
    pub rust_log: String,
    /// The metrics namespace which measurements are published under.
    #[serde(default = "crate::config::default_metric_namespace")]
    pub metric_namespace: String,
    /// The directory beneath which per-invocation scratch directories are created.
    #[serde(default = "crate::config::default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl Config {
    /// Create a new config instance from the runtime environment.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Result<Self> {
        envy::from_env().context("error building config from env")
    }
}

pub fn default_rust_log() -> String {
    "info".into()
}

pub fn default_metric_namespace() -> String {
    "/MLOps/Recommendation/ValidationBestMetrics".into()
}

/// Lambda only grants write access beneath `/tmp`.
pub fn default_scratch_dir() -> PathBuf {
    PathBuf::from("/tmp")
}
