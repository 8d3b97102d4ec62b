//! Runtime configuration.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime configuration data.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The function's logging config, which uses Rust's `env_logger` directives.
    #[serde(default = "crate::config::default_rust_log")]
    pub rust_log: String,
    /// The ARN of the role which the hosting service assumes on behalf of registered models.
    pub sagemaker_exec_role: String,
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
