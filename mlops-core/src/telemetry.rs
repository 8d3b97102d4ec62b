//! Logging & tracing setup.

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;

/// Setup the tracing/logging system.
///
/// Output goes to stdout, which the Lambda service ships to CloudWatch Logs. CloudWatch
/// timestamps every line and does not render colors, so both are disabled.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        // Filter spans based on the RUST_LOG env var.
        .with(tracing_subscriber::EnvFilter::from_default_env())
        // Send a copy of all spans to stdout in compact form.
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .without_time(),
        )
        // Install this registry as the global tracing registry.
        .try_init()
        .context("error initializing logging/tracing system")
}
