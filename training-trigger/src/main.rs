//! Starts pipeline executions from manifests uploaded to S3.

mod config;
mod handler;
#[cfg(test)]
mod handler_test;

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{service_fn, LambdaEvent};
use mlops_core::clients::aws::{load_sdk_config, S3Store, SageMakerControlPlane};
use mlops_core::models::S3Notification;

use crate::config::Config;
use crate::handler::TrainingTrigger;

#[tokio::main]
async fn main() -> Result<()> {
    mlops_core::telemetry::init_tracing()?;

    let cfg = Arc::new(Config::new()?);
    tracing::info!(rust_log = %cfg.rust_log, "starting training trigger");
    let sdk_config = load_sdk_config().await;
    let trigger = TrainingTrigger::new(Arc::new(S3Store::new(&sdk_config)), Arc::new(SageMakerControlPlane::new(&sdk_config)));

    let trigger = &trigger;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Notification>| async move { trigger.handle(event.payload).await }))
        .await
        .map_err(|err| anyhow::anyhow!(err))
        .context("error running lambda runtime")
}
