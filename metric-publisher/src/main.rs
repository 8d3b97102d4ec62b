//! Publishes the validation metrics of a training run.

mod config;
mod handler;

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{service_fn, LambdaEvent};
use mlops_core::clients::aws::{load_sdk_config, CloudWatchSink, S3Store};

use crate::config::Config;
use crate::handler::{MetricPublisher, MetricRequest};

#[tokio::main]
async fn main() -> Result<()> {
    mlops_core::telemetry::init_tracing()?;

    let cfg = Arc::new(Config::new()?);
    tracing::info!(
        rust_log = %cfg.rust_log,
        namespace = %cfg.metric_namespace,
        scratch_dir = %cfg.scratch_dir.display(),
        "starting metric publisher",
    );
    let sdk_config = load_sdk_config().await;
    let publisher = MetricPublisher::new(cfg, Arc::new(S3Store::new(&sdk_config)), Arc::new(CloudWatchSink::new(&sdk_config)));

    let publisher = &publisher;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<MetricRequest>| async move { publisher.handle(event.payload).await }))
        .await
        .map_err(|err| anyhow::anyhow!(err))
        .context("error running lambda runtime")
}
