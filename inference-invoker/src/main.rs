//! Forwards API Gateway requests to a hosted inference endpoint.

mod config;
#[cfg(test)]
mod config_test;
mod handler;

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{service_fn, LambdaEvent};
use mlops_core::clients::aws::{load_sdk_config, SageMakerRuntime};
use mlops_core::models::ProxyRequest;

use crate::config::Config;
use crate::handler::InferenceInvoker;

#[tokio::main]
async fn main() -> Result<()> {
    mlops_core::telemetry::init_tracing()?;

    let cfg = Arc::new(Config::new()?);
    tracing::info!(
        rust_log = %cfg.rust_log,
        endpoint = %cfg.sagemaker_endpoint_name,
        content_type = %cfg.content_type,
        "starting inference invoker",
    );
    let sdk_config = load_sdk_config().await;
    let invoker = InferenceInvoker::new(cfg, Arc::new(SageMakerRuntime::new(&sdk_config)));

    let invoker = &invoker;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<ProxyRequest>| async move { invoker.handle(event.payload).await }))
        .await
        .map_err(|err| anyhow::anyhow!(err))
        .context("error running lambda runtime")
}
