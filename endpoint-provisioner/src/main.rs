//! Rolls approved model packages out onto their hosted endpoint.

mod config;
mod handler;

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_runtime::{service_fn, LambdaEvent};
use mlops_core::clients::aws::{load_sdk_config, SageMakerControlPlane};
use mlops_core::models::ModelPackageStateChange;

use crate::config::Config;
use crate::handler::EndpointProvisioner;

#[tokio::main]
async fn main() -> Result<()> {
    mlops_core::telemetry::init_tracing()?;

    let cfg = Arc::new(Config::new()?);
    tracing::info!(rust_log = %cfg.rust_log, exec_role = %cfg.sagemaker_exec_role, "starting endpoint provisioner");
    let sdk_config = load_sdk_config().await;
    let provisioner = EndpointProvisioner::new(cfg, Arc::new(SageMakerControlPlane::new(&sdk_config)));

    let provisioner = &provisioner;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<ModelPackageStateChange>| async move {
        provisioner.handle(event.payload).await
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
    .context("error running lambda runtime")
}
