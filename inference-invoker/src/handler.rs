//! Inference request forwarding.

use std::sync::Arc;

use anyhow::{Context, Result};
use mlops_core::clients::InferenceRuntime;
use mlops_core::models::{ProxyRequest, ProxyResponse};

use crate::config::Config;

/// Forwards proxy requests to the configured endpoint and relays its raw response.
pub struct InferenceInvoker {
    config: Arc<Config>,
    runtime: Arc<dyn InferenceRuntime>,
}

impl InferenceInvoker {
    /// Create a new instance.
    pub fn new(config: Arc<Config>, runtime: Arc<dyn InferenceRuntime>) -> Self {
        Self { config, runtime }
    }

    /// Handle a single proxy request.
    ///
    /// Endpoint faults are not translated, they fail the invocation.
    #[tracing::instrument(level = "debug", skip(self, request), fields(endpoint = %self.config.sagemaker_endpoint_name))]
    pub async fn handle(&self, request: ProxyRequest) -> Result<ProxyResponse> {
        let payload = request.payload()?;
        tracing::debug!(bytes = payload.len(), base64 = request.is_base64_encoded, "received inference request");

        tracing::info!(content_type = %self.config.content_type, "invoking endpoint");
        let body = self
            .runtime
            .invoke_endpoint(&self.config.sagemaker_endpoint_name, &self.config.content_type, payload)
            .await
            .with_context(|| format!("error invoking endpoint {}", self.config.sagemaker_endpoint_name))?;
        tracing::debug!(bytes = body.len(), "received endpoint response");

        Ok(ProxyResponse::ok_with_cors(body))
    }
}
