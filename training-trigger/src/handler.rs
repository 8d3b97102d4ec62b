//! Pipeline execution triggering.

use std::sync::Arc;

use anyhow::{Context, Result};
use mlops_core::clients::{ObjectStore, PipelineLauncher};
use mlops_core::models::{PipelineManifest, S3Notification};
use mlops_core::AppError;
use serde::Serialize;

/// The result payload of a triggered execution.
#[derive(Clone, Debug, Serialize)]
pub struct TriggerResponse {
    /// The HTTP status of the start call.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// The JSON serialized start call result.
    pub body: String,
}

/// Starts a pipeline execution for each uploaded manifest.
pub struct TrainingTrigger {
    store: Arc<dyn ObjectStore>,
    launcher: Arc<dyn PipelineLauncher>,
}

impl TrainingTrigger {
    /// Create a new instance.
    pub fn new(store: Arc<dyn ObjectStore>, launcher: Arc<dyn PipelineLauncher>) -> Self {
        Self { store, launcher }
    }

    /// Handle an S3 notification, using only its first record.
    #[tracing::instrument(level = "debug", skip(self, event), fields(records = event.records.len()))]
    pub async fn handle(&self, event: S3Notification) -> Result<TriggerResponse> {
        let record = event
            .records
            .first()
            .ok_or_else(|| AppError::InvalidInput("S3 notification carries no records".into()))?;
        let uri = record.object_uri()?;
        tracing::debug!(%uri, event_name = ?record.event_name, "received manifest upload notification");

        tracing::info!(%uri, "reading pipeline manifest");
        let data = self
            .store
            .get_object(&uri)
            .await
            .with_context(|| format!("error reading pipeline manifest {}", uri))?
            .ok_or_else(|| AppError::ObjectNotFound(uri.to_string()))?;
        let manifest = PipelineManifest::from_slice(&data).with_context(|| format!("error loading pipeline manifest {}", uri))?;

        tracing::info!(
            pipeline = %manifest.pipeline_name,
            parameters = manifest.pipeline_parameters.len(),
            "starting pipeline execution",
        );
        let execution = self
            .launcher
            .start_pipeline_execution(&manifest)
            .await
            .with_context(|| format!("error starting execution of pipeline {}", manifest.pipeline_name))?;
        tracing::info!(arn = ?execution.pipeline_execution_arn, "pipeline execution started");

        Ok(TriggerResponse {
            status_code: execution.response_metadata.http_status_code,
            body: serde_json::to_string(&execution).context("error serializing pipeline execution")?,
        })
    }
}
