use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A pipeline manifest, the parameters of a `StartPipelineExecution` call.
///
/// Field names follow the API's request shape so manifests are written exactly as the API
/// documents them. Unknown fields are rejected rather than silently dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PipelineManifest {
    pub pipeline_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline_parameters: Vec<PipelineParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_execution_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_execution_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism_configuration: Option<ParallelismConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_version_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective_execution_config: Option<SelectiveExecutionConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PipelineParameter {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ParallelismConfiguration {
    pub max_parallel_execution_steps: i32,
}

/// Re-runs a subset of the steps of an earlier execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SelectiveExecutionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_pipeline_execution_arn: Option<String>,
    pub selected_steps: Vec<SelectedStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SelectedStep {
    pub step_name: String,
}

impl PipelineManifest {
    /// Parse and validate a manifest from raw JSON.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(data).context("error parsing pipeline manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate this manifest against the constraints of the pipeline execution API.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pipeline_name.trim().is_empty() {
            return Err(AppError::InvalidInput("manifest PipelineName must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for param in self.pipeline_parameters.iter() {
            if param.name.is_empty() {
                return Err(AppError::InvalidInput("manifest PipelineParameters entries must have a Name".into()));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(AppError::InvalidInput(format!("manifest PipelineParameters declares {} more than once", param.name)));
            }
        }
        if let Some(cfg) = &self.parallelism_configuration {
            if cfg.max_parallel_execution_steps < 1 {
                return Err(AppError::InvalidInput(format!(
                    "manifest MaxParallelExecutionSteps must be at least 1, got {}",
                    cfg.max_parallel_execution_steps
                )));
            }
        }
        if let Some(version) = self.pipeline_version_id {
            if version < 1 {
                return Err(AppError::InvalidInput(format!("manifest PipelineVersionId must be at least 1, got {}", version)));
            }
        }
        if let Some(cfg) = &self.selective_execution_config {
            if cfg.selected_steps.is_empty() {
                return Err(AppError::InvalidInput("manifest SelectiveExecutionConfig must select at least one step".into()));
            }
            if cfg.selected_steps.iter().any(|step| step.step_name.is_empty()) {
                return Err(AppError::InvalidInput("manifest SelectedSteps entries must have a StepName".into()));
            }
        }
        Ok(())
    }
}
