//! Model package rollout.
//!
//! An approved model package is registered as a model, bound to an endpoint configuration and
//! rolled out onto the package group's endpoint. Every step is keyed by the deterministic
//! resource names of the package, so re-processing an event never creates duplicates.

use std::sync::Arc;

use anyhow::{Context, Result};
use mlops_core::clients::{EndpointConfigSpec, HostingControlPlane, ModelSpec};
use mlops_core::models::{ModelPackageDetail, ModelPackageStateChange};
use mlops_core::ResourceNames;
use serde::Serialize;

use crate::config::Config;

/// The status code of completed & skipped rollouts.
const STATUS_OK: u16 = 200;
/// The status code of failed rollouts.
const STATUS_FAILED: u16 = 500;

/// The outcome of a single rollout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionOutcome {
    /// The existing endpoint was pointed at the new endpoint configuration.
    Updated,
    /// The endpoint did not exist and was created.
    Created,
    /// The event did not describe an approved package.
    Skipped,
    /// A step of the rollout failed.
    Failed,
}

/// The result payload of a rollout.
#[derive(Clone, Debug, Serialize)]
pub struct ProvisionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    pub outcome: ProvisionOutcome,
    pub model_name: String,
    pub endpoint_config_name: String,
    pub endpoint_name: String,
    /// Whether this invocation registered the model.
    pub model_created: bool,
    /// Whether this invocation created the endpoint configuration.
    pub endpoint_config_created: bool,
    /// The reason of a failed rollout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The resources created by a rollout so far.
#[derive(Debug, Default)]
struct Progress {
    model_created: bool,
    endpoint_config_created: bool,
}

/// Rolls approved model packages out onto their endpoint.
pub struct EndpointProvisioner {
    config: Arc<Config>,
    control_plane: Arc<dyn HostingControlPlane>,
}

impl EndpointProvisioner {
    /// Create a new instance.
    pub fn new(config: Arc<Config>, control_plane: Arc<dyn HostingControlPlane>) -> Self {
        Self { config, control_plane }
    }

    /// Handle a model package state change event.
    ///
    /// Rollout failures are reported through a `failed` outcome rather than an error.
    #[tracing::instrument(level = "debug", skip(self, event), fields(event_id = ?event.id))]
    pub async fn handle(&self, event: ModelPackageStateChange) -> Result<ProvisionResponse> {
        let detail = event.detail;
        let names = ResourceNames::derive(&detail.model_package_group_name, detail.model_package_version);
        tracing::debug!(
            group = %detail.model_package_group_name,
            version = detail.model_package_version,
            status = ?detail.model_approval_status,
            "received model package state change",
        );

        if !detail.is_approved() {
            tracing::warn!(
                group = %detail.model_package_group_name,
                version = detail.model_package_version,
                status = ?detail.model_approval_status,
                "skipping model package which is not approved",
            );
            let body = format!("model package {} is not approved", names.model);
            return Ok(response(ProvisionOutcome::Skipped, body, names, Progress::default(), None));
        }

        let mut progress = Progress::default();
        match self.provision(&detail, &names, &mut progress).await {
            Ok(outcome) => {
                let body = format!("endpoint {} {} with endpoint config {}", names.endpoint, outcome_verb(outcome), names.endpoint_config);
                tracing::info!(outcome = ?outcome, endpoint = %names.endpoint, "model package rollout finished");
                Ok(response(outcome, body, names, progress, None))
            }
            Err(err) => {
                tracing::error!(error = ?err, model = %names.model, endpoint = %names.endpoint, "error rolling out model package");
                let body = format!("error rolling out model {} onto endpoint {}", names.model, names.endpoint);
                Ok(response(ProvisionOutcome::Failed, body, names, progress, Some(format!("{:#}", err))))
            }
        }
    }

    /// Register the model, create its endpoint config & roll it out onto the endpoint.
    async fn provision(&self, detail: &ModelPackageDetail, names: &ResourceNames, progress: &mut Progress) -> Result<ProvisionOutcome> {
        let container = detail.primary_container()?;
        let instance_type = detail.instance_type()?;

        if self
            .control_plane
            .model_exists(&names.model)
            .await
            .context("error checking for existing model")?
        {
            tracing::info!(model = %names.model, "model already exists, skipping registration");
        } else {
            tracing::info!(model = %names.model, image = %container.image, "registering model");
            let spec = ModelSpec {
                name: names.model.clone(),
                image: container.image.clone(),
                model_data_url: container.model_data_url.clone(),
                execution_role_arn: self.config.sagemaker_exec_role.clone(),
            };
            self.control_plane.create_model(&spec).await.context("error registering model")?;
            progress.model_created = true;
        }

        if self
            .control_plane
            .endpoint_config_exists(&names.endpoint_config)
            .await
            .context("error checking for existing endpoint config")?
        {
            tracing::info!(endpoint_config = %names.endpoint_config, "endpoint config already exists, skipping creation");
        } else {
            tracing::info!(endpoint_config = %names.endpoint_config, instance_type, "creating endpoint config");
            let spec = EndpointConfigSpec::single_instance(&names.endpoint_config, &names.model, instance_type);
            self.control_plane
                .create_endpoint_config(&spec)
                .await
                .context("error creating endpoint config")?;
            progress.endpoint_config_created = true;
        }

        let exists = self
            .control_plane
            .endpoint_exists(&names.endpoint)
            .await
            .context("error checking for existing endpoint")?;
        if exists {
            tracing::info!(endpoint = %names.endpoint, endpoint_config = %names.endpoint_config, "updating endpoint");
            self.control_plane
                .update_endpoint(&names.endpoint, &names.endpoint_config)
                .await
                .context("error updating endpoint")?;
            Ok(ProvisionOutcome::Updated)
        } else {
            tracing::info!(endpoint = %names.endpoint, endpoint_config = %names.endpoint_config, "creating endpoint");
            self.control_plane
                .create_endpoint(&names.endpoint, &names.endpoint_config)
                .await
                .context("error creating endpoint")?;
            Ok(ProvisionOutcome::Created)
        }
    }
}

fn outcome_verb(outcome: ProvisionOutcome) -> &'static str {
    match outcome {
        ProvisionOutcome::Updated => "updated",
        ProvisionOutcome::Created => "created",
        ProvisionOutcome::Skipped => "skipped",
        ProvisionOutcome::Failed => "failed",
    }
}

fn response(outcome: ProvisionOutcome, body: String, names: ResourceNames, progress: Progress, error: Option<String>) -> ProvisionResponse {
    ProvisionResponse {
        status_code: if outcome == ProvisionOutcome::Failed { STATUS_FAILED } else { STATUS_OK },
        body,
        outcome,
        model_name: names.model,
        endpoint_config_name: names.endpoint_config,
        endpoint_name: names.endpoint,
        model_created: progress.model_created,
        endpoint_config_created: progress.endpoint_config_created,
        error,
    }
}
