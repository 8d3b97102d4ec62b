//! AWS SDK backed clients.
//!
//! Clients are cheap to clone and are meant to be constructed once per process from a single
//! shared `SdkConfig`, then handed to the function handler.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_sagemaker::operation::RequestId;
use aws_sdk_sagemaker::types::{
    ContainerDefinition, ParallelismConfiguration, Parameter, ProductionVariant, ProductionVariantInstanceType, SelectedStep, SelectiveExecutionConfig,
};
use aws_sdk_sagemakerruntime::primitives::Blob;

use crate::clients::{
    EndpointConfigSpec, HostingControlPlane, InferenceRuntime, Measurement, MetricSink, ModelSpec, ObjectStore, PipelineExecution, PipelineLauncher,
    ResponseMetadata, VARIANT_ALL_TRAFFIC,
};
use crate::models::PipelineManifest;
use crate::s3uri::S3Uri;

/// The status code of successful control plane calls; the SDK surfaces anything else as an error.
const HTTP_STATUS_OK: u16 = 200;

/// Load the shared SDK config from the Lambda environment.
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

//////////////////////////////////////////////////////////////////////////////
// S3 ////////////////////////////////////////////////////////////////////////

/// Object storage backed by S3.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Create a new instance.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(level = "debug", skip(self), fields(object = %uri))]
    async fn get_object(&self, uri: &S3Uri) -> Result<Option<Vec<u8>>> {
        let output = match self.client.get_object().bucket(&uri.bucket).key(&uri.key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().map(GetObjectError::is_no_such_key).unwrap_or(false) => {
                tracing::warn!(object = %uri, "the object does not exist");
                return Ok(None);
            }
            Err(err) => return Err(anyhow::Error::new(err).context(format!("error fetching object {}", uri))),
        };
        let data = output
            .body
            .collect()
            .await
            .with_context(|| format!("error reading body of object {}", uri))?;
        Ok(Some(data.into_bytes().to_vec()))
    }

    #[tracing::instrument(level = "debug", skip(self, body), fields(object = %uri, len = body.len()))]
    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&uri.bucket)
            .key(&uri.key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("error uploading object {}", uri))?;
        Ok(())
    }
}

//////////////////////////////////////////////////////////////////////////////
// SageMaker Runtime /////////////////////////////////////////////////////////

/// Endpoint invocation backed by the SageMaker runtime.
#[derive(Clone)]
pub struct SageMakerRuntime {
    client: aws_sdk_sagemakerruntime::Client,
}

impl SageMakerRuntime {
    /// Create a new instance.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sagemakerruntime::Client::new(config),
        }
    }
}

#[async_trait]
impl InferenceRuntime for SageMakerRuntime {
    async fn invoke_endpoint(&self, endpoint: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(endpoint)
            .content_type(content_type)
            .body(Blob::new(body))
            .send()
            .await
            .with_context(|| format!("error invoking endpoint {}", endpoint))?;
        Ok(output.body.map(Blob::into_inner).unwrap_or_default())
    }
}

//////////////////////////////////////////////////////////////////////////////
// SageMaker /////////////////////////////////////////////////////////////////

/// The SageMaker control plane, used for hosting resources & pipelines.
#[derive(Clone)]
pub struct SageMakerControlPlane {
    client: aws_sdk_sagemaker::Client,
}

impl SageMakerControlPlane {
    /// Create a new instance.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sagemaker::Client::new(config),
        }
    }
}

#[async_trait]
impl HostingControlPlane for SageMakerControlPlane {
    async fn model_exists(&self, name: &str) -> Result<bool> {
        // The name filter is a substring match, so only an exact name counts.
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_models()
                .name_contains(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .with_context(|| format!("error listing models matching {}", name))?;
            if output.models().iter().any(|model| model.model_name() == Some(name)) {
                return Ok(true);
            }
            match output.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(false),
            }
        }
    }

    async fn create_model(&self, spec: &ModelSpec) -> Result<()> {
        let output = self
            .client
            .create_model()
            .model_name(&spec.name)
            .primary_container(container_definition(spec))
            .execution_role_arn(&spec.execution_role_arn)
            .send()
            .await
            .with_context(|| format!("error creating model {}", spec.name))?;
        tracing::debug!(model_arn = ?output.model_arn, "model created");
        Ok(())
    }

    async fn endpoint_config_exists(&self, name: &str) -> Result<bool> {
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_endpoint_configs()
                .name_contains(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .with_context(|| format!("error listing endpoint configs matching {}", name))?;
            if output.endpoint_configs().iter().any(|cfg| cfg.endpoint_config_name() == Some(name)) {
                return Ok(true);
            }
            match output.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(false),
            }
        }
    }

    async fn create_endpoint_config(&self, spec: &EndpointConfigSpec) -> Result<()> {
        let output = self
            .client
            .create_endpoint_config()
            .endpoint_config_name(&spec.name)
            .production_variants(production_variant(spec))
            .send()
            .await
            .with_context(|| format!("error creating endpoint config {}", spec.name))?;
        tracing::debug!(endpoint_config_arn = ?output.endpoint_config_arn, "endpoint config created");
        Ok(())
    }

    async fn endpoint_exists(&self, name: &str) -> Result<bool> {
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_endpoints()
                .name_contains(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .with_context(|| format!("error listing endpoints matching {}", name))?;
            if output.endpoints().iter().any(|endpoint| endpoint.endpoint_name() == Some(name)) {
                return Ok(true);
            }
            match output.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(false),
            }
        }
    }

    async fn update_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()> {
        let output = self
            .client
            .update_endpoint()
            .endpoint_name(endpoint)
            .endpoint_config_name(endpoint_config)
            .send()
            .await
            .with_context(|| format!("error updating endpoint {} to config {}", endpoint, endpoint_config))?;
        tracing::debug!(endpoint_arn = ?output.endpoint_arn, "endpoint update accepted");
        Ok(())
    }

    async fn create_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()> {
        let output = self
            .client
            .create_endpoint()
            .endpoint_name(endpoint)
            .endpoint_config_name(endpoint_config)
            .send()
            .await
            .with_context(|| format!("error creating endpoint {} from config {}", endpoint, endpoint_config))?;
        tracing::debug!(endpoint_arn = ?output.endpoint_arn, "endpoint creation accepted");
        Ok(())
    }
}

#[async_trait]
impl PipelineLauncher for SageMakerControlPlane {
    async fn start_pipeline_execution(&self, manifest: &PipelineManifest) -> Result<PipelineExecution> {
        let output = self
            .client
            .start_pipeline_execution()
            .pipeline_name(&manifest.pipeline_name)
            .set_pipeline_parameters(pipeline_parameters(manifest))
            .set_pipeline_execution_display_name(manifest.pipeline_execution_display_name.clone())
            .set_pipeline_execution_description(manifest.pipeline_execution_description.clone())
            .set_client_request_token(manifest.client_request_token.clone())
            .set_parallelism_configuration(parallelism_configuration(manifest))
            .set_pipeline_version_id(manifest.pipeline_version_id)
            .set_selective_execution_config(selective_execution_config(manifest))
            .send()
            .await
            .with_context(|| format!("error starting execution of pipeline {}", manifest.pipeline_name))?;
        Ok(PipelineExecution {
            response_metadata: ResponseMetadata {
                request_id: output.request_id().map(String::from),
                http_status_code: HTTP_STATUS_OK,
            },
            pipeline_execution_arn: output.pipeline_execution_arn,
        })
    }
}

//////////////////////////////////////////////////////////////////////////////
// CloudWatch ////////////////////////////////////////////////////////////////

/// A metrics sink backed by CloudWatch custom metrics.
#[derive(Clone)]
pub struct CloudWatchSink {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchSink {
    /// Create a new instance.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatch::Client::new(config),
        }
    }
}

#[async_trait]
impl MetricSink for CloudWatchSink {
    async fn put_measurement(&self, namespace: &str, measurement: &Measurement) -> Result<()> {
        self.client
            .put_metric_data()
            .namespace(namespace)
            .metric_data(metric_datum(measurement))
            .send()
            .await
            .with_context(|| format!("error publishing metric {} to namespace {}", measurement.name, namespace))?;
        Ok(())
    }
}

//////////////////////////////////////////////////////////////////////////////
// Request Builders //////////////////////////////////////////////////////////

/// The primary container of a model registration.
pub(crate) fn container_definition(spec: &ModelSpec) -> ContainerDefinition {
    ContainerDefinition::builder()
        .image(&spec.image)
        .set_model_data_url(spec.model_data_url.clone())
        .build()
}

/// The single production variant of an endpoint configuration, receiving all traffic.
pub(crate) fn production_variant(spec: &EndpointConfigSpec) -> ProductionVariant {
    ProductionVariant::builder()
        .variant_name(VARIANT_ALL_TRAFFIC)
        .model_name(&spec.model_name)
        .instance_type(ProductionVariantInstanceType::from(spec.instance_type.as_str()))
        .initial_instance_count(spec.initial_instance_count)
        .initial_variant_weight(spec.initial_variant_weight)
        .build()
}

/// The manifest's parameters, omitted from the request when the manifest declares none.
pub(crate) fn pipeline_parameters(manifest: &PipelineManifest) -> Option<Vec<Parameter>> {
    if manifest.pipeline_parameters.is_empty() {
        return None;
    }
    let params = manifest
        .pipeline_parameters
        .iter()
        .map(|param| Parameter::builder().name(&param.name).value(&param.value).build())
        .collect();
    Some(params)
}

pub(crate) fn parallelism_configuration(manifest: &PipelineManifest) -> Option<ParallelismConfiguration> {
    manifest.parallelism_configuration.as_ref().map(|cfg| {
        ParallelismConfiguration::builder()
            .max_parallel_execution_steps(cfg.max_parallel_execution_steps)
            .build()
    })
}

pub(crate) fn selective_execution_config(manifest: &PipelineManifest) -> Option<SelectiveExecutionConfig> {
    manifest.selective_execution_config.as_ref().map(|cfg| {
        let steps = cfg
            .selected_steps
            .iter()
            .map(|step| SelectedStep::builder().step_name(&step.step_name).build())
            .collect();
        SelectiveExecutionConfig::builder()
            .set_source_pipeline_execution_arn(cfg.source_pipeline_execution_arn.clone())
            .set_selected_steps(Some(steps))
            .build()
    })
}

/// A unitless datum carrying the measurement's value & dimensions.
pub(crate) fn metric_datum(measurement: &Measurement) -> MetricDatum {
    let dimensions = measurement
        .dimensions
        .iter()
        .map(|(name, value)| Dimension::builder().name(name).value(value).build())
        .collect();
    MetricDatum::builder()
        .metric_name(&measurement.name)
        .unit(StandardUnit::None)
        .set_dimensions(Some(dimensions))
        .value(measurement.value)
        .build()
}
