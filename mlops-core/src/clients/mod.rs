//! Clients of the managed services the functions depend upon.
//!
//! Each external collaborator is abstracted by a trait so that handlers receive explicitly
//! constructed client handles. The AWS SDK backed implementations live in `aws`.

pub mod aws;
#[cfg(test)]
mod aws_test;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::PipelineManifest;
use crate::s3uri::S3Uri;

/// The variant name used for the single production variant of an endpoint configuration.
pub const VARIANT_ALL_TRAFFIC: &str = "AllTraffic";

/// Object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetch the contents of an object, returning `None` if the object does not exist.
    async fn get_object(&self, uri: &S3Uri) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any object already stored at the location.
    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> Result<()>;
}

/// The runtime of hosted inference endpoints.
#[async_trait]
pub trait InferenceRuntime: Send + Sync + 'static {
    /// Invoke the named endpoint, returning the raw response body.
    async fn invoke_endpoint(&self, endpoint: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// The control plane of the model hosting service.
#[async_trait]
pub trait HostingControlPlane: Send + Sync + 'static {
    /// Check whether a model with exactly the given name exists.
    async fn model_exists(&self, name: &str) -> Result<bool>;

    /// Register a model.
    async fn create_model(&self, spec: &ModelSpec) -> Result<()>;

    /// Check whether an endpoint configuration with exactly the given name exists.
    async fn endpoint_config_exists(&self, name: &str) -> Result<bool>;

    /// Create an endpoint configuration.
    async fn create_endpoint_config(&self, spec: &EndpointConfigSpec) -> Result<()>;

    /// Check whether an endpoint with exactly the given name exists.
    async fn endpoint_exists(&self, name: &str) -> Result<bool>;

    /// Point an existing endpoint at a new endpoint configuration.
    async fn update_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()>;

    /// Create an endpoint from an endpoint configuration.
    async fn create_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()>;
}

/// The pipeline service.
#[async_trait]
pub trait PipelineLauncher: Send + Sync + 'static {
    /// Start an execution of the pipeline named by the manifest.
    async fn start_pipeline_execution(&self, manifest: &PipelineManifest) -> Result<PipelineExecution>;
}

/// A metrics sink.
#[async_trait]
pub trait MetricSink: Send + Sync + 'static {
    /// Publish a single measurement under the given namespace.
    async fn put_measurement(&self, namespace: &str, measurement: &Measurement) -> Result<()>;
}

/// A model registration request.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    /// The inference container image.
    pub image: String,
    /// The location of the model artifact, if the image does not embed it.
    pub model_data_url: Option<String>,
    /// The role the hosting service assumes on behalf of the model.
    pub execution_role_arn: String,
}

/// An endpoint configuration request, a single variant receiving all traffic.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointConfigSpec {
    pub name: String,
    pub model_name: String,
    pub instance_type: String,
    pub initial_instance_count: i32,
    pub initial_variant_weight: f32,
}

impl EndpointConfigSpec {
    /// A single instance configuration hosting `model_name` on `instance_type`.
    pub fn single_instance(name: &str, model_name: &str, instance_type: &str) -> Self {
        Self {
            name: name.to_string(),
            model_name: model_name.to_string(),
            instance_type: instance_type.to_string(),
            initial_instance_count: 1,
            initial_variant_weight: 1.0,
        }
    }
}

/// A started pipeline execution, serialized in the shape of the API response.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineExecution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_execution_arn: Option<String>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "HTTPStatusCode")]
    pub http_status_code: u16,
}

/// A single named measurement with its dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
    pub dimensions: Vec<(String, String)>,
}

impl Measurement {
    /// A unitless measurement with a single dimension.
    pub fn new(name: &str, value: f64, dimension: (&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            value,
            dimensions: vec![(dimension.0.to_string(), dimension.1.to_string())],
        }
    }
}
