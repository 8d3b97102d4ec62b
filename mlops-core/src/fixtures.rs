//! In-memory client implementations & archive builders for tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::clients::{
    EndpointConfigSpec, HostingControlPlane, InferenceRuntime, Measurement, MetricSink, ModelSpec, ObjectStore, PipelineExecution, PipelineLauncher,
    ResponseMetadata,
};
use crate::models::PipelineManifest;
use crate::s3uri::S3Uri;

/// Write a gzipped tarball at `dest` containing the given `(path, contents)` entries.
pub fn write_tar_gz(dest: &Path, entries: &[(&str, &[u8])]) -> Result<()> {
    let data = tar_gz_bytes(entries)?;
    std::fs::write(dest, data).context("error writing test archive")
}

/// Build a gzipped tarball in memory containing the given `(path, contents)` entries.
pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).context("error appending test archive entry")?;
    }
    builder
        .into_inner()
        .context("error finishing test archive")?
        .finish()
        .context("error finishing test archive compression")
}

//////////////////////////////////////////////////////////////////////////////
// Object Storage ////////////////////////////////////////////////////////////

/// An in-memory object store.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<S3Uri, Vec<u8>>>,
}

impl MemoryStore {
    /// Store an object.
    pub fn insert(&self, uri: &S3Uri, body: impl Into<Vec<u8>>) {
        self.objects.lock().unwrap().insert(uri.clone(), body.into());
    }

    /// The contents of an object, if stored.
    pub fn object(&self, uri: &S3Uri) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(uri).cloned()
    }

    /// All stored object locations.
    pub fn uris(&self) -> Vec<S3Uri> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, uri: &S3Uri) -> Result<Option<Vec<u8>>> {
        Ok(self.object(uri))
    }

    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> Result<()> {
        self.insert(uri, body);
        Ok(())
    }
}

//////////////////////////////////////////////////////////////////////////////
// Inference Runtime /////////////////////////////////////////////////////////

/// An inference runtime which answers every invocation with a canned response.
pub struct StaticRuntime {
    response: Option<Vec<u8>>,
    /// All invocations as `(endpoint, content_type, body)`.
    pub invocations: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl StaticRuntime {
    /// A runtime which responds with `response`.
    pub fn responding(response: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Some(response.into()),
            invocations: Default::default(),
        }
    }

    /// A runtime whose endpoint always faults.
    pub fn failing() -> Self {
        Self {
            response: None,
            invocations: Default::default(),
        }
    }
}

#[async_trait]
impl InferenceRuntime for StaticRuntime {
    async fn invoke_endpoint(&self, endpoint: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        self.invocations
            .lock()
            .unwrap()
            .push((endpoint.to_string(), content_type.to_string(), body));
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => bail!("ModelError: received server error (500) from primary while invoking endpoint {}", endpoint),
        }
    }
}

//////////////////////////////////////////////////////////////////////////////
// Control Plane /////////////////////////////////////////////////////////////

/// An in-memory hosting control plane & pipeline service.
#[derive(Default)]
pub struct MemoryControlPlane {
    pub models: Mutex<BTreeMap<String, ModelSpec>>,
    pub endpoint_configs: Mutex<BTreeMap<String, EndpointConfigSpec>>,
    /// Endpoints mapped to their current endpoint config.
    pub endpoints: Mutex<BTreeMap<String, String>>,
    /// The names of all mutating calls, in order.
    pub calls: Mutex<Vec<String>>,
    /// Started pipeline executions.
    pub executions: Mutex<Vec<PipelineManifest>>,
    /// Pipelines which exist; when empty any pipeline name is accepted.
    pub pipelines: Mutex<BTreeSet<String>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryControlPlane {
    /// Make every call of the named operation fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(operation) {
            bail!("ValidationException: injected failure of {}", operation);
        }
        self.calls.lock().unwrap().push(operation.to_string());
        Ok(())
    }

    /// The number of recorded calls of the named operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| *call == operation).count()
    }
}

#[async_trait]
impl HostingControlPlane for MemoryControlPlane {
    async fn model_exists(&self, name: &str) -> Result<bool> {
        Ok(self.models.lock().unwrap().contains_key(name))
    }

    async fn create_model(&self, spec: &ModelSpec) -> Result<()> {
        self.record("create_model")?;
        let mut models = self.models.lock().unwrap();
        if models.contains_key(&spec.name) {
            bail!("ValidationException: cannot create already existing model {}", spec.name);
        }
        models.insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn endpoint_config_exists(&self, name: &str) -> Result<bool> {
        Ok(self.endpoint_configs.lock().unwrap().contains_key(name))
    }

    async fn create_endpoint_config(&self, spec: &EndpointConfigSpec) -> Result<()> {
        self.record("create_endpoint_config")?;
        let mut configs = self.endpoint_configs.lock().unwrap();
        if configs.contains_key(&spec.name) {
            bail!("ValidationException: cannot create already existing endpoint configuration {}", spec.name);
        }
        configs.insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn endpoint_exists(&self, name: &str) -> Result<bool> {
        Ok(self.endpoints.lock().unwrap().contains_key(name))
    }

    async fn update_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()> {
        self.record("update_endpoint")?;
        match self.endpoints.lock().unwrap().get_mut(endpoint) {
            Some(current) => *current = endpoint_config.to_string(),
            None => bail!("ValidationException: could not find endpoint {}", endpoint),
        }
        Ok(())
    }

    async fn create_endpoint(&self, endpoint: &str, endpoint_config: &str) -> Result<()> {
        self.record("create_endpoint")?;
        let mut endpoints = self.endpoints.lock().unwrap();
        if endpoints.contains_key(endpoint) {
            bail!("ValidationException: cannot create already existing endpoint {}", endpoint);
        }
        endpoints.insert(endpoint.to_string(), endpoint_config.to_string());
        Ok(())
    }
}

#[async_trait]
impl PipelineLauncher for MemoryControlPlane {
    async fn start_pipeline_execution(&self, manifest: &PipelineManifest) -> Result<PipelineExecution> {
        self.record("start_pipeline_execution")?;
        {
            let pipelines = self.pipelines.lock().unwrap();
            if !pipelines.is_empty() && !pipelines.contains(&manifest.pipeline_name) {
                bail!("ResourceNotFound: pipeline {} does not exist", manifest.pipeline_name);
            }
        }
        let mut executions = self.executions.lock().unwrap();
        executions.push(manifest.clone());
        Ok(PipelineExecution {
            pipeline_execution_arn: Some(format!(
                "arn:aws:sagemaker:us-east-1:123456789012:pipeline/{}/execution/{}",
                manifest.pipeline_name,
                executions.len()
            )),
            response_metadata: ResponseMetadata {
                request_id: Some(format!("request-{}", executions.len())),
                http_status_code: 200,
            },
        })
    }
}

//////////////////////////////////////////////////////////////////////////////
// Metrics ///////////////////////////////////////////////////////////////////

/// A metric sink which records every measurement with its namespace.
#[derive(Default)]
pub struct MemorySink {
    pub measurements: Mutex<Vec<(String, Measurement)>>,
}

#[async_trait]
impl MetricSink for MemorySink {
    async fn put_measurement(&self, namespace: &str, measurement: &Measurement) -> Result<()> {
        self.measurements
            .lock()
            .unwrap()
            .push((namespace.to_string(), measurement.clone()));
        Ok(())
    }
}
