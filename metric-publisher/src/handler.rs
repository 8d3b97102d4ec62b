//! Training metric publication.
//!
//! The metrics report of a training run is only available inside the run's output archive. The
//! publisher unpacks the archive into per-invocation scratch space, republishes the report next
//! to the archive & emits its headline values as measurements.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use mlops_core::archive::{self, TRAINING_OUTPUT_ARCHIVE};
use mlops_core::clients::{Measurement, MetricSink, ObjectStore};
use mlops_core::models::MetricsReport;
use mlops_core::{AppError, S3Uri};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The metrics report at the root of every training output archive.
pub const METRICS_FILE: &str = "metrics.json";
/// The measurement name of the best validation hit ratio.
pub const MEASUREMENT_HR: &str = "HR";
/// The measurement name of the best validation NDCG.
pub const MEASUREMENT_NDCG: &str = "NDCG";
/// The dimension identifying the model package group of a measurement.
pub const DIMENSION_MODEL_PACKAGE_GROUP: &str = "ModelPackageGroup";

/// A request to publish the metrics of a training run.
#[derive(Clone, Debug, Deserialize)]
pub struct MetricRequest {
    /// The S3 location of the training run's outputs.
    pub output_path: String,
    /// The metrics file named by the pipeline step, informational only.
    #[serde(default)]
    pub metric_file: String,
    /// The model package group the training run belongs to.
    pub model_package_group: String,
}

/// The result payload of a publication.
#[derive(Clone, Debug, Serialize)]
pub struct MetricResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    #[serde(rename = "S3_Metric_URI")]
    pub s3_metric_uri: String,
}

/// Publishes training metrics.
pub struct MetricPublisher {
    config: Arc<Config>,
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn MetricSink>,
}

impl MetricPublisher {
    /// Create a new instance.
    pub fn new(config: Arc<Config>, store: Arc<dyn ObjectStore>, sink: Arc<dyn MetricSink>) -> Self {
        Self { config, store, sink }
    }

    /// Handle a single publication request.
    #[tracing::instrument(level = "debug", skip(self, request), fields(output_path = %request.output_path))]
    pub async fn handle(&self, request: MetricRequest) -> Result<MetricResponse> {
        tracing::debug!(metric_file = %request.metric_file, group = %request.model_package_group, "received metric publication request");
        let output_uri: S3Uri = request.output_path.parse()?;
        let archive_uri = output_uri.join(TRAINING_OUTPUT_ARCHIVE);

        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .with_context(|| format!("error creating scratch root {}", self.config.scratch_dir.display()))?;
        // Removed when dropped.
        let scratch = tempfile::Builder::new()
            .prefix("metric-publisher-")
            .tempdir_in(&self.config.scratch_dir)
            .context("error creating scratch dir")?;

        let archive_path = self.download_archive(&archive_uri, scratch.path()).await?;
        let extract_dir = scratch.path().join("output");
        archive::unpack(archive_path, extract_dir.clone()).await?;
        archive::log_tree("extracted training output", scratch.path());

        let metrics = tokio::fs::read(extract_dir.join(METRICS_FILE))
            .await
            .with_context(|| format!("error reading {} from {}", METRICS_FILE, archive_uri))?;
        let report: MetricsReport =
            serde_json::from_slice(&metrics).with_context(|| format!("error parsing {} from {}", METRICS_FILE, archive_uri))?;
        let (hit_ratio, ndcg) = (report.best_hit_ratio()?, report.best_ndcg()?);

        let metric_uri = output_uri.join(METRICS_FILE);
        tracing::info!(uri = %metric_uri, "uploading metrics file");
        self.store
            .put_object(&metric_uri, metrics)
            .await
            .with_context(|| format!("error uploading metrics file to {}", metric_uri))?;

        let dimension = (DIMENSION_MODEL_PACKAGE_GROUP, request.model_package_group.as_str());
        for measurement in [Measurement::new(MEASUREMENT_HR, hit_ratio, dimension), Measurement::new(MEASUREMENT_NDCG, ndcg, dimension)] {
            tracing::info!(
                namespace = %self.config.metric_namespace,
                name = %measurement.name,
                value = measurement.value,
                "publishing measurement",
            );
            self.sink
                .put_measurement(&self.config.metric_namespace, &measurement)
                .await
                .with_context(|| format!("error publishing {} measurement", measurement.name))?;
        }

        if let Err(err) = scratch.close() {
            tracing::warn!(error = ?err, "error removing scratch dir");
        }
        Ok(MetricResponse {
            status_code: 200,
            body: format!("Uploading is Done : {}", metric_uri),
            s3_metric_uri: metric_uri.to_string(),
        })
    }

    /// Download the training output archive into `dir`, returning the local archive path.
    async fn download_archive(&self, uri: &S3Uri, dir: &Path) -> Result<PathBuf> {
        tracing::info!(%uri, "downloading training output archive");
        let data = match self.store.get_object(uri).await.with_context(|| format!("error downloading {}", uri))? {
            Some(data) => data,
            None => {
                tracing::warn!(%uri, "training output archive not found");
                return Err(AppError::ArtifactNotFound(uri.to_string()).into());
            }
        };
        let path = dir.join(TRAINING_OUTPUT_ARCHIVE);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("error writing archive to {}", path.display()))?;
        archive::log_tree("downloaded training output", dir);
        Ok(path)
    }
}
