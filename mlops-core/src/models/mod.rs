//! Event & payload models.
//!
//! These mirror the JSON documents which the Lambda service, EventBridge, S3 and the training
//! jobs hand to the functions. Only the fields the functions act upon are modelled.

mod apigw;
mod approval;
mod manifest;
mod metrics;
mod notification;

pub use apigw::{ProxyRequest, ProxyResponse, HEADER_ALLOW_ORIGIN};
pub use approval::{ContainerSpec, InferenceSpecification, ModelPackageDetail, ModelPackageStateChange, APPROVAL_STATUS_APPROVED};
pub use manifest::{ParallelismConfiguration, PipelineManifest, PipelineParameter, SelectedStep, SelectiveExecutionConfig};
pub use metrics::{MetricValue, MetricsReport, METRIC_BEST_HR, METRIC_BEST_NDCG};
pub use notification::{S3Bucket, S3Entity, S3EventRecord, S3Notification, S3Object};
