use serde::Deserialize;

use crate::error::AppError;

/// The approval status which makes a model package eligible for deployment.
pub const APPROVAL_STATUS_APPROVED: &str = "Approved";

/// An EventBridge `SageMaker Model Package State Change` event.
///
/// See https://docs.aws.amazon.com/sagemaker/latest/dg/automating-sagemaker-with-eventbridge.html#eventbridge-model-package
#[derive(Clone, Debug, Deserialize)]
pub struct ModelPackageStateChange {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "detail-type", default)]
    pub detail_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub detail: ModelPackageDetail,
}

/// The model package described by a state change event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelPackageDetail {
    pub model_package_group_name: String,
    pub model_package_version: u64,
    #[serde(default)]
    pub model_package_arn: Option<String>,
    #[serde(default)]
    pub model_approval_status: Option<String>,
    pub inference_specification: InferenceSpecification,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InferenceSpecification {
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub supported_realtime_inference_instance_types: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    pub image: String,
    #[serde(default)]
    pub model_data_url: Option<String>,
}

impl ModelPackageDetail {
    /// Whether this package has been approved for deployment.
    ///
    /// Events without an approval status are treated as approved, routing rules only deliver
    /// approvals to the provisioner.
    pub fn is_approved(&self) -> bool {
        self.model_approval_status.as_deref().map_or(true, |status| status == APPROVAL_STATUS_APPROVED)
    }

    /// The primary inference container of this package.
    pub fn primary_container(&self) -> Result<&ContainerSpec, AppError> {
        self.inference_specification.containers.first().ok_or_else(|| {
            AppError::InvalidInput(format!(
                "model package {} v{} declares no inference containers",
                self.model_package_group_name, self.model_package_version
            ))
        })
    }

    /// The realtime instance type used for hosting this package.
    pub fn instance_type(&self) -> Result<&str, AppError> {
        self.inference_specification
            .supported_realtime_inference_instance_types
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "model package {} v{} declares no realtime inference instance types",
                    self.model_package_group_name, self.model_package_version
                ))
            })
    }
}
