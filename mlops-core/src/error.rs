//! MLOps error abstractions.

use thiserror::Error;

/// Application error variants.
#[derive(Debug, Error)]
pub enum AppError {
    /// The given input was invalid.
    #[error("validation error: {0}")]
    InvalidInput(String),
    /// The requested object does not exist in object storage.
    #[error("the object {0} does not exist")]
    ObjectNotFound(String),
    /// The training output archive does not exist or could not be downloaded.
    #[error("training output artifact {0} not found")]
    ArtifactNotFound(String),
    /// A required field is missing from a metrics report.
    #[error("metrics report is missing the {0} metric")]
    MissingMetric(String),
}
