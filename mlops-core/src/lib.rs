//! Shared building blocks of the MLOps Lambda functions.
//!
//! Each function crate owns its handler and runtime config, everything which is shared between
//! them lives here: the event & response models, the resource naming convention, S3 URI
//! handling, training artifact extraction, and the traits which abstract over the managed
//! services the functions call.

pub mod archive;
pub mod clients;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fixtures;
pub mod models;
pub mod naming;
#[cfg(test)]
mod naming_test;
pub mod s3uri;
pub mod telemetry;

pub use error::AppError;
pub use naming::ResourceNames;
pub use s3uri::S3Uri;
