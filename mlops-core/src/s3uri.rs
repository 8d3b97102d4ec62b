//! S3 object locations.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The URI scheme of S3 object locations.
const S3_SCHEME: &str = "s3://";

/// The location of an object, or of a key prefix, within an S3 bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct S3Uri {
    /// The bucket name.
    pub bucket: String,
    /// The object key, without any leading `/`. May be empty when addressing a bucket root.
    pub key: String,
}

impl S3Uri {
    /// Create a new instance.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The location of `name` directly beneath this location.
    pub fn join(&self, name: &str) -> Self {
        let (prefix, name) = (self.key.trim_end_matches('/'), name.trim_start_matches('/'));
        let key = if prefix.is_empty() { name.to_string() } else { format!("{}/{}", prefix, name) };
        Self::new(self.bucket.clone(), key)
    }
}

impl FromStr for S3Uri {
    type Err = AppError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let rest = uri
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| AppError::InvalidInput(format!("expected an {} URI, got {:?}", S3_SCHEME, uri)))?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(AppError::InvalidInput(format!("S3 URI {:?} has no bucket", uri)));
        }
        Ok(Self::new(bucket, key.trim_start_matches('/')))
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}
