use serde::Deserialize;

use crate::error::AppError;
use crate::s3uri::S3Uri;

/// An S3 event notification.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Clone, Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Clone, Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct S3Object {
    /// The object key, URL encoded as delivered by S3.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl S3EventRecord {
    /// The location of the object this record refers to, with the key URL decoded.
    pub fn object_uri(&self) -> Result<S3Uri, AppError> {
        // S3 form-encodes keys, spaces arrive as `+`.
        let plus_decoded = self.s3.object.key.replace('+', " ");
        let key = urlencoding::decode(&plus_decoded)
            .map_err(|err| AppError::InvalidInput(format!("invalid object key {:?} in S3 notification: {}", self.s3.object.key, err)))?;
        Ok(S3Uri::new(self.s3.bucket.name.clone(), key.into_owned()))
    }
}
