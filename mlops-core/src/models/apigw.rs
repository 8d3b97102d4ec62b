use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The CORS header attached to every inference response.
pub const HEADER_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

/// An API Gateway Lambda proxy integration request.
///
/// Both REST (v1) and HTTP (v2) payload formats carry the body under the same fields.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// The raw request body, if any.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether API Gateway base64 encoded the body.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyRequest {
    /// The request body as raw bytes, decoding base64 bodies.
    ///
    /// Requests without a body are invalid, an empty body is forwarded as is.
    pub fn payload(&self) -> Result<Vec<u8>> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("inference request carries no body".into()))?;
        if self.is_base64_encoded {
            base64::decode(body).context("error decoding base64 request body")
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

/// An API Gateway Lambda proxy integration response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// A 200 response carrying `body` verbatim, open to any origin.
    ///
    /// Bodies which are not valid UTF-8 are base64 encoded so that they survive the trip through
    /// API Gateway unchanged.
    pub fn ok_with_cors(body: Vec<u8>) -> Self {
        let (body, is_base64_encoded) = match String::from_utf8(body) {
            Ok(body) => (body, false),
            Err(err) => (base64::encode(err.into_bytes()), true),
        };
        let mut headers = BTreeMap::new();
        headers.insert(HEADER_ALLOW_ORIGIN.to_string(), "*".to_string());
        Self {
            status_code: 200,
            headers,
            body,
            is_base64_encoded,
        }
    }
}
