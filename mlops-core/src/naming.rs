//! The naming convention of hosted model resources.
//!
//! Every resource created for an approved model package is named deterministically from the
//! package group name and version, which is what makes re-processing an approval event safe.

use std::fmt::Display;

/// The suffix of endpoint configuration names.
const ENDPOINT_CONFIG_SUFFIX: &str = "-cfg";
/// The suffix of endpoint names.
const ENDPOINT_SUFFIX: &str = "-endpoint";

/// The names of all hosting resources derived from a model package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceNames {
    /// The model name, `{group}-v{version}`.
    pub model: String,
    /// The endpoint configuration name, `{group}-v{version}-cfg`.
    pub endpoint_config: String,
    /// The endpoint name, `{group}-endpoint`.
    ///
    /// This is version independent, new versions are rolled out onto the same endpoint.
    pub endpoint: String,
}

impl ResourceNames {
    /// Derive the resource names for the given model package group & version.
    pub fn derive(group: &str, version: impl Display) -> Self {
        let model = model_name(group, version);
        Self {
            endpoint_config: format!("{}{}", model, ENDPOINT_CONFIG_SUFFIX),
            endpoint: endpoint_name(group),
            model,
        }
    }
}

/// The model name of the given model package group & version.
pub fn model_name(group: &str, version: impl Display) -> String {
    format!("{}-v{}", group, version)
}

/// The endpoint name of the given model package group.
pub fn endpoint_name(group: &str) -> String {
    format!("{}{}", group, ENDPOINT_SUFFIX)
}
