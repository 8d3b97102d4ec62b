use rand::prelude::*;

use crate::naming::{endpoint_name, model_name, ResourceNames};

#[test]
fn derive_names_for_group_and_version() {
    let names = ResourceNames::derive("recsys", 3);

    assert_eq!(names.model, "recsys-v3", "unexpected model name, got {}", names.model);
    assert_eq!(names.endpoint_config, "recsys-v3-cfg", "unexpected endpoint config name, got {}", names.endpoint_config);
    assert_eq!(names.endpoint, "recsys-endpoint", "unexpected endpoint name, got {}", names.endpoint);
}

#[test]
fn derive_names_is_deterministic() {
    let version = rand::thread_rng().gen_range(1u64..10_000u64);
    let (n0, n1) = (ResourceNames::derive("ncf", version), ResourceNames::derive("ncf", version));

    assert_eq!(n0, n1, "expected identical names for identical input, got {:?} and {:?}", n0, n1);
    assert_eq!(n0.model, model_name("ncf", version), "expected derive to agree with model_name");
    assert_eq!(n0.endpoint, endpoint_name("ncf"), "expected derive to agree with endpoint_name");
}

#[test]
fn derive_names_distinct_per_version_shared_endpoint() {
    let (v1, v10) = (ResourceNames::derive("ncf", 1), ResourceNames::derive("ncf", 10));

    assert_ne!(v1.model, v10.model, "expected model names to differ across versions");
    assert_ne!(v1.endpoint_config, v10.endpoint_config, "expected endpoint config names to differ across versions");
    assert_eq!(v1.endpoint, v10.endpoint, "expected the endpoint to be shared across versions");
}
