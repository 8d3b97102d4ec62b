use anyhow::Result;

use super::config::*;

#[test]
fn config_deserializes_from_full_env() -> Result<()> {
    let config: Config = envy::from_iter(vec![
        ("RUST_LOG".into(), "debug".into()),
        ("SAGEMAKER_ENDPOINT_NAME".into(), "ncf-endpoint".into()),
        ("CONTENT_TYPE".into(), "text/csv".into()),
    ])?;

    assert!(config.rust_log == "debug", "unexpected value parsed for RUST_LOG, got {}, expected {}", config.rust_log, "debug");
    assert!(
        config.sagemaker_endpoint_name == "ncf-endpoint",
        "unexpected value parsed for SAGEMAKER_ENDPOINT_NAME, got {}, expected {}",
        config.sagemaker_endpoint_name,
        "ncf-endpoint"
    );
    assert!(
        config.content_type == "text/csv",
        "unexpected value parsed for CONTENT_TYPE, got {}, expected {}",
        config.content_type,
        "text/csv"
    );

    Ok(())
}

#[test]
fn config_deserializes_from_sparse_env() -> Result<()> {
    let config: Config = envy::from_iter(vec![("SAGEMAKER_ENDPOINT_NAME".into(), "ncf-endpoint".into())])?;

    assert!(config.rust_log == "info", "unexpected default for RUST_LOG, got {}, expected {}", config.rust_log, "info");
    assert!(
        config.content_type == "application/json",
        "unexpected default for CONTENT_TYPE, got {}, expected {}",
        config.content_type,
        "application/json"
    );

    Ok(())
}

#[test]
fn config_requires_endpoint_name() {
    let res = envy::from_iter::<_, Config>(vec![("RUST_LOG".into(), "info".into())]);
    assert!(res.is_err(), "expected a missing SAGEMAKER_ENDPOINT_NAME to be rejected");
}
