use std::sync::Arc;

use anyhow::Result;
use mlops_core::fixtures::{MemoryControlPlane, MemoryStore};
use mlops_core::models::{PipelineParameter, S3Notification};
use mlops_core::{AppError, S3Uri};

use crate::handler::TrainingTrigger;

fn trigger() -> (Arc<MemoryStore>, Arc<MemoryControlPlane>, TrainingTrigger) {
    let (store, launcher) = (Arc::new(MemoryStore::default()), Arc::new(MemoryControlPlane::default()));
    let trigger = TrainingTrigger::new(store.clone(), launcher.clone());
    (store, launcher, trigger)
}

fn notification(bucket: &str, key: &str) -> Result<S3Notification> {
    let event = serde_json::json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {"name": bucket, "arn": format!("arn:aws:s3:::{}", bucket)},
                "object": {"key": key, "size": 128, "eTag": "0123456789abcdef0123456789abcdef"},
            },
        }],
    });
    Ok(serde_json::from_value(event)?)
}

#[tokio::test]
async fn handle_starts_pipeline_with_manifest_verbatim() -> Result<()> {
    let (store, launcher, trigger) = trigger();
    let manifest = r#"{
        "PipelineName": "p1",
        "PipelineParameters": [
            {"Name": "TrainingInstanceType", "Value": "ml.g4dn.xlarge"},
            {"Name": "Epochs", "Value": "20"}
        ],
        "PipelineExecutionDisplayName": "nightly",
        "ClientRequestToken": "nightly-2026-10-18"
    }"#;
    store.insert(&S3Uri::new("mlops-bucket", "manifests/ncf v2/pipeline=manifest.json"), manifest);

    let res = trigger.handle(notification("mlops-bucket", "manifests/ncf+v2/pipeline%3Dmanifest.json")?).await?;

    assert!(res.status_code == 200, "expected the start call's status code 200, got {}", res.status_code);
    let executions = launcher.executions.lock().unwrap();
    assert!(executions.len() == 1, "expected exactly 1 execution, got {}", executions.len());
    let started = &executions[0];
    assert!(started.pipeline_name == "p1", "expected pipeline p1, got {}", started.pipeline_name);
    let expected_params = vec![
        PipelineParameter {
            name: "TrainingInstanceType".into(),
            value: "ml.g4dn.xlarge".into(),
        },
        PipelineParameter {
            name: "Epochs".into(),
            value: "20".into(),
        },
    ];
    assert!(started.pipeline_parameters == expected_params, "expected parameters verbatim, got {:?}", started.pipeline_parameters);
    assert!(
        started.client_request_token.as_deref() == Some("nightly-2026-10-18"),
        "expected request token verbatim, got {:?}",
        started.client_request_token
    );

    let body: serde_json::Value = serde_json::from_str(&res.body)?;
    let arn = "arn:aws:sagemaker:us-east-1:123456789012:pipeline/p1/execution/1";
    assert!(body["PipelineExecutionArn"] == arn, "expected execution arn {}, got {}", arn, body["PipelineExecutionArn"]);
    let status = &body["ResponseMetadata"]["HTTPStatusCode"];
    assert!(*status == 200, "expected serialized status code 200, got {}", status);

    Ok(())
}

#[tokio::test]
async fn handle_fails_for_missing_manifest() -> Result<()> {
    let (_store, launcher, trigger) = trigger();

    let res = trigger.handle(notification("mlops-bucket", "manifests/missing.json")?).await;

    let is_missing = matches!(res.as_ref().err().and_then(|err| err.downcast_ref::<AppError>()), Some(AppError::ObjectNotFound(_)));
    assert!(is_missing, "expected object not found error, got {:?}", res.err());
    assert!(launcher.call_count("start_pipeline_execution") == 0, "expected no pipeline execution");

    Ok(())
}

#[tokio::test]
async fn handle_rejects_notifications_without_records() -> Result<()> {
    let (_store, _launcher, trigger) = trigger();

    let res = trigger.handle(serde_json::from_str(r#"{"Records": []}"#)?).await;

    let is_invalid = matches!(res.as_ref().err().and_then(|err| err.downcast_ref::<AppError>()), Some(AppError::InvalidInput(_)));
    assert!(is_invalid, "expected invalid input error, got {:?}", res.err());

    Ok(())
}

#[tokio::test]
async fn handle_rejects_manifests_outside_the_api_contract() -> Result<()> {
    let (store, launcher, trigger) = trigger();
    store.insert(&S3Uri::new("mlops-bucket", "manifests/typo.json"), r#"{"PipelineName": "p1", "PipelineParams": []}"#);
    store.insert(&S3Uri::new("mlops-bucket", "manifests/empty.json"), r#"{"PipelineName": ""}"#);

    for key in ["manifests/typo.json", "manifests/empty.json"] {
        let res = trigger.handle(notification("mlops-bucket", key)?).await;
        assert!(res.is_err(), "expected manifest {} to be rejected", key);
    }
    assert!(launcher.call_count("start_pipeline_execution") == 0, "expected no pipeline execution");

    Ok(())
}

#[tokio::test]
async fn handle_propagates_start_failures() -> Result<()> {
    let (store, launcher, trigger) = trigger();
    launcher.pipelines.lock().unwrap().insert("p1".into());
    store.insert(&S3Uri::new("mlops-bucket", "manifests/p2.json"), r#"{"PipelineName": "p2"}"#);

    let res = trigger.handle(notification("mlops-bucket", "manifests/p2.json")?).await;

    let err = res.err().map(|err| format!("{:#}", err)).unwrap_or_default();
    assert!(err.contains("error starting execution of pipeline p2"), "expected start failure with context, got {:?}", err);

    Ok(())
}

#[tokio::test]
async fn handle_forwards_version_and_selective_execution() -> Result<()> {
    let (store, launcher, trigger) = trigger();
    let manifest = r#"{
        "PipelineName": "p1",
        "PipelineVersionId": 2,
        "SelectiveExecutionConfig": {"SelectedSteps": [{"StepName": "Evaluate"}]}
    }"#;
    store.insert(&S3Uri::new("mlops-bucket", "manifests/rerun.json"), manifest);

    let res = trigger.handle(notification("mlops-bucket", "manifests/rerun.json")?).await?;

    assert!(res.status_code == 200, "expected status 200, got {}", res.status_code);
    let executions = launcher.executions.lock().unwrap();
    let started = &executions[0];
    assert!(started.pipeline_version_id == Some(2), "expected pipeline version 2, got {:?}", started.pipeline_version_id);
    let steps: Vec<_> = started
        .selective_execution_config
        .iter()
        .flat_map(|cfg| cfg.selected_steps.iter().map(|step| step.step_name.as_str()))
        .collect();
    assert!(steps == vec!["Evaluate"], "expected selected step Evaluate, got {:?}", steps);

    Ok(())
}
