use anyhow::Result;
use aws_sdk_cloudwatch::types::StandardUnit;

use crate::clients::aws::*;
use crate::clients::{EndpointConfigSpec, Measurement, ModelSpec, VARIANT_ALL_TRAFFIC};
use crate::models::PipelineManifest;

#[test]
fn container_definition_carries_image_and_artifact() {
    let spec = ModelSpec {
        name: "ncf-v3".into(),
        image: "763104351884.dkr.ecr.us-east-1.amazonaws.com/pytorch-inference:2.1-cpu-py310".into(),
        model_data_url: Some("s3://mlops-bucket/ncf/v3/model.tar.gz".into()),
        execution_role_arn: "arn:aws:iam::123456789012:role/sagemaker-exec".into(),
    };

    let container = container_definition(&spec);

    assert_eq!(container.image(), Some(spec.image.as_str()), "unexpected image, got {:?}", container.image());
    assert_eq!(
        container.model_data_url(),
        Some("s3://mlops-bucket/ncf/v3/model.tar.gz"),
        "unexpected model data url, got {:?}",
        container.model_data_url()
    );
}

#[test]
fn production_variant_is_single_instance_all_traffic() {
    let variant = production_variant(&EndpointConfigSpec::single_instance("ncf-v3-cfg", "ncf-v3", "ml.m5.large"));

    assert_eq!(variant.variant_name(), Some(VARIANT_ALL_TRAFFIC), "unexpected variant name, got {:?}", variant.variant_name());
    assert_eq!(variant.model_name(), Some("ncf-v3"), "unexpected model name, got {:?}", variant.model_name());
    let instance_type = variant.instance_type().map(|t| t.as_str());
    assert_eq!(instance_type, Some("ml.m5.large"), "unexpected instance type, got {:?}", instance_type);
    assert_eq!(variant.initial_instance_count(), Some(1), "expected 1 initial instance");
    assert_eq!(variant.initial_variant_weight(), Some(1.0), "expected initial variant weight 1.0");
}

#[test]
fn pipeline_request_parts_mirror_manifest() -> Result<()> {
    let manifest = PipelineManifest::from_slice(
        br#"{
            "PipelineName": "p1",
            "PipelineParameters": [{"Name": "Epochs", "Value": "20"}],
            "ParallelismConfiguration": {"MaxParallelExecutionSteps": 4},
            "PipelineVersionId": 3,
            "SelectiveExecutionConfig": {
                "SourcePipelineExecutionArn": "arn:aws:sagemaker:us-east-1:123456789012:pipeline/p1/execution/abc",
                "SelectedSteps": [{"StepName": "Train"}, {"StepName": "Evaluate"}]
            }
        }"#,
    )?;

    let params = pipeline_parameters(&manifest).unwrap_or_default();
    assert_eq!(params.len(), 1, "expected 1 parameter, got {:?}", params);
    assert_eq!(params[0].name(), Some("Epochs"), "unexpected parameter name, got {:?}", params[0].name());
    assert_eq!(params[0].value(), Some("20"), "unexpected parameter value, got {:?}", params[0].value());

    let parallelism = parallelism_configuration(&manifest).map(|cfg| cfg.max_parallel_execution_steps());
    assert_eq!(parallelism, Some(Some(4)), "unexpected parallelism, got {:?}", parallelism);

    let selective = selective_execution_config(&manifest);
    let source = selective.as_ref().and_then(|cfg| cfg.source_pipeline_execution_arn());
    assert_eq!(
        source,
        Some("arn:aws:sagemaker:us-east-1:123456789012:pipeline/p1/execution/abc"),
        "unexpected source execution, got {:?}",
        source
    );
    let steps: Vec<_> = selective
        .iter()
        .flat_map(|cfg| cfg.selected_steps().iter().filter_map(|step| step.step_name()))
        .collect();
    assert_eq!(steps, vec!["Train", "Evaluate"], "unexpected selected steps, got {:?}", steps);
    Ok(())
}

#[test]
fn pipeline_request_parts_omit_absent_fields() -> Result<()> {
    let manifest = PipelineManifest::from_slice(br#"{"PipelineName": "p1"}"#)?;

    assert!(pipeline_parameters(&manifest).is_none(), "expected no parameters in the request");
    assert!(parallelism_configuration(&manifest).is_none(), "expected no parallelism configuration in the request");
    assert!(selective_execution_config(&manifest).is_none(), "expected no selective execution config in the request");
    Ok(())
}

#[test]
fn metric_datum_is_unitless_with_dimensions() {
    let datum = metric_datum(&Measurement::new("HR", 0.42, ("ModelPackageGroup", "ncf")));

    assert_eq!(datum.metric_name(), Some("HR"), "unexpected metric name, got {:?}", datum.metric_name());
    assert_eq!(datum.value(), Some(0.42), "unexpected value, got {:?}", datum.value());
    assert_eq!(datum.unit(), Some(&StandardUnit::None), "expected a unitless datum, got {:?}", datum.unit());
    let dimensions: Vec<_> = datum.dimensions().iter().map(|dim| (dim.name(), dim.value())).collect();
    assert_eq!(dimensions, vec![(Some("ModelPackageGroup"), Some("ncf"))], "unexpected dimensions, got {:?}", dimensions);
}
