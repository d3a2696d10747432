use std::fs;

use tempfile::tempdir;

use super::*;
use crate::aggregate::EmptyGroupPolicy;
use crate::cli::{OutputArgs, OutputFormat, PipelineArgs};
use crate::normalize::IssuePolicy;

const SAMPLE: &str = "\
female,class,eval_workshop,eval_instructor,target,perform
0,1,4,5,0,1
1,3,5,3,1,0
1,9,N/A,4,1,1
";

#[test]
fn dashboard_fires_every_trigger_and_writes_both_charts() {
    let tmp = tempdir().expect("tempdir should be created");
    let data = tmp.path().join("website_data.csv");
    fs::write(&data, SAMPLE).expect("sample csv should be written");
    let output_dir = tmp.path().join("out");

    let args = DashboardArgs {
        pipeline: PipelineArgs {
            data,
            on_issue: IssuePolicy::Default,
            empty_groups: EmptyGroupPolicy::Drop,
        },
        output: OutputArgs {
            format: OutputFormat::Json,
            width: 72,
            write: true,
            output_dir: output_dir.clone(),
        },
    };
    run(args).expect("dashboard should succeed");

    assert!(output_dir.join("charts").join("chart.json").exists());
    assert!(output_dir.join("charts").join("instructorChart.json").exists());

    let manifests: Vec<_> = fs::read_dir(output_dir.join("manifests"))
        .expect("manifest directory should exist")
        .map(|entry| entry.expect("manifest entry should be readable").path())
        .collect();
    assert_eq!(manifests.len(), 1);

    let raw = fs::read_to_string(&manifests[0]).expect("manifest should be readable");
    let manifest: serde_json::Value =
        serde_json::from_str(&raw).expect("manifest should be valid json");
    let charts = manifest["charts"].as_array().expect("charts should be an array");
    assert_eq!(charts.len(), Trigger::ALL.len());
    assert_eq!(charts[1]["trigger"], "classBtn");
    assert_eq!(charts[1]["normalization"]["rows_defaulted"], 1);
    assert_eq!(charts[1]["aggregation"]["empty_group_policy"], "drop");
    assert_eq!(charts[1]["aggregation"]["empty_groups"], 0);
    assert_eq!(
        charts
            .iter()
            .filter(|chart| chart["replaced_existing"] == true)
            .count(),
        6
    );
    assert_eq!(manifest["warnings"], serde_json::json!([]));
}

#[test]
fn dashboard_fails_when_dataset_is_missing() {
    let tmp = tempdir().expect("tempdir should be created");
    let args = DashboardArgs {
        pipeline: PipelineArgs {
            data: tmp.path().join("absent.csv"),
            on_issue: IssuePolicy::Default,
            empty_groups: EmptyGroupPolicy::Keep,
        },
        output: OutputArgs {
            format: OutputFormat::Text,
            width: 72,
            write: true,
            output_dir: tmp.path().join("out"),
        },
    };

    let error = run(args).expect_err("missing dataset should fail");
    assert!(error.to_string().contains("failed to load dataset"));
    assert!(!tmp.path().join("out").exists());
}
