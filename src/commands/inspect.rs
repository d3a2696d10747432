use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{AggregationStats, aggregate};
use crate::cli::InspectArgs;
use crate::model::{CategoryField, DatasetInfo, MetricField};
use crate::normalize::{NormalizationReport, Normalizer};
use crate::source::load_dataset;

#[derive(Debug, Serialize)]
struct MetricCoverage {
    metric: String,
    stats: AggregationStats,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    dataset: DatasetInfo,
    normalization: NormalizationReport,
    metrics: Vec<MetricCoverage>,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let options = args.pipeline.options();
    let dataset = load_dataset(&args.pipeline.data)
        .with_context(|| format!("failed to load dataset {}", args.pipeline.data.display()))?;

    let (records, normalization) =
        Normalizer::new(options.issue_policy).normalize_all(&dataset.rows);
    let metrics = [MetricField::EvalWorkshop, MetricField::EvalInstructor]
        .into_iter()
        .map(|metric| MetricCoverage {
            metric: metric.as_str().to_string(),
            stats: aggregate(&records, CategoryField::Gender, metric, options.empty_groups).stats,
        })
        .collect();

    let report = InspectReport {
        dataset: dataset.info(),
        normalization,
        metrics,
    };
    info!(rows = report.dataset.row_count, "inspection completed");

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize inspect json output")?;
        writeln!(output)?;
    } else {
        write_text_report(&mut output, &report)?;
    }
    output.flush()?;

    Ok(())
}

fn write_text_report(output: &mut impl Write, report: &InspectReport) -> Result<()> {
    writeln!(output, "Dataset: {}", report.dataset.path)?;
    writeln!(
        output,
        "Rows: {} sha256={}",
        report.dataset.row_count, report.dataset.sha256
    )?;
    if !report.dataset.missing_columns.is_empty() {
        writeln!(
            output,
            "Missing columns: {}",
            report.dataset.missing_columns.join(",")
        )?;
    }

    let normalization = &report.normalization;
    writeln!(
        output,
        "Normalization: policy={} kept={} defaulted={} rejected={}",
        normalization.policy,
        normalization.rows_kept,
        normalization.rows_defaulted,
        normalization.rows_rejected,
    )?;
    writeln!(
        output,
        "Issues: missing_field={} unmapped_code={}",
        normalization.missing_field_issues, normalization.unmapped_code_issues,
    )?;

    for coverage in &report.metrics {
        writeln!(
            output,
            "Metric {}: numeric={} non_numeric={}",
            coverage.metric,
            coverage.stats.records_contributing,
            coverage.stats.records_skipped_non_numeric,
        )?;
    }

    Ok(())
}
