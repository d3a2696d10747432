use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::chart::{ChartRegistry, ChartSpec, render_text};
use crate::cli::{OutputArgs, OutputFormat};
use crate::controller::PipelineOutcome;
use crate::model::RunManifest;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

pub(super) fn write_charts(charts: &[&ChartSpec], output: &OutputArgs) -> Result<()> {
    let mut stdout = io::BufWriter::new(io::stdout().lock());
    write_charts_to(&mut stdout, charts, output)?;
    stdout.flush()?;
    Ok(())
}

fn write_charts_to(out: &mut impl Write, charts: &[&ChartSpec], output: &OutputArgs) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, charts)
                .context("failed to serialize chart json output")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for (index, chart) in charts.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                write!(out, "{}", render_text(chart, output.width))?;
            }
        }
    }
    Ok(())
}

pub(super) fn write_run_artifacts(
    output_dir: &Path,
    started_ts: DateTime<Utc>,
    started_at: String,
    outcomes: &[PipelineOutcome],
    registry: &ChartRegistry,
) -> Result<PathBuf> {
    let charts_dir = output_dir.join("charts");
    let mut chart_paths = Vec::with_capacity(registry.len());
    for chart in registry.charts() {
        let path = charts_dir.join(format!("{}.json", chart.target.as_str()));
        write_json_pretty(&path, chart)?;
        info!(path = %path.display(), "wrote chart");
        chart_paths.push(path.display().to_string());
    }

    let mut warnings = Vec::new();
    if registry.is_empty() {
        warnings.push("no chart was bound during the run".to_string());
    }
    for outcome in outcomes {
        if outcome.aggregation.empty_groups > 0 {
            warnings.push(format!(
                "{} by {}: {} group(s) without numeric {} values",
                outcome.request.target.as_str(),
                outcome.request.category.as_str(),
                outcome.aggregation.empty_groups,
                outcome.request.metric.as_str(),
            ));
        }
    }
    if let Some(outcome) = outcomes.first() {
        for column in &outcome.dataset.missing_columns {
            warnings.push(format!("dataset is missing column `{column}`"));
        }
    }

    let manifest = RunManifest {
        manifest_version: 1,
        run_id: format!("run-{}", utc_compact_string(started_ts)),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: std::env::args().collect::<Vec<_>>().join(" "),
        dataset: outcomes.first().map(|outcome| outcome.dataset.clone()),
        charts: outcomes.iter().map(PipelineOutcome::run_entry).collect(),
        chart_paths,
        warnings,
    };

    let manifest_path = output_dir.join("manifests").join(format!(
        "run_{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), run_id = %manifest.run_id, "wrote run manifest");

    Ok(manifest_path)
}
