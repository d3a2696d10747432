use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::{AggregationStats, EmptyGroupPolicy, aggregate};
use crate::chart::{ChartRegistry, ChartSpec};
use crate::model::{ChartRunEntry, DatasetInfo, SummaryRow};
use crate::normalize::{IssuePolicy, NormalizationReport, Normalizer};
use crate::source::{Dataset, load_dataset};
use crate::trigger::{PipelineRequest, Trigger};


#[derive(Copy, Clone, Debug, Default)]
pub struct PipelineOptions {
    pub issue_policy: IssuePolicy,
    pub empty_groups: EmptyGroupPolicy,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub trigger: Option<Trigger>,
    pub request: PipelineRequest,
    pub dataset: DatasetInfo,
    pub normalization: NormalizationReport,
    pub aggregation: AggregationStats,
    pub groups: Vec<SummaryRow>,
    pub replaced_existing: bool,
}

impl PipelineOutcome {
    pub fn run_entry(&self) -> ChartRunEntry {
        ChartRunEntry {
            trigger: self.trigger.map(|trigger| trigger.id().to_string()),
            target: self.request.target.as_str().to_string(),
            category: self.request.category.as_str().to_string(),
            metric: self.request.metric.as_str().to_string(),
            replaced_existing: self.replaced_existing,
            normalization: self.normalization.clone(),
            aggregation: self.aggregation.clone(),
            groups: self.groups.clone(),
        }
    }
}

/// Owns the chart registry and runs one full pipeline per interaction:
/// load, normalize, aggregate, then rebind the request's chart target.
pub struct Controller {
    data_path: PathBuf,
    options: PipelineOptions,
    registry: ChartRegistry,
}

impl Controller {
    pub fn new(data_path: &Path, options: PipelineOptions) -> Self {
        Self {
            data_path: data_path.to_path_buf(),
            options,
            registry: ChartRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    pub fn fire(&mut self, trigger: Trigger) -> Result<PipelineOutcome> {
        info!(trigger = trigger.id(), "trigger fired");
        let mut outcome = self.execute(trigger.request())?;
        outcome.trigger = Some(trigger);
        Ok(outcome)
    }

    pub fn execute(&mut self, request: PipelineRequest) -> Result<PipelineOutcome> {
        let dataset = load_dataset(&self.data_path)
            .with_context(|| format!("failed to load dataset {}", self.data_path.display()))?;
        Ok(self.apply(&dataset, request))
    }

    /// Runs the synchronous part of the pipeline on an already loaded dataset.
    pub fn apply(&mut self, dataset: &Dataset, request: PipelineRequest) -> PipelineOutcome {
        let (records, normalization) =
            Normalizer::new(self.options.issue_policy).normalize_all(&dataset.rows);
        let aggregation = aggregate(
            &records,
            request.category,
            request.metric,
            self.options.empty_groups,
        );

        let chart = ChartSpec::bar(
            request.target,
            request.category,
            request.metric,
            &aggregation.rows,
        );
        let replaced_existing = self.registry.replace(chart).is_some();

        info!(
            category = request.category.as_str(),
            metric = request.metric.as_str(),
            chart_target = request.target.as_str(),
            groups = aggregation.stats.groups_emitted,
            empty_groups = aggregation.stats.empty_groups,
            "pipeline completed"
        );

        PipelineOutcome {
            trigger: None,
            request,
            dataset: dataset.info(),
            normalization,
            aggregation: aggregation.stats,
            groups: aggregation.rows,
            replaced_existing,
        }
    }
}
