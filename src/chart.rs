use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, info};

use crate::model::{CategoryField, MetricField, SummaryRow};
use crate::trigger::ChartTarget;
use crate::util::now_utc_string;


/// Top of the evaluation scale.
pub const SUGGESTED_MAX: f64 = 5.0;
pub const BACKGROUND_COLOR: &str = "rgba(54, 162, 235, 0.5)";
pub const BORDER_COLOR: &str = "rgba(54, 162, 235, 1)";

const LABEL_WIDTH: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub begin_at_zero: bool,
    pub suggested_max: f64,
    pub tick_decimals: u8,
}

impl Default for YAxis {
    fn default() -> Self {
        Self {
            begin_at_zero: true,
            suggested_max: SUGGESTED_MAX,
            tick_decimals: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub target: ChartTarget,
    pub kind: String,
    pub category: String,
    pub metric: String,
    pub dataset_label: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
    pub y_axis: YAxis,
    pub generated_at: String,
}

impl ChartSpec {
    pub fn bar(
        target: ChartTarget,
        category: CategoryField,
        metric: MetricField,
        rows: &[SummaryRow],
    ) -> Self {
        Self {
            target,
            kind: "bar".to_string(),
            category: category.as_str().to_string(),
            metric: metric.as_str().to_string(),
            dataset_label: format!("Average Evaluation for {}", category.display_label()),
            labels: rows.iter().map(|row| row.category.clone()).collect(),
            values: rows
                .iter()
                .map(|row| row.average.is_finite().then_some(row.average))
                .collect(),
            background_color: BACKGROUND_COLOR.to_string(),
            border_color: BORDER_COLOR.to_string(),
            border_width: 1,
            y_axis: YAxis::default(),
            generated_at: now_utc_string(),
        }
    }

    /// Upper bound of the drawn axis: the suggested max unless a bar exceeds it.
    pub fn axis_max(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(self.y_axis.suggested_max, f64::max)
    }
}

/// Charts currently bound to each rendering target. A target holds at most
/// one chart; binding a new one destroys the previous.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ChartTarget, ChartSpec>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys any chart bound to the new chart's target, then binds it.
    /// Returns the destroyed chart.
    pub fn replace(&mut self, chart: ChartSpec) -> Option<ChartSpec> {
        let target = chart.target;
        let previous = self.destroy(target);
        info!(
            chart_target = target.as_str(),
            label = %chart.dataset_label,
            bars = chart.labels.len(),
            "chart bound"
        );
        self.charts.insert(target, chart);
        previous
    }

    pub fn destroy(&mut self, target: ChartTarget) -> Option<ChartSpec> {
        let previous = self.charts.remove(&target);
        if let Some(chart) = &previous {
            debug!(
                chart_target = target.as_str(),
                label = %chart.dataset_label,
                "destroyed chart"
            );
        }
        previous
    }

    pub fn get(&self, target: ChartTarget) -> Option<&ChartSpec> {
        self.charts.get(&target)
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.charts.values()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Draws a horizontal bar chart. Bars are scaled against `axis_max` and
/// values print with the axis tick precision.
pub fn render_text(chart: &ChartSpec, width: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} [{}]", chart.dataset_label, chart.target.as_str());

    if chart.labels.is_empty() {
        output.push_str("No data to display\n");
        return output;
    }

    let label_width = LABEL_WIDTH;
    let decimals = usize::from(chart.y_axis.tick_decimals);
    let axis_max = chart.axis_max();
    let bar_width = width.saturating_sub(label_width + 10).max(10);

    for (label, value) in chart.labels.iter().zip(&chart.values) {
        let truncated: String = label.chars().take(label_width).collect();
        let (bar_len, shown) = match value {
            Some(value) => {
                let ratio = if axis_max > 0.0 {
                    (value.max(0.0) / axis_max).min(1.0)
                } else {
                    0.0
                };
                (
                    (ratio * bar_width as f64).round() as usize,
                    format!("{value:.decimals$}"),
                )
            }
            None => (0, "n/a".to_string()),
        };
        let bar = "#".repeat(bar_len);
        let _ = writeln!(
            output,
            "{truncated:>label_width$} |{bar:<bar_width$}| {shown}"
        );
    }

    let start = format!("{:.decimals$}", 0.0);
    let end = format!("{axis_max:.decimals$}");
    let gap = (bar_width + 2).saturating_sub(start.len() + end.len());
    let _ = writeln!(
        output,
        "{:>label_width$} {start}{}{end}",
        "",
        " ".repeat(gap)
    );

    output
}
