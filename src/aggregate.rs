use std::collections::HashMap;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::model::{CategoryField, MetricField, NormalizedRecord, SummaryRow};


/// Whether a category whose metric values are all non-numeric still gets a row.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize)]
pub enum EmptyGroupPolicy {
    /// Create the bucket on first sight of the key; empty groups average to NaN.
    #[default]
    Keep,
    /// Create the bucket on first numeric contribution only.
    Drop,
}

impl EmptyGroupPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Drop => "drop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub empty_group_policy: String,
    pub records_seen: usize,
    pub records_contributing: usize,
    pub records_skipped_non_numeric: usize,
    pub groups_emitted: usize,
    pub empty_groups: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub rows: Vec<SummaryRow>,
    pub stats: AggregationStats,
}

/// Groups `records` by `category` and averages the numeric values of `metric`.
pub fn aggregate(
    records: &[NormalizedRecord],
    category: CategoryField,
    metric: MetricField,
    policy: EmptyGroupPolicy,
) -> Aggregation {
    let mut stats = AggregationStats {
        empty_group_policy: policy.as_str().to_string(),
        ..Default::default()
    };
    let mut first_seen: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for record in records {
        stats.records_seen += 1;
        let key = record.category_key(category);
        let value = record.metric(metric).as_number();

        if value.is_none() {
            stats.records_skipped_non_numeric += 1;
            if policy == EmptyGroupPolicy::Drop {
                continue;
            }
        }

        let bucket = buckets.entry(key.to_string()).or_insert_with(|| {
            first_seen.push(key.to_string());
            Bucket::default()
        });

        if let Some(value) = value {
            bucket.sum += value;
            bucket.count += 1;
            stats.records_contributing += 1;
        }
    }

    let mut rows = Vec::with_capacity(first_seen.len());
    for key in order_keys(first_seen) {
        let bucket = buckets.get(&key).copied().unwrap_or_default();
        if bucket.count == 0 {
            stats.empty_groups += 1;
            debug!(category = %key, "group has no numeric contributions");
        }
        rows.push(SummaryRow {
            category: key,
            average: bucket.sum / bucket.count as f64,
            count: bucket.count,
        });
    }
    stats.groups_emitted = rows.len();

    debug!(
        category = category.as_str(),
        metric = metric.as_str(),
        groups = stats.groups_emitted,
        contributing = stats.records_contributing,
        skipped = stats.records_skipped_non_numeric,
        "aggregation completed"
    );

    Aggregation { rows, stats }
}

fn array_index(key: &str) -> Option<u32> {
    let index = key.parse::<u32>().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

/// Canonical array-index keys ascending first, then the rest in first-seen order.
fn order_keys(first_seen: Vec<String>) -> Vec<String> {
    let mut indexed = Vec::new();
    let mut named = Vec::new();
    for key in first_seen {
        match array_index(&key) {
            Some(index) => indexed.push((index, key)),
            None => named.push(key),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, key)| key).chain(named).collect()
}
