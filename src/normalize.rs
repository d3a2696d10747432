use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{FieldValue, Gender, NormalizedRecord, RawRow, SocialClass};


#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationIssue {
    #[error("required field `{field}` has no value")]
    MissingField { field: &'static str },
    #[error("social class code `{code}` is not one of 1, 2, 3")]
    UnmappedCategoryCode { code: String },
}

/// What to do with a row whose normalization raised an issue.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize)]
pub enum IssuePolicy {
    /// Keep the row with degraded values.
    #[default]
    Default,
    /// Drop the row.
    Reject,
}

impl IssuePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub policy: String,
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub rows_defaulted: usize,
    pub rows_rejected: usize,
    pub missing_field_issues: usize,
    pub unmapped_code_issues: usize,
}

impl NormalizationReport {
    pub fn has_anomalies(&self) -> bool {
        self.rows_defaulted > 0 || self.rows_rejected > 0
    }
}

pub fn gender(row: &RawRow) -> Gender {
    match row.female {
        FieldValue::Numeric(value) if value == 0.0 => Gender::Male,
        _ => Gender::Female,
    }
}

pub fn social_class(row: &RawRow) -> Result<SocialClass, NormalizationIssue> {
    if !row.class.is_truthy() {
        return Ok(SocialClass::Unknown);
    }

    let code = row.class.to_text().unwrap_or_default();
    match code.as_str() {
        "1" => Ok(SocialClass::Low),
        "2" => Ok(SocialClass::Middle),
        "3" => Ok(SocialClass::High),
        _ => Err(NormalizationIssue::UnmappedCategoryCode { code }),
    }
}

fn key_text(value: &FieldValue, field: &'static str) -> Result<String, NormalizationIssue> {
    value
        .to_text()
        .ok_or(NormalizationIssue::MissingField { field })
}

/// Normalizes a row, substituting defaults for anything that fails: an
/// empty key for missing `target`/`perform` and `Unrecognized` for unmapped
/// class codes. Every substitution is returned as an issue.
pub fn normalize_row_with_defaults(row: &RawRow) -> (NormalizedRecord, Vec<NormalizationIssue>) {
    let mut issues = Vec::new();

    let social_class = social_class(row).unwrap_or_else(|issue| {
        let code = match &issue {
            NormalizationIssue::UnmappedCategoryCode { code } => code.clone(),
            NormalizationIssue::MissingField { .. } => String::new(),
        };
        issues.push(issue);
        SocialClass::Unrecognized(code)
    });

    let mut key_or_default = |value: &FieldValue, field: &'static str| {
        key_text(value, field).unwrap_or_else(|issue| {
            issues.push(issue);
            String::new()
        })
    };
    let target = key_or_default(&row.target, "target");
    let perform = key_or_default(&row.perform, "perform");

    let record = NormalizedRecord {
        gender: gender(row),
        social_class,
        eval_workshop: row.eval_workshop.clone(),
        eval_instructor: row.eval_instructor.clone(),
        target,
        perform,
    };

    (record, issues)
}

/// Strict normalization: the first issue encountered fails the row.
pub fn normalize_row(row: &RawRow) -> Result<NormalizedRecord, NormalizationIssue> {
    let (record, issues) = normalize_row_with_defaults(row);
    match issues.into_iter().next() {
        Some(issue) => Err(issue),
        None => Ok(record),
    }
}

pub struct Normalizer {
    policy: IssuePolicy,
}

impl Normalizer {
    pub fn new(policy: IssuePolicy) -> Self {
        Self { policy }
    }

    /// Normalizes rows in order. Output preserves input order; under
    /// `IssuePolicy::Reject` rows with issues are left out.
    pub fn normalize_all(&self, rows: &[RawRow]) -> (Vec<NormalizedRecord>, NormalizationReport) {
        let mut report = NormalizationReport {
            policy: self.policy.as_str().to_string(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            report.rows_seen += 1;
            let (record, issues) = match self.policy {
                IssuePolicy::Default => {
                    let (record, issues) = normalize_row_with_defaults(row);
                    (Some(record), issues)
                }
                // Strict path first; the full issue list is only needed for failing rows.
                IssuePolicy::Reject => match normalize_row(row) {
                    Ok(record) => (Some(record), Vec::new()),
                    Err(_) => (None, normalize_row_with_defaults(row).1),
                },
            };

            for issue in &issues {
                match issue {
                    NormalizationIssue::MissingField { .. } => report.missing_field_issues += 1,
                    NormalizationIssue::UnmappedCategoryCode { .. } => {
                        report.unmapped_code_issues += 1
                    }
                }
                debug!(row = index + 1, issue = %issue, "normalization issue");
            }

            match record {
                Some(record) => {
                    records.push(record);
                    report.rows_kept += 1;
                    if !issues.is_empty() {
                        report.rows_defaulted += 1;
                    }
                }
                None => report.rows_rejected += 1,
            }
        }

        if report.has_anomalies() {
            warn!(
                policy = %report.policy,
                rows_seen = report.rows_seen,
                rows_defaulted = report.rows_defaulted,
                rows_rejected = report.rows_rejected,
                missing_field_issues = report.missing_field_issues,
                unmapped_code_issues = report.unmapped_code_issues,
                "normalization completed with anomalies"
            );
        } else {
            info!(rows = report.rows_seen, "normalization completed");
        }

        (records, report)
    }
}
