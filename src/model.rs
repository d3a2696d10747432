use clap::ValueEnum;
use serde::{Serialize, Serializer};

use crate::aggregate::AggregationStats;
use crate::normalize::NormalizationReport;

/// A single CSV cell after dynamic type inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Numeric(f64),
    Boolean(bool),
    Text(String),
    #[default]
    Missing,
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Numeric(value) => *value != 0.0 && !value.is_nan(),
            Self::Boolean(value) => *value,
            Self::Text(value) => !value.is_empty(),
            Self::Missing => false,
        }
    }

    /// Textual form used when a value acts as a grouping key. `Missing` has none.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Numeric(value) => Some(format_number(*value)),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Missing => None,
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude < 1e-6 || magnitude >= 1e21 {
        // Exponent form always carries a sign: 1e-7, 1e+21.
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }

    format!("{value}")
}

/// One dataset record as produced by the CSV source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow {
    pub female: FieldValue,
    pub class: FieldValue,
    pub eval_workshop: FieldValue,
    pub eval_instructor: FieldValue,
    pub target: FieldValue,
    pub perform: FieldValue,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum SocialClass {
    Low,
    Middle,
    High,
    /// No class recorded (empty, zero or false).
    Unknown,
    /// A class was recorded but its code is outside 1, 2, 3.
    Unrecognized(String),
}

impl SocialClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Middle => "Middle",
            Self::High => "High",
            Self::Unknown => "Unknown",
            Self::Unrecognized(_) => "Unrecognized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub gender: Gender,
    pub social_class: SocialClass,
    pub eval_workshop: FieldValue,
    pub eval_instructor: FieldValue,
    pub target: String,
    pub perform: String,
}

impl NormalizedRecord {
    pub fn category_key(&self, field: CategoryField) -> &str {
        match field {
            CategoryField::Gender => self.gender.label(),
            CategoryField::SocialClass => self.social_class.label(),
            CategoryField::Target => &self.target,
            CategoryField::Perform => &self.perform,
        }
    }

    pub fn metric(&self, field: MetricField) -> &FieldValue {
        match field {
            MetricField::EvalWorkshop => &self.eval_workshop,
            MetricField::EvalInstructor => &self.eval_instructor,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryField {
    Gender,
    #[value(alias = "socialClass")]
    SocialClass,
    Target,
    Perform,
}

impl CategoryField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::SocialClass => "socialClass",
            Self::Target => "target",
            Self::Perform => "perform",
        }
    }

    /// Field name with its first character upper-cased, as shown on charts.
    pub fn display_label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    #[value(alias = "eval_workshop")]
    EvalWorkshop,
    #[value(alias = "eval_instructor")]
    EvalInstructor,
}

impl MetricField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EvalWorkshop => "eval_workshop",
            Self::EvalInstructor => "eval_instructor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub category: String,
    #[serde(serialize_with = "serialize_finite")]
    pub average: f64,
    pub count: usize,
}

pub fn serialize_finite<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub path: String,
    pub sha256: String,
    pub row_count: usize,
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRunEntry {
    pub trigger: Option<String>,
    pub target: String,
    pub category: String,
    pub metric: String,
    pub replaced_existing: bool,
    pub normalization: NormalizationReport,
    pub aggregation: AggregationStats,
    pub groups: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub dataset: Option<DatasetInfo>,
    pub charts: Vec<ChartRunEntry>,
    pub chart_paths: Vec<String>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_drops_trailing_zero_fraction() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn format_number_uses_signed_exponent_outside_plain_range() {
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-8), "-2.5e-8");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e22), "1.5e+22");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
    }

    #[test]
    fn truthiness_matches_loose_rules() {
        assert!(!FieldValue::Missing.is_truthy());
        assert!(!FieldValue::Numeric(0.0).is_truthy());
        assert!(!FieldValue::Numeric(f64::NAN).is_truthy());
        assert!(!FieldValue::Boolean(false).is_truthy());
        assert!(!FieldValue::Text(String::new()).is_truthy());
        assert!(FieldValue::Numeric(4.0).is_truthy());
        assert!(FieldValue::Text("0".to_string()).is_truthy());
    }

    #[test]
    fn numeric_and_text_keys_share_textual_form() {
        assert_eq!(
            FieldValue::Numeric(1.0).to_text(),
            FieldValue::Text("1".to_string()).to_text()
        );
        assert_eq!(FieldValue::Boolean(true).to_text().as_deref(), Some("true"));
        assert!(FieldValue::Missing.to_text().is_none());
    }

    #[test]
    fn display_label_uppercases_first_character() {
        assert_eq!(CategoryField::SocialClass.display_label(), "SocialClass");
        assert_eq!(CategoryField::Gender.display_label(), "Gender");
    }

    #[test]
    fn summary_row_serializes_non_finite_average_as_null() {
        let row = SummaryRow {
            category: "Female".to_string(),
            average: f64::NAN,
            count: 0,
        };
        let value = serde_json::to_value(&row).expect("summary row should serialize");
        assert_eq!(
            value,
            serde_json::json!({ "category": "Female", "average": null, "count": 0 })
        );
    }
}
