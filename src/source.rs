use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{DatasetInfo, FieldValue, RawRow};
use crate::util::sha256_hex;

#[cfg(test)]
mod tests;

/// Numbers beyond this magnitude stay textual so they keep their exact digits.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

const NUMERIC_PATTERN: &str = r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$";

pub const SCHEMA_COLUMNS: [&str; 6] = [
    "female",
    "class",
    "eval_workshop",
    "eval_instructor",
    "target",
    "perform",
];

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to read data source {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV input")]
    Csv(#[from] csv::Error),
    #[error("failed to compile numeric inference pattern")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub sha256: String,
    pub rows: Vec<RawRow>,
    pub missing_columns: Vec<String>,
}

impl Dataset {
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            path: self.path.display().to_string(),
            sha256: self.sha256.clone(),
            row_count: self.rows.len(),
            missing_columns: self.missing_columns.clone(),
        }
    }
}

/// Converts raw cell text into typed values the way the upstream CSV parser
/// does with dynamic typing enabled.
pub struct FieldParser {
    numeric: Regex,
}

impl FieldParser {
    pub fn new() -> Result<Self, DataSourceError> {
        Ok(Self {
            numeric: Regex::new(NUMERIC_PATTERN)?,
        })
    }

    pub fn parse(&self, raw: &str) -> FieldValue {
        match raw {
            "" => return FieldValue::Missing,
            "true" | "TRUE" => return FieldValue::Boolean(true),
            "false" | "FALSE" => return FieldValue::Boolean(false),
            _ => {}
        }

        if self.numeric.is_match(raw) {
            if let Ok(value) = raw.trim().parse::<f64>() {
                if value > -MAX_SAFE_INTEGER && value < MAX_SAFE_INTEGER {
                    return FieldValue::Numeric(value);
                }
            }
        }

        FieldValue::Text(raw.to_string())
    }
}

#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    female: Option<usize>,
    class: Option<usize>,
    eval_workshop: Option<usize>,
    eval_instructor: Option<usize>,
    target: Option<usize>,
    perform: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &ByteRecord) -> Self {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| String::from_utf8_lossy(header).trim() == name)
        };
        Self {
            female: position("female"),
            class: position("class"),
            eval_workshop: position("eval_workshop"),
            eval_instructor: position("eval_instructor"),
            target: position("target"),
            perform: position("perform"),
        }
    }

    fn missing(&self) -> Vec<String> {
        let slots = [
            self.female,
            self.class,
            self.eval_workshop,
            self.eval_instructor,
            self.target,
            self.perform,
        ];
        SCHEMA_COLUMNS
            .iter()
            .zip(slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    fn extract(&self, record: &ByteRecord, parser: &FieldParser) -> RawRow {
        let cell = |slot: Option<usize>| {
            slot.and_then(|index| record.get(index))
                .map(|raw| parser.parse(&String::from_utf8_lossy(raw)))
                .unwrap_or_default()
        };

        RawRow {
            female: cell(self.female),
            class: cell(self.class),
            eval_workshop: cell(self.eval_workshop),
            eval_instructor: cell(self.eval_instructor),
            target: cell(self.target),
            perform: cell(self.perform),
        }
    }
}

/// Reads header-led CSV from any reader. Blank lines are skipped, short
/// rows yield `Missing` for their absent cells and invalid UTF-8 is decoded
/// lossily.
pub fn read_rows<R: Read>(input: R) -> Result<(Vec<RawRow>, Vec<String>), DataSourceError> {
    let parser = FieldParser::new()?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.byte_headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers);
    let missing_columns = columns.missing();
    for column in &missing_columns {
        warn!(column = %column, "schema column absent from header");
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(columns.extract(&record, &parser));
    }

    Ok((rows, missing_columns))
}

pub fn load_dataset(path: &Path) -> Result<Dataset, DataSourceError> {
    let bytes = fs::read(path).map_err(|source| DataSourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let sha256 = sha256_hex(&bytes);
    let (rows, missing_columns) = read_rows(bytes.as_slice())?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        sha256 = %sha256,
        "loaded dataset"
    );

    Ok(Dataset {
        path: path.to_path_buf(),
        sha256,
        rows,
        missing_columns,
    })
}
