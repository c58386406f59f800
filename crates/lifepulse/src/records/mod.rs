//! Record import for the CLI and HTTP surfaces.
//!
//! CSV files carry a `timestamp` and a `domain` column; every other non-empty
//! cell becomes a numeric field when it parses as a number and a categorical
//! field otherwise.

use crate::analytics::{Record, RecordDomain};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const TIMESTAMP_COLUMN: &str = "timestamp";
const DOMAIN_COLUMN: &str = "domain";

#[derive(Debug, thiserror::Error)]
pub enum RecordImportError {
    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("record CSV is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: unknown record domain '{value}'")]
    UnknownDomain { row: usize, value: String },
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, or a bare date.
///
/// Offsets are dropped and the local wall-clock time is kept.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}

pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>, RecordImportError> {
    let file = File::open(path.as_ref())?;
    load_records(file)
}

pub fn load_records<R: Read>(reader: R) -> Result<Vec<Record>, RecordImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .ok_or(RecordImportError::MissingColumn(name))
    };
    let timestamp_at = column(TIMESTAMP_COLUMN)?;
    let domain_at = column(DOMAIN_COLUMN)?;

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;

        let raw_timestamp = row.get(timestamp_at).unwrap_or_default();
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| RecordImportError::InvalidTimestamp {
                row: row_number,
                value: raw_timestamp.to_string(),
            })?;

        let raw_domain = row.get(domain_at).unwrap_or_default();
        let domain =
            RecordDomain::parse(raw_domain).ok_or_else(|| RecordImportError::UnknownDomain {
                row: row_number,
                value: raw_domain.to_string(),
            })?;

        let mut record = Record::new(domain, timestamp);
        for (position, (header, cell)) in headers.iter().zip(row.iter()).enumerate() {
            if position == timestamp_at || position == domain_at || cell.is_empty() {
                continue;
            }
            record = match cell.parse::<f64>() {
                Ok(number) if number.is_finite() => record.with_number(header, number),
                _ => record.with_category(header, cell),
            };
        }
        records.push(record);
    }

    debug!(target: "lifepulse::records", count = records.len(), "loaded records from CSV");
    Ok(records)
}
