//! CSV Import
//!
//! Bulk import of historical observations. Each row describes one meal,
//! mood, sleep session or heart sample:
//!
//! ```text
//! kind,timestamp,end,value,label,detail
//! meal,2025-05-19 12:30:00,,,Pizza,lunch with friends
//! mood,2025-05-19 13:00:00,,60,Sad,manual
//! sleep,2025-05-19T23:10:00+02:00,2025-05-20T06:40:00+02:00,,,
//! heart_rate,1747700000000,,58,,
//! hrv,1747700000000,,42.3,,
//! ```
//!
//! Bad rows are reported with their line number and skipped.

use super::{HealthSample, Meal, MoodEntry, Observation};
use crate::timeline::{MoodSource, MoodState};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Maximum number of row errors kept in a result
const MAX_REPORTED_ERRORS: usize = 100;

/// Errors that abort an import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Row(String),
}

/// Result of a CSV import operation
#[derive(Debug, Default)]
pub struct CsvImportResult {
    pub observations: Vec<Observation>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    kind: String,
    timestamp: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// CSV observation importer
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Offset applied to timestamps without a zone
    offset: FixedOffset,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    /// Importer that reads zoneless timestamps as UTC
    pub fn new() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Read zoneless timestamps in the given offset
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Import observations from a CSV file
    pub fn import(&self, path: &Path) -> Result<CsvImportResult, ImportError> {
        let file = std::fs::File::open(path)?;
        let result = self.import_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = result.rows_processed,
            failed = result.rows_failed,
            "Imported CSV observations"
        );
        Ok(result)
    }

    /// Import from a CSV string
    pub fn import_str(&self, csv_data: &str) -> Result<CsvImportResult, ImportError> {
        self.import_reader(csv_data.as_bytes())
    }

    fn import_reader<R: Read>(&self, reader: R) -> Result<CsvImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // Fail fast on an unreadable header
        reader.headers()?;

        let mut result = CsvImportResult::default();

        for (line_num, record) in reader.deserialize::<Row>().enumerate() {
            // Header is line 1
            let line = line_num + 2;

            let parsed = record
                .map_err(ImportError::from)
                .and_then(|row| self.parse_row(row));

            match parsed {
                Ok(observation) => {
                    result.observations.push(observation);
                    result.rows_processed += 1;
                }
                Err(e) => {
                    tracing::debug!(line, error = %e, "Skipping CSV row");
                    result.rows_failed += 1;
                    result.errors.push(format!("Line {}: {}", line, e));
                }
            }
        }

        if result.errors.len() > MAX_REPORTED_ERRORS {
            let total = result.errors.len();
            result.errors.truncate(MAX_REPORTED_ERRORS);
            result
                .errors
                .push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(result)
    }

    fn parse_row(&self, row: Row) -> Result<Observation, ImportError> {
        let timestamp = self.parse_timestamp(&row.timestamp)?;
        let label = row.label.filter(|l| !l.is_empty());
        let detail = row.detail.unwrap_or_default();

        let observation = match row.kind.to_lowercase().as_str() {
            "meal" => Meal::new(label, detail, timestamp).into(),
            "mood" => {
                let label = label.ok_or_else(|| ImportError::Row("mood row needs a label".to_string()))?;
                let mood = MoodState::from_label(&label)
                    .ok_or_else(|| ImportError::Row(format!("Unknown mood: {}", label)))?;
                let intensity = parse_intensity(row.value)?;
                let source = match detail.to_lowercase().as_str() {
                    "automatic" => MoodSource::Automatic,
                    _ => MoodSource::Manual,
                };
                MoodEntry::new(mood, intensity, timestamp, source).into()
            }
            "sleep" => {
                let end = row
                    .end
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| ImportError::Row("sleep row needs an end time".to_string()))?;
                HealthSample::sleep(timestamp, self.parse_timestamp(&end)?).into()
            }
            "heart_rate" => HealthSample::heart_rate(timestamp, required_value(row.value)?).into(),
            "hrv" => HealthSample::hrv(timestamp, required_value(row.value)?).into(),
            other => return Err(ImportError::Row(format!("Unknown kind: {}", other))),
        };

        Ok(observation)
    }

    /// Parse RFC 3339, Unix milliseconds, or `%Y-%m-%d %H:%M:%S` in the importer's offset
    fn parse_timestamp(&self, ts_str: &str) -> Result<i64, ImportError> {
        let ts_str = ts_str.trim();

        if let Ok(millis) = ts_str.parse::<i64>() {
            return Ok(millis);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
            return Ok(dt.timestamp_millis());
        }

        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(ts_str, fmt) {
                if let Some(dt) = self.offset.from_local_datetime(&naive).single() {
                    return Ok(dt.timestamp_millis());
                }
            }
        }

        Err(ImportError::Row(format!(
            "Could not parse timestamp: {}",
            ts_str
        )))
    }
}

fn required_value(value: Option<f64>) -> Result<f64, ImportError> {
    value.ok_or_else(|| ImportError::Row("missing value".to_string()))
}

fn parse_intensity(value: Option<f64>) -> Result<u8, ImportError> {
    match value {
        None => Ok(50),
        Some(v) if (0.0..=100.0).contains(&v) => Ok(v.round() as u8),
        Some(v) => Err(ImportError::Row(format!(
            "Mood intensity must be between 0 and 100, got {}",
            v
        ))),
    }
}
