//! CSV ingest.
//!
//! Column names are matched case-insensitively. Recognized headers:
//! `timestamp|time|date`, `open`, `high`, `low`, `close`, `volume`,
//! `ticker|symbol`. Unknown columns are ignored.
//!
//! Rows are sorted by timestamp and duplicate timestamps are dropped
//! (first occurrence wins). A file without a time column loads as a
//! series without a time field; the engine decides whether that is usable.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Field, Series, SeriesError};

use super::DataError;

/// Load a CSV file. `default_ticker` is used when the file has no ticker column.
pub fn load_csv(path: impl AsRef<Path>, default_ticker: &str) -> Result<Series, DataError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading CSV");
    read_csv(File::open(path)?, default_ticker)
}

struct Row {
    timestamp: Option<DateTime<Utc>>,
    values: Vec<f64>,
}

/// Parse CSV from any reader.
pub fn read_csv<R: Read>(reader: R, default_ticker: &str) -> Result<Series, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut time_idx = None;
    let mut ticker_idx = None;
    let mut numeric: Vec<(Field, usize)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        match name.to_ascii_lowercase().as_str() {
            "timestamp" | "time" | "date" | "datetime" => time_idx = time_idx.or(Some(idx)),
            "ticker" | "symbol" => ticker_idx = ticker_idx.or(Some(idx)),
            other => {
                if let Some(field) = Field::NUMERIC.iter().find(|f| f.name() == other) {
                    if !numeric.iter().any(|(f, _)| f == field) {
                        numeric.push((*field, idx));
                    }
                }
            }
        }
    }

    let mut ticker: Option<String> = None;
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Row numbers as a user sees them in the file (header is row 1).
        let row = i + 2;

        if let Some(cell) = ticker_idx.and_then(|idx| record.get(idx)) {
            if !cell.is_empty() {
                match &ticker {
                    None => ticker = Some(cell.to_string()),
                    Some(t) if t != cell => {
                        return Err(SeriesError::MixedTickers {
                            expected: t.clone(),
                            found: cell.to_string(),
                        }
                        .into());
                    }
                    Some(_) => {}
                }
            }
        }

        let timestamp = match time_idx {
            Some(idx) => {
                let cell = record.get(idx).unwrap_or("");
                Some(parse_timestamp(cell).ok_or_else(|| DataError::InvalidTimestamp {
                    row,
                    value: cell.to_string(),
                })?)
            }
            None => None,
        };

        let mut values = Vec::with_capacity(numeric.len());
        for (field, idx) in &numeric {
            let cell = record.get(*idx).unwrap_or("");
            values.push(parse_number(cell).ok_or_else(|| DataError::InvalidNumber {
                row,
                column: field.name().to_string(),
                value: cell.to_string(),
            })?);
        }

        rows.push(Row { timestamp, values });
    }

    if time_idx.is_some() {
        rows = canonicalize(rows);
    }

    let timestamps = time_idx.map(|_| {
        rows.iter()
            .filter_map(|r| r.timestamp)
            .collect::<Vec<_>>()
    });
    let columns: BTreeMap<Field, Vec<f64>> = numeric
        .iter()
        .enumerate()
        .map(|(col, (field, _))| (*field, rows.iter().map(|r| r.values[col]).collect()))
        .collect();

    let ticker = ticker.unwrap_or_else(|| default_ticker.to_string());
    let series = Series::from_columns(ticker, timestamps, columns)?;
    debug!(ticker = series.ticker(), rows = series.len(), "parsed CSV");
    Ok(series)
}

/// Sort by timestamp and drop repeated timestamps.
fn canonicalize(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort_by_key(|r| r.timestamp);
    let before = rows.len();
    rows.dedup_by_key(|r| r.timestamp);
    let dropped = before - rows.len();
    if dropped > 0 {
        warn!(dropped, "dropped rows with duplicate timestamps");
    }
    rows
}

/// Accepts unix seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD`.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Empty cells are missing values and read as NaN.
fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    s.parse().ok()
}
