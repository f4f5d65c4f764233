//! Series: a time-ordered, columnar price table for one ticker.
//!
//! The data layer hands the engine a table with named fields. Not every
//! source supplies every field, so each column is optional; the engine
//! validates the fields it needs before simulating.
//!
//! Strategies never see a whole `Series` during a run. They receive a
//! [`SeriesView`] over the prefix `0..k`, which makes reading bar `k` or
//! later impossible through the view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::bar::Bar;

/// Named fields of a price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    /// Numeric (non-time) fields, in table order.
    pub const NUMERIC: [Field; 5] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("column '{field}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        field: Field,
        expected: usize,
        actual: usize,
    },

    #[error("timestamp is not a numeric column")]
    TimestampNotNumeric,

    #[error("timestamps must be strictly increasing (row {row}: {current} does not follow {previous})")]
    NonIncreasing {
        row: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("series mixes tickers '{expected}' and '{found}'")]
    MixedTickers { expected: String, found: String },

    #[error("cannot materialize bars: series lacks field '{0}'")]
    MissingField(Field),
}

/// Columnar price table for a single ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub(crate) ticker: String,
    pub(crate) timestamps: Option<Vec<DateTime<Utc>>>,
    pub(crate) columns: BTreeMap<Field, Vec<f64>>,
    pub(crate) len: usize,
}

impl Series {
    /// Build a series from already-ordered bars of one ticker.
    pub fn from_bars(bars: &[Bar]) -> Result<Self, SeriesError> {
        let ticker = bars.first().map(|b| b.ticker.clone()).unwrap_or_default();
        if let Some(other) = bars.iter().find(|b| b.ticker != ticker) {
            return Err(SeriesError::MixedTickers {
                expected: ticker,
                found: other.ticker.clone(),
            });
        }

        let timestamps: Vec<DateTime<Utc>> = bars.iter().map(|b| b.timestamp).collect();
        let mut columns = BTreeMap::new();
        columns.insert(Field::Open, bars.iter().map(|b| b.open).collect());
        columns.insert(Field::High, bars.iter().map(|b| b.high).collect());
        columns.insert(Field::Low, bars.iter().map(|b| b.low).collect());
        columns.insert(Field::Close, bars.iter().map(|b| b.close).collect());
        columns.insert(Field::Volume, bars.iter().map(|b| b.volume).collect());

        Self::from_columns(ticker, Some(timestamps), columns)
    }

    /// Build a series from named columns. Any column, including the time
    /// field, may be absent.
    pub fn from_columns(
        ticker: impl Into<String>,
        timestamps: Option<Vec<DateTime<Utc>>>,
        columns: BTreeMap<Field, Vec<f64>>,
    ) -> Result<Self, SeriesError> {
        if columns.contains_key(&Field::Timestamp) {
            return Err(SeriesError::TimestampNotNumeric);
        }

        let len = timestamps
            .as_ref()
            .map(|t| t.len())
            .or_else(|| columns.values().next().map(|c| c.len()))
            .unwrap_or(0);

        for (field, values) in &columns {
            if values.len() != len {
                return Err(SeriesError::RaggedColumn {
                    field: *field,
                    expected: len,
                    actual: values.len(),
                });
            }
        }

        if let Some(ts) = &timestamps {
            for (row, pair) in ts.windows(2).enumerate() {
                if pair[1] <= pair[0] {
                    return Err(SeriesError::NonIncreasing {
                        row: row + 1,
                        previous: pair[0],
                        current: pair[1],
                    });
                }
            }
        }

        Ok(Self {
            ticker: ticker.into(),
            timestamps,
            columns,
            len,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_time_field(&self) -> bool {
        self.timestamps.is_some()
    }

    /// Fields present in this table, time field first.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(self.columns.len() + 1);
        if self.has_time_field() {
            fields.push(Field::Timestamp);
        }
        fields.extend(self.columns.keys().copied());
        fields
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn column(&self, field: Field) -> Option<&[f64]> {
        self.columns.get(&field).map(|v| v.as_slice())
    }

    /// Close prices, or an empty slice when the field is absent.
    pub fn closes(&self) -> &[f64] {
        self.column(Field::Close).unwrap_or(&[])
    }

    /// View over the first `n` rows (clamped to the series length).
    pub fn head(&self, n: usize) -> SeriesView<'_> {
        SeriesView {
            series: self,
            len: n.min(self.len),
        }
    }

    /// View over every row.
    pub fn view(&self) -> SeriesView<'_> {
        self.head(self.len)
    }

    /// Materialize row `i` as a [`Bar`]. Requires every field.
    pub fn bar(&self, i: usize) -> Result<Option<Bar>, SeriesError> {
        let timestamps = self
            .timestamps
            .as_ref()
            .ok_or(SeriesError::MissingField(Field::Timestamp))?;
        let Some(&timestamp) = timestamps.get(i) else {
            return Ok(None);
        };
        let value = |field: Field| -> Result<f64, SeriesError> {
            self.columns
                .get(&field)
                .map(|c| c[i])
                .ok_or(SeriesError::MissingField(field))
        };
        Ok(Some(Bar {
            ticker: self.ticker.clone(),
            timestamp,
            open: value(Field::Open)?,
            high: value(Field::High)?,
            low: value(Field::Low)?,
            close: value(Field::Close)?,
            volume: value(Field::Volume)?,
        }))
    }

    /// Materialize every row as a [`Bar`].
    pub fn to_bars(&self) -> Result<Vec<Bar>, SeriesError> {
        let mut bars = Vec::with_capacity(self.len);
        for i in 0..self.len {
            if let Some(bar) = self.bar(i)? {
                bars.push(bar);
            }
        }
        Ok(bars)
    }

    /// Copy of this series keeping only rows where `keep[i]` is true.
    pub(crate) fn filter_rows(&self, keep: &[bool]) -> Series {
        let pick = |values: &[f64]| -> Vec<f64> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect()
        };
        let timestamps = self.timestamps.as_ref().map(|ts| {
            ts.iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(t, _)| *t)
                .collect::<Vec<_>>()
        });
        let columns: BTreeMap<Field, Vec<f64>> = self
            .columns
            .iter()
            .map(|(field, values)| (*field, pick(values)))
            .collect();
        let len = keep.iter().take(self.len).filter(|k| **k).count();

        Series {
            ticker: self.ticker.clone(),
            timestamps,
            columns,
            len,
        }
    }
}

/// Read-only window over the first `len` rows of a [`Series`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    series: &'a Series,
    len: usize,
}

impl<'a> SeriesView<'a> {
    pub fn ticker(&self) -> &'a str {
        &self.series.ticker
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, field: Field) -> Option<&'a [f64]> {
        self.series.column(field).map(|c| &c[..self.len])
    }

    pub fn timestamps(&self) -> Option<&'a [DateTime<Utc>]> {
        self.series.timestamps().map(|t| &t[..self.len])
    }

    /// Close prices in the window, or an empty slice when absent.
    pub fn closes(&self) -> &'a [f64] {
        self.column(Field::Close).unwrap_or(&[])
    }

    /// Volumes in the window, or an empty slice when absent.
    pub fn volumes(&self) -> &'a [f64] {
        self.column(Field::Volume).unwrap_or(&[])
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes().last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new(
                    "TEST",
                    start + Duration::days(i as i64),
                    c - 0.5,
                    c + 1.0,
                    c - 1.0,
                    c,
                    1000.0,
                )
            })
            .collect()
    }

    #[test]
    fn from_bars_keeps_all_fields() {
        let series = Series::from_bars(&bars(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker(), "TEST");
        assert!(series.has_time_field());
        assert_eq!(series.fields().len(), 6);
        assert_eq!(series.closes(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut input = bars(&[1.0, 2.0, 3.0]);
        input[2].timestamp = input[1].timestamp;
        assert!(matches!(
            Series::from_bars(&input),
            Err(SeriesError::NonIncreasing { row: 2, .. })
        ));
    }

    #[test]
    fn rejects_mixed_tickers() {
        let mut input = bars(&[1.0, 2.0]);
        input[1].ticker = "OTHER".into();
        assert!(matches!(
            Series::from_bars(&input),
            Err(SeriesError::MixedTickers { .. })
        ));
    }

    #[test]
    fn rejects_ragged_columns() {
        let mut columns = BTreeMap::new();
        columns.insert(Field::Open, vec![1.0, 2.0]);
        columns.insert(Field::Close, vec![1.0]);
        assert!(matches!(
            Series::from_columns("X", None, columns),
            Err(SeriesError::RaggedColumn { .. })
        ));
    }

    #[test]
    fn series_without_time_field() {
        let mut columns = BTreeMap::new();
        columns.insert(Field::Close, vec![1.0, 2.0]);
        let series = Series::from_columns("X", None, columns).unwrap();
        assert!(!series.has_time_field());
        assert_eq!(series.len(), 2);
        assert!(series.to_bars().is_err());
    }

    #[test]
    fn head_view_hides_later_rows() {
        let series = Series::from_bars(&bars(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        let view = series.head(2);
        assert_eq!(view.len(), 2);
        assert_eq!(view.closes(), &[1.0, 2.0]);
        assert_eq!(view.volumes().len(), 2);
        assert_eq!(view.last_close(), Some(2.0));
        assert_eq!(series.head(10).len(), 4);
        assert!(series.head(0).is_empty());
    }

    #[test]
    fn filter_rows_drops_masked_rows() {
        let series = Series::from_bars(&bars(&[1.0, 2.0, 3.0])).unwrap();
        let filtered = series.filter_rows(&[true, false, true]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.closes(), &[1.0, 3.0]);
        assert_eq!(filtered.timestamps().unwrap().len(), 2);
    }

    #[test]
    fn bars_roundtrip_through_series() {
        let input = bars(&[10.0, 11.0]);
        let series = Series::from_bars(&input).unwrap();
        assert_eq!(series.to_bars().unwrap(), input);
    }
}
