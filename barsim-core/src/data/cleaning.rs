//! Missing-value filling and outlier removal.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{Field, Series};

/// Replacement used for missing (NaN) cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStrategy {
    Value(f64),
    Mean,
    Median,
}

/// Replace NaN cells in every price/volume column.
///
/// `Mean` and `Median` are computed per column over its finite values. A
/// column with no finite values is left unchanged.
pub fn fill_missing(series: &Series, strategy: FillStrategy) -> Series {
    let mut filled = 0usize;
    let columns: BTreeMap<Field, Vec<f64>> = series
        .columns
        .iter()
        .map(|(field, values)| {
            let replacement = match strategy {
                FillStrategy::Value(v) => Some(v),
                FillStrategy::Mean => mean(&finite(values)),
                FillStrategy::Median => median(finite(values)),
            };
            let column = match replacement {
                Some(r) => values
                    .iter()
                    .map(|&v| {
                        if v.is_nan() {
                            filled += 1;
                            r
                        } else {
                            v
                        }
                    })
                    .collect(),
                None => values.clone(),
            };
            (*field, column)
        })
        .collect();

    if filled > 0 {
        warn!(ticker = series.ticker(), filled, ?strategy, "filled missing values");
    }

    Series {
        columns,
        ..series.clone()
    }
}

/// Drop rows whose value lies outside `mean ± k·σ` of its column.
///
/// Columns are processed in [`Field::NUMERIC`] order and each pass sees the
/// rows left by the previous one. Statistics use the finite values of the
/// column (sample standard deviation). NaN cells never trigger removal.
pub fn remove_outliers(series: &Series, k: f64) -> Series {
    let mut current = series.clone();
    for field in Field::NUMERIC {
        let Some(values) = current.column(field) else {
            continue;
        };
        let finite_values = finite(values);
        let (Some(mu), Some(sigma)) = (mean(&finite_values), sample_std(&finite_values)) else {
            continue;
        };

        let (lo, hi) = (mu - k * sigma, mu + k * sigma);
        let keep: Vec<bool> = values
            .iter()
            .map(|&v| v.is_nan() || (v >= lo && v <= hi))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed > 0 {
            warn!(
                ticker = series.ticker(),
                %field,
                removed,
                lower = lo,
                upper = hi,
                "removed outlier rows"
            );
            current = current.filter_rows(&keep);
        }
    }
    current
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64], volumes: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let timestamps = (0..closes.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let mut columns = BTreeMap::new();
        columns.insert(Field::Close, closes.to_vec());
        columns.insert(Field::Volume, volumes.to_vec());
        Series::from_columns("T", Some(timestamps), columns).unwrap()
    }

    #[test]
    fn fill_with_value() {
        let s = fill_missing(&series(&[1.0, f64::NAN, 3.0], &[1.0; 3]), FillStrategy::Value(0.0));
        assert_eq!(s.closes(), &[1.0, 0.0, 3.0]);
    }

    #[test]
    fn fill_with_mean_and_median() {
        let s = series(&[1.0, f64::NAN, 2.0, 9.0], &[1.0; 4]);
        assert_eq!(fill_missing(&s, FillStrategy::Mean).closes()[1], 4.0);
        assert_eq!(fill_missing(&s, FillStrategy::Median).closes()[1], 2.0);
    }

    #[test]
    fn all_nan_column_left_alone() {
        let s = fill_missing(&series(&[f64::NAN, f64::NAN], &[1.0; 2]), FillStrategy::Mean);
        assert!(s.closes().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn removes_spike_rows() {
        let mut closes = vec![10.0; 10];
        closes[4] = 1000.0;
        let cleaned = remove_outliers(&series(&closes, &[5.0; 10]), 2.0);
        assert_eq!(cleaned.len(), 9);
        assert!(cleaned.closes().iter().all(|&c| c == 10.0));
        assert_eq!(cleaned.column(Field::Volume).unwrap().len(), 9);
        assert_eq!(cleaned.timestamps().unwrap().len(), 9);
    }

    #[test]
    fn keeps_rows_without_outliers() {
        let s = series(&[10.0, 11.0, 9.0, 10.5], &[5.0; 4]);
        assert_eq!(remove_outliers(&s, 2.0), s);
    }
}
