//! Deterministic synthetic price series for demos and benchmarks.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Field, Series};

const START_PRICE: f64 = 100.0;
/// Largest close-to-close move as a fraction of price.
const MAX_MOVE: f64 = 0.02;

/// Random walk of `n` bars spaced `step` apart, starting at `start`.
///
/// Each open equals the previous close. The same seed always produces the
/// same series.
pub fn random_walk(
    ticker: &str,
    n: usize,
    start: DateTime<Utc>,
    step: Duration,
    seed: u64,
) -> Series {
    assert!(step > Duration::zero(), "step must be positive");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut timestamps = Vec::with_capacity(n);
    let mut columns: BTreeMap<Field, Vec<f64>> = Field::NUMERIC
        .iter()
        .map(|&f| (f, Vec::with_capacity(n)))
        .collect();

    let mut prev_close = START_PRICE;
    for i in 0..n {
        let open = prev_close;
        let close = open * (1.0 + rng.gen_range(-MAX_MOVE..=MAX_MOVE));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume: f64 = rng.gen_range(1_000.0..10_000.0_f64).round();

        timestamps.push(start + step * i as i32);
        for (field, value) in [
            (Field::Open, open),
            (Field::High, high),
            (Field::Low, low),
            (Field::Close, close),
            (Field::Volume, volume),
        ] {
            columns.entry(field).or_default().push(value);
        }
        prev_close = close;
    }

    Series {
        ticker: ticker.to_string(),
        timestamps: Some(timestamps),
        columns,
        len: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_same_series() {
        let a = random_walk("SYN", 50, start(), Duration::days(1), 7);
        let b = random_walk("SYN", 50, start(), Duration::days(1), 7);
        let c = random_walk("SYN", 50, start(), Duration::days(1), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bars_are_sane_and_chained() {
        let s = random_walk("SYN", 30, start(), Duration::hours(1), 1);
        assert_eq!(s.len(), 30);
        let bars = s.to_bars().unwrap();
        assert!(bars.iter().all(|b| b.is_sane()));
        for pair in bars.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }
}
