//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N). Warmup positions are `0.0`.

use super::{moving_average, standard_deviation};

/// Default lookback for the bands.
pub const DEFAULT_PERIOD: usize = 20;
/// Default standard deviation multiplier.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// All three bands, index-aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_bands(values: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = moving_average(values, period);
    let stddev = standard_deviation(values, &middle, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let bands = bollinger_bands(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        assert_eq!(bands.middle[0], 0.0);
        assert_eq!(bands.middle[1], 0.0);
        assert_approx(bands.middle[2], 11.0, DEFAULT_EPSILON);
        assert_approx(bands.middle[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bands = bollinger_bands(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        for i in 2..5 {
            let half_width = bands.upper[i] - bands.middle[i];
            assert_approx(bands.middle[i] - bands.lower[i], half_width, DEFAULT_EPSILON);
            assert!(half_width > 0.0);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let bands = bollinger_bands(&[100.0; 4], 3, 2.0);
        assert_approx(bands.upper[2], 100.0, DEFAULT_EPSILON);
        assert_approx(bands.lower[2], 100.0, DEFAULT_EPSILON);
    }
}
