//! Simple moving average.
//!
//! Arithmetic mean of the trailing `window` values.
//! Warmup: indices `0..window-1` hold the `0.0` placeholder.

/// Moving average of `values` over `window` samples.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "moving average window must be >= 1");

    let mut result = vec![0.0; values.len()];
    for i in (window - 1)..values.len() {
        let sum: f64 = values[i + 1 - window..=i].iter().sum();
        result[i] = sum / window as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = moving_average(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert_eq!(*v, 0.0, "expected placeholder at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = moving_average(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_too_few_values() {
        let result = moving_average(&[10.0, 11.0], 5);
        assert_eq!(result, vec![0.0, 0.0]);
    }

    #[test]
    fn sma_empty_input() {
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    #[should_panic(expected = "window must be >= 1")]
    fn sma_zero_window_panics() {
        moving_average(&[1.0], 0);
    }
}
