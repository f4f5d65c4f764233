//! Cumulative volume-weighted average price.

/// Running `Σ(price·volume) / Σvolume`, strictly causal.
///
/// While cumulative volume is zero the value is the `0.0` placeholder.
/// Extra entries in the longer of the two slices are ignored.
pub fn vwap(prices: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    prices
        .iter()
        .zip(volumes)
        .map(|(price, volume)| {
            cumulative_pv += price * volume;
            cumulative_volume += volume;
            if cumulative_volume == 0.0 {
                0.0
            } else {
                cumulative_pv / cumulative_volume
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn vwap_weighted_mean() {
        let result = vwap(&[10.0, 20.0], &[1.0, 3.0]);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        // (10*1 + 20*3) / 4 = 17.5
        assert_approx(result[1], 17.5, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_constant_price() {
        for v in vwap(&[42.0; 10], &[7.0; 10]) {
            assert_approx(v, 42.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn vwap_zero_volume_placeholder() {
        let result = vwap(&[10.0, 12.0], &[0.0, 2.0]);
        assert_eq!(result[0], 0.0);
        assert_approx(result[1], 12.0, DEFAULT_EPSILON);
    }
}
