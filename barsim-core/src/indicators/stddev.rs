//! Rolling population standard deviation around a precomputed moving average.

/// Population standard deviation of the trailing `window` values, measured
/// against `moving_avg[i]` at each index.
///
/// `moving_avg` must be the same length as `values`, normally the output of
/// [`moving_average`](super::moving_average) with the same window.
pub fn standard_deviation(values: &[f64], moving_avg: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "standard deviation window must be >= 1");
    assert_eq!(
        values.len(),
        moving_avg.len(),
        "moving average must align with values"
    );

    let mut result = vec![0.0; values.len()];
    for i in (window - 1)..values.len() {
        let mean = moving_avg[i];
        let sum_sq: f64 = values[i + 1 - window..=i]
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();
        result[i] = (sum_sq / window as f64).sqrt();
    }
    result
}
