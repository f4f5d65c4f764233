//! Indicator library: pure numeric functions over price/volume slices.
//!
//! Every function returns a vector the same length as its input. Positions
//! without enough history hold a `0.0` placeholder rather than NaN; callers
//! must treat the warmup prefix as invalid for decision purposes.
//!
//! No output at index `i` depends on inputs after `i`.

pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod vwap;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use rsi::rsi;
pub use sma::moving_average;
pub use stddev::standard_deviation;
pub use vwap::vwap;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
