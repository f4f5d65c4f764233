//! Engine configuration and validation errors.

use chrono::Duration;
use thiserror::Error;

use crate::domain::Field;

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum time between two evaluated bars.
    pub interval: Duration,
    pub initial_capital: f64,
}

impl EngineConfig {
    pub fn new(interval: Duration, initial_capital: f64) -> Self {
        Self {
            interval,
            initial_capital,
        }
    }

    /// One decision per day.
    pub fn daily(initial_capital: f64) -> Self {
        Self::new(Duration::days(1), initial_capital)
    }
}

/// Rejections raised before any bar is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("series has no time field")]
    MissingTimeField,

    #[error("series has no '{0}' field")]
    MissingField(Field),

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("interval must be positive")]
    NonPositiveInterval,

    #[error("series is sampled more coarsely than the requested interval of {interval}")]
    IntervalTooCoarse { interval: Duration },
}
