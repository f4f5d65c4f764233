//! Strategy capability: one decision per eligible bar.
//!
//! A strategy sees only the bars strictly before the one being traded
//! (a [`SeriesView`] prefix) and answers Buy, Sell, or Hold. It never
//! sees portfolio state.
//!
//! Randomness is threaded in explicitly. Deterministic strategies ignore
//! the source; the Markov predictor draws from it, so a fixed seed fixes
//! the whole decision sequence.

pub mod bollinger_reversion;
pub mod ensemble;
pub mod ma_crossover;
pub mod markov;
pub mod rsi_reversion;
pub mod vwap_reversion;

use rand::RngCore;

use crate::domain::{Action, SeriesView};

/// Trait for trading strategies.
pub trait Strategy: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Number of prior bars needed before this strategy can leave Hold.
    fn warmup_bars(&self) -> usize;

    /// Decide on the bar that follows `history`.
    ///
    /// `history` holds bars `0..k` when deciding for bar `k`; the bar being
    /// traded is never visible.
    fn decide(&self, history: &SeriesView<'_>, rng: &mut dyn RngCore) -> Action;
}

/// Adapter turning a plain function into a [`Strategy`].
pub struct FnStrategy<F> {
    name: String,
    decide: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&SeriesView<'_>) -> Action + Send + Sync,
{
    pub fn new(name: impl Into<String>, decide: F) -> Self {
        Self {
            name: name.into(),
            decide,
        }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(&SeriesView<'_>) -> Action + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn decide(&self, history: &SeriesView<'_>, _rng: &mut dyn RngCore) -> Action {
        (self.decide)(history)
    }
}

// Re-export concrete strategy types.
pub use bollinger_reversion::BollingerReversion;
pub use ensemble::{ActionTally, Ensemble, EnsembleError};
pub use ma_crossover::MaCrossover;
pub use markov::{MarkovStrategy, PredictionMode, PriceMove, StateKey, TransitionModel};
pub use rsi_reversion::RsiReversion;
pub use vwap_reversion::VwapReversion;

/// Build synthetic daily series from close prices for strategy tests.
///
/// open = close - 0.5, high/low = close ± 1.0, volume = 1000.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::Series {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars: Vec<crate::domain::Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            crate::domain::Bar::new(
                "TEST",
                start + Duration::days(i as i64),
                c - 0.5,
                c + 1.0,
                c - 1.0,
                c,
                1000.0,
            )
        })
        .collect();
    crate::domain::Series::from_bars(&bars).unwrap()
}
