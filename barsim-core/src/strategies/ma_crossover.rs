//! Moving average crossover: golden cross and death cross detection.
//!
//! Buys when the short MA crosses above the long MA and sells when it
//! crosses below.

use rand::RngCore;

use crate::domain::{Action, SeriesView};
use crate::indicators::moving_average;

use super::Strategy;

/// Moving average crossover strategy.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl MaCrossover {
    pub const DEFAULT_SHORT: usize = 5;
    pub const DEFAULT_LONG: usize = 20;

    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(short_window >= 1, "short_window must be >= 1");
        assert!(
            long_window > short_window,
            "long_window must be > short_window"
        );
        Self {
            short_window,
            long_window,
        }
    }

    pub fn default_params() -> Self {
        Self::new(Self::DEFAULT_SHORT, Self::DEFAULT_LONG)
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::default_params()
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.long_window
    }

    fn decide(&self, history: &SeriesView<'_>, _rng: &mut dyn RngCore) -> Action {
        let closes = history.closes();
        let n = closes.len();
        if n < self.long_window {
            return Action::Hold;
        }

        let short = moving_average(closes, self.short_window);
        let long = moving_average(closes, self.long_window);

        let (short_cur, long_cur) = (short[n - 1], long[n - 1]);
        // With exactly `long_window` bars the previous long MA is still a
        // warmup placeholder, so the previous pair counts as level.
        let (short_prev, long_prev) = if n > self.long_window {
            (short[n - 2], long[n - 2])
        } else {
            (0.0, 0.0)
        };

        if short_prev <= long_prev && short_cur > long_cur {
            Action::Buy
        } else if short_prev >= long_prev && short_cur < long_cur {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::make_series;
    use rand::rngs::mock::StepRng;

    fn decide(strategy: &MaCrossover, closes: &[f64]) -> Action {
        let series = make_series(closes);
        strategy.decide(&series.view(), &mut StepRng::new(0, 1))
    }

    #[test]
    fn holds_during_warmup() {
        let closes: Vec<f64> = (0..19).map(|i| 100.0 + i as f64).collect();
        assert_eq!(decide(&MaCrossover::default(), &closes), Action::Hold);
    }

    #[test]
    fn buys_when_averages_first_valid_and_short_above() {
        // Previous pair is the (0, 0) placeholder, so the first full window can cross.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(decide(&MaCrossover::default(), &closes), Action::Buy);
    }

    #[test]
    fn sells_when_averages_first_valid_and_short_below() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        assert_eq!(decide(&MaCrossover::default(), &closes), Action::Sell);
    }

    #[test]
    fn steady_trend_holds_after_first_valid_bar() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        assert_eq!(decide(&MaCrossover::default(), &closes), Action::Hold);
    }

    #[test]
    fn golden_cross_fires_buy() {
        // Short window 2, long window 3. Falling then a sharp rise.
        let strategy = MaCrossover::new(2, 3);
        // Prev: short(9,8)=8.5 vs long(10,9,8)=9 → short below.
        // Cur: short(8,14)=11 vs long(9,8,14)=10.33 → short above.
        assert_eq!(decide(&strategy, &[10.0, 9.0, 8.0, 14.0]), Action::Buy);
    }

    #[test]
    fn death_cross_fires_sell() {
        let strategy = MaCrossover::new(2, 3);
        // Prev: short(11,12)=11.5 vs long(10,11,12)=11 → above.
        // Cur: short(12,6)=9 vs long(11,12,6)=9.67 → below.
        assert_eq!(decide(&strategy, &[10.0, 11.0, 12.0, 6.0]), Action::Sell);
    }

    #[test]
    #[should_panic(expected = "long_window must be > short_window")]
    fn rejects_inverted_windows() {
        MaCrossover::new(20, 5);
    }
}
