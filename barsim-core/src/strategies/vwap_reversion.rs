//! VWAP mean reversion: trade the deviation of price from cumulative VWAP.

use rand::RngCore;

use crate::domain::{Action, SeriesView};
use crate::indicators::vwap;

use super::Strategy;

#[derive(Debug, Clone)]
pub struct VwapReversion {
    /// Fractional deviation that triggers a trade (0.01 = 1%).
    pub threshold: f64,
}

impl VwapReversion {
    pub const DEFAULT_THRESHOLD: f64 = 0.01;

    pub fn new(threshold: f64) -> Self {
        assert!(threshold >= 0.0, "VWAP threshold must be >= 0");
        Self { threshold }
    }
}

impl Default for VwapReversion {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl Strategy for VwapReversion {
    fn name(&self) -> &str {
        "vwap"
    }

    fn warmup_bars(&self) -> usize {
        1
    }

    fn decide(&self, history: &SeriesView<'_>, _rng: &mut dyn RngCore) -> Action {
        let closes = history.closes();
        let volumes = history.volumes();
        if closes.is_empty() || volumes.len() != closes.len() {
            return Action::Hold;
        }

        let price = closes[closes.len() - 1];
        let current = vwap(closes, volumes)[closes.len() - 1];
        // Zero cumulative volume leaves no reference price.
        if current == 0.0 {
            return Action::Hold;
        }

        let deviation = (price - current) / current;
        if deviation < -self.threshold {
            Action::Buy
        } else if deviation > self.threshold {
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

    fn decide(closes: &[f64]) -> Action {
        let series = make_series(closes);
        VwapReversion::default().decide(&series.view(), &mut StepRng::new(0, 1))
    }

    #[test]
    fn holds_on_empty_history() {
        assert_eq!(decide(&[]), Action::Hold);
    }

    #[test]
    fn single_bar_equals_vwap() {
        assert_eq!(decide(&[100.0]), Action::Hold);
    }

    #[test]
    fn buys_below_vwap() {
        // VWAP (equal volumes) = 99.33; price 98 is 1.3% below.
        assert_eq!(decide(&[100.0, 100.0, 98.0]), Action::Buy);
    }

    #[test]
    fn sells_above_vwap() {
        assert_eq!(decide(&[100.0, 100.0, 103.0]), Action::Sell);
    }

    #[test]
    fn holds_within_band() {
        assert_eq!(decide(&[100.0, 100.0, 100.5]), Action::Hold);
    }
}
