//! Bollinger Band mean reversion: buy at the lower band, sell at the upper.

use rand::RngCore;

use crate::domain::{Action, SeriesView};
use crate::indicators::bollinger::{self, bollinger_bands};

use super::Strategy;

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    pub period: usize,
    pub multiplier: f64,
}

impl BollingerReversion {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self { period, multiplier }
    }

    pub fn default_params() -> Self {
        Self::new(bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULTIPLIER)
    }
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self::default_params()
    }
}

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn decide(&self, history: &SeriesView<'_>, _rng: &mut dyn RngCore) -> Action {
        let closes = history.closes();
        let n = closes.len();
        if n < self.period {
            return Action::Hold;
        }

        let bands = bollinger_bands(closes, self.period, self.multiplier);
        let price = closes[n - 1];

        if price <= bands.lower[n - 1] {
            Action::Buy
        } else if price >= bands.upper[n - 1] {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}
