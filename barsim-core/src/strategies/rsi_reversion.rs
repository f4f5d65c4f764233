//! RSI mean reversion: buy oversold, sell overbought.

use rand::RngCore;

use crate::domain::{Action, SeriesView};
use crate::indicators::rsi;

use super::Strategy;

#[derive(Debug, Clone)]
pub struct RsiReversion {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiReversion {
    pub const DEFAULT_PERIOD: usize = 2;
    pub const DEFAULT_OVERSOLD: f64 = 30.0;
    pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        assert!(
            oversold < overbought,
            "oversold threshold must be below overbought"
        );
        Self {
            period,
            oversold,
            overbought,
        }
    }

    pub fn default_params() -> Self {
        Self::new(
            Self::DEFAULT_PERIOD,
            Self::DEFAULT_OVERSOLD,
            Self::DEFAULT_OVERBOUGHT,
        )
    }
}

impl Default for RsiReversion {
    fn default() -> Self {
        Self::default_params()
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi"
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn decide(&self, history: &SeriesView<'_>, _rng: &mut dyn RngCore) -> Action {
        let closes = history.closes();
        if closes.len() < self.warmup_bars() {
            return Action::Hold;
        }

        let current = rsi(closes, self.period)[closes.len() - 1];
        if current < self.oversold {
            Action::Buy
        } else if current > self.overbought {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}
