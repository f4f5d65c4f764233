//! Ledger entries and the summary record of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Action;

/// One evaluated bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub open_price: f64,
    pub close_price: f64,
    pub step_profit_loss: f64,
    pub cumulative_profit_loss: f64,
    pub capital_after: f64,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_profit_loss: f64,
    /// Peak of cumulative P/L, in currency units.
    pub max_up: f64,
    /// Trough of cumulative P/L, in currency units.
    pub max_down: f64,
    pub trade_log: Vec<TradeLogEntry>,
    pub buy_count: usize,
    pub sell_count: usize,
    pub hold_count: usize,
    pub total_count: usize,
    pub final_capital: f64,
    pub gain_market: f64,
    pub gain_strategy: f64,
    pub gain_vs_market: f64,
}

impl BacktestResult {
    pub fn count(&self, action: Action) -> usize {
        match action {
            Action::Buy => self.buy_count,
            Action::Sell => self.sell_count,
            Action::Hold => self.hold_count,
        }
    }
}
