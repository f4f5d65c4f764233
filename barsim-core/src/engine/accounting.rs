//! Step P/L and the running capital account.

use crate::domain::Action;

/// Profit or loss of acting on one bar with the current capital.
///
/// A zero or missing (non-finite) open, or a missing close, yields 0 for
/// every action.
pub fn step_profit_loss(action: Action, open: f64, close: f64, capital: f64) -> f64 {
    if open == 0.0 || !open.is_finite() || !close.is_finite() {
        return 0.0;
    }
    match action {
        Action::Buy => (close - open) / open * capital,
        Action::Sell => (open - close) / open * capital,
        Action::Hold => 0.0,
    }
}

/// Capital and cumulative P/L tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalAccount {
    initial_capital: f64,
    capital: f64,
    total_profit_loss: f64,
    max_up: f64,
    max_down: f64,
}

impl CapitalAccount {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            capital: initial_capital,
            total_profit_loss: 0.0,
            max_up: 0.0,
            max_down: 0.0,
        }
    }

    /// Book one step. Capital never drops below zero.
    pub fn apply(&mut self, step: f64) {
        self.total_profit_loss += step;
        self.capital = (self.capital + step).max(0.0);
        self.max_up = self.max_up.max(self.total_profit_loss);
        self.max_down = self.max_down.min(self.total_profit_loss);
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn total_profit_loss(&self) -> f64 {
        self.total_profit_loss
    }

    /// Highest cumulative P/L seen so far (never below 0).
    pub fn max_up(&self) -> f64 {
        self.max_up
    }

    /// Lowest cumulative P/L seen so far (never above 0).
    pub fn max_down(&self) -> f64 {
        self.max_down
    }

    pub fn gain(&self) -> f64 {
        self.total_profit_loss / self.initial_capital
    }
}
