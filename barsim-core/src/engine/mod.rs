//! Backtesting engine: bar-by-bar simulation of one strategy over a series.
//!
//! Per eligible bar the engine:
//!
//! 1. Skips the bar if it follows the previous bar by less than the interval
//! 2. Asks the strategy for an action on the prefix of earlier bars
//! 3. Applies the action to the bar's open → close move
//! 4. Updates capital and the cumulative P/L high/low water marks
//! 5. Appends a ledger entry
//!
//! Validation happens before the loop; a rejected series produces no ledger.

pub mod accounting;
pub mod loop_runner;
pub mod result;
pub mod state;

pub use accounting::{step_profit_loss, CapitalAccount};
pub use loop_runner::run_backtest;
pub use result::{BacktestResult, TradeLogEntry};
pub use state::{EngineConfig, EngineError};
