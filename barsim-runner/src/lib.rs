//! Barsim Runner: backtest orchestration.
//!
//! This crate builds on `barsim-core` to provide:
//! - TOML configuration with validated strategy parameters
//! - A strategy factory (including nested ensembles and fitted Markov models)
//! - Single-backtest runner from a config file
//! - Parallel batch runs over one series with reproducible per-run RNG streams

pub mod config;
pub mod factory;
pub mod runner;

pub use config::{parse_interval, BacktestConfig, BacktestSection, ConfigError, MemberConfig, StrategyConfig};
pub use factory::build_strategy;
pub use runner::{
    load_series, run_batch, run_from_series, run_single_backtest, run_strategies, RunError,
    RunReport,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn reports_and_configs_are_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
