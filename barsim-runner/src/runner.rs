//! Backtest runner: wires together data loading, the strategy factory, and the engine.
//!
//! Entry points:
//! - `run_single_backtest()`: loads the CSV named in the config, then runs. Used by CLI.
//! - `run_from_series()`: takes a pre-loaded series and one strategy config.
//! - `run_batch()`: several strategy configs over one series, in parallel.
//! - `run_strategies()`: already-built strategies over one series, in parallel.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use barsim_core::data::{fill_missing, load_csv, remove_outliers, DataError, FillStrategy};
use barsim_core::domain::Series;
use barsim_core::engine::{run_backtest, BacktestResult, EngineConfig, EngineError};
use barsim_core::rng::RngHierarchy;
use barsim_core::strategies::Strategy;

use crate::config::{BacktestConfig, BacktestSection, ConfigError, StrategyConfig};
use crate::factory::build_strategy;

/// Band width, in standard deviations, for outlier removal when cleaning.
pub const OUTLIER_STDDEVS: f64 = 2.0;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("backtest rejected: {0}")]
    Engine(#[from] EngineError),
}

/// Result of one strategy over one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub ticker: String,
    pub strategy: String,
    /// Bars in the input series.
    pub bar_count: usize,
    /// Bars that produced a ledger entry.
    pub evaluated_bars: usize,
    pub result: BacktestResult,
}

/// Run the backtest described by `config`.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let series = load_series(&config.backtest)?;
    let engine_config = config.engine_config()?;
    let rngs = RngHierarchy::new(config.backtest.seed);
    run_from_series(&series, &config.strategy, &engine_config, &rngs, 0)
}

/// Load the configured CSV, cleaning it if requested.
pub fn load_series(section: &BacktestSection) -> Result<Series, RunError> {
    let series = load_csv(&section.data, &section.ticker)?;
    if !section.clean {
        return Ok(series);
    }
    let filled = fill_missing(&series, FillStrategy::Mean);
    let cleaned = remove_outliers(&filled, OUTLIER_STDDEVS);
    info!(
        ticker = cleaned.ticker(),
        before = series.len(),
        after = cleaned.len(),
        "cleaned series"
    );
    Ok(cleaned)
}

/// Build `strategy` on `series` and run it. `iteration` selects the RNG stream.
pub fn run_from_series(
    series: &Series,
    strategy: &StrategyConfig,
    engine_config: &EngineConfig,
    rngs: &RngHierarchy,
    iteration: u64,
) -> Result<RunReport, RunError> {
    let built = build_strategy(strategy, series)?;
    run_built(series, built.as_ref(), engine_config, rngs, iteration)
}

/// Run every config over `series` in parallel. Output order matches `configs`.
///
/// Config `i` draws from RNG stream `i`, so results do not depend on
/// scheduling.
pub fn run_batch(
    series: &Series,
    configs: &[StrategyConfig],
    engine_config: &EngineConfig,
    seed: u64,
) -> Vec<Result<RunReport, RunError>> {
    let rngs = RngHierarchy::new(seed);
    info!(
        ticker = series.ticker(),
        strategies = configs.len(),
        "running batch"
    );
    configs
        .par_iter()
        .enumerate()
        .map(|(i, config)| run_from_series(series, config, engine_config, &rngs, i as u64))
        .collect()
}

/// Run already-built strategies over `series` in parallel.
///
/// Strategies are shared, not cloned; a fitted Markov model is read by every
/// run that holds it.
pub fn run_strategies(
    series: &Series,
    strategies: &[Arc<dyn Strategy>],
    engine_config: &EngineConfig,
    seed: u64,
) -> Vec<Result<RunReport, RunError>> {
    let rngs = RngHierarchy::new(seed);
    strategies
        .par_iter()
        .enumerate()
        .map(|(i, s)| run_built(series, s.as_ref(), engine_config, &rngs, i as u64))
        .collect()
}

fn run_built(
    series: &Series,
    strategy: &dyn Strategy,
    engine_config: &EngineConfig,
    rngs: &RngHierarchy,
    iteration: u64,
) -> Result<RunReport, RunError> {
    let mut rng = rngs.rng_for(series.ticker(), strategy.name(), iteration);
    let result = run_backtest(series, strategy, engine_config, &mut rng)?;
    Ok(RunReport {
        ticker: series.ticker().to_string(),
        strategy: strategy.name().to_string(),
        bar_count: series.len(),
        evaluated_bars: result.total_count,
        result,
    })
}
