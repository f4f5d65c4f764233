//! Barsim Core: domain types, indicators, strategies, and the backtest engine.
//!
//! This crate contains the simulation itself:
//! - Domain types (bars, columnar series, actions)
//! - Indicator library (moving average, standard deviation, RSI, VWAP, Bollinger)
//! - Strategy capability with indicator strategies, a Markov predictor, and a weighted ensemble
//! - Bar-by-bar engine with interval coalescing and capital accounting
//! - Data collaborators (CSV ingest, in-memory store, cleaning, synthetic series)
//! - Deterministic RNG hierarchy for reproducible stochastic runs

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod rng;
pub mod strategies;

pub use domain::{Action, Bar, Field, Series, SeriesView};
pub use engine::{run_backtest, BacktestResult, EngineConfig, EngineError, TradeLogEntry};
pub use strategies::Strategy;
