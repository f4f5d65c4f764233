//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! ticker = "TSLA"
//! data = "data/tsla.csv"
//! interval = "1d"
//! initial_capital = 10000.0
//! seed = 42
//!
//! [strategy]
//! type = "markov"
//! depth = 2
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barsim_core::engine::EngineConfig;
use barsim_core::indicators::bollinger;
use barsim_core::strategies::{
    EnsembleError, MaCrossover, PredictionMode, RsiReversion, VwapReversion,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid interval '{0}': expected <n>{{s,m,h,d,w}}, e.g. \"1d\"")]
    InvalidInterval(String),
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),
    #[error("{strategy}: {message}")]
    InvalidParameter {
        strategy: &'static str,
        message: String,
    },
    #[error("unknown strategy '{0}'. Valid: ma_crossover, rsi, bollinger, vwap, markov, ensemble")]
    UnknownStrategy(String),
    #[error("ensemble: {0}")]
    Ensemble(#[from] EnsembleError),
}

/// Top-level config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
}

/// `[backtest]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub ticker: String,
    /// CSV file with the price series.
    pub data: PathBuf,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    /// Master seed for stochastic strategies.
    #[serde(default)]
    pub seed: u64,
    /// Fill missing values and drop outlier rows before running.
    #[serde(default)]
    pub clean: bool,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_capital() -> f64 {
    10_000.0
}

/// `[strategy]` table, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    MaCrossover {
        #[serde(default = "default_short")]
        short_window: usize,
        #[serde(default = "default_long")]
        long_window: usize,
    },
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    Bollinger {
        #[serde(default = "default_bollinger_period")]
        period: usize,
        #[serde(default = "default_multiplier")]
        multiplier: f64,
    },
    Vwap {
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    Markov {
        #[serde(default = "default_depth")]
        depth: usize,
        #[serde(default)]
        mode: PredictionMode,
    },
    Ensemble { members: Vec<MemberConfig> },
}

/// One `[[strategy.members]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberConfig {
    /// Omit on every member for uniform weights.
    #[serde(default)]
    pub weight: Option<f64>,
    pub strategy: StrategyConfig,
}

fn default_short() -> usize {
    MaCrossover::DEFAULT_SHORT
}
fn default_long() -> usize {
    MaCrossover::DEFAULT_LONG
}
fn default_rsi_period() -> usize {
    RsiReversion::DEFAULT_PERIOD
}
fn default_oversold() -> f64 {
    RsiReversion::DEFAULT_OVERSOLD
}
fn default_overbought() -> f64 {
    RsiReversion::DEFAULT_OVERBOUGHT
}
fn default_bollinger_period() -> usize {
    bollinger::DEFAULT_PERIOD
}
fn default_multiplier() -> f64 {
    bollinger::DEFAULT_MULTIPLIER
}
fn default_threshold() -> f64 {
    VwapReversion::DEFAULT_THRESHOLD
}
fn default_depth() -> usize {
    1
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capital = self.backtest.initial_capital;
        if capital.is_nan() || capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(capital));
        }
        parse_interval(&self.backtest.interval)?;
        self.strategy.validate()
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig::new(
            parse_interval(&self.backtest.interval)?,
            self.backtest.initial_capital,
        ))
    }
}

impl StrategyConfig {
    /// Strategy with its default parameters, by config name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "ma_crossover" => StrategyConfig::MaCrossover {
                short_window: default_short(),
                long_window: default_long(),
            },
            "rsi" => StrategyConfig::Rsi {
                period: default_rsi_period(),
                oversold: default_oversold(),
                overbought: default_overbought(),
            },
            "bollinger" => StrategyConfig::Bollinger {
                period: default_bollinger_period(),
                multiplier: default_multiplier(),
            },
            "vwap" => StrategyConfig::Vwap {
                threshold: default_threshold(),
            },
            "markov" => StrategyConfig::Markov {
                depth: default_depth(),
                mode: PredictionMode::default(),
            },
            "ensemble" => StrategyConfig::Ensemble {
                members: Self::indicator_strategies()
                    .into_iter()
                    .map(|strategy| MemberConfig {
                        weight: None,
                        strategy,
                    })
                    .collect(),
            },
            other => return Err(ConfigError::UnknownStrategy(other.to_string())),
        };
        Ok(config)
    }

    /// The four indicator strategies with default parameters.
    pub fn indicator_strategies() -> Vec<StrategyConfig> {
        ["ma_crossover", "rsi", "bollinger", "vwap"]
            .into_iter()
            .filter_map(|name| Self::from_name(name).ok())
            .collect()
    }

    /// Every built-in strategy with default parameters.
    pub fn builtin() -> Vec<StrategyConfig> {
        [
            "ma_crossover",
            "rsi",
            "bollinger",
            "vwap",
            "markov",
            "ensemble",
        ]
        .into_iter()
        .filter_map(|name| Self::from_name(name).ok())
        .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::MaCrossover { .. } => "ma_crossover",
            StrategyConfig::Rsi { .. } => "rsi",
            StrategyConfig::Bollinger { .. } => "bollinger",
            StrategyConfig::Vwap { .. } => "vwap",
            StrategyConfig::Markov { .. } => "markov",
            StrategyConfig::Ensemble { .. } => "ensemble",
        }
    }

    /// Check parameters so strategy construction cannot panic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let strategy = self.name();
        let invalid = |message: String| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidParameter { strategy, message })
        };

        match self {
            StrategyConfig::MaCrossover {
                short_window,
                long_window,
            } => {
                if *short_window == 0 {
                    return invalid("short_window must be >= 1".into());
                }
                if long_window <= short_window {
                    return invalid(format!(
                        "long_window ({long_window}) must be > short_window ({short_window})"
                    ));
                }
            }
            StrategyConfig::Rsi {
                period,
                oversold,
                overbought,
            } => {
                if *period == 0 {
                    return invalid("period must be >= 1".into());
                }
                if !(oversold < overbought) {
                    return invalid(format!(
                        "oversold ({oversold}) must be below overbought ({overbought})"
                    ));
                }
            }
            StrategyConfig::Bollinger { period, multiplier } => {
                if *period == 0 {
                    return invalid("period must be >= 1".into());
                }
                if !multiplier.is_finite() || *multiplier < 0.0 {
                    return invalid(format!("multiplier must be >= 0, got {multiplier}"));
                }
            }
            StrategyConfig::Vwap { threshold } => {
                if !threshold.is_finite() || *threshold < 0.0 {
                    return invalid(format!("threshold must be >= 0, got {threshold}"));
                }
            }
            StrategyConfig::Markov { depth, .. } => {
                if *depth == 0 {
                    return invalid("depth must be >= 1".into());
                }
            }
            StrategyConfig::Ensemble { members } => {
                if members.is_empty() {
                    return Err(EnsembleError::Empty.into());
                }
                let weighted = members.iter().filter(|m| m.weight.is_some()).count();
                if weighted != 0 && weighted != members.len() {
                    return Err(EnsembleError::WeightCountMismatch {
                        members: members.len(),
                        weights: weighted,
                    }
                    .into());
                }
                for (index, member) in members.iter().enumerate() {
                    if let Some(weight) = member.weight {
                        if !weight.is_finite() || weight <= 0.0 {
                            return Err(EnsembleError::InvalidWeight { index, weight }.into());
                        }
                    }
                    member.strategy.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Explicit member weights, or `None` for uniform.
    pub(crate) fn member_weights(members: &[MemberConfig]) -> Option<Vec<f64>> {
        members.iter().map(|m| m.weight).collect()
    }
}

/// Parse `<n><unit>` with unit one of `s`, `m`, `h`, `d`, `w`.
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let err = || ConfigError::InvalidInterval(s.to_string());
    let s_trim = s.trim();
    let split = s_trim
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(err)?;
    let (digits, unit) = s_trim.split_at(split);
    let n: i64 = digits.parse().map_err(|_| err())?;
    if n <= 0 {
        return Err(err());
    }
    let interval = match unit {
        "s" => Duration::try_seconds(n),
        "m" => Duration::try_minutes(n),
        "h" => Duration::try_hours(n),
        "d" => Duration::try_days(n),
        "w" => Duration::try_weeks(n),
        _ => None,
    };
    interval.ok_or_else(err)
}
