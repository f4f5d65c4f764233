//! Strategy factory: turns a [`StrategyConfig`] into a runnable strategy.

use std::sync::Arc;

use tracing::{debug, warn};

use barsim_core::domain::Series;
use barsim_core::strategies::{
    BollingerReversion, Ensemble, MaCrossover, MarkovStrategy, RsiReversion, Strategy,
    VwapReversion,
};

use crate::config::{ConfigError, StrategyConfig};

/// Build a strategy. Markov models are fit on `series`.
///
/// The config is validated first, so no constructor precondition can fire.
pub fn build_strategy(
    config: &StrategyConfig,
    series: &Series,
) -> Result<Arc<dyn Strategy>, ConfigError> {
    config.validate()?;
    build_validated(config, series)
}

fn build_validated(
    config: &StrategyConfig,
    series: &Series,
) -> Result<Arc<dyn Strategy>, ConfigError> {
    let strategy: Arc<dyn Strategy> = match config {
        StrategyConfig::MaCrossover {
            short_window,
            long_window,
        } => Arc::new(MaCrossover::new(*short_window, *long_window)),
        StrategyConfig::Rsi {
            period,
            oversold,
            overbought,
        } => Arc::new(RsiReversion::new(*period, *oversold, *overbought)),
        StrategyConfig::Bollinger { period, multiplier } => {
            Arc::new(BollingerReversion::new(*period, *multiplier))
        }
        StrategyConfig::Vwap { threshold } => Arc::new(VwapReversion::new(*threshold)),
        StrategyConfig::Markov { depth, mode } => {
            warn!(
                ticker = series.ticker(),
                depth,
                "Markov model is fit on the same series it will be backtested on"
            );
            Arc::new(MarkovStrategy::fit(series, *depth, *mode))
        }
        StrategyConfig::Ensemble { members } => {
            let built = members
                .iter()
                .map(|m| build_validated(&m.strategy, series))
                .collect::<Result<Vec<_>, _>>()?;
            let weights = StrategyConfig::member_weights(members);
            Arc::new(Ensemble::new(built, weights)?)
        }
    };
    debug!(strategy = strategy.name(), "built strategy");
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemberConfig;
    use barsim_core::data::random_walk;
    use barsim_core::strategies::PredictionMode;
    use chrono::{Duration, TimeZone, Utc};

    fn series() -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        random_walk("FAC", 60, start, Duration::days(1), 3)
    }

    #[test]
    fn builds_every_builtin() {
        let series = series();
        for config in StrategyConfig::builtin() {
            let strategy = build_strategy(&config, &series).unwrap();
            assert_eq!(strategy.name(), config.name());
        }
    }

    #[test]
    fn invalid_config_is_an_error_not_a_panic() {
        let config = StrategyConfig::MaCrossover {
            short_window: 10,
            long_window: 10,
        };
        assert!(matches!(
            build_strategy(&config, &series()),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn nested_ensemble_builds() {
        let config = StrategyConfig::Ensemble {
            members: vec![
                MemberConfig {
                    weight: Some(2.0),
                    strategy: StrategyConfig::Markov {
                        depth: 2,
                        mode: PredictionMode::MostLikely,
                    },
                },
                MemberConfig {
                    weight: Some(1.0),
                    strategy: StrategyConfig::from_name("ensemble").unwrap(),
                },
            ],
        };
        let strategy = build_strategy(&config, &series()).unwrap();
        assert_eq!(strategy.name(), "ensemble");
        assert!(strategy.warmup_bars() >= 20);
    }
}
