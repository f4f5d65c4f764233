//! Bar-by-bar event loop.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::domain::{Action, Field, Series};
use crate::strategies::Strategy;

use super::accounting::{step_profit_loss, CapitalAccount};
use super::result::{BacktestResult, TradeLogEntry};
use super::state::{EngineConfig, EngineError};

/// Run `strategy` over `series`.
///
/// Bar `i` is decided on the prefix `0..i`, so the strategy never sees the
/// bar it trades. Bars closer than `config.interval` to their predecessor
/// are skipped entirely. Validation failures return before any bar is
/// simulated.
pub fn run_backtest(
    series: &Series,
    strategy: &dyn Strategy,
    config: &EngineConfig,
    rng: &mut dyn RngCore,
) -> Result<BacktestResult, EngineError> {
    let (timestamps, opens, closes) = validate(series, config)?;

    info!(
        ticker = series.ticker(),
        strategy = strategy.name(),
        bars = series.len(),
        "starting backtest"
    );

    let mut account = CapitalAccount::new(config.initial_capital);
    let mut trade_log = Vec::with_capacity(series.len());

    for i in 0..series.len() {
        if i > 0 && timestamps[i] - timestamps[i - 1] < config.interval {
            debug!(bar = i, timestamp = %timestamps[i], "skipped: inside interval");
            continue;
        }

        let action = strategy.decide(&series.head(i), rng);
        let (open, close) = (opens[i], closes[i]);
        if !open.is_finite() || !close.is_finite() {
            warn!(
                bar = i,
                timestamp = %timestamps[i],
                open,
                close,
                "missing price, step booked flat"
            );
        }
        let step = step_profit_loss(action, open, close, account.capital());
        account.apply(step);

        debug!(
            bar = i,
            timestamp = %timestamps[i],
            %action,
            step,
            capital = account.capital(),
            "evaluated"
        );

        trade_log.push(TradeLogEntry {
            timestamp: timestamps[i],
            action,
            open_price: open,
            close_price: close,
            step_profit_loss: step,
            cumulative_profit_loss: account.total_profit_loss(),
            capital_after: account.capital(),
        });
    }

    let result = summarize(trade_log, &account);
    info!(
        ticker = series.ticker(),
        strategy = strategy.name(),
        evaluated = result.total_count,
        total_profit_loss = result.total_profit_loss,
        gain_vs_market = result.gain_vs_market,
        "backtest complete"
    );
    Ok(result)
}

type Columns<'a> = (&'a [DateTime<Utc>], &'a [f64], &'a [f64]);

fn validate<'a>(series: &'a Series, config: &EngineConfig) -> Result<Columns<'a>, EngineError> {
    let timestamps = series.timestamps().ok_or(EngineError::MissingTimeField)?;
    let opens = series
        .column(Field::Open)
        .ok_or(EngineError::MissingField(Field::Open))?;
    let closes = series
        .column(Field::Close)
        .ok_or(EngineError::MissingField(Field::Close))?;

    if config.initial_capital.is_nan() || config.initial_capital <= 0.0 {
        return Err(EngineError::NonPositiveCapital(config.initial_capital));
    }
    if config.interval <= Duration::zero() {
        return Err(EngineError::NonPositiveInterval);
    }

    // One adjacent pair at or below the interval is enough.
    let fine_enough = timestamps
        .windows(2)
        .any(|pair| pair[1] - pair[0] <= config.interval);
    if !fine_enough {
        return Err(EngineError::IntervalTooCoarse {
            interval: config.interval,
        });
    }

    Ok((timestamps, opens, closes))
}

fn summarize(trade_log: Vec<TradeLogEntry>, account: &CapitalAccount) -> BacktestResult {
    let count = |action: Action| trade_log.iter().filter(|e| e.action == action).count();
    let buy_count = count(Action::Buy);
    let sell_count = count(Action::Sell);
    let hold_count = count(Action::Hold);

    let gain_market = match (trade_log.first(), trade_log.last()) {
        (Some(first), Some(last))
            if first.open_price != 0.0
                && first.open_price.is_finite()
                && last.close_price.is_finite() =>
        {
            (last.close_price - first.open_price) / first.open_price
        }
        _ => 0.0,
    };
    let gain_strategy = account.gain();

    BacktestResult {
        total_profit_loss: account.total_profit_loss(),
        max_up: account.max_up(),
        max_down: account.max_down(),
        total_count: trade_log.len(),
        trade_log,
        buy_count,
        sell_count,
        hold_count,
        final_capital: account.capital(),
        gain_market,
        gain_strategy,
        gain_vs_market: gain_strategy - gain_market,
    }
}
