//! Property tests for indicator and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Constant series - moving average and VWAP reproduce the constant
//! 2. Monotone rise - RSI is 100 once valid
//! 3. Action validity - every strategy answers Buy, Sell, or Hold
//! 4. Capital - never negative anywhere in the ledger
//! 5. Counts - per-action counts add up to the ledger length

use barsim_core::domain::{Action, Bar, Series};
use barsim_core::engine::{run_backtest, EngineConfig};
use barsim_core::indicators::{moving_average, rsi, vwap};
use barsim_core::strategies::{
    BollingerReversion, Ensemble, MaCrossover, MarkovStrategy, PredictionMode, RsiReversion,
    Strategy as TradingStrategy, VwapReversion,
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// (open, close) pairs for a daily series.
fn arb_bars(max: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((arb_price(), arb_price()), 2..max)
}

fn build_series(pairs: &[(f64, f64)]) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars: Vec<Bar> = pairs
        .iter()
        .enumerate()
        .map(|(i, &(o, c))| {
            Bar::new(
                "PROP",
                start + Duration::days(i as i64),
                o,
                o.max(c),
                o.min(c),
                c,
                1000.0 + i as f64,
            )
        })
        .collect();
    Series::from_bars(&bars).unwrap()
}

fn all_strategies(series: &Series, depth: usize) -> Vec<Arc<dyn TradingStrategy>> {
    let indicator: Vec<Arc<dyn TradingStrategy>> = vec![
        Arc::new(MaCrossover::default()),
        Arc::new(RsiReversion::default()),
        Arc::new(BollingerReversion::default()),
        Arc::new(VwapReversion::default()),
    ];
    let mut all = indicator.clone();
    all.push(Arc::new(MarkovStrategy::fit(
        series,
        depth,
        PredictionMode::Sample,
    )));
    all.push(Arc::new(MarkovStrategy::fit(
        series,
        depth,
        PredictionMode::MostLikely,
    )));
    if let Ok(ensemble) = Ensemble::uniform(indicator) {
        all.push(Arc::new(ensemble));
    }
    all
}

// ── 1. Constant series ───────────────────────────────────────────────

proptest! {
    #[test]
    fn moving_average_of_constant(c in arb_price(), n in 1usize..60, w in 1usize..20) {
        let values = vec![c; n];
        let ma = moving_average(&values, w);
        prop_assert_eq!(ma.len(), n);
        for (i, v) in ma.iter().enumerate() {
            if i + 1 < w {
                prop_assert_eq!(*v, 0.0);
            } else {
                prop_assert!((v - c).abs() < 1e-9 * c.max(1.0));
            }
        }
    }

    #[test]
    fn vwap_of_constant(p in arb_price(), vol in 1.0..1e6_f64, n in 1usize..60) {
        let out = vwap(&vec![p; n], &vec![vol; n]);
        for v in out {
            prop_assert!((v - p).abs() < 1e-9 * p);
        }
    }
}

// ── 2. Monotone rise ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_of_rising_series_is_100(
        base in arb_price(),
        step in 0.01..5.0_f64,
        n in 3usize..60,
        period in 1usize..10,
    ) {
        let values: Vec<f64> = (0..n).map(|i| base + step * i as f64).collect();
        let out = rsi(&values, period);
        for v in out.iter().skip(period) {
            prop_assert_eq!(*v, 100.0);
        }
    }
}

// ── 3–5. Engine ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn engine_invariants_hold(
        pairs in arb_bars(60),
        capital in 1.0..1e6_f64,
        depth in 1usize..4,
        seed in any::<u64>(),
    ) {
        let series = build_series(&pairs);
        let config = EngineConfig::daily(capital);

        for strategy in all_strategies(&series, depth) {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = run_backtest(&series, strategy.as_ref(), &config, &mut rng).unwrap();

            prop_assert_eq!(result.total_count, pairs.len());
            prop_assert_eq!(
                result.buy_count + result.sell_count + result.hold_count,
                result.total_count
            );
            for action in Action::PRIORITY {
                let logged = result.trade_log.iter().filter(|e| e.action == action).count();
                prop_assert_eq!(result.count(action), logged);
            }
            for entry in &result.trade_log {
                prop_assert!(matches!(entry.action, Action::Buy | Action::Sell | Action::Hold));
                prop_assert!(entry.capital_after >= 0.0);
            }
            prop_assert!(result.max_up >= 0.0);
            prop_assert!(result.max_down <= 0.0);
        }
    }
}
