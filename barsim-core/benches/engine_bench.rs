//! Criterion benchmarks for Barsim hot paths.
//!
//! Benchmarks:
//! 1. Indicator computation over a full series
//! 2. Markov model build
//! 3. Full engine runs (indicator strategy, Markov, ensemble)

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use barsim_core::data::random_walk;
use barsim_core::domain::Series;
use barsim_core::engine::{run_backtest, EngineConfig};
use barsim_core::indicators::{bollinger_bands, moving_average, rsi, vwap};
use barsim_core::strategies::{
    BollingerReversion, Ensemble, MaCrossover, MarkovStrategy, PredictionMode, RsiReversion,
    Strategy, TransitionModel, VwapReversion,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> Series {
    let start = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    random_walk("BENCH", n, start, Duration::days(1), 42)
}

// ── Indicators ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [252, 1260, 5040] {
        let series = make_series(n);
        let closes = series.closes().to_vec();
        let volumes = series.view().volumes().to_vec();

        group.bench_with_input(BenchmarkId::new("sma_20", n), &closes, |b, closes| {
            b.iter(|| moving_average(black_box(closes), 20))
        });
        group.bench_with_input(BenchmarkId::new("rsi_14", n), &closes, |b, closes| {
            b.iter(|| rsi(black_box(closes), 14))
        });
        group.bench_with_input(BenchmarkId::new("bollinger_20", n), &closes, |b, closes| {
            b.iter(|| bollinger_bands(black_box(closes), 20, 2.0))
        });
        group.bench_function(BenchmarkId::new("vwap", n), |b| {
            b.iter(|| vwap(black_box(&closes), black_box(&volumes)))
        });
    }
    group.finish();
}

// ── Markov build ─────────────────────────────────────────────────────

fn bench_markov_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("markov_build");
    let series = make_series(5040);
    for depth in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| TransitionModel::build(black_box(series.closes()), depth))
        });
    }
    group.finish();
}

// ── Engine ───────────────────────────────────────────────────────────

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(20);

    let series = make_series(504);
    let config = EngineConfig::daily(100_000.0);

    let crossover = MaCrossover::default();
    group.bench_function("ma_crossover_504_bars", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            run_backtest(black_box(&series), &crossover, &config, &mut rng)
        })
    });

    let markov = MarkovStrategy::fit(&series, 2, PredictionMode::Sample);
    group.bench_function("markov_504_bars", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            run_backtest(black_box(&series), &markov, &config, &mut rng)
        })
    });

    let members: Vec<Arc<dyn Strategy>> = vec![
        Arc::new(MaCrossover::default()),
        Arc::new(RsiReversion::default()),
        Arc::new(BollingerReversion::default()),
        Arc::new(VwapReversion::default()),
    ];
    if let Ok(ensemble) = Ensemble::uniform(members) {
        group.bench_function("ensemble_504_bars", |b| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                run_backtest(black_box(&series), &ensemble, &config, &mut rng)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_indicators, bench_markov_build, bench_engine);
criterion_main!(benches);
