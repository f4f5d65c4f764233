//! Barsim CLI: run and compare backtests over a CSV price series.
//!
//! Commands:
//! - `run` - one strategy, from a TOML config file or from flags
//! - `compare` - every built-in strategy over the same series, in parallel

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use barsim_core::domain::Action;
use barsim_core::engine::EngineConfig;
use barsim_core::strategies::PredictionMode;
use barsim_runner::{
    load_series, parse_interval, run_batch, run_single_backtest, BacktestConfig, BacktestSection,
    RunReport, StrategyConfig,
};

#[derive(Parser)]
#[command(name = "barsim", about = "Barsim - bar-by-bar strategy backtesting")]
struct Cli {
    /// Log filter (e.g. "info", "barsim_core=debug"). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one strategy over a CSV series.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV file (required without --config).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Strategy: ma_crossover, rsi, bollinger, vwap, markov, ensemble.
        #[arg(long)]
        strategy: Option<String>,

        /// Markov order (markov only).
        #[arg(long)]
        depth: Option<usize>,

        /// Use arg-max instead of sampling (markov only).
        #[arg(long, default_value_t = false)]
        most_likely: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run every built-in strategy over the same series and compare.
    Compare {
        /// CSV file.
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Ticker used when the CSV has no ticker column.
    #[arg(long, default_value = "TICKER")]
    ticker: String,

    /// Minimum time between evaluated bars: <n>{s,m,h,d,w}.
    #[arg(long, default_value = "1d")]
    interval: String,

    /// Initial capital.
    #[arg(long, default_value_t = 10_000.0)]
    capital: f64,

    /// Master seed for stochastic strategies.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Fill missing values and drop outliers before running.
    #[arg(long, default_value_t = false)]
    clean: bool,

    /// Print the full report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl CommonArgs {
    fn section(&self, data: PathBuf) -> BacktestSection {
        BacktestSection {
            ticker: self.ticker.clone(),
            data,
            interval: self.interval.clone(),
            initial_capital: self.capital,
            seed: self.seed,
            clean: self.clean,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run {
            config,
            data,
            strategy,
            depth,
            most_likely,
            common,
        } => run_cmd(config, data, strategy, depth, most_likely, common),
        Commands::Compare { data, common } => compare_cmd(data, common),
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid --log-level '{directive}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_cmd(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    strategy: Option<String>,
    depth: Option<usize>,
    most_likely: bool,
    common: CommonArgs,
) -> Result<()> {
    if config_path.is_some() && (data.is_some() || strategy.is_some()) {
        bail!("--config cannot be combined with --data or --strategy");
    }

    let config = match (config_path, data) {
        (Some(path), None) => BacktestConfig::from_file(&path)?,
        (None, Some(data)) => {
            let name = strategy.as_deref().unwrap_or("ma_crossover");
            let strategy = flag_strategy(name, depth, most_likely)?;
            let config = BacktestConfig {
                backtest: common.section(data),
                strategy,
            };
            config.validate()?;
            config
        }
        _ => bail!("one of --config or --data is required"),
    };

    let report = run_single_backtest(&config)?;
    if common.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn flag_strategy(name: &str, depth: Option<usize>, most_likely: bool) -> Result<StrategyConfig> {
    let mut strategy = StrategyConfig::from_name(name)?;
    match &mut strategy {
        StrategyConfig::Markov {
            depth: configured,
            mode,
        } => {
            if let Some(d) = depth {
                *configured = d;
            }
            if most_likely {
                *mode = PredictionMode::MostLikely;
            }
        }
        _ if depth.is_some() || most_likely => {
            bail!("--depth and --most-likely only apply to --strategy markov")
        }
        _ => {}
    }
    Ok(strategy)
}

fn compare_cmd(data: PathBuf, common: CommonArgs) -> Result<()> {
    let section = common.section(data);
    let series = load_series(&section)?;
    let engine_config = EngineConfig::new(parse_interval(&section.interval)?, section.initial_capital);
    let configs = StrategyConfig::builtin();

    let outcomes = run_batch(&series, &configs, &engine_config, section.seed);

    let mut reports = Vec::with_capacity(outcomes.len());
    for (config, outcome) in configs.iter().zip(outcomes) {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => warn!(strategy = config.name(), error = %e, "strategy failed"),
        }
    }
    if reports.is_empty() {
        bail!("every strategy failed");
    }

    if common.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_comparison(&reports);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let r = &report.result;
    println!();
    println!("=== Backtest: {} / {} ===", report.ticker, report.strategy);
    println!(
        "Bars:            {} ({} evaluated)",
        report.bar_count, report.evaluated_bars
    );
    println!(
        "Actions:         {} buy / {} sell / {} hold",
        r.count(Action::Buy),
        r.count(Action::Sell),
        r.count(Action::Hold)
    );
    println!("Total P/L:       {:.2}", r.total_profit_loss);
    println!("Final capital:   {:.2}", r.final_capital);
    println!("Strategy gain:   {:.2}%", r.gain_strategy * 100.0);
    println!("Max up:          {:.2}", r.max_up);
    println!("Max down:        {:.2}", r.max_down);
    println!("Market gain:     {:.2}%", r.gain_market * 100.0);
    println!("Gain vs market:  {:.2}%", r.gain_vs_market * 100.0);
    println!();
}

fn print_comparison(reports: &[RunReport]) {
    let Some(first) = reports.first() else {
        return;
    };
    println!();
    println!(
        "=== {} - {} bars ({} evaluated), market gain {:.2}% ===",
        first.ticker,
        first.bar_count,
        first.evaluated_bars,
        first.result.gain_market * 100.0
    );
    println!(
        "{:<14} {:>6} {:>6} {:>6} {:>12} {:>10} {:>10}",
        "strategy", "buy", "sell", "hold", "P/L", "gain %", "vs mkt %"
    );
    for report in reports {
        let r = &report.result;
        println!(
            "{:<14} {:>6} {:>6} {:>6} {:>12.2} {:>10.2} {:>10.2}",
            report.strategy,
            r.buy_count,
            r.sell_count,
            r.hold_count,
            r.total_profit_loss,
            r.gain_strategy * 100.0,
            r.gain_vs_market * 100.0
        );
    }
    println!();
}
