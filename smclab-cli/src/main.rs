//! SMC Lab CLI: structure, fair value gap, Monte Carlo, and validation commands.
//!
//! Commands:
//! - `structure` prints swings, BOS/CHoCH breaks, trend, and bias for a candle CSV
//! - `fvg` prints gap and iFVG counts, the nearest gap, and the iFVG signal
//! - `monte-carlo` simulates reshuffled equity paths from a trade CSV
//! - `validate` runs the statistical significance tests on a trade CSV
//!
//! Every command accepts `--config <toml>`; explicit flags override it.
//! Log verbosity follows `RUST_LOG` (default `info`), written to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use smclab_core::data::{load_candles, load_trade_pnls};
use smclab_core::{FvgDetector, StructureAnalysis, StructureEngine, Trend};
use smclab_runner::report::{
    render_monte_carlo, render_validation, save_monte_carlo_json, save_validation_json,
};
use smclab_runner::{MonteCarloSimulator, SmcConfig, StatisticalValidator};

#[derive(Parser)]
#[command(
    name = "smclab",
    about = "SMC Lab: market structure detection and strategy risk analysis"
)]
struct Cli {
    /// TOML config with [structure], [fvg], [monte_carlo], [validation] sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect swings and structure breaks in an OHLC CSV.
    Structure {
        /// CSV with timestamp,open,high,low,close columns.
        #[arg(long)]
        candles: PathBuf,

        /// Override the swing strength (bars on each side).
        #[arg(long)]
        strength: Option<usize>,

        /// Print the full analysis as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Detect fair value gaps and inverse zones in an OHLC CSV.
    Fvg {
        #[arg(long)]
        candles: PathBuf,

        /// Price to query. Defaults to the last close.
        #[arg(long)]
        price: Option<f64>,

        /// Trend used to grade the iFVG signal (bullish, bearish, ranging).
        #[arg(long)]
        trend: Option<Trend>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Simulate reshuffled equity paths from a trade list.
    MonteCarlo {
        /// CSV with a `pnl` column.
        #[arg(long)]
        trades: PathBuf,

        #[arg(long)]
        simulations: Option<usize>,

        #[arg(long)]
        capital: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        threads: Option<usize>,

        /// Directory for the JSON report.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Test a trade list for statistical significance.
    Validate {
        /// CSV with a `pnl` column.
        #[arg(long)]
        trades: PathBuf,

        /// Capital the PnLs are relative to.
        #[arg(long)]
        capital: Option<f64>,

        #[arg(long)]
        alpha: Option<f64>,

        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Structure {
            candles,
            strength,
            json,
        } => {
            if let Some(s) = strength {
                config.structure.swing_strength = s;
            }
            config.validate()?;
            run_structure(&config, &candles, json)
        }
        Commands::Fvg {
            candles,
            price,
            trend,
            json,
        } => run_fvg(&config, &candles, price, trend, json),
        Commands::MonteCarlo {
            trades,
            simulations,
            capital,
            seed,
            threads,
            output_dir,
        } => {
            let mc = &mut config.monte_carlo;
            if let Some(n) = simulations {
                mc.n_simulations = n;
            }
            if let Some(c) = capital {
                mc.initial_capital = c;
            }
            if seed.is_some() {
                mc.seed = seed;
            }
            if threads.is_some() {
                mc.threads = threads;
            }
            config.validate()?;
            run_monte_carlo_cmd(&config, &trades, &output_dir)
        }
        Commands::Validate {
            trades,
            capital,
            alpha,
            output_dir,
        } => {
            if let Some(c) = capital {
                config.monte_carlo.initial_capital = c;
            }
            if let Some(a) = alpha {
                config.validation.alpha = a;
            }
            config.validate()?;
            run_validate(&config, &trades, &output_dir)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SmcConfig> {
    match path {
        Some(p) => SmcConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(SmcConfig::default()),
    }
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_structure(config: &SmcConfig, candles: &Path, json: bool) -> Result<()> {
    let series = load_candles(candles)
        .with_context(|| format!("failed to load candles from {}", candles.display()))?;
    let analysis = StructureEngine::new(config.structure.clone()).analyze(&series);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }
    print_structure(&analysis, series.len());
    Ok(())
}

fn run_fvg(
    config: &SmcConfig,
    candles: &Path,
    price: Option<f64>,
    trend: Option<Trend>,
    json: bool,
) -> Result<()> {
    let series = load_candles(candles)
        .with_context(|| format!("failed to load candles from {}", candles.display()))?;
    let Some(last) = series.last() else {
        bail!("no candles in {}", candles.display());
    };
    let price = price.unwrap_or(last.close);

    let trend = match trend {
        Some(t) => t,
        None => StructureEngine::new(config.structure.clone())
            .analyze(&series)
            .trend,
    };

    let scan = FvgDetector::new(config.fvg.clone()).detect(&series);
    let signal = scan.ifvg_signal(price, trend);

    if json {
        let doc = serde_json::json!({
            "price": price,
            "trend": trend,
            "summary": scan.summary(),
            "nearest": scan.nearest(price, None),
            "signal": signal,
            "scan": scan,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let summary = scan.summary();
    println!();
    println!("=== Fair Value Gaps ===");
    println!("Candles:        {}", series.len());
    println!(
        "FVGs:           {} ({} bullish, {} bearish valid)",
        summary.fvg_count, summary.bullish_fvg, summary.bearish_fvg
    );
    println!(
        "iFVGs:          {} ({} bullish, {} bearish valid)",
        summary.ifvg_count, summary.bullish_ifvg, summary.bearish_ifvg
    );
    println!("A+ setups:      {}", summary.a_plus_setups);
    println!();
    println!("--- At price {price:.5} ---");
    match scan.nearest(price, None) {
        Some(gap) => println!(
            "Nearest FVG:    {:?} {:.5}-{:.5} ({:?}, {:.1}% filled)",
            gap.direction, gap.low, gap.high, gap.status, gap.fill_percentage
        ),
        None => println!("Nearest FVG:    none"),
    }
    println!("Trend:          {trend:?}");
    println!(
        "iFVG signal:    {:?} ({:.0}%): {}",
        signal.bias, signal.confidence, signal.reason
    );
    Ok(())
}

fn run_monte_carlo_cmd(config: &SmcConfig, trades: &Path, output_dir: &Path) -> Result<()> {
    let pnls = load_trade_pnls(trades)
        .with_context(|| format!("failed to load trades from {}", trades.display()))?;

    let results = MonteCarloSimulator::new(config.monte_carlo.clone()).run(&pnls, None)?;
    print!("{}", render_monte_carlo(&results));

    if results.is_empty() {
        return Ok(());
    }
    let path = save_monte_carlo_json(&results, output_dir)?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn run_validate(config: &SmcConfig, trades: &Path, output_dir: &Path) -> Result<()> {
    let pnls = load_trade_pnls(trades)
        .with_context(|| format!("failed to load trades from {}", trades.display()))?;
    if pnls.is_empty() {
        bail!("no trades in {}", trades.display());
    }

    let validator = StatisticalValidator::new(config.validation.clone());
    let validation = validator.validate_pnls(&pnls, config.monte_carlo.initial_capital);
    print!("{}", render_validation(&validation));

    let path = save_validation_json(&validation, output_dir)?;
    println!("Report written to {}", path.display());
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_structure(analysis: &StructureAnalysis, candle_count: usize) {
    println!();
    println!("=== Market Structure ===");
    println!("Candles:        {candle_count}");
    println!("Swing highs:    {}", analysis.swing_highs.len());
    println!("Swing lows:     {}", analysis.swing_lows.len());
    println!("Breaks:         {}", analysis.breaks.len());
    println!("Trend:          {:?}", analysis.trend);
    println!("Bias:           {:?}", analysis.bias());
    println!();
    println!("--- Recent swings ---");
    let labelled = [
        ("Higher high:", analysis.last_higher_high()),
        ("Higher low:", analysis.last_higher_low()),
        ("Lower high:", analysis.last_lower_high()),
        ("Lower low:", analysis.last_lower_low()),
    ];
    for (label, swing) in labelled {
        match swing {
            Some(s) => println!(
                "{label:<16}{:.5} at #{} ({})",
                s.price, s.index, s.timestamp
            ),
            None => println!("{label:<16}none"),
        }
    }
    if !analysis.breaks.is_empty() {
        println!();
        println!("--- Breaks ---");
        for b in &analysis.breaks {
            println!(
                "{:<6} {:?} at #{} close {:.5} through {:.5} (swing #{}) {}",
                format!("{:?}", b.kind),
                b.direction,
                b.break_index,
                b.break_price,
                b.swing_price,
                b.swing_index,
                b.timestamp
            );
        }
    }
}
