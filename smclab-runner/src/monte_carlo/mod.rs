//! Monte Carlo risk simulation over a realized trade-PnL series.
//!
//! Each trial reshuffles the full trade list, walks the resulting equity
//! path from the starting capital, and records final equity, max drawdown,
//! and streak lengths. Aggregates are reduced in trial-index order once every
//! trial has finished.
//!
//! Trials are independent and run in parallel with rayon. Trial `i` draws its
//! shuffle from `RngHierarchy::rng_for("shuffle", i)`, so a seeded run yields
//! the same result for any thread count.

pub mod path;
pub mod rating;

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use smclab_core::rng::RngHierarchy;

use crate::stats::{mean, median_sorted, percentile_sorted, population_std, sorted};

pub use path::{simulate_path, walk_equity, PathOutcome};
pub use rating::{RiskAssessment, RiskRating};

/// Below this many trades a run returns an empty result.
pub const MIN_TRADES: usize = 5;
/// Trials dispatched between cancellation checks.
pub const TRIAL_CHUNK: usize = 1_000;
/// Equity curves retained from the first trials, in trial order.
pub const SAMPLE_PATHS_RETAINED: usize = 20;
/// Equity curves written to the JSON report.
pub const SAMPLE_PATHS_EXPORTED: usize = 10;

const SHUFFLE_STREAM: &str = "shuffle";

// ─── Configuration ───────────────────────────────────────────────────

/// Monte Carlo run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of simulated paths (default 10 000).
    pub n_simulations: usize,
    /// Starting equity for every path (default 10 000).
    pub initial_capital: f64,
    /// Master seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Size of a private worker pool. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_simulations: 10_000,
            initial_capital: 10_000.0,
            seed: None,
            threads: None,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MonteCarloError {
    #[error("trade {index} has non-finite pnl {value}")]
    InvalidTrade { index: usize, value: f64 },
    #[error("n_simulations must be at least 1")]
    NoSimulations,
    #[error("initial capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
    #[error("simulation cancelled")]
    Cancelled,
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

// ─── Results ─────────────────────────────────────────────────────────

/// Aggregate statistics over every simulated path.
///
/// Percent-valued fields (drawdowns, probabilities) are in 0..=100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResults {
    pub n_simulations: usize,
    pub n_trades: usize,
    pub initial_capital: f64,
    /// Seed the run was derived from. `None` for an empty result.
    pub master_seed: Option<u64>,

    pub median_final_equity: f64,
    pub mean_final_equity: f64,
    pub std_final_equity: f64,
    /// 95th percentile of final equity.
    pub best_case_5pct: f64,
    /// 5th percentile of final equity.
    pub worst_case_5pct: f64,
    pub absolute_best: f64,
    pub absolute_worst: f64,

    pub var_95: f64,
    pub var_99: f64,
    pub cvar_95: f64,

    pub median_max_drawdown: f64,
    pub worst_drawdown_5pct: f64,
    pub worst_drawdown_1pct: f64,

    pub probability_profitable: f64,
    pub probability_double: f64,
    pub probability_of_ruin: f64,

    pub avg_max_win_streak: f64,
    pub avg_max_loss_streak: f64,
    pub worst_loss_streak_95pct: f64,

    pub ci_95: (f64, f64),
    pub ci_99: (f64, f64),

    pub risk: RiskAssessment,
    pub recommendation: String,

    /// Equity curves of the first trials, starting capital first.
    pub sample_paths: Vec<Vec<f64>>,
}

impl MonteCarloResults {
    /// Zeroed result for a series too short to simulate.
    pub fn empty(n_trades: usize, initial_capital: f64) -> Self {
        Self {
            n_trades,
            initial_capital,
            recommendation: format!(
                "Insufficient trades for simulation ({n_trades} < {MIN_TRADES})."
            ),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_simulations == 0
    }

    pub fn risk_rating(&self) -> RiskRating {
        self.risk.rating
    }
}

// ─── Simulator ───────────────────────────────────────────────────────

/// Reshuffling equity-path simulator.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulate `n_simulations` reshuffled paths of `trades`.
    ///
    /// `cancel` is checked before every chunk of `TRIAL_CHUNK` trials. A
    /// cancelled run returns `Err(Cancelled)` and discards finished trials.
    pub fn run(
        &self,
        trades: &[f64],
        cancel: Option<&AtomicBool>,
    ) -> Result<MonteCarloResults, MonteCarloError> {
        let config = &self.config;
        let capital = config.initial_capital;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(MonteCarloError::InvalidCapital(capital));
        }
        if config.n_simulations == 0 {
            return Err(MonteCarloError::NoSimulations);
        }
        if let Some((index, &value)) = trades.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(MonteCarloError::InvalidTrade { index, value });
        }

        if trades.len() < MIN_TRADES {
            warn!(
                n_trades = trades.len(),
                min = MIN_TRADES,
                "not enough trades for monte carlo, returning empty result"
            );
            return Ok(MonteCarloResults::empty(trades.len(), capital));
        }

        let hierarchy = config
            .seed
            .map(RngHierarchy::new)
            .unwrap_or_else(RngHierarchy::from_entropy);

        info!(
            n_simulations = config.n_simulations,
            n_trades = trades.len(),
            initial_capital = capital,
            master_seed = hierarchy.master_seed(),
            "monte carlo run started"
        );

        let thread_pool = match config.threads.filter(|&n| n > 0) {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };

        let simulate_chunk = |start: usize, end: usize| -> Vec<PathOutcome> {
            (start..end)
                .into_par_iter()
                .map(|trial| {
                    let mut rng = hierarchy.rng_for(SHUFFLE_STREAM, trial as u64);
                    simulate_path(trades, capital, &mut rng, trial < SAMPLE_PATHS_RETAINED)
                })
                .collect()
        };

        let mut outcomes: Vec<PathOutcome> = Vec::with_capacity(config.n_simulations);
        let mut start = 0;
        while start < config.n_simulations {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                info!(completed = start, "monte carlo run cancelled");
                return Err(MonteCarloError::Cancelled);
            }
            let end = (start + TRIAL_CHUNK).min(config.n_simulations);
            let chunk = match &thread_pool {
                Some(tp) => tp.install(|| simulate_chunk(start, end)),
                None => simulate_chunk(start, end),
            };
            outcomes.extend(chunk);
            start = end;
        }

        let results = aggregate(outcomes, trades.len(), capital, hierarchy.master_seed());
        info!(
            median_final_equity = results.median_final_equity,
            probability_profitable = results.probability_profitable,
            risk = %results.risk.rating,
            "monte carlo run finished"
        );
        Ok(results)
    }
}

/// Run a simulation with `config`.
pub fn run_monte_carlo(
    trades: &[f64],
    config: &MonteCarloConfig,
    cancel: Option<&AtomicBool>,
) -> Result<MonteCarloResults, MonteCarloError> {
    MonteCarloSimulator::new(config.clone()).run(trades, cancel)
}

// ─── Reduction ───────────────────────────────────────────────────────

fn aggregate(
    outcomes: Vec<PathOutcome>,
    n_trades: usize,
    capital: f64,
    master_seed: u64,
) -> MonteCarloResults {
    let n = outcomes.len();
    let mut finals = Vec::with_capacity(n);
    let mut drawdowns = Vec::with_capacity(n);
    let mut win_streaks = Vec::with_capacity(n);
    let mut loss_streaks = Vec::with_capacity(n);
    let mut sample_paths = Vec::with_capacity(SAMPLE_PATHS_RETAINED);

    for outcome in outcomes {
        finals.push(outcome.final_equity);
        drawdowns.push(outcome.max_drawdown_pct);
        win_streaks.push(outcome.max_win_streak as f64);
        loss_streaks.push(outcome.max_loss_streak as f64);
        if let Some(curve) = outcome.equity_curve {
            if sample_paths.len() < SAMPLE_PATHS_RETAINED {
                sample_paths.push(curve);
            }
        }
    }

    let sorted_finals = sorted(&finals);
    let losses: Vec<f64> = sorted_finals.iter().map(|f| capital - f).collect();
    let sorted_losses = sorted(&losses);
    let sorted_dd = sorted(&drawdowns);
    let sorted_loss_streaks = sorted(&loss_streaks);

    let worst_case_5pct = percentile_sorted(&sorted_finals, 5.0);
    let tail: Vec<f64> = sorted_finals
        .iter()
        .copied()
        .take_while(|&f| f <= worst_case_5pct)
        .collect();
    let cvar_95 = if tail.is_empty() {
        capital - worst_case_5pct
    } else {
        capital - mean(&tail)
    };

    let probability_profitable = percent_where(&finals, |f| f > capital);
    let probability_double = percent_where(&finals, |f| f >= 2.0 * capital);
    let probability_of_ruin = percent_where(&finals, |f| f <= 0.5 * capital);

    let median_max_drawdown = median_sorted(&sorted_dd);
    let worst_loss_streak_95pct = percentile_sorted(&sorted_loss_streaks, 95.0);

    let risk = RiskAssessment::evaluate(
        probability_profitable,
        probability_of_ruin,
        median_max_drawdown,
        worst_loss_streak_95pct,
    );
    let recommendation = risk.recommendation();

    MonteCarloResults {
        n_simulations: n,
        n_trades,
        initial_capital: capital,
        master_seed: Some(master_seed),

        median_final_equity: median_sorted(&sorted_finals),
        mean_final_equity: mean(&finals),
        std_final_equity: population_std(&finals),
        best_case_5pct: percentile_sorted(&sorted_finals, 95.0),
        worst_case_5pct,
        absolute_best: sorted_finals.last().copied().unwrap_or(0.0),
        absolute_worst: sorted_finals.first().copied().unwrap_or(0.0),

        var_95: percentile_sorted(&sorted_losses, 95.0),
        var_99: percentile_sorted(&sorted_losses, 99.0),
        cvar_95,

        median_max_drawdown,
        worst_drawdown_5pct: percentile_sorted(&sorted_dd, 95.0),
        worst_drawdown_1pct: percentile_sorted(&sorted_dd, 99.0),

        probability_profitable,
        probability_double,
        probability_of_ruin,

        avg_max_win_streak: mean(&win_streaks),
        avg_max_loss_streak: mean(&loss_streaks),
        worst_loss_streak_95pct,

        ci_95: (
            percentile_sorted(&sorted_finals, 2.5),
            percentile_sorted(&sorted_finals, 97.5),
        ),
        ci_99: (
            percentile_sorted(&sorted_finals, 0.5),
            percentile_sorted(&sorted_finals, 99.5),
        ),

        risk,
        recommendation,
        sample_paths,
    }
}

fn percent_where(values: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| pred(v)).count() as f64 / values.len() as f64 * 100.0
}
