//! Reports: nested JSON documents and plain-text console rendering.
//!
//! JSON reports round money to 2 decimals and percentages to 1 decimal.
//! Files are named `monte_carlo_<YYYYmmdd_HHMMSS>.json` and
//! `validation_<YYYYmmdd_HHMMSS>.json` inside the output directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monte_carlo::{MonteCarloResults, RiskRating, SAMPLE_PATHS_EXPORTED};
use crate::stats::round_to;
use crate::validation::{SignificanceTest, StatisticalValidation};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Monte Carlo report ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub timestamp: String,
    pub configuration: SimulationSection,
    pub final_equity: FinalEquitySection,
    pub value_at_risk: ValueAtRiskSection,
    pub drawdown: DrawdownSection,
    pub probabilities: ProbabilitySection,
    pub streaks: StreakSection,
    pub confidence_intervals: ConfidenceIntervalSection,
    pub risk_rating: RiskRating,
    pub risk_score: u32,
    pub recommendation: String,
    pub sample_equity_paths: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSection {
    pub n_simulations: usize,
    pub n_trades: usize,
    pub initial_capital: f64,
    pub master_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEquitySection {
    pub median: f64,
    pub mean: f64,
    pub std: f64,
    pub best_5pct: f64,
    pub worst_5pct: f64,
    pub absolute_best: f64,
    pub absolute_worst: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAtRiskSection {
    pub var_95: f64,
    pub var_99: f64,
    pub cvar_95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSection {
    pub median_max_dd: f64,
    pub worst_dd_5pct: f64,
    pub worst_dd_1pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySection {
    pub profitable: f64,
    pub double_capital: f64,
    pub ruin_50pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSection {
    pub avg_max_win_streak: f64,
    pub avg_max_loss_streak: f64,
    pub worst_loss_streak_95pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    fn rounded((lower, upper): (f64, f64)) -> Self {
        Self {
            lower: round_to(lower, 2),
            upper: round_to(upper, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervalSection {
    #[serde(rename = "95pct")]
    pub ci_95: Interval,
    #[serde(rename = "99pct")]
    pub ci_99: Interval,
}

impl MonteCarloReport {
    pub fn new(r: &MonteCarloResults) -> Self {
        Self {
            timestamp: report_timestamp(),
            configuration: SimulationSection {
                n_simulations: r.n_simulations,
                n_trades: r.n_trades,
                initial_capital: r.initial_capital,
                master_seed: r.master_seed,
            },
            final_equity: FinalEquitySection {
                median: round_to(r.median_final_equity, 2),
                mean: round_to(r.mean_final_equity, 2),
                std: round_to(r.std_final_equity, 2),
                best_5pct: round_to(r.best_case_5pct, 2),
                worst_5pct: round_to(r.worst_case_5pct, 2),
                absolute_best: round_to(r.absolute_best, 2),
                absolute_worst: round_to(r.absolute_worst, 2),
            },
            value_at_risk: ValueAtRiskSection {
                var_95: round_to(r.var_95, 2),
                var_99: round_to(r.var_99, 2),
                cvar_95: round_to(r.cvar_95, 2),
            },
            drawdown: DrawdownSection {
                median_max_dd: round_to(r.median_max_drawdown, 1),
                worst_dd_5pct: round_to(r.worst_drawdown_5pct, 1),
                worst_dd_1pct: round_to(r.worst_drawdown_1pct, 1),
            },
            probabilities: ProbabilitySection {
                profitable: round_to(r.probability_profitable, 1),
                double_capital: round_to(r.probability_double, 1),
                ruin_50pct: round_to(r.probability_of_ruin, 1),
            },
            streaks: StreakSection {
                avg_max_win_streak: round_to(r.avg_max_win_streak, 1),
                avg_max_loss_streak: round_to(r.avg_max_loss_streak, 1),
                worst_loss_streak_95pct: round_to(r.worst_loss_streak_95pct, 0),
            },
            confidence_intervals: ConfidenceIntervalSection {
                ci_95: Interval::rounded(r.ci_95),
                ci_99: Interval::rounded(r.ci_99),
            },
            risk_rating: r.risk.rating,
            risk_score: r.risk.score,
            recommendation: r.recommendation.clone(),
            sample_equity_paths: r
                .sample_paths
                .iter()
                .take(SAMPLE_PATHS_EXPORTED)
                .cloned()
                .collect(),
        }
    }
}

// ─── Validation report ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: String,
    pub metrics: ValidationMetrics,
    pub tests: Vec<TestEntry>,
    pub summary: ValidationSummary,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub total_trades: usize,
    /// Percent.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_return: f64,
    pub std_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub test: String,
    pub passed: bool,
    pub p_value: f64,
    pub confidence: f64,
    pub observed: f64,
    pub expected: f64,
    pub interpretation: String,
}

impl From<&SignificanceTest> for TestEntry {
    fn from(t: &SignificanceTest) -> Self {
        Self {
            test: t.name.clone(),
            passed: t.passed,
            p_value: round_to(t.p_value, 4),
            confidence: round_to(t.confidence_level, 1),
            observed: round_to(t.observed, 4),
            expected: round_to(t.expected, 4),
            interpretation: t.interpretation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub tests_passed: usize,
    pub tests_total: usize,
    pub overall_confidence: f64,
    pub is_significant: bool,
    pub minimum_trades_needed: usize,
}

impl ValidationReport {
    pub fn new(v: &StatisticalValidation) -> Self {
        Self {
            timestamp: report_timestamp(),
            metrics: ValidationMetrics {
                total_trades: v.n_trades,
                win_rate: round_to(v.win_rate * 100.0, 1),
                profit_factor: round_to(v.profit_factor, 2),
                avg_return: round_to(v.avg_return, 4),
                std_return: round_to(v.std_return, 4),
            },
            tests: v.tests.iter().map(TestEntry::from).collect(),
            summary: ValidationSummary {
                tests_passed: v.tests_passed,
                tests_total: v.tests_total,
                overall_confidence: round_to(v.overall_confidence, 1),
                is_significant: v.is_significant,
                minimum_trades_needed: v.minimum_trades_needed,
            },
            recommendation: v.recommendation.clone(),
        }
    }
}

// ─── Persistence ────────────────────────────────────────────────────

/// Write the Monte Carlo report to `output_dir`. Returns the file path.
pub fn save_monte_carlo_json(
    results: &MonteCarloResults,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    write_json(&MonteCarloReport::new(results), output_dir, "monte_carlo")
}

/// Write the validation report to `output_dir`. Returns the file path.
pub fn save_validation_json(
    validation: &StatisticalValidation,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    write_json(&ValidationReport::new(validation), output_dir, "validation")
}

fn write_json<T: Serialize>(
    report: &T,
    output_dir: &Path,
    prefix: &str,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ReportError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let filename = format!(
        "{prefix}_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = output_dir.join(filename);
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn report_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

// ─── Console rendering ──────────────────────────────────────────────

const RULE: &str = "======================================================================";

/// Plain-text Monte Carlo report.
pub fn render_monte_carlo(r: &MonteCarloResults) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(&format!("\n{RULE}\nMONTE CARLO SIMULATION REPORT\n{RULE}\n"));

    if r.is_empty() {
        out.push_str(&format!("\n{}\n{RULE}\n", r.recommendation));
        return out;
    }

    out.push_str("\nConfiguration:\n");
    out.push_str(&format!("  Simulations:     {}\n", r.n_simulations));
    out.push_str(&format!("  Trades/sim:      {}\n", r.n_trades));
    out.push_str(&format!("  Initial capital: ${:.2}\n", r.initial_capital));
    if let Some(seed) = r.master_seed {
        out.push_str(&format!("  Seed:            {seed}\n"));
    }

    out.push_str("\nFinal equity distribution:\n");
    out.push_str(&format!("  Median:          ${:.2}\n", r.median_final_equity));
    out.push_str(&format!("  Mean:            ${:.2}\n", r.mean_final_equity));
    out.push_str(&format!("  Std dev:         ${:.2}\n", r.std_final_equity));
    out.push_str(&format!("  Best 5%:         ${:.2}\n", r.best_case_5pct));
    out.push_str(&format!("  Worst 5%:        ${:.2}\n", r.worst_case_5pct));
    out.push_str(&format!("  Best:            ${:.2}\n", r.absolute_best));
    out.push_str(&format!("  Worst:           ${:.2}\n", r.absolute_worst));

    out.push_str("\nValue at risk:\n");
    out.push_str(&format!("  VaR 95%:         ${:.2}\n", r.var_95));
    out.push_str(&format!("  VaR 99%:         ${:.2}\n", r.var_99));
    out.push_str(&format!("  CVaR 95%:        ${:.2}\n", r.cvar_95));

    out.push_str("\nDrawdowns:\n");
    out.push_str(&format!("  Median max DD:   {:.1}%\n", r.median_max_drawdown));
    out.push_str(&format!("  Worst 5% DD:     {:.1}%\n", r.worst_drawdown_5pct));
    out.push_str(&format!("  Worst 1% DD:     {:.1}%\n", r.worst_drawdown_1pct));

    out.push_str("\nProbabilities:\n");
    out.push_str(&format!("  Profitable:      {:.1}%\n", r.probability_profitable));
    out.push_str(&format!("  Double capital:  {:.1}%\n", r.probability_double));
    out.push_str(&format!("  Ruin (-50%):     {:.1}%\n", r.probability_of_ruin));

    out.push_str("\nConfidence intervals (final equity):\n");
    out.push_str(&format!("  95%:             ${:.2} - ${:.2}\n", r.ci_95.0, r.ci_95.1));
    out.push_str(&format!("  99%:             ${:.2} - ${:.2}\n", r.ci_99.0, r.ci_99.1));

    out.push_str("\nStreaks:\n");
    out.push_str(&format!("  Avg max wins:    {:.1}\n", r.avg_max_win_streak));
    out.push_str(&format!("  Avg max losses:  {:.1}\n", r.avg_max_loss_streak));
    out.push_str(&format!("  Losses p95:      {:.0}\n", r.worst_loss_streak_95pct));

    out.push_str(&format!("\n{RULE}\n"));
    out.push_str(&format!("RISK RATING: {} (score {}/11)\n", r.risk.rating, r.risk.score));
    out.push_str(&format!("{}\n", r.recommendation));
    out.push_str(&format!("{RULE}\n"));
    out
}

/// Plain-text validation report.
pub fn render_validation(v: &StatisticalValidation) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(&format!("\n{RULE}\nSTATISTICAL VALIDATION REPORT\n{RULE}\n"));

    if v.is_empty() {
        out.push_str(&format!("\nNo trades to validate.\n{RULE}\n"));
        return out;
    }

    out.push_str("\nBase metrics:\n");
    out.push_str(&format!("  Total trades:    {}\n", v.n_trades));
    out.push_str(&format!("  Win rate:        {:.1}%\n", v.win_rate * 100.0));
    out.push_str(&format!("  Profit factor:   {:.2}\n", v.profit_factor));
    out.push_str(&format!("  Avg return:      {:.4}\n", v.avg_return));
    out.push_str(&format!("  Std return:      {:.4}\n", v.std_return));

    out.push_str("\nSignificance tests:\n");
    for t in &v.tests {
        let status = if t.passed { "PASS" } else { "FAIL" };
        out.push_str(&format!("  [{status}] {}\n", t.name));
        out.push_str(&format!(
            "      p-value: {:.4} | confidence: {:.1}%\n",
            t.p_value, t.confidence_level
        ));
        out.push_str(&format!("      {}\n", t.interpretation));
    }

    out.push_str("\nSummary:\n");
    out.push_str(&format!("  Tests passed:    {}/{}\n", v.tests_passed, v.tests_total));
    out.push_str(&format!("  Confidence:      {:.1}%\n", v.overall_confidence));
    let status = if v.is_significant {
        "SIGNIFICANT"
    } else {
        "NOT SIGNIFICANT"
    };
    out.push_str(&format!("  Status:          {status}\n"));
    if v.minimum_trades_needed > 0 {
        out.push_str(&format!("  Trades needed:   {}\n", v.minimum_trades_needed));
    }

    out.push_str(&format!("\n{RULE}\nRECOMMENDATION:\n{}\n{RULE}\n", v.recommendation));
    out
}
