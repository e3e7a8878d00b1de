//! Statistical significance checks on a trade-return series.
//!
//! Six tests run in a fixed order:
//! 1. Minimum trade count
//! 2. One-sided binomial test of the win rate against 50%
//! 3. One-sided one-sample t-test of the mean return against 0
//! 4. Profit factor heuristic
//! 5. Annualized Sharpe threshold
//! 6. Win-rate stability between the first and second half of the series
//!
//! A strategy is significant when at least 75% of the tests pass. The exact
//! binomial and Student-t tails come from `statrs`; without the `statrs`
//! feature both tests fall back to a sign-of-edge check.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::metrics::{profit_factor, sharpe_ratio, win_rate};
use crate::stats::{mean, population_std, sample_std};

/// Hard floor on trade count.
pub const MIN_TRADES_BASIC: usize = 30;
/// Trade count at which the sample is considered reliable.
pub const MIN_TRADES_RELIABLE: usize = 100;

const STABILITY_MIN_TRADES: usize = 20;
const STABILITY_TOLERANCE: f64 = 0.15;
const SIGNIFICANT_PASS_RATE: f64 = 75.0;
const HIGH_CONFIDENCE: f64 = 90.0;

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Significance level for the binomial and t-tests (default 0.05).
    pub alpha: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Outcome of one significance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    pub name: String,
    pub passed: bool,
    pub p_value: f64,
    /// Percentage in 0..=100.
    pub confidence_level: f64,
    pub observed: f64,
    pub expected: f64,
    pub interpretation: String,
}

impl SignificanceTest {
    fn new(
        name: &str,
        passed: bool,
        p_value: f64,
        confidence_level: f64,
        observed: f64,
        expected: f64,
        interpretation: String,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed,
            p_value,
            confidence_level: confidence_level.clamp(0.0, 100.0),
            observed,
            expected,
            interpretation,
        }
    }
}

/// Full validation of one return series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalValidation {
    pub n_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_return: f64,
    /// Population standard deviation of the returns.
    pub std_return: f64,

    pub tests: Vec<SignificanceTest>,
    pub tests_passed: usize,
    pub tests_total: usize,
    /// Share of passed tests, in percent.
    pub overall_confidence: f64,

    pub is_significant: bool,
    pub recommendation: String,
    pub minimum_trades_needed: usize,
}

impl StatisticalValidation {
    fn push(&mut self, test: SignificanceTest) {
        self.tests_total += 1;
        if test.passed {
            self.tests_passed += 1;
        }
        self.tests.push(test);
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn test(&self, name: &str) -> Option<&SignificanceTest> {
        self.tests.iter().find(|t| t.name == name)
    }

    fn finalize(&mut self) {
        if self.tests_total > 0 {
            self.overall_confidence = self.tests_passed as f64 / self.tests_total as f64 * 100.0;
        }
        self.is_significant = self.overall_confidence >= SIGNIFICANT_PASS_RATE;
        self.recommendation = self.recommend();
    }

    fn recommend(&self) -> String {
        if self.is_significant {
            if self.overall_confidence >= HIGH_CONFIDENCE {
                "STRATEGY VALIDATED with high confidence.\n  \
                 -> Deploy with the planned sizing.\n  \
                 -> Keep monitoring."
                    .to_string()
            } else {
                "STRATEGY PROVISIONALLY VALIDATED.\n  \
                 -> Start with reduced sizing (50%).\n  \
                 -> Scale up after 50+ live trades."
                    .to_string()
            }
        } else if self.n_trades < MIN_TRADES_BASIC {
            format!(
                "INSUFFICIENT DATA: only {} trades.\n  \
                 -> Collect {}+ more trades.\n  \
                 -> Re-run the validation afterwards.",
                self.n_trades, self.minimum_trades_needed
            )
        } else {
            "STRATEGY NOT STATISTICALLY VALIDATED.\n  \
             -> Results may be due to chance.\n  \
             -> Revise the strategy before live deployment."
                .to_string()
        }
    }
}

// ─── Validator ───────────────────────────────────────────────────────

pub const TEST_MINIMUM_TRADES: &str = "Minimum Trades";
pub const TEST_WIN_RATE: &str = "Win Rate Binomial Test";
pub const TEST_RETURNS: &str = "Returns T-Test";
pub const TEST_PROFIT_FACTOR: &str = "Profit Factor Test";
pub const TEST_SHARPE: &str = "Sharpe Ratio Test";
pub const TEST_STABILITY: &str = "Stability Test";

#[derive(Debug, Clone, Default)]
pub struct StatisticalValidator {
    config: ValidationConfig,
}

impl StatisticalValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate `returns` in chronological order.
    ///
    /// `win_rate` and `profit_factor` are computed from `returns` unless the
    /// caller supplies them.
    pub fn validate(
        &self,
        returns: &[f64],
        win_rate_override: Option<f64>,
        profit_factor_override: Option<f64>,
    ) -> StatisticalValidation {
        let n = returns.len();
        if n == 0 {
            warn!("no trades to validate");
            return StatisticalValidation::default();
        }

        info!(n_trades = n, alpha = self.config.alpha, "statistical validation started");

        let wr = win_rate_override.unwrap_or_else(|| win_rate(returns));
        let pf = profit_factor_override.unwrap_or_else(|| profit_factor(returns));

        let mut v = StatisticalValidation {
            n_trades: n,
            win_rate: wr,
            profit_factor: pf,
            avg_return: mean(returns),
            std_return: population_std(returns),
            minimum_trades_needed: MIN_TRADES_BASIC.saturating_sub(n),
            ..StatisticalValidation::default()
        };

        v.push(minimum_trades_test(n));
        v.push(win_rate_test(n, wr, self.config.alpha));
        v.push(returns_test(returns, self.config.alpha));
        v.push(profit_factor_test(pf, n));
        v.push(sharpe_test(returns));
        v.push(stability_test(returns));
        v.finalize();

        info!(
            passed = v.tests_passed,
            total = v.tests_total,
            significant = v.is_significant,
            "statistical validation finished"
        );
        v
    }

    /// Validate dollar PnLs as returns on `initial_capital`.
    pub fn validate_pnls(&self, pnls: &[f64], initial_capital: f64) -> StatisticalValidation {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            warn!(initial_capital, "initial capital must be positive, skipping validation");
            return StatisticalValidation::default();
        }
        let returns: Vec<f64> = pnls.iter().map(|p| p / initial_capital).collect();
        self.validate(&returns, None, None)
    }
}

// ─── Individual tests ────────────────────────────────────────────────

fn minimum_trades_test(n: usize) -> SignificanceTest {
    let passed = n >= MIN_TRADES_BASIC;
    let confidence = (n as f64 / MIN_TRADES_RELIABLE as f64 * 100.0).min(100.0);
    let interpretation = if n < MIN_TRADES_BASIC {
        format!("{n} trades is not enough. Minimum: {MIN_TRADES_BASIC}")
    } else if n < MIN_TRADES_RELIABLE {
        format!("{n} trades is acceptable but {MIN_TRADES_RELIABLE}+ is recommended")
    } else {
        format!("{n} trades is enough for significance")
    };
    SignificanceTest::new(
        TEST_MINIMUM_TRADES,
        passed,
        if passed { 0.0 } else { 1.0 },
        confidence,
        n as f64,
        MIN_TRADES_BASIC as f64,
        interpretation,
    )
}

fn win_rate_test(n: usize, win_rate: f64, alpha: f64) -> SignificanceTest {
    let Some(p_value) = binomial_upper_tail(n, win_rate) else {
        let edge = win_rate > 0.5;
        return SignificanceTest::new(
            TEST_WIN_RATE,
            edge,
            if edge { 0.5 } else { 1.0 },
            if edge { 50.0 } else { 0.0 },
            win_rate,
            0.5,
            "statrs not enabled, simplified win-rate check".to_string(),
        );
    };

    let passed = p_value < alpha && win_rate > 0.5;
    let pct = win_rate * 100.0;
    let interpretation = if passed {
        format!("Win rate {pct:.1}% is significantly above 50%")
    } else if win_rate > 0.5 {
        format!("Win rate {pct:.1}% is above 50% but not significant (p={p_value:.3})")
    } else {
        format!("Win rate {pct:.1}% is no better than chance")
    };
    SignificanceTest::new(
        TEST_WIN_RATE,
        passed,
        p_value,
        (1.0 - p_value) * 100.0,
        win_rate,
        0.5,
        interpretation,
    )
}

fn returns_test(returns: &[f64], alpha: f64) -> SignificanceTest {
    let n = returns.len();
    let m = mean(returns);

    if n < 2 {
        return SignificanceTest::new(
            TEST_RETURNS,
            false,
            1.0,
            0.0,
            m,
            0.0,
            "Not enough trades for a t-test".to_string(),
        );
    }

    let s = sample_std(returns);
    let p_value = if s < 1e-15 {
        Some(if m > 0.0 {
            0.0
        } else if m == 0.0 {
            0.5
        } else {
            1.0
        })
    } else {
        let t = m / (s / (n as f64).sqrt());
        students_t_upper_tail(t, (n - 1) as f64)
    };

    let Some(p_value) = p_value else {
        let edge = m > 0.0;
        return SignificanceTest::new(
            TEST_RETURNS,
            edge,
            if edge { 0.5 } else { 1.0 },
            if edge { 50.0 } else { 0.0 },
            m,
            0.0,
            "statrs not enabled, simplified mean-return check".to_string(),
        );
    };

    let passed = p_value < alpha && m > 0.0;
    let confidence = if m > 0.0 { (1.0 - p_value) * 100.0 } else { 0.0 };
    let interpretation = if passed {
        format!("Mean return {m:.4} is significantly above 0")
    } else if m > 0.0 {
        format!("Mean return is positive but not significant (p={p_value:.3})")
    } else {
        format!("Mean return is not positive ({m:.4})")
    };
    SignificanceTest::new(TEST_RETURNS, passed, p_value, confidence, m, 0.0, interpretation)
}

fn profit_factor_test(pf: f64, n: usize) -> SignificanceTest {
    let passed = pf > 1.0 && n >= MIN_TRADES_BASIC;
    let strong = pf >= 1.5 && n >= 50;
    let confidence = if pf > 1.0 {
        ((pf - 1.0) * 50.0 + n as f64 / 50.0 * 25.0).min(100.0)
    } else {
        0.0
    };
    let interpretation = if strong {
        format!("PF {pf:.2} is excellent over {n} trades")
    } else if passed {
        format!("PF {pf:.2} is positive but more trades are recommended")
    } else {
        format!("PF {pf:.2} is too low or has too few trades")
    };
    let p_value = if strong {
        0.0
    } else if passed {
        0.5
    } else {
        1.0
    };
    SignificanceTest::new(
        TEST_PROFIT_FACTOR,
        passed,
        p_value,
        confidence,
        pf,
        1.0,
        interpretation,
    )
}

fn sharpe_test(returns: &[f64]) -> SignificanceTest {
    let sharpe = sharpe_ratio(returns);
    let passed = sharpe > 0.5;
    let excellent = sharpe > 1.5;
    let confidence = if sharpe > 0.0 {
        (sharpe * 50.0).min(100.0)
    } else {
        0.0
    };
    let interpretation = if excellent {
        format!("Sharpe {sharpe:.2} is excellent")
    } else if passed {
        format!("Sharpe {sharpe:.2} is acceptable")
    } else {
        format!("Sharpe {sharpe:.2} is too low")
    };
    let p_value = if excellent {
        0.0
    } else if passed {
        0.5
    } else {
        1.0
    };
    SignificanceTest::new(TEST_SHARPE, passed, p_value, confidence, sharpe, 1.0, interpretation)
}

fn stability_test(returns: &[f64]) -> SignificanceTest {
    let n = returns.len();
    if n < STABILITY_MIN_TRADES {
        return SignificanceTest::new(
            TEST_STABILITY,
            false,
            1.0,
            0.0,
            0.0,
            0.5,
            "Not enough trades for a stability test".to_string(),
        );
    }

    let (first, second) = returns.split_at(n / 2);
    let diff = (win_rate(first) - win_rate(second)).abs();
    let passed = diff < STABILITY_TOLERANCE;
    let confidence = (STABILITY_TOLERANCE - diff) / STABILITY_TOLERANCE * 100.0;
    let interpretation = if passed {
        format!("Performance is stable (win-rate diff {:.1}%)", diff * 100.0)
    } else {
        format!("Performance is unstable (win-rate diff {:.1}%)", diff * 100.0)
    };
    SignificanceTest::new(
        TEST_STABILITY,
        passed,
        diff,
        confidence,
        diff,
        STABILITY_TOLERANCE,
        interpretation,
    )
}

// ─── Distribution tails ──────────────────────────────────────────────

/// P(X >= floor(n * win_rate)) for X ~ Binomial(n, 0.5).
#[cfg(feature = "statrs")]
fn binomial_upper_tail(n: usize, win_rate: f64) -> Option<f64> {
    use statrs::distribution::{Binomial, DiscreteCDF};

    let wins = (n as f64 * win_rate.clamp(0.0, 1.0)).floor() as u64;
    if wins == 0 {
        return Some(1.0);
    }
    let dist = Binomial::new(0.5, n as u64).ok()?;
    Some(dist.sf(wins - 1).clamp(0.0, 1.0))
}

#[cfg(not(feature = "statrs"))]
fn binomial_upper_tail(_n: usize, _win_rate: f64) -> Option<f64> {
    None
}

/// P(T >= t) for Student's t with `df` degrees of freedom.
#[cfg(feature = "statrs")]
fn students_t_upper_tail(t: f64, df: f64) -> Option<f64> {
    use statrs::distribution::{ContinuousCDF, StudentsT};

    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(dist.sf(t).clamp(0.0, 1.0))
}

#[cfg(not(feature = "statrs"))]
fn students_t_upper_tail(_t: f64, _df: f64) -> Option<f64> {
    None
}
