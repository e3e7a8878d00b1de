//! Statistical validator: verdicts on small samples, confidence monotonicity,
//! and end-to-end recommendations.

use smclab_runner::validation::{
    StatisticalValidator, ValidationConfig, TEST_MINIMUM_TRADES, TEST_PROFIT_FACTOR,
    TEST_STABILITY, TEST_WIN_RATE,
};

/// `n` returns with exactly `wins` winners, interleaved so halves match.
fn interleaved(n: usize, wins: usize, win: f64, loss: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut placed = 0;
    for i in 0..n {
        // Bresenham spread of winners across the series.
        let target = (i + 1) * wins / n;
        if target > placed {
            out.push(win);
            placed += 1;
        } else {
            out.push(loss);
        }
    }
    out
}

// ── 1. Small samples ─────────────────────────────────────────────────

/// 10 trades at 90% win rate: the minimum-trades test blocks significance.
#[test]
fn ten_trades_are_never_significant() {
    let mut returns = vec![0.02; 9];
    returns.push(-0.01);
    let v = StatisticalValidator::default().validate(&returns, Some(0.9), None);

    assert_eq!(v.n_trades, 10);
    assert!(!v.test(TEST_MINIMUM_TRADES).unwrap().passed);
    assert!(v.test(TEST_WIN_RATE).unwrap().passed);
    assert!(!v.test(TEST_PROFIT_FACTOR).unwrap().passed);
    assert!(!v.test(TEST_STABILITY).unwrap().passed);
    assert!(!v.is_significant);
    assert_eq!(v.minimum_trades_needed, 20);
    assert!(v.recommendation.starts_with("INSUFFICIENT DATA"));
    assert!(v.recommendation.contains("Collect 20+ more trades"));
}

#[test]
fn empty_input_yields_empty_validation() {
    let v = StatisticalValidator::default().validate(&[], None, None);
    assert!(v.is_empty());
    assert_eq!(v.overall_confidence, 0.0);
    assert!(v.recommendation.is_empty());
}

// ── 2. Monotonicity ─────────────────────────────────────────────────

/// At a fixed 75% win rate, more trades never lower binomial confidence.
#[test]
fn binomial_confidence_is_monotone_in_sample_size() {
    let validator = StatisticalValidator::default();
    let mut previous = f64::NEG_INFINITY;
    for n in (4..=200).step_by(4) {
        let returns = interleaved(n, n * 3 / 4, 0.01, -0.01);
        let v = validator.validate(&returns, Some(0.75), None);
        let confidence = v.test(TEST_WIN_RATE).unwrap().confidence_level;
        assert!(
            confidence >= previous,
            "n = {n}: {confidence} < {previous}"
        );
        assert!((0.0..=100.0).contains(&confidence));
        previous = confidence;
    }
}

// ── 3. Verdicts ─────────────────────────────────────────────────────

/// A steady edge over 200 trades passes every test.
#[cfg(feature = "statrs")]
#[test]
fn steady_edge_is_validated() {
    let returns = interleaved(200, 130, 0.012, -0.008);
    let v = StatisticalValidator::default().validate(&returns, None, None);
    assert_eq!(v.tests_passed, v.tests_total, "{:#?}", v.tests);
    assert!(v.is_significant);
    assert_eq!(v.overall_confidence, 100.0);
    assert!(v.recommendation.starts_with("STRATEGY VALIDATED"));
}

/// A break-even coin flip over many trades is not validated.
#[test]
fn coin_flip_is_not_validated() {
    let returns = interleaved(120, 60, 0.01, -0.01);
    let v = StatisticalValidator::default().validate(&returns, None, None);
    assert!(!v.test(TEST_WIN_RATE).unwrap().passed);
    assert!(!v.is_significant);
    assert!(v.recommendation.starts_with("STRATEGY NOT STATISTICALLY VALIDATED"));
}

#[test]
fn stricter_alpha_never_passes_more_tests() {
    let returns = interleaved(60, 36, 0.01, -0.009);
    let loose = StatisticalValidator::new(ValidationConfig { alpha: 0.2 }).validate(&returns, None, None);
    let strict =
        StatisticalValidator::new(ValidationConfig { alpha: 0.001 }).validate(&returns, None, None);
    assert!(strict.tests_passed <= loose.tests_passed);
}

#[test]
fn pnl_helper_matches_manual_scaling() {
    let pnls = interleaved(40, 24, 150.0, -100.0);
    let capital = 10_000.0;
    let returns: Vec<f64> = pnls.iter().map(|p| p / capital).collect();
    let validator = StatisticalValidator::default();
    assert_eq!(
        validator.validate_pnls(&pnls, capital),
        validator.validate(&returns, None, None)
    );
}
