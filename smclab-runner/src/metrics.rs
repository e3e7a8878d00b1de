//! Trade-level performance metrics over a PnL or return series.

use crate::stats::{mean, population_std};

/// Trading days per year used to annualize per-trade Sharpe.
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Fraction of entries strictly above zero.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let winners = returns.iter().filter(|&&r| r > 0.0).count();
    winners as f64 / returns.len() as f64
}

/// Gross profit over gross loss.
///
/// Capped at 100.0 for edge cases (all winners, zero losses). Zero when
/// there is neither profit nor loss.
pub fn profit_factor(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let gross_loss: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r.abs()).sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Annualized Sharpe: mean / population std * sqrt(252).
///
/// Returns 0.0 for zero variance.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let std = population_std(returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean(returns) / std) * ANNUALIZATION_FACTOR.sqrt()
}
