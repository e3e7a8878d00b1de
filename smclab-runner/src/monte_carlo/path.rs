//! One simulated equity path: shuffle the trade sequence, then walk it.

use rand::seq::SliceRandom;
use rand::Rng;

/// Per-path statistics gathered while walking a shuffled trade sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    pub final_equity: f64,
    /// Largest peak-to-trough decline along the path, in percent of the peak.
    pub max_drawdown_pct: f64,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    /// Full equity curve (starting capital first), kept only for sample paths.
    pub equity_curve: Option<Vec<f64>>,
}

/// Shuffle a copy of `trades` uniformly and walk the resulting path.
pub fn simulate_path<R: Rng + ?Sized>(
    trades: &[f64],
    initial_capital: f64,
    rng: &mut R,
    keep_curve: bool,
) -> PathOutcome {
    let mut sequence = trades.to_vec();
    sequence.shuffle(rng);
    walk_equity(&sequence, initial_capital, keep_curve)
}

/// Walk a fixed trade sequence from `initial_capital`.
///
/// A zero PnL ends both the current win streak and the current loss streak.
pub fn walk_equity(sequence: &[f64], initial_capital: f64, keep_curve: bool) -> PathOutcome {
    let mut curve = keep_curve.then(|| {
        let mut c = Vec::with_capacity(sequence.len() + 1);
        c.push(initial_capital);
        c
    });

    let mut equity = initial_capital;
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    let mut win_streak = 0usize;
    let mut loss_streak = 0usize;
    let mut max_win_streak = 0usize;
    let mut max_loss_streak = 0usize;

    for &pnl in sequence {
        equity += pnl;
        if let Some(c) = curve.as_mut() {
            c.push(equity);
        }

        if equity > peak {
            peak = equity;
        }
        let dd = if peak > 0.0 {
            (peak - equity) / peak * 100.0
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);

        if pnl > 0.0 {
            win_streak += 1;
            loss_streak = 0;
            max_win_streak = max_win_streak.max(win_streak);
        } else if pnl < 0.0 {
            loss_streak += 1;
            win_streak = 0;
            max_loss_streak = max_loss_streak.max(loss_streak);
        } else {
            win_streak = 0;
            loss_streak = 0;
        }
    }

    PathOutcome {
        final_equity: equity,
        max_drawdown_pct: max_dd,
        max_win_streak,
        max_loss_streak,
        equity_curve: curve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn walk_tracks_drawdown_from_peak() {
        let out = walk_equity(&[100.0, -50.0, -50.0, 200.0], 1000.0, true);
        assert_eq!(out.final_equity, 1200.0);
        // peak 1100, trough 1000
        assert!((out.max_drawdown_pct - 100.0 / 1100.0 * 100.0).abs() < 1e-9);
        assert_eq!(
            out.equity_curve,
            Some(vec![1000.0, 1100.0, 1050.0, 1000.0, 1200.0])
        );
    }

    #[test]
    fn streaks_reset_on_zero() {
        let out = walk_equity(&[1.0, 1.0, 0.0, 1.0, -1.0, -1.0, -1.0, 0.0, -1.0], 100.0, false);
        assert_eq!(out.max_win_streak, 2);
        assert_eq!(out.max_loss_streak, 3);
        assert!(out.equity_curve.is_none());
    }

    #[test]
    fn non_positive_peak_has_zero_drawdown() {
        let out = walk_equity(&[-10.0, -5.0], 0.0, false);
        assert_eq!(out.max_drawdown_pct, 0.0);
        assert_eq!(out.final_equity, -15.0);
    }

    #[test]
    fn shuffled_path_keeps_the_sum() {
        let trades = [120.0, -80.0, 45.0, -10.0, 300.0, -150.0];
        let mut rng = StdRng::seed_from_u64(7);
        let out = simulate_path(&trades, 10_000.0, &mut rng, true);
        let expected = 10_000.0 + trades.iter().sum::<f64>();
        assert!((out.final_equity - expected).abs() < 1e-9);
        assert_eq!(out.equity_curve.map(|c| c.len()), Some(trades.len() + 1));
    }
}
