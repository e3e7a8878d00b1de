//! Gap detection and fill tracking.
//!
//! For the window `(k, k+1, k+2)`:
//! - bullish when `low[k+2] > high[k]` by at least `min_gap`, zone `[high[k], low[k+2]]`
//! - bearish when `high[k+2] < low[k]` by at least `min_gap`, zone `[high[k+2], low[k]]`
//!
//! The zone is indexed at the middle candle. Fill state is folded over the
//! candles from `k+3` on with [`FillProgress`]; a full touch that is later
//! reclaimed past the midpoint spawns an inverse zone.

use tracing::debug;

use super::scan::FvgScan;
use super::{FairValueGap, FvgConfig, FvgStatus};
use crate::domain::{Candle, Direction};

/// Running fill state of a single gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillProgress {
    pub status: FvgStatus,
    pub fill_percentage: f64,
    /// Index of the first candle that traded through the far edge.
    pub full_fill_index: Option<usize>,
}

impl Default for FillProgress {
    fn default() -> Self {
        Self {
            status: FvgStatus::Fresh,
            fill_percentage: 0.0,
            full_fill_index: None,
        }
    }
}

impl FillProgress {
    /// Fold one later candle into the fill state.
    pub fn advance(self, gap: &FairValueGap, index: usize, candle: &Candle, threshold: f64) -> Self {
        if self.full_fill_index.is_some() {
            return self;
        }
        let size = gap.size();
        let (full_touch, intrusion) = match gap.direction {
            Direction::Bullish => (candle.low <= gap.low, gap.high - candle.low),
            Direction::Bearish => (candle.high >= gap.high, candle.high - gap.low),
        };

        if full_touch {
            return Self {
                status: FvgStatus::Filled,
                fill_percentage: 100.0,
                full_fill_index: Some(index),
            };
        }
        if intrusion <= 0.0 || size <= 0.0 {
            return self;
        }

        let pct = (intrusion / size * 100.0).min(100.0);
        let fill_percentage = self.fill_percentage.max(pct);
        let status = if fill_percentage >= threshold {
            FvgStatus::Filled
        } else {
            FvgStatus::PartiallyFilled
        };
        Self {
            status: self.status.max(status),
            fill_percentage,
            full_fill_index: None,
        }
    }
}

/// Three-candle imbalance detector.
#[derive(Debug, Clone, Default)]
pub struct FvgDetector {
    config: FvgConfig,
}

impl FvgDetector {
    pub fn new(config: FvgConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FvgConfig {
        &self.config
    }

    /// Detect every gap young enough to survive the age filter.
    ///
    /// Primary gaps come back ordered by index; inverse zones are kept in a
    /// separate collection.
    pub fn detect(&self, candles: &[Candle]) -> FvgScan {
        if candles.len() < 3 {
            return FvgScan::default();
        }
        let last_index = candles.len() - 1;
        let min_gap = self.config.min_gap();

        let mut gaps = Vec::new();
        let mut inverse = Vec::new();

        for k in 0..candles.len() - 2 {
            let index = k + 1;
            if last_index - index > self.config.max_age_bars {
                continue;
            }
            let Some(fresh) =
                open_gap(&candles[k], &candles[k + 2], min_gap, index, candles[index].timestamp)
            else {
                continue;
            };

            let progress = candles
                .iter()
                .enumerate()
                .skip(k + 3)
                .fold(FillProgress::default(), |p, (i, c)| {
                    p.advance(&fresh, i, c, self.config.fill_percentage_threshold)
                });

            let gap = FairValueGap {
                status: progress.status,
                fill_percentage: progress.fill_percentage,
                ..fresh
            };
            if let Some(fill_index) = progress.full_fill_index {
                if let Some(ifvg) = reclaim(&gap, candles, fill_index) {
                    inverse.push(ifvg);
                }
            }
            gaps.push(gap);
        }

        debug!(
            candles = candles.len(),
            fvgs = gaps.len(),
            ifvgs = inverse.len(),
            "fair value gap scan complete"
        );
        FvgScan::new(gaps, inverse)
    }
}

fn open_gap(
    first: &Candle,
    third: &Candle,
    min_gap: f64,
    index: usize,
    timestamp: chrono::NaiveDateTime,
) -> Option<FairValueGap> {
    let (direction, low, high) = if third.low > first.high && third.low - first.high >= min_gap {
        (Direction::Bullish, first.high, third.low)
    } else if third.high < first.low && first.low - third.high >= min_gap {
        (Direction::Bearish, third.high, first.low)
    } else {
        return None;
    };
    Some(FairValueGap {
        direction,
        status: FvgStatus::Fresh,
        index,
        high,
        low,
        timestamp,
        fill_percentage: 0.0,
        is_inverse: false,
        is_ob_confluence: false,
    })
}

/// First close after the full fill that crosses back past the midpoint.
fn reclaim(gap: &FairValueGap, candles: &[Candle], fill_index: usize) -> Option<FairValueGap> {
    let mid = gap.midpoint();
    candles
        .iter()
        .enumerate()
        .skip(fill_index + 1)
        .find(|(_, c)| match gap.direction {
            Direction::Bullish => c.close > mid,
            Direction::Bearish => c.close < mid,
        })
        .map(|(i, c)| FairValueGap {
            status: FvgStatus::Fresh,
            index: i,
            timestamp: c.timestamp,
            fill_percentage: 0.0,
            is_inverse: true,
            is_ob_confluence: false,
            ..*gap
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_candles;

    /// Bullish gap [1.1000, 1.1010] at index 1 followed by `tail`.
    fn bullish_gap_then(tail: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let mut ohlc = vec![
            (1.0990, 1.1000, 1.0980, 1.0995),
            (1.0995, 1.1030, 1.0994, 1.1025),
            (1.1025, 1.1040, 1.1010, 1.1035),
        ];
        ohlc.extend_from_slice(tail);
        make_candles(&ohlc)
    }

    fn detector() -> FvgDetector {
        FvgDetector::new(FvgConfig {
            max_age_bars: 500,
            ..FvgConfig::default()
        })
    }

    #[test]
    fn detects_bullish_gap() {
        let scan = detector().detect(&bullish_gap_then(&[]));
        assert_eq!(scan.gaps.len(), 1);
        let g = scan.gaps[0];
        assert_eq!(g.direction, Direction::Bullish);
        assert_eq!(g.index, 1);
        assert_eq!(g.low, 1.1000);
        assert_eq!(g.high, 1.1010);
        assert_eq!(g.status, FvgStatus::Fresh);
        assert_eq!(g.fill_percentage, 0.0);
    }

    #[test]
    fn detects_bearish_gap() {
        let candles = make_candles(&[
            (1.1020, 1.1030, 1.1010, 1.1012),
            (1.1012, 1.1013, 1.0985, 1.0990),
            (1.0990, 1.1000, 1.0970, 1.0975),
        ]);
        let scan = detector().detect(&candles);
        assert_eq!(scan.gaps.len(), 1);
        assert_eq!(scan.gaps[0].direction, Direction::Bearish);
        assert_eq!(scan.gaps[0].low, 1.1000);
        assert_eq!(scan.gaps[0].high, 1.1010);
    }

    #[test]
    fn gap_below_minimum_is_ignored() {
        let candles = make_candles(&[
            (1.0990, 1.1000, 1.0980, 1.0995),
            (1.0995, 1.1010, 1.0994, 1.1005),
            (1.1005, 1.1010, 1.1003, 1.1008),
        ]);
        assert!(detector().detect(&candles).gaps.is_empty());
    }

    #[test]
    fn partial_fill_below_threshold() {
        // dips to 1.1007: 30% of the zone
        let scan = detector().detect(&bullish_gap_then(&[(1.1035, 1.1036, 1.1007, 1.1030)]));
        let g = scan.gaps[0];
        assert_eq!(g.status, FvgStatus::PartiallyFilled);
        assert!((g.fill_percentage - 30.0).abs() < 1e-6);
    }

    #[test]
    fn partial_fill_past_threshold_counts_as_filled() {
        let scan = detector().detect(&bullish_gap_then(&[(1.1035, 1.1036, 1.1003, 1.1030)]));
        let g = scan.gaps[0];
        assert_eq!(g.status, FvgStatus::Filled);
        assert!((g.fill_percentage - 70.0).abs() < 1e-6);
        assert!(scan.inverse.is_empty());
    }

    #[test]
    fn full_fill_then_reclaim_spawns_inverse() {
        let scan = detector().detect(&bullish_gap_then(&[
            (1.1035, 1.1036, 1.0995, 1.0998),
            (1.0998, 1.1003, 1.0990, 1.1001),
            (1.1001, 1.1012, 1.1000, 1.1008),
        ]));
        let g = scan.gaps[0];
        assert_eq!(g.status, FvgStatus::Filled);
        assert_eq!(g.fill_percentage, 100.0);

        assert_eq!(scan.inverse.len(), 1);
        let inv = scan.inverse[0];
        assert!(inv.is_inverse);
        assert_eq!(inv.index, 5);
        assert_eq!(inv.direction, Direction::Bullish);
        assert_eq!(inv.status, FvgStatus::Fresh);
        assert_eq!((inv.low, inv.high), (g.low, g.high));
    }

    #[test]
    fn full_fill_without_reclaim_has_no_inverse() {
        let scan = detector().detect(&bullish_gap_then(&[
            (1.1035, 1.1036, 1.0995, 1.0998),
            (1.0998, 1.1003, 1.0990, 1.0992),
        ]));
        assert_eq!(scan.gaps[0].status, FvgStatus::Filled);
        assert!(scan.inverse.is_empty());
    }

    #[test]
    fn stale_gaps_are_dropped() {
        let tail: Vec<_> = (0..60).map(|_| (1.1035, 1.1040, 1.1030, 1.1035)).collect();
        let candles = bullish_gap_then(&tail);
        let scan = FvgDetector::default().detect(&candles);
        assert!(scan.gaps.is_empty());
    }

    #[test]
    fn fewer_than_three_candles_is_empty() {
        let candles = make_candles(&[(1.0, 1.1, 0.9, 1.0), (1.0, 1.1, 0.9, 1.0)]);
        let scan = FvgDetector::default().detect(&candles);
        assert!(scan.gaps.is_empty());
        assert!(scan.inverse.is_empty());
    }

    #[test]
    fn progress_never_regresses() {
        let candles = bullish_gap_then(&[]);
        let gap = detector().detect(&candles).gaps[0];
        let deep = Candle::new(candles[2].timestamp, 1.1030, 1.1031, 1.1006, 1.1020);
        let shallow = Candle::new(candles[2].timestamp, 1.1030, 1.1031, 1.1009, 1.1020);
        let p = FillProgress::default()
            .advance(&gap, 3, &deep, 50.0)
            .advance(&gap, 4, &shallow, 50.0);
        assert_eq!(p.status, FvgStatus::PartiallyFilled);
        assert!((p.fill_percentage - 40.0).abs() < 1e-6);
    }
}
