//! Structure-break engine.
//!
//! Swings are merged into one index-ordered list (a high before a low at the
//! same index) and resolved in that order. Each swing scans forward from the
//! candle after it for the first displaced close beyond its price. The
//! internal trend starts Ranging and is local to the pass:
//!
//! | trend   | high breaks     | low breaks      |
//! |---------|-----------------|-----------------|
//! | Bullish | BOS bullish     | CHoCH bearish   |
//! | Bearish | CHoCH bullish   | BOS bearish     |
//! | Ranging | BOS bullish     | BOS bearish     |
//!
//! Only a CHoCH moves the internal trend. A pass over fewer than three swings
//! emits no breaks.

use tracing::debug;

use super::analysis::StructureAnalysis;
use super::swing::{detect_swings, SwingPoint};
use super::{BreakKind, StructureBreak, StructureConfig};
use crate::domain::{Candle, Direction, Trend};

/// Number of preceding candles averaged by the displacement filter.
pub const DISPLACEMENT_LOOKBACK: usize = 10;

/// Merged swings required before any break is resolved.
pub const MIN_SWINGS_FOR_BREAKS: usize = 3;

/// Whether the candle at `index` carries enough body to count as displacement.
///
/// Candles without a full lookback window, and windows with zero average
/// range, are accepted.
pub fn is_displaced(candles: &[Candle], index: usize, multiplier: f64) -> bool {
    if index < DISPLACEMENT_LOOKBACK {
        return true;
    }
    let Some(candle) = candles.get(index) else {
        return false;
    };
    let window = &candles[index - DISPLACEMENT_LOOKBACK..index];
    let avg_range = window.iter().map(Candle::range).sum::<f64>() / DISPLACEMENT_LOOKBACK as f64;
    if avg_range <= 0.0 {
        return true;
    }
    candle.body() > multiplier * avg_range
}

/// Detects swings and classifies their breaks.
#[derive(Debug, Clone, Default)]
pub struct StructureEngine {
    config: StructureConfig,
}

impl StructureEngine {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    /// Run one full analysis pass.
    pub fn analyze(&self, candles: &[Candle]) -> StructureAnalysis {
        let swings = detect_swings(candles, self.config.swing_strength);
        debug!(
            highs = swings.highs.len(),
            lows = swings.lows.len(),
            "detected swing points"
        );

        let mut ordered: Vec<SwingPoint> = swings.highs.into_iter().chain(swings.lows).collect();
        // stable: a high stays ahead of a low at the same index
        ordered.sort_by_key(|s| s.index);
        let resolve_breaks = ordered.len() >= MIN_SWINGS_FOR_BREAKS;

        let mut internal_trend = Trend::Ranging;
        let mut breaks = Vec::new();
        let mut highs = Vec::new();
        let mut lows = Vec::new();

        for swing in ordered {
            let found = if resolve_breaks {
                self.find_break(candles, &swing)
            } else {
                None
            };
            let resolved = match found {
                Some(break_index) => {
                    let direction = if swing.is_high {
                        Direction::Bullish
                    } else {
                        Direction::Bearish
                    };
                    let kind = classify(internal_trend, direction);
                    if kind == BreakKind::Choch {
                        internal_trend = Trend::from(direction);
                    }

                    let candle = &candles[break_index];
                    breaks.push(StructureBreak {
                        kind,
                        direction,
                        break_index,
                        break_price: candle.close,
                        swing_index: swing.index,
                        swing_price: swing.price,
                        timestamp: candle.timestamp,
                    });
                    SwingPoint {
                        broken: true,
                        ..swing
                    }
                }
                None => swing,
            };
            if resolved.is_high {
                highs.push(resolved);
            } else {
                lows.push(resolved);
            }
        }

        let trend = derive_trend(&breaks);
        debug!(breaks = breaks.len(), ?trend, "structure pass complete");
        StructureAnalysis::new(highs, lows, breaks, trend)
    }

    fn find_break(&self, candles: &[Candle], swing: &SwingPoint) -> Option<usize> {
        let multiplier = self.config.displacement_multiplier;
        (swing.index + 1..candles.len()).find(|&i| {
            let close = candles[i].close;
            let crossed = if swing.is_high {
                close > swing.price
            } else {
                close < swing.price
            };
            crossed && is_displaced(candles, i, multiplier)
        })
    }
}

fn classify(internal_trend: Trend, direction: Direction) -> BreakKind {
    match internal_trend.direction() {
        Some(current) if current != direction => BreakKind::Choch,
        _ => BreakKind::Bos,
    }
}

/// Direction of the latest CHoCH, else the majority of the last three breaks.
pub(crate) fn derive_trend(breaks: &[StructureBreak]) -> Trend {
    if let Some(choch) = breaks.iter().rev().find(|b| b.kind == BreakKind::Choch) {
        return choch.direction.into();
    }
    let recent = &breaks[breaks.len().saturating_sub(3)..];
    let bullish = recent
        .iter()
        .filter(|b| b.direction == Direction::Bullish)
        .count();
    let bearish = recent.len() - bullish;
    match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => Trend::Bullish,
        std::cmp::Ordering::Less => Trend::Bearish,
        std::cmp::Ordering::Equal => Trend::Ranging,
    }
}
