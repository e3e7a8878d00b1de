//! Finalized output of a structure pass and its query surface.

use serde::{Deserialize, Serialize};

use super::swing::SwingPoint;
use super::{BreakKind, StructureBreak};
use crate::domain::{Bias, Direction, Trend};

/// Resolved swings, emitted breaks, and the derived trend of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    /// Breaks in the order their swings were resolved.
    pub breaks: Vec<StructureBreak>,
    pub trend: Trend,
}

/// Flat charting record for swings and breaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureMarker {
    SwingHigh {
        index: usize,
        price: f64,
        broken: bool,
    },
    SwingLow {
        index: usize,
        price: f64,
        broken: bool,
    },
    Break {
        kind: BreakKind,
        direction: Direction,
        break_index: usize,
        break_price: f64,
        swing_index: usize,
        swing_price: f64,
    },
}

impl StructureAnalysis {
    pub(crate) fn new(
        swing_highs: Vec<SwingPoint>,
        swing_lows: Vec<SwingPoint>,
        breaks: Vec<StructureBreak>,
        trend: Trend,
    ) -> Self {
        Self {
            swing_highs,
            swing_lows,
            breaks,
            trend,
        }
    }

    pub fn bias(&self) -> Bias {
        self.trend.into()
    }

    /// Latest BOS, optionally restricted to one direction.
    pub fn last_bos(&self, direction: Option<Direction>) -> Option<&StructureBreak> {
        self.breaks.iter().rev().find(|b| {
            b.kind == BreakKind::Bos && direction.map_or(true, |d| b.direction == d)
        })
    }

    pub fn last_choch(&self) -> Option<&StructureBreak> {
        self.breaks.iter().rev().find(|b| b.kind == BreakKind::Choch)
    }

    pub fn last_higher_high(&self) -> Option<&SwingPoint> {
        last_relative(&self.swing_highs, true)
    }

    pub fn last_higher_low(&self) -> Option<&SwingPoint> {
        last_relative(&self.swing_lows, true)
    }

    pub fn last_lower_high(&self) -> Option<&SwingPoint> {
        last_relative(&self.swing_highs, false)
    }

    pub fn last_lower_low(&self) -> Option<&SwingPoint> {
        last_relative(&self.swing_lows, false)
    }

    /// Every swing then every break, for a charting collaborator.
    pub fn markers(&self) -> Vec<StructureMarker> {
        let highs = self.swing_highs.iter().map(|s| StructureMarker::SwingHigh {
            index: s.index,
            price: s.price,
            broken: s.broken,
        });
        let lows = self.swing_lows.iter().map(|s| StructureMarker::SwingLow {
            index: s.index,
            price: s.price,
            broken: s.broken,
        });
        let breaks = self.breaks.iter().map(|b| StructureMarker::Break {
            kind: b.kind,
            direction: b.direction,
            break_index: b.break_index,
            break_price: b.break_price,
            swing_index: b.swing_index,
            swing_price: b.swing_price,
        });
        highs.chain(lows).chain(breaks).collect()
    }
}

/// Newest swing priced above (`higher`) or below its predecessor, falling
/// back to the newest swing when none qualifies.
fn last_relative(swings: &[SwingPoint], higher: bool) -> Option<&SwingPoint> {
    swings
        .windows(2)
        .rev()
        .find(|w| {
            if higher {
                w[1].price > w[0].price
            } else {
                w[1].price < w[0].price
            }
        })
        .map(|w| &w[1])
        .or_else(|| swings.last())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn swing(index: usize, price: f64, is_high: bool) -> SwingPoint {
        SwingPoint {
            index,
            price,
            timestamp: NaiveDateTime::default(),
            is_high,
            confirmed: true,
            broken: false,
        }
    }

    fn brk(kind: BreakKind, direction: Direction, break_index: usize) -> StructureBreak {
        StructureBreak {
            kind,
            direction,
            break_index,
            break_price: 1.0,
            swing_index: break_index - 1,
            swing_price: 1.0,
            timestamp: NaiveDateTime::default(),
        }
    }

    fn sample() -> StructureAnalysis {
        StructureAnalysis::new(
            vec![swing(5, 1.20, true), swing(15, 1.25, true), swing(25, 1.22, true)],
            vec![swing(10, 1.10, false), swing(20, 1.12, false)],
            vec![
                brk(BreakKind::Bos, Direction::Bullish, 12),
                brk(BreakKind::Choch, Direction::Bearish, 22),
                brk(BreakKind::Bos, Direction::Bearish, 30),
            ],
            Trend::Bearish,
        )
    }

    #[test]
    fn relative_swings() {
        let a = sample();
        assert_eq!(a.last_higher_high().map(|s| s.index), Some(15));
        assert_eq!(a.last_lower_high().map(|s| s.index), Some(25));
        assert_eq!(a.last_higher_low().map(|s| s.index), Some(20));
        // no lower low: falls back to the newest low
        assert_eq!(a.last_lower_low().map(|s| s.index), Some(20));
    }

    #[test]
    fn relative_swings_on_sparse_input() {
        let empty = StructureAnalysis::default();
        assert!(empty.last_higher_high().is_none());

        let one = StructureAnalysis::new(vec![swing(3, 2.0, true)], vec![], vec![], Trend::Ranging);
        assert_eq!(one.last_lower_high().map(|s| s.index), Some(3));
    }

    #[test]
    fn last_break_queries() {
        let a = sample();
        assert_eq!(a.last_bos(None).map(|b| b.break_index), Some(30));
        assert_eq!(
            a.last_bos(Some(Direction::Bullish)).map(|b| b.break_index),
            Some(12)
        );
        assert_eq!(a.last_choch().map(|b| b.break_index), Some(22));
        assert_eq!(a.bias(), Bias::Sell);
    }

    #[test]
    fn markers_cover_everything() {
        let a = sample();
        let markers = a.markers();
        assert_eq!(markers.len(), 8);
        assert!(matches!(markers[0], StructureMarker::SwingHigh { index: 5, .. }));
        assert!(matches!(markers[3], StructureMarker::SwingLow { index: 10, .. }));
        assert!(matches!(
            markers[6],
            StructureMarker::Break {
                kind: BreakKind::Choch,
                ..
            }
        ));
    }

    #[test]
    fn marker_json_is_tagged() {
        let m = StructureMarker::SwingLow {
            index: 4,
            price: 1.5,
            broken: true,
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["type"], "swing_low");
        assert_eq!(json["broken"], true);
    }
}
