//! Fair value gaps: three-candle imbalances, their fill lifecycle, and the
//! inverse zones left behind once a filled gap is reclaimed.

pub mod detector;
pub mod scan;

pub use detector::{FillProgress, FvgDetector};
pub use scan::{FvgScan, FvgSummary, IfvgSignal};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Direction;

// ─── Configuration ───────────────────────────────────────────────────

/// Parameters for gap detection and fill classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FvgConfig {
    /// Minimum gap size in pips (default 5).
    pub min_gap_pips: f64,
    /// Gaps indexed more than this many candles before the last one are dropped (default 50).
    pub max_age_bars: usize,
    /// Partial fill at or above this percentage counts as filled (default 50).
    pub fill_percentage_threshold: f64,
    /// Price value of one pip (default 0.0001).
    pub pip_value: f64,
}

impl Default for FvgConfig {
    fn default() -> Self {
        Self {
            min_gap_pips: 5.0,
            max_age_bars: 50,
            fill_percentage_threshold: 50.0,
            pip_value: 0.0001,
        }
    }
}

impl FvgConfig {
    /// Minimum gap in price units.
    pub fn min_gap(&self) -> f64 {
        self.min_gap_pips * self.pip_value
    }
}

// ─── Zone types ──────────────────────────────────────────────────────

/// Fill lifecycle. Only ever advances `Fresh -> PartiallyFilled -> Filled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FvgStatus {
    Fresh,
    PartiallyFilled,
    Filled,
}

/// A price imbalance zone `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub status: FvgStatus,
    pub index: usize,
    pub high: f64,
    pub low: f64,
    pub timestamp: NaiveDateTime,
    pub fill_percentage: f64,
    pub is_inverse: bool,
    pub is_ob_confluence: bool,
}

impl FairValueGap {
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn size(&self) -> f64 {
        self.high - self.low
    }

    /// Still tradeable: anything short of `Filled`.
    pub fn is_valid(&self) -> bool {
        self.status != FvgStatus::Filled
    }

    /// Order-block confluence marks an A+ setup.
    pub fn is_a_plus_setup(&self) -> bool {
        self.is_ob_confluence
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }

    /// Distance from `price` to the zone, 0 inside it.
    pub fn distance_to(&self, price: f64) -> f64 {
        if self.contains(price) {
            0.0
        } else {
            (self.low - price).abs().min((self.high - price).abs())
        }
    }
}

/// An externally detected order block used for confluence tagging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlockZone {
    pub direction: Direction,
    pub high: f64,
    pub low: f64,
}

impl OrderBlockZone {
    pub fn new(direction: Direction, high: f64, low: f64) -> Self {
        Self {
            direction,
            high,
            low,
        }
    }

    pub fn height(&self) -> f64 {
        self.high - self.low
    }

    /// Overlap or proximity within half the block's height, same direction only.
    pub fn confluent_with(&self, gap: &FairValueGap) -> bool {
        if gap.direction != self.direction {
            return false;
        }
        let overlaps = gap.low <= self.high && gap.high >= self.low;
        let proximity = match gap.direction {
            Direction::Bullish => (gap.low - self.high).abs(),
            Direction::Bearish => (gap.high - self.low).abs(),
        };
        overlaps || proximity < self.height() * 0.5
    }
}
