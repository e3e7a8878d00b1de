//! Swing point detection.
//!
//! A swing high at `i` is a candle whose high is strictly above the highs of
//! the `strength` candles on each side; swing lows mirror this on the lows.
//! Ties disqualify. Only confirmed swings are emitted, so the last
//! `strength` candles of a series can never be swings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// A confirmed local extreme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub timestamp: NaiveDateTime,
    pub is_high: bool,
    pub confirmed: bool,
    /// Set by the structure engine once a displaced close crosses `price`.
    pub broken: bool,
}

impl SwingPoint {
    fn high(candles: &[Candle], index: usize) -> Self {
        Self {
            index,
            price: candles[index].high,
            timestamp: candles[index].timestamp,
            is_high: true,
            confirmed: true,
            broken: false,
        }
    }

    fn low(candles: &[Candle], index: usize) -> Self {
        Self {
            index,
            price: candles[index].low,
            timestamp: candles[index].timestamp,
            is_high: false,
            confirmed: true,
            broken: false,
        }
    }
}

/// Swing highs and lows, each ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swings {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl Swings {
    pub fn is_empty(&self) -> bool {
        self.highs.is_empty() && self.lows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.highs.len() + self.lows.len()
    }
}

/// Detect all confirmed swing highs and lows.
///
/// Returns an empty result when `strength` is 0 or the series is shorter than
/// `2 * strength + 1`.
pub fn detect_swings(candles: &[Candle], strength: usize) -> Swings {
    let len = candles.len();
    if strength == 0 || len < 2 * strength + 1 {
        return Swings::default();
    }

    let mut swings = Swings::default();
    for i in strength..len - strength {
        if is_swing_high(candles, i, strength) {
            swings.highs.push(SwingPoint::high(candles, i));
        }
        if is_swing_low(candles, i, strength) {
            swings.lows.push(SwingPoint::low(candles, i));
        }
    }
    swings
}

// Nearest neighbours are compared first so most candles exit after one check.
fn is_swing_high(candles: &[Candle], i: usize, strength: usize) -> bool {
    let pivot = candles[i].high;
    (1..=strength).all(|j| pivot > candles[i - j].high && pivot > candles[i + j].high)
}

fn is_swing_low(candles: &[Candle], i: usize, strength: usize) -> bool {
    let pivot = candles[i].low;
    (1..=strength).all(|j| pivot < candles[i - j].low && pivot < candles[i + j].low)
}
