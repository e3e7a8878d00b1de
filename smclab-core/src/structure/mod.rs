//! Market structure: swing points, displacement-filtered breaks, trend.
//!
//! One `StructureEngine::analyze` call is one pass over a series. The pass
//! returns a finalized `StructureAnalysis`; nothing carries over between
//! calls.

pub mod analysis;
pub mod engine;
pub mod swing;

pub use analysis::{StructureAnalysis, StructureMarker};
pub use engine::{is_displaced, StructureEngine, DISPLACEMENT_LOOKBACK};
pub use swing::{detect_swings, SwingPoint, Swings};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Direction;

// ─── Configuration ───────────────────────────────────────────────────

/// Parameters for swing detection and break classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Candles required on each side of a swing (default 5). Zero detects nothing.
    pub swing_strength: usize,
    /// Breaking body must exceed this multiple of the trailing average range (default 1.2).
    pub displacement_multiplier: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            swing_strength: 5,
            displacement_multiplier: 1.2,
        }
    }
}

// ─── Break types ─────────────────────────────────────────────────────

/// Continuation or reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakKind {
    /// Break of structure: close beyond a swing in the direction of the trend.
    #[serde(rename = "BOS")]
    Bos,
    /// Change of character: close beyond a swing against the trend.
    #[serde(rename = "CHoCH")]
    Choch,
}

/// One confirmed close-based break of a specific swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureBreak {
    #[serde(rename = "type")]
    pub kind: BreakKind,
    pub direction: Direction,
    pub break_index: usize,
    /// Close of the breaking candle.
    pub break_price: f64,
    pub swing_index: usize,
    pub swing_price: f64,
    /// Timestamp of the breaking candle.
    pub timestamp: NaiveDateTime,
}
