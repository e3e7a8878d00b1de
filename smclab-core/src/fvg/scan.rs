//! Query surface over one detection pass.

use serde::{Deserialize, Serialize};

use super::{FairValueGap, OrderBlockZone};
use crate::domain::{Bias, Direction, Trend};

/// Confidence of an iFVG signal without trend agreement.
pub const IFVG_BASE_CONFIDENCE: f64 = 65.0;
/// Confidence of an iFVG signal whose direction matches the supplied trend.
pub const IFVG_ALIGNED_CONFIDENCE: f64 = 85.0;

/// Finalized primary gaps and inverse zones of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FvgScan {
    pub gaps: Vec<FairValueGap>,
    pub inverse: Vec<FairValueGap>,
}

/// Aggregate zone counts. Direction counts only include valid zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FvgSummary {
    pub fvg_count: usize,
    pub bullish_fvg: usize,
    pub bearish_fvg: usize,
    pub ifvg_count: usize,
    pub bullish_ifvg: usize,
    pub bearish_ifvg: usize,
    pub a_plus_setups: usize,
}

/// Directional suggestion from price sitting inside an inverse zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfvgSignal {
    pub bias: Bias,
    pub confidence: f64,
    pub reason: String,
}

impl FvgScan {
    pub(crate) fn new(gaps: Vec<FairValueGap>, inverse: Vec<FairValueGap>) -> Self {
        Self { gaps, inverse }
    }

    /// Valid gap closest to `price`, optionally of one direction.
    pub fn nearest(&self, price: f64, direction: Option<Direction>) -> Option<&FairValueGap> {
        self.gaps
            .iter()
            .filter(|g| g.is_valid() && direction.map_or(true, |d| g.direction == d))
            .min_by(|a, b| {
                a.distance_to(price)
                    .partial_cmp(&b.distance_to(price))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// First valid gap containing `price`.
    pub fn gap_containing(&self, price: f64) -> Option<&FairValueGap> {
        first_containing(&self.gaps, price)
    }

    /// First valid inverse zone containing `price`.
    pub fn inverse_containing(&self, price: f64) -> Option<&FairValueGap> {
        first_containing(&self.inverse, price)
    }

    pub fn bullish_gaps(&self) -> impl Iterator<Item = &FairValueGap> {
        valid_of(&self.gaps, Direction::Bullish)
    }

    pub fn bearish_gaps(&self) -> impl Iterator<Item = &FairValueGap> {
        valid_of(&self.gaps, Direction::Bearish)
    }

    pub fn bullish_inverse(&self) -> impl Iterator<Item = &FairValueGap> {
        valid_of(&self.inverse, Direction::Bullish)
    }

    pub fn bearish_inverse(&self) -> impl Iterator<Item = &FairValueGap> {
        valid_of(&self.inverse, Direction::Bearish)
    }

    pub fn summary(&self) -> FvgSummary {
        FvgSummary {
            fvg_count: self.gaps.len(),
            bullish_fvg: self.bullish_gaps().count(),
            bearish_fvg: self.bearish_gaps().count(),
            ifvg_count: self.inverse.len(),
            bullish_ifvg: self.bullish_inverse().count(),
            bearish_ifvg: self.bearish_inverse().count(),
            a_plus_setups: self.gaps.iter().filter(|g| g.is_a_plus_setup()).count(),
        }
    }

    /// Signal from the first inverse zone containing `price`.
    ///
    /// Confidence is 65, raised to 85 when `trend` agrees with the zone.
    pub fn ifvg_signal(&self, price: f64, trend: Trend) -> IfvgSignal {
        let Some(zone) = self.inverse_containing(price) else {
            return IfvgSignal {
                bias: Bias::Neutral,
                confidence: 0.0,
                reason: "price not inside an iFVG".into(),
            };
        };
        let confidence = if trend.direction() == Some(zone.direction) {
            IFVG_ALIGNED_CONFIDENCE
        } else {
            IFVG_BASE_CONFIDENCE
        };
        let role = match zone.direction {
            Direction::Bullish => "bullish iFVG (support)",
            Direction::Bearish => "bearish iFVG (resistance)",
        };
        IfvgSignal {
            bias: zone.direction.into(),
            confidence,
            reason: format!("price inside {role} [{:.5}-{:.5}]", zone.low, zone.high),
        }
    }

    /// Flag valid gaps that overlap or sit near a same-direction order block.
    pub fn with_order_block_confluence(mut self, order_blocks: &[OrderBlockZone]) -> Self {
        for gap in self.gaps.iter_mut().filter(|g| g.is_valid()) {
            if order_blocks.iter().any(|ob| ob.confluent_with(gap)) {
                gap.is_ob_confluence = true;
            }
        }
        self
    }
}

fn first_containing(zones: &[FairValueGap], price: f64) -> Option<&FairValueGap> {
    zones.iter().find(|z| z.is_valid() && z.contains(price))
}

fn valid_of(zones: &[FairValueGap], direction: Direction) -> impl Iterator<Item = &FairValueGap> {
    zones
        .iter()
        .filter(move |z| z.is_valid() && z.direction == direction)
}
