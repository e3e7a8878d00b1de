//! SMC Lab Core: candles, market structure, and fair value gaps.
//!
//! This crate contains the deterministic detection engine:
//! - Domain types (candles, validated series, direction, trend, bias)
//! - CSV ingestion with fail-fast validation at the boundary
//! - Swing detection and displacement-filtered BOS/CHoCH classification
//! - Fair value gap detection, fill tracking, and inverse zones
//! - Deterministic RNG hierarchy for the simulation crates

pub mod data;
pub mod domain;
pub mod fvg;
pub mod rng;
pub mod structure;

pub use domain::{Bias, Candle, CandleError, CandleSeries, Direction, Trend};
pub use fvg::{FairValueGap, FvgConfig, FvgDetector, FvgScan, FvgStatus, OrderBlockZone};
pub use structure::{
    BreakKind, StructureAnalysis, StructureBreak, StructureConfig, StructureEngine, SwingPoint,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: detection outputs can move to worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Candle>();
        require_sync::<Candle>();
        require_send::<CandleSeries>();
        require_sync::<CandleSeries>();
        require_send::<SwingPoint>();
        require_sync::<SwingPoint>();
        require_send::<StructureBreak>();
        require_sync::<StructureBreak>();
        require_send::<StructureAnalysis>();
        require_sync::<StructureAnalysis>();
        require_send::<StructureEngine>();
        require_sync::<StructureEngine>();
        require_send::<FairValueGap>();
        require_sync::<FairValueGap>();
        require_send::<FvgScan>();
        require_sync::<FvgScan>();
        require_send::<FvgDetector>();
        require_sync::<FvgDetector>();
        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
    }

    /// Detectors take plain slices, so a validated series and a raw vector
    /// go through the same entry points.
    #[test]
    fn detectors_accept_series_and_slices() {
        let candles = domain::make_candles(&[
            (1.0990, 1.1000, 1.0980, 1.0995),
            (1.0995, 1.1030, 1.0994, 1.1025),
            (1.1025, 1.1040, 1.1010, 1.1035),
        ]);
        let series = CandleSeries::new(candles.clone()).unwrap();

        let from_series = FvgDetector::default().detect(&series);
        let from_vec = FvgDetector::default().detect(&candles);
        assert_eq!(from_series, from_vec);
        assert_eq!(from_series.gaps.len(), 1);

        let analysis = StructureEngine::default().analyze(&series);
        assert_eq!(analysis.trend, Trend::Ranging);
    }
}
