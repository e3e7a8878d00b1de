//! Candle: the fundamental market data unit.

use std::ops::Deref;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLC candle at a fixed position in a time-ordered series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Absolute body size `|close - open|`.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// OHLC sanity: finite, high >= low, open and close inside the range.
    pub fn is_sane(&self) -> bool {
        self.is_finite()
            && self.high >= self.low
            && self.open <= self.high
            && self.open >= self.low
            && self.close <= self.high
            && self.close >= self.low
    }
}

/// Rejection reasons for a candle series at the input boundary.
#[derive(Debug, Error, PartialEq)]
pub enum CandleError {
    #[error("candle {index}: non-finite price")]
    NonFinite { index: usize },
    #[error("candle {index}: high {high} below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },
    #[error("candle {index}: open/close outside the high-low range")]
    BodyOutsideRange { index: usize },
    #[error("candle {index}: timestamp {current} not after previous {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// A validated, strictly time-ordered candle sequence.
///
/// Detectors accept any `&[Candle]`; constructing a `CandleSeries` is how
/// input is checked once at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, CandleError> {
        for (index, c) in candles.iter().enumerate() {
            if !c.is_finite() {
                return Err(CandleError::NonFinite { index });
            }
            if c.high < c.low {
                return Err(CandleError::InvertedRange {
                    index,
                    high: c.high,
                    low: c.low,
                });
            }
            if !c.is_sane() {
                return Err(CandleError::BodyOutsideRange { index });
            }
            if index > 0 {
                let previous = candles[index - 1].timestamp;
                if c.timestamp <= previous {
                    return Err(CandleError::NonIncreasingTimestamp {
                        index,
                        previous,
                        current: c.timestamp,
                    });
                }
            }
        }
        Ok(Self { candles })
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }

    /// Index of the most recent candle, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.candles.len().checked_sub(1)
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &[Candle] {
        &self.candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_candle(hour: u32) -> Candle {
        Candle::new(ts(hour), 1.1000, 1.1030, 1.0990, 1.1020)
    }

    #[test]
    fn body_and_range() {
        let c = sample_candle(0);
        assert!((c.body() - 0.0020).abs() < 1e-12);
        assert!((c.range() - 0.0040).abs() < 1e-12);
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle(0).is_sane());
    }

    #[test]
    fn series_accepts_ordered_sane_candles() {
        let series = CandleSeries::new(vec![sample_candle(0), sample_candle(1)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_index(), Some(1));
    }

    #[test]
    fn series_rejects_nan() {
        let mut c = sample_candle(0);
        c.close = f64::NAN;
        assert_eq!(
            CandleSeries::new(vec![c]),
            Err(CandleError::NonFinite { index: 0 })
        );
    }

    #[test]
    fn series_rejects_inverted_range() {
        let mut c = sample_candle(0);
        c.high = 1.0980;
        assert!(matches!(
            CandleSeries::new(vec![c]),
            Err(CandleError::InvertedRange { index: 0, .. })
        ));
    }

    #[test]
    fn series_rejects_close_outside_range() {
        let mut c = sample_candle(0);
        c.close = 1.1100;
        assert_eq!(
            CandleSeries::new(vec![c]),
            Err(CandleError::BodyOutsideRange { index: 0 })
        );
    }

    #[test]
    fn series_rejects_duplicate_timestamp() {
        let err = CandleSeries::new(vec![sample_candle(2), sample_candle(2)]).unwrap_err();
        assert!(matches!(
            err,
            CandleError::NonIncreasingTimestamp { index: 1, .. }
        ));
    }

    #[test]
    fn empty_series_is_valid() {
        let series = CandleSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_index(), None);
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let c = sample_candle(5);
        let json = serde_json::to_string(&c).unwrap();
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
