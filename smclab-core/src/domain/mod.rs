//! Domain types shared by every detector.

pub mod candle;

pub use candle::{Candle, CandleError, CandleSeries};

use serde::{Deserialize, Serialize};

/// Direction of a structure break, gap, or order block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Bullish => Direction::Bearish,
            Direction::Bearish => Direction::Bullish,
        }
    }
}

/// Market trend label, derived per analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Ranging,
}

impl Trend {
    /// The directional component, `None` when ranging.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Trend::Bullish => Some(Direction::Bullish),
            Trend::Bearish => Some(Direction::Bearish),
            Trend::Ranging => None,
        }
    }
}

impl From<Direction> for Trend {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bullish => Trend::Bullish,
            Direction::Bearish => Trend::Bearish,
        }
    }
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bullish" => Ok(Trend::Bullish),
            "bearish" => Ok(Trend::Bearish),
            "ranging" => Ok(Trend::Ranging),
            other => Err(format!("unknown trend '{other}' (expected bullish, bearish, ranging)")),
        }
    }
}

/// Trading bias handed to strategy collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Buy,
    Sell,
    Neutral,
}

impl From<Trend> for Bias {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Bullish => Bias::Buy,
            Trend::Bearish => Bias::Sell,
            Trend::Ranging => Bias::Neutral,
        }
    }
}

impl From<Direction> for Bias {
    fn from(direction: Direction) -> Self {
        Trend::from(direction).into()
    }
}

/// Hourly candles from explicit `(open, high, low, close)` tuples.
#[cfg(test)]
pub fn make_candles(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::new(base + chrono::Duration::hours(i as i64), open, high, low, close)
        })
        .collect()
}

/// Hourly doji candles (open = close = midpoint) from highs and lows.
#[cfg(test)]
pub fn candles_from_highs_lows(highs: &[f64], lows: &[f64]) -> Vec<Candle> {
    let ohlc: Vec<(f64, f64, f64, f64)> = highs
        .iter()
        .zip(lows)
        .map(|(&h, &l)| {
            let mid = (h + l) / 2.0;
            (mid, h, l, mid)
        })
        .collect();
    make_candles(&ohlc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_round_trips_through_direction() {
        assert_eq!(Trend::from(Direction::Bullish).direction(), Some(Direction::Bullish));
        assert_eq!(Trend::from(Direction::Bearish).direction(), Some(Direction::Bearish));
        assert_eq!(Trend::Ranging.direction(), None);
    }

    #[test]
    fn bias_from_trend() {
        assert_eq!(Bias::from(Trend::Bullish), Bias::Buy);
        assert_eq!(Bias::from(Trend::Bearish), Bias::Sell);
        assert_eq!(Bias::from(Trend::Ranging), Bias::Neutral);
    }

    #[test]
    fn trend_parses_case_insensitive() {
        assert_eq!("Bullish".parse::<Trend>(), Ok(Trend::Bullish));
        assert_eq!("RANGING".parse::<Trend>(), Ok(Trend::Ranging));
        assert!("sideways".parse::<Trend>().is_err());
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::Bullish.opposite(), Direction::Bearish);
        assert_eq!(Direction::Bearish.opposite(), Direction::Bullish);
    }
}
