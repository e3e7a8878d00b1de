//! End-to-end detection scenarios: CSV in, finalized zones and breaks out.

use std::io::Write;

use chrono::{Duration, NaiveDate};
use smclab_core::data::load_candles;
use smclab_core::fvg::{FvgConfig, FvgDetector, FvgStatus};
use smclab_core::structure::{StructureConfig, StructureEngine};
use smclab_core::{Candle, CandleSeries, Direction};

fn hourly(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle::new(base + Duration::hours(i as i64), o, h, l, c))
        .collect()
}

/// Candle 1 high 1.1000, candle 3 low 1.1010: exactly one bullish gap.
#[test]
fn single_bullish_gap_from_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timestamp,open,high,low,close").unwrap();
    writeln!(file, "2024-06-03 08:00:00,1.0985,1.1000,1.0980,1.0995").unwrap();
    writeln!(file, "2024-06-03 09:00:00,1.0995,1.1030,1.0994,1.1025").unwrap();
    writeln!(file, "2024-06-03 10:00:00,1.1025,1.1040,1.1010,1.1035").unwrap();
    file.flush().unwrap();

    let series = load_candles(file.path()).unwrap();
    let config = FvgConfig {
        min_gap_pips: 5.0,
        pip_value: 0.0001,
        ..FvgConfig::default()
    };
    let scan = FvgDetector::new(config).detect(&series);

    assert_eq!(scan.gaps.len(), 1);
    let gap = scan.gaps[0];
    assert_eq!(gap.direction, Direction::Bullish);
    assert_eq!(gap.low, 1.1000);
    assert_eq!(gap.high, 1.1010);
    assert_eq!(gap.index, 1);
    assert_eq!(gap.timestamp, series[1].timestamp);
    assert_eq!(gap.status, FvgStatus::Fresh);
    assert!(scan.inverse.is_empty());
}

/// A swing high at index 50 (1.1200) that no later close exceeds stays unbroken.
#[test]
fn unbroken_swing_high_has_no_break() {
    let ohlc: Vec<(f64, f64, f64, f64)> = (0..80)
        .map(|i| {
            let level = 1.1000 + 0.0005 * (i as f64 * 0.7).sin();
            let high = if i == 50 { 1.1200 } else { level + 0.0008 };
            (level, high, level - 0.0008, level + 0.0003)
        })
        .collect();
    let series = CandleSeries::new(hourly(&ohlc)).unwrap();

    let analysis = StructureEngine::new(StructureConfig::default()).analyze(&series);

    let swing = analysis
        .swing_highs
        .iter()
        .find(|s| s.index == 50)
        .expect("swing high at 50");
    assert_eq!(swing.price, 1.1200);
    assert!(!swing.broken);
    assert!(analysis.breaks.iter().all(|b| b.swing_index != 50));
}

/// Full fill, reclaim above the midpoint, then an aligned iFVG signal.
#[test]
fn gap_fill_reclaim_and_signal() {
    let candles = hourly(&[
        (1.0985, 1.1000, 1.0980, 1.0995),
        (1.0995, 1.1030, 1.0994, 1.1025),
        (1.1025, 1.1040, 1.1010, 1.1035),
        (1.1035, 1.1036, 1.0995, 1.0998),
        (1.0998, 1.1003, 1.0990, 1.1001),
        (1.1001, 1.1012, 1.1000, 1.1008),
    ]);
    let series = CandleSeries::new(candles).unwrap();
    let scan = FvgDetector::default().detect(&series);

    let primary = scan.gaps.iter().find(|g| g.index == 1).unwrap();
    assert_eq!(primary.status, FvgStatus::Filled);
    assert_eq!(scan.inverse.len(), 1);

    let signal = scan.ifvg_signal(1.1005, smclab_core::Trend::Bullish);
    assert_eq!(signal.confidence, 85.0);
    assert_eq!(signal.bias, smclab_core::Bias::Buy);
}
