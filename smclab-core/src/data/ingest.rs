//! CSV readers.
//!
//! Candle files: `timestamp,open,high,low,close` with RFC 3339,
//! `%Y-%m-%d %H:%M:%S`, `%Y-%m-%dT%H:%M:%S` or `%Y-%m-%d` timestamps.
//! Trade files: a `pnl` column; other columns are ignored.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Candle, CandleError, CandleSeries};

/// Errors from the ingestion layer.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("record {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("record {row}: unparseable timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error(transparent)]
    Candle(#[from] CandleError),
}

#[derive(Debug, Deserialize)]
struct CandleRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct TradeRecord {
    pnl: f64,
}

/// Parse the timestamp formats accepted in candle files.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Read and validate a candle series from any CSV source.
pub fn read_candles<R: Read>(reader: R) -> Result<CandleSeries, IngestError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();
    for (i, record) in rdr.deserialize::<CandleRecord>().enumerate() {
        let row = i + 1;
        let record = record.map_err(|source| IngestError::Record { row, source })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| IngestError::Timestamp {
            row,
            value: record.timestamp.clone(),
        })?;
        candles.push(Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
        ));
    }
    debug!(candles = candles.len(), "read candle records");
    Ok(CandleSeries::new(candles)?)
}

pub fn load_candles(path: &Path) -> Result<CandleSeries, IngestError> {
    let file = open(path)?;
    read_candles(file)
}

/// Read trade PnLs in file order.
pub fn read_trade_pnls<R: Read>(reader: R) -> Result<Vec<f64>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let pnls = rdr
        .deserialize::<TradeRecord>()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(|r| r.pnl)
                .map_err(|source| IngestError::Record { row: i + 1, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(trades = pnls.len(), "read trade records");
    Ok(pnls)
}

pub fn load_trade_pnls(path: &Path) -> Result<Vec<f64>, IngestError> {
    let file = open(path)?;
    read_trade_pnls(file)
}

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Open {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })
}
