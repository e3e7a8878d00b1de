//! Input boundary: CSV ingestion of candles and trade PnLs.
//!
//! Every row is checked here so the detectors never see malformed input.
//! Errors carry the 1-based record number.

pub mod ingest;

pub use ingest::{
    load_candles, load_trade_pnls, parse_timestamp, read_candles, read_trade_pnls, IngestError,
};
