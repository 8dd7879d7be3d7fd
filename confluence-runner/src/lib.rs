//! Confluence Runner — fan-out of independent analyses, reports and exports.
//!
//! This crate builds on `confluence-core` to provide:
//! - A batch runner with a private worker pool and one deadline per batch
//! - `join_two` for running two independent analyses side by side
//! - Batch summaries serialized to JSON
//! - CSV export of candle series

pub mod batch;
pub mod export;
pub mod report;

pub use batch::{join_two, BatchError, BatchRunner, BranchOutcome};
pub use export::{ohlc_csv, write_json, write_ohlc_csv};
pub use report::{BatchReport, BranchStatus, SignalCounts, SymbolSummary};
