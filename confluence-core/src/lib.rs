//! Confluence Core — market data, indicators, structure and signal scoring.
//!
//! This crate holds the whole one-shot analysis pipeline:
//! - Data acquisition with a multi-source fallback chain and synthetic series
//! - Indicator engine (EMA, RSI, MACD, engulfing patterns, Fibonacci bands)
//! - Market structure (swing points, BOS, CHoCH)
//! - Confluence scoring and trade-level construction
//! - The `analyze` entry point and its serializable result

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod rng;
pub mod signal;
pub mod structure;

pub use analysis::{analyze, AnalysisError, AnalysisResult, Analyzer, DEFAULT_LOOKBACK_DAYS};
pub use config::{AnalyzerConfig, ConfigError, DataConfig};
pub use domain::{Candle, DataSource, Series};
pub use signal::{Signal, SignalType};
