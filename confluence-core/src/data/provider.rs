//! Source traits and structured error types.
//!
//! Every remote endpoint sits behind one of three traits so the fallback
//! chain can be driven by mocks in tests. Sources never return `Err`: they
//! report a tagged [`SourceOutcome`] and the chain advances on anything but
//! `Success`.

use super::resolve::ResolvedAsset;
use crate::domain::{Candle, SeriesError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// Every history and quote source was exhausted.
    #[error("no market data available for '{symbol}'")]
    DataUnavailable { symbol: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DataError::Decode(e.to_string())
        } else {
            DataError::Http(e.to_string())
        }
    }
}

/// Result of asking one source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Success(T),
    /// The source answered, but with too little or unusable data.
    Insufficient(String),
    /// The source failed, or does not apply to this asset.
    Unavailable(String),
}

impl<T> SourceOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T> From<Result<T, DataError>> for SourceOutcome<T> {
    fn from(result: Result<T, DataError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }
}

/// Current price snapshot from a quote endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    /// 24h traded volume in USD, 0 when unknown.
    pub volume_24h: f64,
    /// Market capitalization in USD, 0 when unknown.
    pub market_cap: f64,
}

impl Quote {
    /// Only a finite, strictly positive price can seed a synthetic series.
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// A directory hit.
///
/// `id` is a CoinGecko id, valid for the OHLC and simple-price endpoints.
/// Directories with their own id scheme leave it unset and fill only
/// their own field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMatch {
    pub id: Option<String>,
    pub paprika_id: Option<String>,
}

/// Historical OHLC endpoint.
pub trait HistorySource: Send + Sync {
    fn name(&self) -> &str;

    /// Daily candles covering the last `days` days, sorted by timestamp.
    fn fetch_history(&self, asset: &ResolvedAsset, days: u32) -> SourceOutcome<Vec<Candle>>;
}

/// Current-price endpoint.
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_quote(&self, asset: &ResolvedAsset) -> SourceOutcome<Quote>;
}

/// Coin search used to resolve unknown symbols.
pub trait CoinDirectory: Send + Sync {
    fn name(&self) -> &str;

    fn search(&self, query: &str) -> SourceOutcome<DirectoryMatch>;
}
