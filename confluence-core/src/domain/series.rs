//! Series — an ordered, validated run of candles for one asset.

use super::candle::Candle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// Real historical candles from a history endpoint.
    History { provider: String },
    /// Synthesized around a single real quote.
    Synthetic { quote_provider: String },
    /// Candles handed in directly by the caller.
    Supplied,
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series has no candles")]
    Empty,

    #[error("timestamps not strictly increasing at candle {index}")]
    NonMonotonic { index: usize },

    #[error("candle {index} violates OHLC sanity")]
    InsaneCandle { index: usize },
}

/// Immutable OHLCV series.
///
/// Invariants (checked by [`Series::new`]): at least one candle, strictly
/// increasing timestamps, every candle passes [`Candle::is_sane`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    asset_id: String,
    candles: Vec<Candle>,
    source: DataSource,
}

impl Series {
    pub fn new(
        asset_id: impl Into<String>,
        candles: Vec<Candle>,
        source: DataSource,
    ) -> Result<Self, SeriesError> {
        if candles.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, candle) in candles.iter().enumerate() {
            if !candle.is_sane() {
                return Err(SeriesError::InsaneCandle { index });
            }
            if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
                return Err(SeriesError::NonMonotonic { index });
            }
        }
        Ok(Self {
            asset_id: asset_id.into(),
            candles,
            source,
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false for a constructed series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Most recent candle.
    pub fn last(&self) -> &Candle {
        // Non-empty by construction.
        &self.candles[self.candles.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}
