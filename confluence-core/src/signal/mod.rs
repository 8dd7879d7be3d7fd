//! Confluence scoring and trade signal construction.
//!
//! Scores are additive tallies of independent bullish and bearish conditions
//! on the most recent candle. The decision gate, tie-break and trade levels
//! live in [`decision`].

pub mod confluence;
pub mod decision;

pub use confluence::{Confluence, ConfluenceParams, SideScore};
pub use decision::{build_signal, RISK_FLOOR};

use crate::indicators::IndicatorFrame;
use crate::structure::Structure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Long,
    Short,
    Wait,
    /// Analysis failed; the signal body is zeroed.
    Error,
}

/// Final recommendation of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub confidence: u32,
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub risk_reward: f64,
    pub reasons: Vec<String>,
}

impl Signal {
    /// Zeroed signal carrying a failure reason.
    pub fn error(message: &str) -> Self {
        Self {
            kind: SignalType::Error,
            confidence: 0,
            entry: 0.0,
            stop_loss: 0.0,
            tp1: 0.0,
            tp2: 0.0,
            risk_reward: 0.0,
            reasons: vec![format!("Analysis failed: {message}")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("indicator frame is empty")]
    EmptyFrame,

    #[error("non-finite indicator value on the latest candle")]
    NonFinite,
}

/// Score the latest candle and build the signal.
///
/// Pure: the same frame and structure always produce the same signal.
pub fn score(
    frame: &IndicatorFrame,
    structure: &Structure,
    params: &ConfluenceParams,
) -> Result<Signal, ScoreError> {
    let confluence = Confluence::evaluate(frame, structure, params)?;
    Ok(build_signal(&confluence, structure, params.min_confluence))
}
