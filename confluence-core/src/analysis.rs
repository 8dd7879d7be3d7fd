//! The one-shot analysis entry point.
//!
//! `analyze` never fails: data and computation errors are folded into an
//! [`AnalysisResult`] with `success == false` and an `ERROR` signal.

use crate::config::AnalyzerConfig;
use crate::data::{DataError, MarketDataFetcher};
use crate::domain::{Candle, DataSource, Series};
use crate::indicators::IndicatorFrame;
use crate::signal::{self, Confluence, ScoreError, Signal, SignalType};
use crate::structure::{self, Structure, StructureEvent, StructureTrend, SwingPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("computation failed: {0}")]
    Computation(String),
}

impl From<ScoreError> for AnalysisError {
    fn from(e: ScoreError) -> Self {
        AnalysisError::Computation(e.to_string())
    }
}

/// Every intermediate product of one pipeline run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub frame: IndicatorFrame,
    pub structure: Structure,
    pub confluence: Confluence,
    pub signal: Signal,
}

/// Indicators, structure and scoring over an already fetched series.
pub fn run_pipeline(series: &Series, config: &AnalyzerConfig) -> Result<Analysis, AnalysisError> {
    let frame = IndicatorFrame::compute_with(series, config.swing_lookback);
    let structure = structure::detect_with(&frame, &config.structure_params());
    let params = config.confluence_params();
    let confluence = Confluence::evaluate(&frame, &structure, &params)?;
    let signal = signal::build_signal(&confluence, &structure, params.min_confluence);

    tracing::debug!(
        asset = series.asset_id(),
        long = confluence.long.score,
        short = confluence.short.score,
        signal = ?signal.kind,
        "pipeline complete"
    );

    Ok(Analysis {
        frame,
        structure,
        confluence,
        signal,
    })
}

pub struct Analyzer {
    config: AnalyzerConfig,
    fetcher: MarketDataFetcher,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    /// Analyzer backed by the live data sources.
    pub fn new(config: AnalyzerConfig) -> Self {
        let fetcher = MarketDataFetcher::live(&config.data);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: AnalyzerConfig, fetcher: MarketDataFetcher) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, symbol: &str, lookback_days: u32) -> AnalysisResult {
        self.analyze_at(symbol, lookback_days, Utc::now())
    }

    /// As [`analyze`](Self::analyze) with an explicit clock.
    pub fn analyze_at(&self, symbol: &str, lookback_days: u32, now: DateTime<Utc>) -> AnalysisResult {
        let outcome = self
            .fetcher
            .fetch_series_at(symbol, lookback_days, now)
            .map_err(AnalysisError::from)
            .and_then(|series| {
                let analysis = run_pipeline(&series, &self.config)?;
                Ok((series, analysis))
            });

        match outcome {
            Ok((series, analysis)) => {
                tracing::info!(
                    symbol,
                    signal = ?analysis.signal.kind,
                    confidence = analysis.signal.confidence,
                    synthetic = series.source().is_synthetic(),
                    "analysis complete"
                );
                AnalysisResult::from_analysis(symbol, &series, &analysis, lookback_days, now)
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "analysis failed");
                AnalysisResult::failure(symbol, &e, lookback_days, now)
            }
        }
    }

    /// Analyze caller-supplied candles, bypassing the data sources.
    pub fn analyze_candles(
        &self,
        symbol: &str,
        candles: Vec<Candle>,
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        let days = candles.len() as u32;
        let outcome = Series::new(symbol, candles, DataSource::Supplied)
            .map_err(|e| AnalysisError::Data(e.into()))
            .and_then(|series| {
                let analysis = run_pipeline(&series, &self.config)?;
                Ok((series, analysis))
            });
        match outcome {
            Ok((series, analysis)) => {
                AnalysisResult::from_analysis(symbol, &series, &analysis, days, now)
            }
            Err(e) => AnalysisResult::failure(symbol, &e, days, now),
        }
    }
}

/// Analyze `symbol` with the default configuration and live data sources.
pub fn analyze(symbol: &str, lookback_days: u32) -> AnalysisResult {
    Analyzer::default().analyze(symbol, lookback_days)
}

/// Signal as exposed to callers, with the `stopLoss` and `rr` aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub confidence: u32,
    pub entry: f64,
    pub stop_loss: f64,
    #[serde(rename = "stopLoss")]
    pub stop_loss_camel: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub risk_reward: f64,
    pub rr: f64,
    pub reasons: Vec<String>,
}

impl From<&Signal> for SignalReport {
    fn from(s: &Signal) -> Self {
        Self {
            kind: s.kind,
            confidence: s.confidence,
            entry: s.entry,
            stop_loss: s.stop_loss,
            stop_loss_camel: s.stop_loss,
            tp1: s.tp1,
            tp2: s.tp2,
            risk_reward: s.risk_reward,
            rr: s.risk_reward,
            reasons: s.reasons.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaReport {
    pub ema_20: f64,
    pub ema_50: f64,
    pub ema_81: f64,
    pub ema_100: f64,
    pub ema_200: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceReport {
    pub price: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    /// EMA 20, 50, 81, 100, 200.
    pub ema: [f64; 5],
    pub emas: EmaReport,
    pub fib50: Option<f64>,
    pub fib618: Option<f64>,
    pub long_score: u32,
    pub short_score: u32,
    pub long_reasons: Vec<String>,
    pub short_reasons: Vec<String>,
}

impl From<&Confluence> for ConfluenceReport {
    fn from(c: &Confluence) -> Self {
        let [ema_20, ema_50, ema_81, ema_100, ema_200] = c.ema;
        Self {
            price: c.price,
            rsi: c.rsi,
            macd: c.macd,
            macd_signal: c.macd_signal,
            ema: c.ema,
            emas: EmaReport {
                ema_20,
                ema_50,
                ema_81,
                ema_100,
                ema_200,
            },
            fib50: c.fib50,
            fib618: c.fib618,
            long_score: c.long.score,
            short_score: c.short.score,
            long_reasons: c.long.reasons.clone(),
            short_reasons: c.short.reasons.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub trend: StructureTrend,
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub bos_signals: Vec<StructureEvent>,
    pub choch_signals: Vec<StructureEvent>,
}

impl From<&Structure> for StructureReport {
    fn from(s: &Structure) -> Self {
        Self {
            trend: s.trend,
            swing_highs: s.swing_highs.clone(),
            swing_lows: s.swing_lows.clone(),
            bos_signals: s.bos.clone(),
            choch_signals: s.choch.clone(),
        }
    }
}

/// Structured answer of one `analyze` call. Well-formed on failure too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub signal: SignalReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confluence: Option<ConfluenceReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<Candle>,
    #[serde(default)]
    pub ohlc_data: Vec<Candle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub synthetic: bool,
    pub timestamp: DateTime<Utc>,
    pub timeframe: String,
    pub lookback_days: u32,
}

impl AnalysisResult {
    pub fn from_analysis(
        symbol: &str,
        series: &Series,
        analysis: &Analysis,
        lookback_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            symbol: symbol.to_string(),
            error: None,
            signal: SignalReport::from(&analysis.signal),
            confluence: Some(ConfluenceReport::from(&analysis.confluence)),
            structure: Some(StructureReport::from(&analysis.structure)),
            latest: Some(*series.last()),
            ohlc_data: series.candles().to_vec(),
            asset_id: Some(series.asset_id().to_string()),
            data_source: Some(series.source().clone()),
            synthetic: series.source().is_synthetic(),
            timestamp: now,
            timeframe: format!("{lookback_days}d"),
            lookback_days,
        }
    }

    pub fn failure(
        symbol: &str,
        error: &AnalysisError,
        lookback_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let message = error.to_string();
        Self {
            success: false,
            symbol: symbol.to_string(),
            signal: SignalReport::from(&Signal::error(&message)),
            error: Some(message),
            confluence: None,
            structure: None,
            latest: None,
            ohlc_data: Vec::new(),
            asset_id: None,
            data_source: None,
            synthetic: false,
            timestamp: now,
            timeframe: format!("{lookback_days}d"),
            lookback_days,
        }
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal.kind
    }
}
