//! Batch summary: one line per symbol plus signal counts.

use chrono::{DateTime, Utc};
use confluence_core::SignalType;
use serde::{Deserialize, Serialize};

use crate::batch::BranchOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStatus {
    Completed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub status: BranchStatus,
    pub success: bool,
    pub signal: Option<SignalType>,
    pub confidence: u32,
    pub entry: f64,
    pub risk_reward: f64,
    pub synthetic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub long: usize,
    pub short: usize,
    pub wait: usize,
    pub error: usize,
    pub timed_out: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub lookback_days: u32,
    pub counts: SignalCounts,
    pub symbols: Vec<SymbolSummary>,
}

impl SymbolSummary {
    fn from_outcome(symbol: &str, outcome: &BranchOutcome) -> Self {
        match outcome {
            BranchOutcome::Completed(r) => Self {
                symbol: symbol.to_string(),
                status: BranchStatus::Completed,
                success: r.success,
                signal: Some(r.signal.kind),
                confidence: r.signal.confidence,
                entry: r.signal.entry,
                risk_reward: r.signal.risk_reward,
                synthetic: r.synthetic,
                error: r.error.clone(),
            },
            BranchOutcome::TimedOut => Self {
                symbol: symbol.to_string(),
                status: BranchStatus::TimedOut,
                success: false,
                signal: None,
                confidence: 0,
                entry: 0.0,
                risk_reward: 0.0,
                synthetic: false,
                error: Some("analysis timed out".to_string()),
            },
        }
    }
}

impl BatchReport {
    /// Pair `symbols` with their outcomes (same order, as returned by
    /// [`BatchRunner::run`](crate::BatchRunner::run)).
    pub fn from_outcomes(
        symbols: &[String],
        outcomes: &[BranchOutcome],
        lookback_days: u32,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let summaries: Vec<SymbolSummary> = symbols
            .iter()
            .zip(outcomes)
            .map(|(symbol, outcome)| SymbolSummary::from_outcome(symbol, outcome))
            .collect();

        let mut counts = SignalCounts::default();
        for s in &summaries {
            match s.signal {
                Some(SignalType::Long) => counts.long += 1,
                Some(SignalType::Short) => counts.short += 1,
                Some(SignalType::Wait) => counts.wait += 1,
                Some(SignalType::Error) => counts.error += 1,
                None => counts.timed_out += 1,
            }
        }

        Self {
            generated_at,
            lookback_days,
            counts,
            symbols: summaries,
        }
    }

    /// Symbols with an actionable LONG or SHORT signal, highest confidence
    /// first.
    pub fn actionable(&self) -> Vec<&SymbolSummary> {
        let mut hits: Vec<&SymbolSummary> = self
            .symbols
            .iter()
            .filter(|s| matches!(s.signal, Some(SignalType::Long | SignalType::Short)))
            .collect();
        hits.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        hits
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use confluence_core::{AnalysisError, AnalysisResult};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn failed(symbol: &str) -> AnalysisResult {
        AnalysisResult::failure(symbol, &AnalysisError::Computation("boom".into()), 30, now())
    }

    #[test]
    fn counts_errors_and_timeouts() {
        let symbols = vec!["btc".to_string(), "eth".to_string()];
        let outcomes = vec![
            BranchOutcome::Completed(failed("btc")),
            BranchOutcome::TimedOut,
        ];
        let report = BatchReport::from_outcomes(&symbols, &outcomes, 30, now());

        assert_eq!(report.counts.error, 1);
        assert_eq!(report.counts.timed_out, 1);
        assert_eq!(report.symbols[0].signal, Some(SignalType::Error));
        assert!(report.symbols[0].error.as_deref().unwrap().contains("boom"));
        assert_eq!(report.symbols[1].status, BranchStatus::TimedOut);
        assert!(report.actionable().is_empty());
    }

    #[test]
    fn json_uses_snake_case_status() {
        let report = BatchReport::from_outcomes(
            &["sol".to_string()],
            &[BranchOutcome::TimedOut],
            7,
            now(),
        );
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"timed_out\""));
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
