//! Long/short confluence tally for the most recent candle.
//!
//! | long                        | pts | short                       |
//! |-----------------------------|-----|-----------------------------|
//! | close > EMA200              | 2   | close < EMA200              |
//! | EMA 20>50>81>100>200        | 2   | EMA 200>100>81>50>20        |
//! | bullish CHoCH               | 1   | bearish CHoCH               |
//! | bullish BOS                 | 1   | bearish BOS                 |
//! | near Fib AND near EMA81/100 | 2   | same                        |
//! | 50 < RSI < 70               | 1   | 30 < RSI < 50               |
//! | MACD > signal, MACD > 0     | 1   | MACD < signal, MACD < 0     |
//! | structure trend bullish     | 1   | structure trend bearish     |
//!
//! Reasons are appended in table order.

use super::ScoreError;
use crate::indicators::IndicatorFrame;
use crate::structure::{Structure, StructureKind, StructureTrend};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceParams {
    /// Max relative distance from a Fibonacci level.
    pub near_pct_fib: f64,
    /// Max relative distance from EMA81 or EMA100.
    pub near_pct_ema: f64,
    /// Minimum winning score for a LONG or SHORT.
    pub min_confluence: u32,
    /// Candles scanned backward for the latest defined Fibonacci level.
    pub fib_recent_window: usize,
}

impl Default for ConfluenceParams {
    fn default() -> Self {
        Self {
            near_pct_fib: 0.02,
            near_pct_ema: 0.015,
            min_confluence: 4,
            fib_recent_window: 10,
        }
    }
}

/// One side's tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideScore {
    pub score: u32,
    pub reasons: Vec<String>,
}

impl SideScore {
    fn add_if(&mut self, condition: bool, points: u32, reason: impl Into<String>) {
        if condition {
            self.score += points;
            self.reasons.push(reason.into());
        }
    }
}

/// Indicator snapshot and both tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confluence {
    pub price: f64,
    /// EMA 20, 50, 81, 100, 200.
    pub ema: [f64; 5],
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub fib50: Option<f64>,
    pub fib618: Option<f64>,
    pub long: SideScore,
    pub short: SideScore,
}

impl Confluence {
    pub fn evaluate(
        frame: &IndicatorFrame,
        structure: &Structure,
        params: &ConfluenceParams,
    ) -> Result<Self, ScoreError> {
        let row = frame.latest().ok_or(ScoreError::EmptyFrame)?;
        if row.has_non_finite() {
            return Err(ScoreError::NonFinite);
        }

        let price = row.close;
        let [ema20, ema50, ema81, ema100, ema200] = row.ema;
        let (fib50, fib618) = frame.latest_fib(params.fib_recent_window);

        let near = |level: f64, pct: f64| (price - level).abs() / price < pct;
        let near_fib = match (fib50, fib618) {
            (Some(f50), Some(f618)) => {
                near(f50, params.near_pct_fib) || near(f618, params.near_pct_fib)
            }
            _ => false,
        };
        let near_ema = near(ema81, params.near_pct_ema) || near(ema100, params.near_pct_ema);
        let fib_ema = near_fib && near_ema;

        let rsi = row.rsi;
        let (macd, macd_signal) = (row.macd, row.macd_signal);

        let mut long = SideScore::default();
        long.add_if(price > ema200, 2, "Price > EMA200");
        long.add_if(
            ema20 > ema50 && ema50 > ema81 && ema81 > ema100 && ema100 > ema200,
            2,
            "EMA 20>50>81>100>200",
        );
        long.add_if(structure.has(StructureKind::BullishChoch), 1, "Bullish CHoCH");
        long.add_if(structure.has(StructureKind::BullishBos), 1, "Bullish BOS");
        long.add_if(fib_ema, 2, "Fib(50/61.8) + EMA(81/100) confluence");
        long.add_if(50.0 < rsi && rsi < 70.0, 1, format!("RSI {rsi:.1} (bull zone)"));
        long.add_if(macd > macd_signal && macd > 0.0, 1, "MACD bullish crossover");
        long.add_if(
            structure.trend == StructureTrend::Bullish,
            1,
            "Clean bullish structure",
        );

        let mut short = SideScore::default();
        short.add_if(price < ema200, 2, "Price < EMA200");
        short.add_if(
            ema200 > ema100 && ema100 > ema81 && ema81 > ema50 && ema50 > ema20,
            2,
            "EMA 200>100>81>50>20",
        );
        short.add_if(structure.has(StructureKind::BearishChoch), 1, "Bearish CHoCH");
        short.add_if(structure.has(StructureKind::BearishBos), 1, "Bearish BOS");
        short.add_if(fib_ema, 2, "Fib(50/61.8) + EMA(81/100) confluence");
        short.add_if(30.0 < rsi && rsi < 50.0, 1, format!("RSI {rsi:.1} (bear zone)"));
        short.add_if(macd < macd_signal && macd < 0.0, 1, "MACD bearish crossover");
        short.add_if(
            structure.trend == StructureTrend::Bearish,
            1,
            "Clean bearish structure",
        );

        Ok(Self {
            price,
            ema: row.ema,
            rsi,
            macd,
            macd_signal,
            fib50,
            fib618,
            long,
            short,
        })
    }

    pub fn ema81(&self) -> f64 {
        self.ema[2]
    }

    pub fn ema100(&self) -> f64 {
        self.ema[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::structure::{detect, StructureEvent};

    /// Candles with open == high == low == close, so the Fib range is zero.
    fn flat_frame() -> IndicatorFrame {
        let mut candles = make_candles(&[100.0; 250]);
        for c in &mut candles {
            c.high = c.close;
            c.low = c.close;
        }
        IndicatorFrame::from_candles(&candles, 20)
    }

    fn neutral_structure() -> Structure {
        Structure {
            swing_highs: vec![],
            swing_lows: vec![],
            bos: vec![],
            choch: vec![],
            trend: StructureTrend::Neutral,
        }
    }

    /// Frame whose last row is overridden with the given values.
    fn frame_with_last(ema: [f64; 5], rsi: f64, macd: f64, macd_signal: f64) -> IndicatorFrame {
        let mut frame = flat_frame();
        let i = frame.len() - 1;
        frame.ema_20[i] = ema[0];
        frame.ema_50[i] = ema[1];
        frame.ema_81[i] = ema[2];
        frame.ema_100[i] = ema[3];
        frame.ema_200[i] = ema[4];
        frame.rsi_14[i] = rsi;
        frame.macd[i] = macd;
        frame.macd_signal[i] = macd_signal;
        frame.macd_hist[i] = macd - macd_signal;
        frame
    }

    #[test]
    fn flat_series_scores_zero() {
        let frame = flat_frame();
        let structure = detect(&frame, 2, 2);
        let c = Confluence::evaluate(&frame, &structure, &ConfluenceParams::default()).unwrap();
        assert_eq!(c.long.score, 0);
        assert_eq!(c.short.score, 0);
        assert!(c.long.reasons.is_empty());
        assert_eq!(c.fib50, None);
        assert_eq!(c.fib618, None);
    }

    #[test]
    fn bullish_alignment_scores_in_table_order() {
        let frame = frame_with_last([99.0, 98.0, 97.0, 96.0, 95.0], 60.0, 1.0, 0.5);
        let mut structure = neutral_structure();
        structure.bos.push(StructureEvent {
            kind: StructureKind::BullishBos,
            level: 99.5,
            confidence: 80,
        });
        structure.trend = StructureTrend::Bullish;

        let c = Confluence::evaluate(&frame, &structure, &ConfluenceParams::default()).unwrap();
        assert_eq!(c.long.score, 2 + 2 + 1 + 1 + 1 + 1);
        assert_eq!(
            c.long.reasons,
            vec![
                "Price > EMA200",
                "EMA 20>50>81>100>200",
                "Bullish BOS",
                "RSI 60.0 (bull zone)",
                "MACD bullish crossover",
                "Clean bullish structure",
            ]
        );
        assert_eq!(c.short.score, 0);
    }

    #[test]
    fn bearish_alignment_scores_short() {
        let frame = frame_with_last([101.0, 102.0, 103.0, 104.0, 105.0], 40.0, -1.0, -0.5);
        let c = Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default())
            .unwrap();
        assert_eq!(c.short.score, 2 + 2 + 1 + 1);
        assert_eq!(c.short.reasons[3], "MACD bearish crossover");
        assert_eq!(c.short.reasons[2], "RSI 40.0 (bear zone)");
        assert_eq!(c.long.score, 0);
    }

    #[test]
    fn rsi_zone_bounds_are_exclusive() {
        for rsi in [30.0, 50.0, 70.0] {
            let frame = frame_with_last([100.0; 5], rsi, 0.0, 0.0);
            let c = Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default())
                .unwrap();
            assert_eq!(c.long.score + c.short.score, 0, "rsi {rsi}");
        }
    }

    #[test]
    fn fib_and_ema_proximity_scores_both_sides() {
        // Highs/lows spread so the rolling range is non-degenerate and fib50 sits at 100.
        let closes: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 95.0 } else { 105.0 }).collect();
        let mut candles = make_candles(&closes);
        candles.last_mut().unwrap().close = 100.0;
        let mut frame = IndicatorFrame::from_candles(&candles, 20);
        let i = frame.len() - 1;
        frame.ema_81[i] = 100.5;
        frame.ema_100[i] = 110.0;

        let c = Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default())
            .unwrap();
        let reason = "Fib(50/61.8) + EMA(81/100) confluence".to_string();
        assert!(c.long.reasons.contains(&reason));
        assert!(c.short.reasons.contains(&reason));
    }

    #[test]
    fn missing_fib_never_scores_proximity() {
        let frame = frame_with_last([100.0; 5], 50.0, 0.0, 0.0);
        let c = Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default())
            .unwrap();
        assert!(c.fib50.is_none());
        assert_eq!(c.long.score, 0);
    }

    #[test]
    fn empty_frame_is_an_error() {
        let frame = IndicatorFrame::from_candles(&[], 20);
        assert_eq!(
            Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default()),
            Err(ScoreError::EmptyFrame)
        );
    }

    #[test]
    fn non_finite_latest_value_is_an_error() {
        let frame = frame_with_last([100.0; 5], f64::NAN, 0.0, 0.0);
        assert_eq!(
            Confluence::evaluate(&frame, &neutral_structure(), &ConfluenceParams::default()),
            Err(ScoreError::NonFinite)
        );
    }
}
