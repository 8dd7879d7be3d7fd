//! Property tests for indicator and structure invariants.
//!
//! Uses proptest to verify:
//! 1. RSI stays within [0, 100]
//! 2. MACD histogram equals line minus signal
//! 3. EMA columns match the input length and are seeded with the first close
//! 4. Swing detection is mirror-symmetric under price negation
//! 5. Bullish BOS fires exactly when the close clears the recent swing highs
//! 6. The signal decision follows the score table

use chrono::{Duration, TimeZone, Utc};
use confluence_core::indicators::{Indicator, IndicatorFrame, Macd, Rsi, EMA_PERIODS};
use confluence_core::signal::{build_signal, Confluence, ConfluenceParams, SideScore};
use confluence_core::structure::{self, find_swings, StructureKind};
use confluence_core::{Candle, SignalType};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of closes starting at 100, each step in [-3%, +3%].
fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.03..0.03_f64, 1..max_len).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|step| {
                price *= 1.0 + step;
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

/// Closes plus independent wick lengths per candle.
fn arb_candles(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    arb_closes(max_len).prop_flat_map(|closes| {
        let n = closes.len();
        (
            Just(closes),
            prop::collection::vec((0.0..2.0_f64, 0.0..2.0_f64), n),
        )
            .prop_map(|(closes, wicks)| candles_from(&closes, &wicks))
    })
}

fn candles_from(closes: &[f64], wicks: &[(f64, f64)]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .zip(wicks)
        .enumerate()
        .map(|(i, (&close, &(up, down)))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + up,
                low: open.min(close) - down,
                close,
                volume: 1_000.0,
            }
        })
        .collect()
}

fn mirrored(candles: &[Candle]) -> Vec<Candle> {
    candles
        .iter()
        .map(|c| Candle {
            open: -c.open,
            high: -c.low,
            low: -c.high,
            close: -c.close,
            ..*c
        })
        .collect()
}

// ── 1-3. Indicators ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(candles in arb_candles(300)) {
        for v in Rsi::new(14).compute(&candles) {
            prop_assert!((0.0..=100.0).contains(&v), "rsi {v}");
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal(candles in arb_candles(300)) {
        let macd = Macd::default().compute(&candles);
        prop_assert_eq!(macd.line.len(), candles.len());
        for i in 0..candles.len() {
            let expected = macd.line[i] - macd.signal[i];
            prop_assert!((macd.histogram[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_columns_cover_history(candles in arb_candles(300)) {
        let frame = IndicatorFrame::from_candles(&candles, 20);
        let first = candles[0].close;
        for (period, column) in EMA_PERIODS.iter().zip([
            &frame.ema_20,
            &frame.ema_50,
            &frame.ema_81,
            &frame.ema_100,
            &frame.ema_200,
        ]) {
            prop_assert_eq!(column.len(), candles.len(), "ema_{}", period);
            prop_assert_eq!(column[0], first);
        }
    }
}

// ── 4-5. Structure ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn swings_mirror_under_negation(candles in arb_candles(200)) {
        let (highs, lows) = find_swings(&candles, 2, 2);
        let (m_highs, m_lows) = find_swings(&mirrored(&candles), 2, 2);

        prop_assert_eq!(highs.len(), m_lows.len());
        prop_assert_eq!(lows.len(), m_highs.len());
        for (h, m) in highs.iter().zip(&m_lows) {
            prop_assert_eq!(h.position, m.position);
            prop_assert_eq!(h.price, -m.price);
        }
        for (l, m) in lows.iter().zip(&m_highs) {
            prop_assert_eq!(l.position, m.position);
            prop_assert_eq!(l.price, -m.price);
        }
    }

    #[test]
    fn bullish_bos_iff_close_clears_recent_highs(candles in arb_candles(200)) {
        let frame = IndicatorFrame::from_candles(&candles, 20);
        let detected = structure::detect(&frame, 2, 2);
        let close = candles[candles.len() - 1].close;

        let highs = &detected.swing_highs;
        let recent_max = highs[highs.len().saturating_sub(3)..]
            .iter()
            .map(|p| p.price)
            .reduce(f64::max);
        let expected = recent_max.is_some_and(|level| close > level * 1.001);

        prop_assert_eq!(detected.has(StructureKind::BullishBos), expected);
    }
}

// ── 6. Decision ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn decision_follows_scores(long in 0u32..10, short in 0u32..10) {
        let candles = candles_from(&[100.0; 5], &[(0.0, 0.0); 5]);
        let frame = IndicatorFrame::from_candles(&candles, 20);
        let detected = structure::detect(&frame, 2, 2);
        let mut confluence =
            Confluence::evaluate(&frame, &detected, &ConfluenceParams::default()).unwrap();
        confluence.long = SideScore { score: long, reasons: vec!["l".into()] };
        confluence.short = SideScore { score: short, reasons: vec!["s".into()] };

        let signal = build_signal(&confluence, &detected, 4);
        let expected = if long >= 4 && long >= short {
            SignalType::Long
        } else if short >= 4 && short > long {
            SignalType::Short
        } else {
            SignalType::Wait
        };
        prop_assert_eq!(signal.kind, expected);
        match expected {
            SignalType::Long => prop_assert_eq!(signal.confidence, long),
            SignalType::Short => prop_assert_eq!(signal.confidence, short),
            _ => {
                prop_assert_eq!(signal.confidence, long.max(short));
                prop_assert_eq!(signal.reasons.clone(), vec!["Insufficient confluence".to_string()]);
            }
        }
    }
}
