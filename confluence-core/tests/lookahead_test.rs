//! Look-ahead contamination tests for the indicator frame.
//!
//! No column value at candle t may depend on candle t+1 or later.
//!
//! Method: compute the frame on a truncated history (candles 0..150) and on
//! the full history (0..300) and require the shared prefix to be identical.

use chrono::{Duration, TimeZone, Utc};
use confluence_core::indicators::IndicatorFrame;
use confluence_core::Candle;

/// Deterministic pseudo-random walk with varied wicks.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut price = 100.0_f64;
    let mut candles = Vec::with_capacity(n);

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0; // -1.0 to +0.99
        let open = price;
        price = (price + change * 2.0).max(10.0);
        let wick = ((seed >> 20) % 100) as f64 / 50.0;

        candles.push(Candle {
            timestamp: base + Duration::days(i as i64),
            open,
            high: open.max(price) + wick,
            low: open.min(price) - wick,
            close: price,
            volume: 1_000.0 + i as f64,
        });
    }

    candles
}

fn assert_prefix_eq<T: PartialEq + std::fmt::Debug>(name: &str, truncated: &[T], full: &[T]) {
    assert_eq!(truncated.len(), 150, "{name}: truncated length");
    for (i, (t, f)) in truncated.iter().zip(full).enumerate() {
        assert_eq!(t, f, "{name}: look-ahead at candle {i}");
    }
}

#[test]
fn frame_columns_have_no_lookahead() {
    let candles = make_test_candles(300);
    let full = IndicatorFrame::from_candles(&candles, 20);
    let truncated = IndicatorFrame::from_candles(&candles[..150], 20);

    assert_prefix_eq("ema_20", &truncated.ema_20, &full.ema_20);
    assert_prefix_eq("ema_50", &truncated.ema_50, &full.ema_50);
    assert_prefix_eq("ema_81", &truncated.ema_81, &full.ema_81);
    assert_prefix_eq("ema_100", &truncated.ema_100, &full.ema_100);
    assert_prefix_eq("ema_200", &truncated.ema_200, &full.ema_200);
    assert_prefix_eq("rsi_14", &truncated.rsi_14, &full.rsi_14);
    assert_prefix_eq("macd", &truncated.macd, &full.macd);
    assert_prefix_eq("macd_signal", &truncated.macd_signal, &full.macd_signal);
    assert_prefix_eq("macd_hist", &truncated.macd_hist, &full.macd_hist);
    assert_prefix_eq(
        "bullish_engulfing",
        &truncated.bullish_engulfing,
        &full.bullish_engulfing,
    );
    assert_prefix_eq(
        "bearish_engulfing",
        &truncated.bearish_engulfing,
        &full.bearish_engulfing,
    );
    assert_prefix_eq("fib", &truncated.fib, &full.fib);
}

#[test]
fn fib_is_undefined_until_window_fills() {
    let candles = make_test_candles(40);
    let frame = IndicatorFrame::from_candles(&candles, 20);
    assert!(frame.fib[..19].iter().all(|f| f.fib_50.is_none()));
    assert!(frame.fib[19..].iter().all(|f| f.fib_50.is_some()));
}
