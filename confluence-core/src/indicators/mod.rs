//! Indicator engine.
//!
//! Every indicator is a pure function from a candle history to an output
//! column of the same length. Values at candle `t` depend only on candles
//! `0..=t`. [`IndicatorFrame`] bundles all columns the confluence engine
//! reads.
//!
//! Exponential smoothing is seeded with the first observation (no warmup
//! gap), so every column is defined from candle 0 except the rolling
//! Fibonacci envelope.

pub mod ema;
pub mod fibonacci;
pub mod frame;
pub mod macd;
pub mod patterns;
pub mod rsi;

pub use ema::{ema_of_series, Ema};
pub use fibonacci::{FibBand, FibLevels};
pub use frame::{FrameRow, IndicatorFrame, EMA_PERIODS};
pub use macd::{Macd, MacdColumns};
pub use patterns::{bearish_engulfing, bullish_engulfing};
pub use rsi::Rsi;

use crate::domain::Candle;

/// Single-column indicator over a candle history.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "rsi_14").
    fn name(&self) -> &str;

    /// Compute the indicator for the entire history.
    ///
    /// Returns a `Vec<f64>` of the same length as `candles`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create daily candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
