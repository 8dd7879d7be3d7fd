//! Indicator frame: the candle history plus every derived column.

use super::ema::ema_of_series;
use super::fibonacci::{FibBand, FibLevels, DEFAULT_SWING_LOOKBACK};
use super::macd::Macd;
use super::patterns::{bearish_engulfing, bullish_engulfing};
use super::rsi::Rsi;
use super::Indicator;
use crate::domain::{Candle, Series};

/// EMA periods carried by every frame, fastest first.
pub const EMA_PERIODS: [usize; 5] = [20, 50, 81, 100, 200];

pub const RSI_PERIOD: usize = 14;

/// Candle history augmented with indicator columns. All columns have the
/// same length as `candles`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub candles: Vec<Candle>,
    pub ema_20: Vec<f64>,
    pub ema_50: Vec<f64>,
    pub ema_81: Vec<f64>,
    pub ema_100: Vec<f64>,
    pub ema_200: Vec<f64>,
    pub rsi_14: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub bullish_engulfing: Vec<bool>,
    pub bearish_engulfing: Vec<bool>,
    pub fib: Vec<FibLevels>,
}

/// Values of the most recent candle, as read by the confluence engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub close: f64,
    /// EMAs in [`EMA_PERIODS`] order.
    pub ema: [f64; 5],
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
}

impl FrameRow {
    pub fn ema_20(&self) -> f64 {
        self.ema[0]
    }
    pub fn ema_50(&self) -> f64 {
        self.ema[1]
    }
    pub fn ema_81(&self) -> f64 {
        self.ema[2]
    }
    pub fn ema_100(&self) -> f64 {
        self.ema[3]
    }
    pub fn ema_200(&self) -> f64 {
        self.ema[4]
    }

    /// True if any value is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        !self.close.is_finite()
            || self.ema.iter().any(|v| !v.is_finite())
            || !self.rsi.is_finite()
            || !self.macd.is_finite()
            || !self.macd_signal.is_finite()
            || !self.macd_hist.is_finite()
    }
}

impl IndicatorFrame {
    /// Compute the frame with the default 20-candle Fibonacci window.
    pub fn compute(series: &Series) -> Self {
        Self::from_candles(series.candles(), DEFAULT_SWING_LOOKBACK)
    }

    pub fn compute_with(series: &Series, swing_lookback: usize) -> Self {
        Self::from_candles(series.candles(), swing_lookback)
    }

    /// Build from a raw candle slice. Total: never fails, empty input yields
    /// empty columns.
    pub fn from_candles(candles: &[Candle], swing_lookback: usize) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let [ema_20, ema_50, ema_81, ema_100, ema_200] =
            EMA_PERIODS.map(|period| ema_of_series(&closes, period));
        let macd = Macd::default().compute(candles);

        Self {
            candles: candles.to_vec(),
            ema_20,
            ema_50,
            ema_81,
            ema_100,
            ema_200,
            rsi_14: Rsi::new(RSI_PERIOD).compute(candles),
            macd: macd.line,
            macd_signal: macd.signal,
            macd_hist: macd.histogram,
            bullish_engulfing: bullish_engulfing(candles),
            bearish_engulfing: bearish_engulfing(candles),
            fib: FibBand::new(swing_lookback.max(1)).compute(candles),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Snapshot of the most recent candle's values.
    pub fn latest(&self) -> Option<FrameRow> {
        let i = self.len().checked_sub(1)?;
        Some(FrameRow {
            close: self.candles[i].close,
            ema: [
                self.ema_20[i],
                self.ema_50[i],
                self.ema_81[i],
                self.ema_100[i],
                self.ema_200[i],
            ],
            rsi: self.rsi_14[i],
            macd: self.macd[i],
            macd_signal: self.macd_signal[i],
            macd_hist: self.macd_hist[i],
        })
    }

    /// Most recent defined (fib_50, fib_618) among the last `recent` candles.
    /// Each level is searched independently; absent if none is defined.
    pub fn latest_fib(&self, recent: usize) -> (Option<f64>, Option<f64>) {
        let start = self.len().saturating_sub(recent);
        let tail = &self.fib[start..];
        let fib_50 = tail.iter().rev().find_map(|l| l.fib_50);
        let fib_618 = tail.iter().rev().find_map(|l| l.fib_618);
        (fib_50, fib_618)
    }
}
