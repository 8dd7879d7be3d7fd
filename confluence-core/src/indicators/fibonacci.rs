//! Rolling swing envelope and Fibonacci retracement levels.
//!
//! Envelope: swing_high = max(high[t-window+1..=t]), swing_low = min(low[..]).
//! Levels are measured down from the swing high:
//! - fib_50  = swing_high - 0.5   * range
//! - fib_618 = swing_high - 0.618 * range
//!
//! Undefined (None) until the window fills, and wherever range == 0.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SWING_LOOKBACK: usize = 20;

/// Envelope and retracement levels for one candle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FibLevels {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
    pub fib_50: Option<f64>,
    pub fib_618: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibBand {
    window: usize,
}

impl Default for FibBand {
    fn default() -> Self {
        Self::new(DEFAULT_SWING_LOOKBACK)
    }
}

impl FibBand {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "Fibonacci window must be >= 1");
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn compute(&self, candles: &[Candle]) -> Vec<FibLevels> {
        let n = candles.len();
        let mut result = vec![FibLevels::default(); n];
        if n < self.window {
            return result;
        }

        for i in (self.window - 1)..n {
            let window = &candles[i + 1 - self.window..=i];
            let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let range = high - low;

            let levels = &mut result[i];
            levels.swing_high = Some(high);
            levels.swing_low = Some(low);
            if range != 0.0 {
                levels.fib_50 = Some(high - range * 0.5);
                levels.fib_618 = Some(high - range * 0.618);
            }
        }

        result
    }
}
