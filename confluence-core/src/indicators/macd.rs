//! Moving Average Convergence/Divergence (MACD).
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal_period) of line,
//! histogram = line - signal. Standard parameters: 12 / 26 / 9.

use super::ema::ema_of_series;
use crate::domain::Candle;

/// The three MACD output columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdColumns {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        Self { fast, slow, signal }
    }

    pub fn compute(&self, candles: &[Candle]) -> MacdColumns {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&line, self.signal);
        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        MacdColumns {
            line,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn flat_series_is_all_zero() {
        let cols = Macd::default().compute(&make_candles(&[100.0; 60]));
        assert!(cols.line.iter().all(|&v| v == 0.0));
        assert!(cols.signal.iter().all(|&v| v == 0.0));
        assert!(cols.histogram.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let cols = Macd::default().compute(&make_candles(&closes));
        for i in 0..closes.len() {
            assert_approx(cols.histogram[i], cols.line[i] - cols.signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_series_has_positive_line() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let cols = Macd::default().compute(&make_candles(&closes));
        assert!(cols.line[59] > 0.0);
        assert!(cols.line[59] > cols.signal[59]);
    }

    #[test]
    fn columns_match_input_length() {
        let cols = Macd::new(3, 6, 2).compute(&make_candles(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(cols.line.len(), 4);
        assert_eq!(cols.signal.len(), 4);
        assert_eq!(cols.histogram.len(), 4);
    }
}
