//! Relative Strength Index (RSI).
//!
//! Gains and losses are smoothed with an exponential average, alpha = 1 / period,
//! seeded at candle 0 with a zero change.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge case: avg_loss == 0 → RSI = 50. A flat or synthetic history must not
//! read as overbought.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = Vec::with_capacity(n);
        if n == 0 {
            return result;
        }

        let alpha = 1.0 / self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        result.push(compute_rsi(avg_gain, avg_loss));

        for i in 1..n {
            let change = candles[i].close - candles[i - 1].close;
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { -change } else { 0.0 };

            avg_gain += alpha * (gain - avg_gain);
            avg_loss += alpha * (loss - avg_loss);

            result.push(compute_rsi(avg_gain, avg_loss));
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        50.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn rsi_flat_is_neutral() {
        let candles = make_candles(&[100.0; 30]);
        let result = Rsi::new(14).compute(&candles);
        assert!(result.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rsi_all_gains_is_neutral() {
        // No losses at all: avg_loss stays zero.
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&candles);
        assert_eq!(result[0], 50.0);
        assert_approx(result[5], 0.0, 1e-9);
    }

    #[test]
    fn rsi_known_values() {
        // period 2, alpha 0.5. closes: 10, 12, 11
        // t1: gain 2, loss 0 → avg_gain 1.0, avg_loss 0 → 50
        // t2: gain 0, loss 1 → avg_gain 0.5, avg_loss 0.5 → 50
        // t3 (close 14): gain 3 → avg_gain 1.75, avg_loss 0.25 → rs 7 → 87.5
        let candles = make_candles(&[10.0, 12.0, 11.0, 14.0]);
        let result = Rsi::new(2).compute(&candles);
        assert_eq!(result[1], 50.0);
        assert_approx(result[2], 50.0, 1e-12);
        assert_approx(result[3], 87.5, 1e-12);
    }

    #[test]
    fn rsi_bounds() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&candles);
        for (i, &v) in result.iter().enumerate() {
            assert!(
                (0.0..=100.0).contains(&v),
                "RSI out of bounds at candle {i}: {v}"
            );
        }
    }

    #[test]
    fn rsi_length_matches_input() {
        let candles = make_candles(&[1.0, 2.0, 3.0]);
        assert_eq!(Rsi::new(14).compute(&candles).len(), 3);
        assert!(Rsi::new(14).compute(&[]).is_empty());
    }
}
