//! Synthetic daily series anchored on a single real quote.
//!
//! A seeded random walk (2% daily step volatility, damped by half) around
//! the quoted price, with ~1% high/low jitter and ~0.5% open jitter. The last
//! close is the quoted price exactly.

use super::provider::Quote;
use crate::domain::Candle;
use crate::rng::{normal, rng_for};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const STEP_VOLATILITY: f64 = 0.02;
const WALK_DAMPING: f64 = 0.5;
const RANGE_JITTER: f64 = 0.01;
const OPEN_JITTER: f64 = 0.005;
/// Floor on the walked price, as a fraction of the quote.
const MIN_PRICE_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticGenerator {
    max_days: u32,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SyntheticGenerator {
    pub fn new(max_days: u32) -> Self {
        Self {
            max_days: max_days.max(1),
        }
    }

    /// Number of candles for a request of `days`: `min(days, max_days)`, at
    /// least one.
    pub fn length_for(&self, days: u32) -> usize {
        days.clamp(1, self.max_days) as usize
    }

    /// Generate daily candles ending at `now`. Deterministic in
    /// `(asset_id, quote, days, now)`.
    pub fn generate(
        &self,
        asset_id: &str,
        quote: &Quote,
        days: u32,
        now: DateTime<Utc>,
    ) -> Vec<Candle> {
        let n = self.length_for(days);
        let price = quote.price;
        let mut rng = rng_for(asset_id);

        let steps: Vec<f64> = (0..n).map(|_| normal(&mut rng, 0.0, STEP_VOLATILITY)).collect();
        let mut walked = 0.0;
        let mut candles: Vec<Candle> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                walked += step;
                let base = (price * (1.0 + walked * WALK_DAMPING)).max(price * MIN_PRICE_FRACTION);
                let high = base * (1.0 + normal(&mut rng, 0.0, RANGE_JITTER).abs());
                let low = base * (1.0 - normal(&mut rng, 0.0, RANGE_JITTER).abs());
                let open = base * (1.0 + normal(&mut rng, 0.0, OPEN_JITTER));
                let volume = quote.volume_24h.max(0.0) * rng.gen_range(0.5..1.5);
                Candle {
                    timestamp: now - Duration::days((n - 1 - i) as i64),
                    open,
                    high: high.max(base).max(open),
                    low: low.min(base).min(open),
                    close: base,
                    volume,
                }
            })
            .collect();

        // The most recent candle is rebuilt around the real price.
        if let Some(last) = candles.last_mut() {
            let open = price * (1.0 + normal(&mut rng, 0.0, OPEN_JITTER));
            last.close = price;
            last.open = open;
            last.high = price.max(open) * (1.0 + normal(&mut rng, 0.0, RANGE_JITTER).abs());
            last.low = price.min(open) * (1.0 - normal(&mut rng, 0.0, RANGE_JITTER).abs());
        }

        candles
    }
}
