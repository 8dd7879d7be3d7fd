//! Swing point detection.
//!
//! Candle `i` is a swing high iff `high[i]` strictly exceeds the highs of the
//! `left` candles before it and the `right` candles after it. Swing lows use
//! strict less-than on lows. Candles closer than `left`/`right` to either end
//! of the history are never swing points.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// A local extremum: candle index and its high (or low).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub position: usize,
    pub price: f64,
}

/// Swing highs and swing lows, each ordered by position.
pub fn find_swings(
    candles: &[Candle],
    left: usize,
    right: usize,
) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    (
        extrema(&highs, left, right, |a, b| a > b),
        extrema(&lows, left, right, |a, b| a < b),
    )
}

fn extrema(
    values: &[f64],
    left: usize,
    right: usize,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<SwingPoint> {
    let n = values.len();
    if n < left + right + 1 {
        return Vec::new();
    }

    (left..n - right)
        .filter(|&i| {
            let v = values[i];
            values[i - left..i].iter().all(|&other| beats(v, other))
                && values[i + 1..=i + right].iter().all(|&other| beats(v, other))
        })
        .map(|i| SwingPoint {
            position: i,
            price: values[i],
        })
        .collect()
}
