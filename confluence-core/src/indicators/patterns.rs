//! Engulfing candle patterns.
//!
//! Bullish engulfing at t: candle t is bullish, candle t-1 is bearish, and
//! t's body covers t-1's body (close[t] >= open[t-1], open[t] <= close[t-1]).
//! Bearish engulfing is the mirror. Candle 0 never matches.

use crate::domain::Candle;

pub fn bullish_engulfing(candles: &[Candle]) -> Vec<bool> {
    engulfing(candles, |prev, cur| {
        cur.close > cur.open
            && prev.open > prev.close
            && cur.close >= prev.open
            && cur.open <= prev.close
    })
}

pub fn bearish_engulfing(candles: &[Candle]) -> Vec<bool> {
    engulfing(candles, |prev, cur| {
        cur.close < cur.open
            && prev.open < prev.close
            && cur.close <= prev.open
            && cur.open >= prev.close
    })
}

fn engulfing(candles: &[Candle], matches: impl Fn(&Candle, &Candle) -> bool) -> Vec<bool> {
    let mut flags = vec![false; candles.len()];
    for (i, pair) in candles.windows(2).enumerate() {
        flags[i + 1] = matches(&pair[0], &pair[1]);
    }
    flags
}
