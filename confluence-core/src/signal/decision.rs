//! Decision gate and trade levels.

use super::{Confluence, Signal, SignalType};
use crate::structure::Structure;

/// Lower bound on the risk leg when computing risk/reward.
pub const RISK_FLOOR: f64 = 1e-9;

const STOP_BUFFER: f64 = 0.01;
const TP1_BUFFER: f64 = 0.01;
const TP1_FALLBACK: f64 = 0.015;
const TP2_DISTANCE: f64 = 0.03;

/// Turn a scored snapshot into a signal.
///
/// LONG wins ties: `long >= min && long >= short` is checked first.
pub fn build_signal(confluence: &Confluence, structure: &Structure, min_confluence: u32) -> Signal {
    let long = &confluence.long;
    let short = &confluence.short;

    if long.score >= min_confluence && long.score >= short.score {
        long_signal(confluence, structure)
    } else if short.score >= min_confluence && short.score > long.score {
        short_signal(confluence, structure)
    } else {
        Signal {
            kind: SignalType::Wait,
            confidence: long.score.max(short.score),
            entry: confluence.price,
            stop_loss: 0.0,
            tp1: 0.0,
            tp2: 0.0,
            risk_reward: 0.0,
            reasons: vec!["Insufficient confluence".to_string()],
        }
    }
}

fn long_signal(c: &Confluence, structure: &Structure) -> Signal {
    let entry = c.price;
    let stop_loss = c.ema81().min(c.ema100()) * (1.0 - STOP_BUFFER);
    let tp1 = structure
        .swing_highs
        .iter()
        .map(|p| p.price)
        .filter(|&h| h > entry)
        .reduce(f64::min)
        .map_or(entry * (1.0 + TP1_FALLBACK), |h| h * (1.0 - TP1_BUFFER));
    let tp2 = entry * (1.0 + TP2_DISTANCE);

    Signal {
        kind: SignalType::Long,
        confidence: c.long.score,
        entry,
        stop_loss,
        tp1,
        tp2,
        risk_reward: risk_reward(tp1 - entry, entry - stop_loss),
        reasons: c.long.reasons.clone(),
    }
}

fn short_signal(c: &Confluence, structure: &Structure) -> Signal {
    let entry = c.price;
    let stop_loss = c.ema81().max(c.ema100()) * (1.0 + STOP_BUFFER);
    let tp1 = structure
        .swing_lows
        .iter()
        .map(|p| p.price)
        .filter(|&l| l < entry)
        .reduce(f64::max)
        .map_or(entry * (1.0 - TP1_FALLBACK), |l| l * (1.0 + TP1_BUFFER));
    let tp2 = entry * (1.0 - TP2_DISTANCE);

    Signal {
        kind: SignalType::Short,
        confidence: c.short.score,
        entry,
        stop_loss,
        tp1,
        tp2,
        risk_reward: risk_reward(entry - tp1, stop_loss - entry),
        reasons: c.short.reasons.clone(),
    }
}

fn risk_reward(reward: f64, risk: f64) -> f64 {
    let rr = reward / risk.max(RISK_FLOOR);
    if rr.is_finite() {
        rr
    } else {
        f64::MAX.copysign(rr)
    }
}
