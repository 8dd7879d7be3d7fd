//! Market structure: swing points, Break-of-Structure (BOS) and
//! Change-of-Character (CHoCH).
//!
//! Evaluated once against the current (last) close. The structure trend is a
//! single-step classification taken from the last BOS emitted in this
//! evaluation, not a running state.

pub mod swings;

pub use swings::{find_swings, SwingPoint};

use crate::indicators::IndicatorFrame;
use serde::{Deserialize, Serialize};

pub const BOS_CONFIDENCE: u32 = 80;
pub const CHOCH_CONFIDENCE: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureKind {
    BullishBos,
    BearishBos,
    BullishChoch,
    BearishChoch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureTrend {
    Bullish,
    Bearish,
    Neutral,
}

/// A structural event with the price level it references.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureEvent {
    #[serde(rename = "type")]
    pub kind: StructureKind,
    pub level: f64,
    pub confidence: u32,
}

/// Tunable detector parameters. The BOS window and breakout margin are
/// heuristics; defaults reproduce the reference behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureParams {
    pub left: usize,
    pub right: usize,
    /// How many of the most recent swings define the BOS reference level.
    pub bos_window: usize,
    /// Fractional margin the close must clear the reference level by.
    pub bos_threshold: f64,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            left: 2,
            right: 2,
            bos_window: 3,
            bos_threshold: 0.001,
        }
    }
}

/// Output of the structure detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub bos: Vec<StructureEvent>,
    pub choch: Vec<StructureEvent>,
    pub trend: StructureTrend,
}

impl Structure {
    pub fn has(&self, kind: StructureKind) -> bool {
        self.bos.iter().chain(&self.choch).any(|e| e.kind == kind)
    }
}

/// Detect structure with the default BOS window and threshold.
pub fn detect(frame: &IndicatorFrame, left: usize, right: usize) -> Structure {
    detect_with(
        frame,
        &StructureParams {
            left,
            right,
            ..StructureParams::default()
        },
    )
}

pub fn detect_with(frame: &IndicatorFrame, params: &StructureParams) -> Structure {
    let (swing_highs, swing_lows) = find_swings(&frame.candles, params.left, params.right);
    let Some(current) = frame.candles.last().map(|c| c.close) else {
        return Structure {
            swing_highs,
            swing_lows,
            bos: Vec::new(),
            choch: Vec::new(),
            trend: StructureTrend::Neutral,
        };
    };

    let bos = break_of_structure(&swing_highs, &swing_lows, current, params);
    let choch = change_of_character(&swing_highs, &swing_lows, current);

    let trend = trend_of(&bos);

    tracing::debug!(
        swing_highs = swing_highs.len(),
        swing_lows = swing_lows.len(),
        bos = bos.len(),
        choch = choch.len(),
        ?trend,
        "structure detected"
    );

    Structure {
        swing_highs,
        swing_lows,
        bos,
        choch,
        trend,
    }
}

/// Trend from the last BOS emitted; bullish is evaluated before bearish.
fn trend_of(bos: &[StructureEvent]) -> StructureTrend {
    match bos.last().map(|e| e.kind) {
        Some(StructureKind::BullishBos) => StructureTrend::Bullish,
        Some(StructureKind::BearishBos) => StructureTrend::Bearish,
        _ => StructureTrend::Neutral,
    }
}

fn recent(points: &[SwingPoint], n: usize) -> &[SwingPoint] {
    &points[points.len().saturating_sub(n)..]
}

fn break_of_structure(
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    current: f64,
    params: &StructureParams,
) -> Vec<StructureEvent> {
    let mut events = Vec::new();

    let last_high = recent(highs, params.bos_window)
        .iter()
        .map(|p| p.price)
        .reduce(f64::max);
    let last_low = recent(lows, params.bos_window)
        .iter()
        .map(|p| p.price)
        .reduce(f64::min);

    if let Some(level) = last_high {
        if current > level * (1.0 + params.bos_threshold) {
            events.push(StructureEvent {
                kind: StructureKind::BullishBos,
                level,
                confidence: BOS_CONFIDENCE,
            });
        }
    }
    if let Some(level) = last_low {
        if current < level * (1.0 - params.bos_threshold) {
            events.push(StructureEvent {
                kind: StructureKind::BearishBos,
                level,
                confidence: BOS_CONFIDENCE,
            });
        }
    }

    events
}

fn change_of_character(
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    current: f64,
) -> Vec<StructureEvent> {
    let mut events = Vec::new();

    // Lower low printed, yet price already reclaimed the recent highs.
    if let (false, [.., prior_low, latest_low]) = (highs.is_empty(), lows) {
        let ceiling = recent(highs, 2)
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);
        if latest_low.price < prior_low.price && current > ceiling {
            events.push(StructureEvent {
                kind: StructureKind::BullishChoch,
                level: prior_low.price,
                confidence: CHOCH_CONFIDENCE,
            });
        }
    }

    // Higher high printed, yet price already lost the recent lows.
    if let (false, [.., prior_high, latest_high]) = (lows.is_empty(), highs) {
        let floor = recent(lows, 2)
            .iter()
            .map(|p| p.price)
            .fold(f64::INFINITY, f64::min);
        if latest_high.price > prior_high.price && current < floor {
            events.push(StructureEvent {
                kind: StructureKind::BearishChoch,
                level: prior_high.price,
                confidence: CHOCH_CONFIDENCE,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn sp(position: usize, price: f64) -> SwingPoint {
        SwingPoint { position, price }
    }

    #[test]
    fn bullish_bos_above_recent_highs() {
        let highs = [sp(2, 100.0), sp(6, 105.0), sp(10, 103.0)];
        let events = break_of_structure(&highs, &[], 105.2, &StructureParams::default());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, StructureKind::BullishBos);
        assert_eq!(events[0].level, 105.0);
        assert_eq!(events[0].confidence, 80);
    }

    #[test]
    fn bos_requires_margin() {
        let highs = [sp(2, 100.0)];
        // 100.05 is above the level but within 0.1%.
        assert!(break_of_structure(&highs, &[], 100.05, &StructureParams::default()).is_empty());
    }

    #[test]
    fn bos_window_only_sees_recent_three() {
        let highs = [sp(1, 200.0), sp(3, 100.0), sp(5, 101.0), sp(7, 102.0)];
        let events = break_of_structure(&highs, &[], 110.0, &StructureParams::default());
        assert_eq!(events[0].level, 102.0);
    }

    #[test]
    fn both_bos_fire_when_close_is_outside_both_levels() {
        let highs = [sp(1, 90.0)];
        let lows = [sp(2, 110.0)];
        let events = break_of_structure(&highs, &lows, 100.0, &StructureParams::default());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, StructureKind::BullishBos);
        assert_eq!(events[1].kind, StructureKind::BearishBos);
        assert_eq!(trend_of(&events), StructureTrend::Bearish);
        assert_eq!(trend_of(&events[..1]), StructureTrend::Bullish);
        assert_eq!(trend_of(&[]), StructureTrend::Neutral);
    }

    #[test]
    fn close_inside_range_has_no_bos() {
        let mut candles = make_candles(&[100.0; 12]);
        candles[3].high = 120.0;
        candles[8].low = 50.0;
        let frame = IndicatorFrame::from_candles(&candles, 20);

        let structure = detect(&frame, 2, 2);
        assert_eq!(structure.swing_highs, vec![sp(3, 120.0)]);
        assert_eq!(structure.swing_lows, vec![sp(8, 50.0)]);
        assert!(structure.bos.is_empty());
        assert_eq!(structure.trend, StructureTrend::Neutral);
    }

    #[test]
    fn bullish_choch_on_lower_low_reclaim() {
        let highs = [sp(3, 105.0), sp(9, 104.0)];
        let lows = [sp(5, 95.0), sp(11, 93.0)];
        let events = change_of_character(&highs, &lows, 106.0);
        assert_eq!(
            events,
            vec![StructureEvent {
                kind: StructureKind::BullishChoch,
                level: 95.0,
                confidence: 70,
            }]
        );
    }

    #[test]
    fn bearish_choch_on_higher_high_breakdown() {
        let highs = [sp(3, 105.0), sp(9, 107.0)];
        let lows = [sp(5, 95.0), sp(11, 97.0)];
        let events = change_of_character(&highs, &lows, 94.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, StructureKind::BearishChoch);
        assert_eq!(events[0].level, 105.0);
    }

    #[test]
    fn choch_needs_enough_swings() {
        let highs = [sp(3, 105.0)];
        let lows = [sp(5, 95.0)];
        assert!(change_of_character(&highs, &lows, 200.0).is_empty());
        assert!(change_of_character(&highs, &lows, 1.0).is_empty());
        assert!(change_of_character(&[], &[sp(1, 9.0), sp(4, 8.0)], 200.0).is_empty());
    }

    #[test]
    fn flat_series_is_neutral() {
        let frame = IndicatorFrame::from_candles(&make_candles(&[100.0; 50]), 20);
        let structure = detect(&frame, 2, 2);
        assert!(structure.swing_highs.is_empty());
        assert!(structure.swing_lows.is_empty());
        assert!(structure.bos.is_empty());
        assert!(structure.choch.is_empty());
        assert_eq!(structure.trend, StructureTrend::Neutral);
    }

    #[test]
    fn empty_frame_is_neutral() {
        let frame = IndicatorFrame::from_candles(&[], 20);
        assert_eq!(detect(&frame, 2, 2).trend, StructureTrend::Neutral);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = StructureEvent {
            kind: StructureKind::BullishBos,
            level: 1.5,
            confidence: 80,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"BULLISH_BOS","level":1.5,"confidence":80}"#);
    }
}
