//! File export: candle series as CSV, any serializable value as JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use confluence_core::Candle;
use serde::Serialize;

/// Render candles as CSV.
///
/// Columns: timestamp (RFC 3339, UTC), open, high, low, close, volume
pub fn ohlc_csv(candles: &[Candle]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;

    for c in candles {
        wtr.write_record([
            c.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            format!("{:.8}", c.open),
            format!("{:.8}", c.high),
            format!("{:.8}", c.low),
            format!("{:.8}", c.close),
            format!("{:.2}", c.volume),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

pub fn write_ohlc_csv(path: &Path, candles: &[Candle]) -> Result<()> {
    let csv = ohlc_csv(candles)?;
    write_file(path, csv.as_bytes())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    write_file(path, json.as_bytes())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
