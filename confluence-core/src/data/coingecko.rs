//! CoinGecko: historical OHLC (primary), simple price (quote) and search
//! (directory).

use super::http::HttpClient;
use super::provider::{
    CoinDirectory, DataError, DirectoryMatch, HistorySource, Quote, QuoteSource, SourceOutcome,
};
use super::resolve::{best_match, DirectoryCoin, ResolvedAsset};
use crate::config::DataConfig;
use crate::domain::Candle;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// `/coins/{id}/ohlc` row: `[timestamp_ms, open, high, low, close]`.
pub type OhlcRow = [Option<f64>; 5];

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    total_volumes: Vec<[Option<f64>; 2]>,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_vol: Option<f64>,
    usd_market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    market_cap_rank: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CoinGecko {
    http: HttpClient,
    base: String,
    history_timeout: Duration,
    quote_timeout: Duration,
    directory_timeout: Duration,
}

impl CoinGecko {
    pub fn new(http: HttpClient, cfg: &DataConfig) -> Self {
        Self {
            http,
            base: cfg.coingecko_base.trim_end_matches('/').to_string(),
            history_timeout: cfg.history_timeout(),
            quote_timeout: cfg.quote_timeout(),
            directory_timeout: cfg.directory_timeout(),
        }
    }

    fn fetch_candles(&self, id: &str, days: u32) -> Result<Vec<Candle>, DataError> {
        let url = format!("{}/coins/{id}/ohlc?vs_currency=usd&days={days}", self.base);
        let rows: Vec<OhlcRow> = self.http.get_json(&url, self.history_timeout)?;
        let mut candles = candles_from_rows(&rows);
        if candles.len() < 2 {
            return Ok(candles);
        }

        attach_volumes(&mut candles, self.fetch_volumes(id, days), id);
        Ok(candles)
    }

    fn fetch_volumes(&self, id: &str, days: u32) -> Result<Vec<(i64, f64)>, DataError> {
        let url = format!(
            "{}/coins/{id}/market_chart?vs_currency=usd&days={days}",
            self.base
        );
        let chart: MarketChart = self.http.get_json(&url, self.history_timeout)?;
        let mut volumes: Vec<(i64, f64)> = chart
            .total_volumes
            .iter()
            .filter_map(|&[ts, vol]| Some((ts? as i64, vol?)))
            .filter(|(_, vol)| vol.is_finite() && *vol >= 0.0)
            .collect();
        volumes.sort_by_key(|&(ts, _)| ts);
        Ok(volumes)
    }

    fn fetch_simple_price(&self, id: &str) -> Result<Option<Quote>, DataError> {
        let url = format!(
            "{}/simple/price?ids={id}&vs_currencies=usd&include_24hr_vol=true&include_market_cap=true",
            self.base
        );
        let prices: HashMap<String, SimplePrice> = self.http.get_json(&url, self.quote_timeout)?;
        Ok(prices.get(id).map(|p| Quote {
            price: p.usd.unwrap_or(0.0),
            volume_24h: p.usd_24h_vol.unwrap_or(0.0),
            market_cap: p.usd_market_cap.unwrap_or(0.0),
        }))
    }

    fn search_coins(&self, query: &str) -> Result<Vec<DirectoryCoin>, DataError> {
        let endpoint = format!("{}/search", self.base);
        let url = reqwest::Url::parse_with_params(&endpoint, &[("query", query)])
            .map_err(|e| DataError::Http(e.to_string()))?;
        let resp: SearchResponse = self.http.get_json(url.as_str(), self.directory_timeout)?;
        Ok(resp
            .coins
            .into_iter()
            .map(|c| DirectoryCoin {
                id: c.id,
                symbol: c.symbol,
                name: c.name,
                rank: c.market_cap_rank,
            })
            .collect())
    }
}

/// Convert raw OHLC rows, dropping incomplete or invalid rows, sorting by
/// time and keeping the last row for duplicated timestamps.
pub fn candles_from_rows(rows: &[OhlcRow]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = rows
        .iter()
        .filter_map(|&[ts, open, high, low, close]| {
            Some(Candle {
                timestamp: DateTime::<Utc>::from_timestamp_millis(ts? as i64)?,
                open: open?,
                high: high?,
                low: low?,
                close: close?,
                volume: 0.0,
            })
        })
        .filter(Candle::is_sane)
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    // dedup_by keeps the first of a run; reverse so the latest row survives.
    candles.reverse();
    candles.dedup_by_key(|c| c.timestamp);
    candles.reverse();
    candles
}

/// Attach to each candle the volume sample closest in time. `volumes` must
/// be sorted by timestamp (ms). Candles keep volume 0 if there are none.
/// Merge a volume fetch into the candles. A failed fetch is not fatal: the
/// candles keep zero volume.
fn attach_volumes(
    candles: &mut [Candle],
    volumes: Result<Vec<(i64, f64)>, DataError>,
    id: &str,
) {
    match volumes {
        Ok(volumes) => merge_volumes(candles, &volumes),
        Err(e) => tracing::warn!(id, error = %e, "volume fetch failed; volume set to 0"),
    }
}

pub fn merge_volumes(candles: &mut [Candle], volumes: &[(i64, f64)]) {
    if volumes.is_empty() {
        return;
    }
    for candle in candles.iter_mut() {
        let t = candle.timestamp.timestamp_millis();
        let idx = volumes.partition_point(|&(ts, _)| ts <= t);
        let before = idx.checked_sub(1).map(|i| volumes[i]);
        let after = volumes.get(idx).copied();
        let nearest = match (before, after) {
            (Some(b), Some(a)) => {
                if (t - b.0) <= (a.0 - t) {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => continue,
        };
        candle.volume = nearest.1;
    }
}

impl HistorySource for CoinGecko {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch_history(&self, asset: &ResolvedAsset, days: u32) -> SourceOutcome<Vec<Candle>> {
        match self.fetch_candles(&asset.id, days) {
            Ok(candles) if candles.len() < 2 => {
                SourceOutcome::Insufficient(format!("{} candles returned", candles.len()))
            }
            result => result.into(),
        }
    }
}

impl QuoteSource for CoinGecko {
    fn name(&self) -> &str {
        "coingecko_simple"
    }

    fn fetch_quote(&self, asset: &ResolvedAsset) -> SourceOutcome<Quote> {
        match self.fetch_simple_price(&asset.id) {
            Ok(Some(quote)) => SourceOutcome::Success(quote),
            Ok(None) => SourceOutcome::Insufficient(format!("no price for '{}'", asset.id)),
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}

impl CoinDirectory for CoinGecko {
    fn name(&self) -> &str {
        "coingecko_search"
    }

    fn search(&self, query: &str) -> SourceOutcome<DirectoryMatch> {
        match self.search_coins(query) {
            Ok(coins) => match best_match(&coins, query).or(coins.first()) {
                Some(coin) => SourceOutcome::Success(DirectoryMatch {
                    id: Some(coin.id.clone()),
                    paprika_id: None,
                }),
                None => SourceOutcome::Insufficient("no coins found".into()),
            },
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}
