//! CoinPaprika: ticker quote and coin listing.

use super::http::HttpClient;
use super::provider::{
    CoinDirectory, DataError, DirectoryMatch, Quote, QuoteSource, SourceOutcome,
};
use super::resolve::{best_match, DirectoryCoin, ResolvedAsset};
use crate::config::DataConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(default)]
    quotes: HashMap<String, TickerQuote>,
}

#[derive(Debug, Deserialize)]
struct TickerQuote {
    price: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ListedCoin {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    /// 0 for unranked coins.
    #[serde(default)]
    rank: u32,
}

impl From<ListedCoin> for DirectoryCoin {
    fn from(c: ListedCoin) -> Self {
        DirectoryCoin {
            id: c.id,
            symbol: c.symbol,
            name: c.name,
            rank: (c.rank > 0).then_some(c.rank),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoinPaprika {
    http: HttpClient,
    base: String,
    quote_timeout: Duration,
    directory_timeout: Duration,
}

impl CoinPaprika {
    pub fn new(http: HttpClient, cfg: &DataConfig) -> Self {
        Self {
            http,
            base: cfg.coinpaprika_base.trim_end_matches('/').to_string(),
            quote_timeout: cfg.quote_timeout(),
            directory_timeout: cfg.directory_timeout(),
        }
    }

    fn fetch_ticker(&self, paprika_id: &str) -> Result<Option<Quote>, DataError> {
        let url = format!("{}/tickers/{paprika_id}", self.base);
        let ticker: Ticker = self.http.get_json(&url, self.quote_timeout)?;
        Ok(quote_from_ticker(&ticker))
    }

    fn list_coins(&self) -> Result<Vec<DirectoryCoin>, DataError> {
        let url = format!("{}/coins", self.base);
        let coins: Vec<ListedCoin> = self.http.get_json(&url, self.directory_timeout)?;
        Ok(coins.into_iter().map(DirectoryCoin::from).collect())
    }
}

fn quote_from_ticker(ticker: &Ticker) -> Option<Quote> {
    let usd = ticker.quotes.get("USD")?;
    Some(Quote {
        price: usd.price?,
        volume_24h: usd.volume_24h.unwrap_or(0.0),
        market_cap: usd.market_cap.unwrap_or(0.0),
    })
}

impl QuoteSource for CoinPaprika {
    fn name(&self) -> &str {
        "coinpaprika"
    }

    fn fetch_quote(&self, asset: &ResolvedAsset) -> SourceOutcome<Quote> {
        let Some(paprika_id) = asset.paprika_id.as_deref() else {
            return SourceOutcome::Unavailable("no CoinPaprika id for asset".into());
        };
        match self.fetch_ticker(paprika_id) {
            Ok(Some(quote)) if quote.is_usable() => SourceOutcome::Success(quote),
            Ok(_) => SourceOutcome::Insufficient(format!("no USD price for '{paprika_id}'")),
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}

impl CoinDirectory for CoinPaprika {
    fn name(&self) -> &str {
        "coinpaprika_coins"
    }

    fn search(&self, query: &str) -> SourceOutcome<DirectoryMatch> {
        match self.list_coins() {
            Ok(coins) => match best_match(&coins, query) {
                Some(coin) => SourceOutcome::Success(directory_match(coin)),
                None => SourceOutcome::Insufficient(format!("no listing matches '{query}'")),
            },
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}

/// Paprika ids (`pepe-pepe`) are not CoinGecko ids; only the ticker
/// fallback may use them.
fn directory_match(coin: &DirectoryCoin) -> DirectoryMatch {
    DirectoryMatch {
        id: None,
        paprika_id: Some(coin.id.clone()),
    }
}
