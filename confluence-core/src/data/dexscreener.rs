//! DexScreener liquidity-pool lookup by token address.

use super::http::HttpClient;
use super::provider::{DataError, Quote, QuoteSource, SourceOutcome};
use super::resolve::{Network, ResolvedAsset};
use crate::config::DataConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenPairs {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    price_usd: Option<String>,
    volume: Option<Volume>,
    liquidity: Option<Liquidity>,
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    usd: Option<f64>,
}

impl Pair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct DexScreener {
    http: HttpClient,
    base: String,
    timeout: Duration,
}

impl DexScreener {
    pub fn new(http: HttpClient, cfg: &DataConfig) -> Self {
        Self {
            http,
            base: cfg.dexscreener_base.trim_end_matches('/').to_string(),
            timeout: cfg.address_timeout(),
        }
    }

    fn fetch_pairs(&self, address: &str) -> Result<TokenPairs, DataError> {
        let url = format!("{}/tokens/{address}", self.base);
        self.http.get_json(&url, self.timeout)
    }
}

/// Quote from the pair with the deepest USD liquidity.
fn deepest_pair_quote(pairs: &TokenPairs) -> Option<Quote> {
    let pair = pairs
        .pairs
        .as_deref()?
        .iter()
        .max_by(|a, b| a.liquidity_usd().total_cmp(&b.liquidity_usd()))?;
    Some(Quote {
        price: pair.price_usd.as_deref()?.parse().ok()?,
        volume_24h: pair.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
        market_cap: pair.market_cap.unwrap_or(0.0),
    })
}

/// Solana contracts from the static table, or any raw address input.
fn lookup_address(asset: &ResolvedAsset) -> Option<&str> {
    asset
        .contract
        .as_ref()
        .filter(|c| c.network == Network::Solana)
        .map(|c| c.address.as_str())
        .or_else(|| asset.raw_address())
}

impl QuoteSource for DexScreener {
    fn name(&self) -> &str {
        "dexscreener"
    }

    fn fetch_quote(&self, asset: &ResolvedAsset) -> SourceOutcome<Quote> {
        let Some(address) = lookup_address(asset) else {
            return SourceOutcome::Unavailable("no token address for asset".into());
        };
        match self.fetch_pairs(address) {
            Ok(pairs) => match deepest_pair_quote(&pairs) {
                Some(quote) => SourceOutcome::Success(quote),
                None => SourceOutcome::Insufficient(format!("no priced pairs for {address}")),
            },
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolve::SymbolResolver;

    #[test]
    fn picks_deepest_liquidity_pair() {
        let pairs: TokenPairs = serde_json::from_str(
            r#"{"schemaVersion":"1.0.0","pairs":[
                {"priceUsd":"1.10","volume":{"h24":500.0},"liquidity":{"usd":1000.0},"marketCap":1.0e6},
                {"priceUsd":"1.20","volume":{"h24":900.0},"liquidity":{"usd":50000.0},"marketCap":2.0e6},
                {"priceUsd":"1.30","liquidity":{}}
            ]}"#,
        )
        .unwrap();
        let q = deepest_pair_quote(&pairs).unwrap();
        assert_eq!(q.price, 1.20);
        assert_eq!(q.volume_24h, 900.0);
        assert_eq!(q.market_cap, 2.0e6);
    }

    #[test]
    fn null_pairs_have_no_quote() {
        let pairs: TokenPairs = serde_json::from_str(r#"{"pairs":null}"#).unwrap();
        assert!(deepest_pair_quote(&pairs).is_none());
        let pairs: TokenPairs = serde_json::from_str(r#"{"pairs":[]}"#).unwrap();
        assert!(deepest_pair_quote(&pairs).is_none());
    }

    #[test]
    fn applies_to_solana_contracts_and_raw_addresses() {
        let resolver = SymbolResolver::offline();
        assert_eq!(
            lookup_address(&resolver.resolve("sol")),
            Some("So11111111111111111111111111111111111111112")
        );
        let mint = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
        assert_eq!(lookup_address(&resolver.resolve(mint)), Some(mint));
        assert_eq!(lookup_address(&resolver.resolve("eth")), None);
        assert_eq!(lookup_address(&resolver.resolve("bitcoin")), None);
    }
}
