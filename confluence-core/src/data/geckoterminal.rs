//! GeckoTerminal token price for EVM contracts.

use super::http::HttpClient;
use super::provider::{DataError, Quote, QuoteSource, SourceOutcome};
use super::resolve::ResolvedAsset;
use crate::config::DataConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenPriceResponse {
    data: TokenPriceData,
}

#[derive(Debug, Deserialize)]
struct TokenPriceData {
    attributes: TokenPriceAttributes,
}

#[derive(Debug, Deserialize)]
struct TokenPriceAttributes {
    /// Prices are returned as decimal strings keyed by address.
    #[serde(default)]
    token_prices: HashMap<String, Option<String>>,
}

#[derive(Debug, Clone)]
pub struct GeckoTerminal {
    http: HttpClient,
    base: String,
    timeout: Duration,
}

impl GeckoTerminal {
    pub fn new(http: HttpClient, cfg: &DataConfig) -> Self {
        Self {
            http,
            base: cfg.geckoterminal_base.trim_end_matches('/').to_string(),
            timeout: cfg.address_timeout(),
        }
    }

    fn fetch_price(&self, network: &str, address: &str) -> Result<Option<f64>, DataError> {
        let url = format!(
            "{}/simple/networks/{network}/token_price/{address}",
            self.base
        );
        let resp: TokenPriceResponse = self.http.get_json(&url, self.timeout)?;
        Ok(price_for(&resp, address))
    }
}

fn price_for(resp: &TokenPriceResponse, address: &str) -> Option<f64> {
    let prices = &resp.data.attributes.token_prices;
    let raw = prices
        .get(address)
        .or_else(|| prices.get(&address.to_lowercase()))?
        .as_deref()?;
    raw.parse().ok()
}

impl QuoteSource for GeckoTerminal {
    fn name(&self) -> &str {
        "geckoterminal"
    }

    fn fetch_quote(&self, asset: &ResolvedAsset) -> SourceOutcome<Quote> {
        let Some(contract) = asset.contract.as_ref().filter(|c| c.network.is_evm()) else {
            return SourceOutcome::Unavailable("no EVM contract for asset".into());
        };
        match self.fetch_price(contract.network.as_str(), &contract.address) {
            Ok(Some(price)) => SourceOutcome::Success(Quote {
                price,
                ..Quote::default()
            }),
            Ok(None) => SourceOutcome::Insufficient(format!("no price for {}", contract.address)),
            Err(e) => SourceOutcome::Unavailable(e.to_string()),
        }
    }
}
