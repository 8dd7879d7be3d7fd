//! Ordered fallback chain: history sources, then quote sources feeding the
//! synthetic generator.

use super::coingecko::CoinGecko;
use super::coinpaprika::CoinPaprika;
use super::dexscreener::DexScreener;
use super::geckoterminal::GeckoTerminal;
use super::http::HttpClient;
use super::provider::{CoinDirectory, DataError, HistorySource, QuoteSource, SourceOutcome};
use super::resolve::{ResolvedAsset, SymbolResolver};
use super::synthetic::SyntheticGenerator;
use crate::config::DataConfig;
use crate::domain::{DataSource, Series};
use chrono::{DateTime, Utc};

pub struct MarketDataFetcher {
    resolver: SymbolResolver,
    history: Vec<Box<dyn HistorySource>>,
    quotes: Vec<Box<dyn QuoteSource>>,
    synthetic: SyntheticGenerator,
}

impl MarketDataFetcher {
    pub fn new(
        resolver: SymbolResolver,
        history: Vec<Box<dyn HistorySource>>,
        quotes: Vec<Box<dyn QuoteSource>>,
        synthetic: SyntheticGenerator,
    ) -> Self {
        Self {
            resolver,
            history,
            quotes,
            synthetic,
        }
    }

    /// The live chain: CoinGecko OHLC, then CoinPaprika, CoinGecko simple
    /// price, GeckoTerminal and DexScreener quotes.
    pub fn live(cfg: &DataConfig) -> Self {
        let http = HttpClient::new();
        let gecko = CoinGecko::new(http.clone(), cfg);
        let paprika = CoinPaprika::new(http.clone(), cfg);

        let directories: Vec<Box<dyn CoinDirectory>> =
            vec![Box::new(gecko.clone()), Box::new(paprika.clone())];
        let history: Vec<Box<dyn HistorySource>> = vec![Box::new(gecko.clone())];
        let quotes: Vec<Box<dyn QuoteSource>> = vec![
            Box::new(paprika),
            Box::new(gecko),
            Box::new(GeckoTerminal::new(http.clone(), cfg)),
            Box::new(DexScreener::new(http, cfg)),
        ];

        Self::new(
            SymbolResolver::new(directories),
            history,
            quotes,
            SyntheticGenerator::new(cfg.synthetic_max_days),
        )
    }

    pub fn resolve(&self, symbol: &str) -> ResolvedAsset {
        self.resolver.resolve(symbol)
    }

    /// Fetch a series for `symbol` covering `days` days.
    pub fn fetch_series(&self, symbol: &str, days: u32) -> Result<Series, DataError> {
        self.fetch_series_at(symbol, days, Utc::now())
    }

    /// As [`fetch_series`](Self::fetch_series), with synthetic candles
    /// ending at `now`.
    pub fn fetch_series_at(
        &self,
        symbol: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Series, DataError> {
        let unavailable = || DataError::DataUnavailable {
            symbol: symbol.to_string(),
        };
        if symbol.trim().is_empty() {
            return Err(unavailable());
        }

        let asset = self.resolver.resolve(symbol);
        tracing::info!(symbol, id = %asset.id, days, "fetching series");

        for source in &self.history {
            match source.fetch_history(&asset, days) {
                SourceOutcome::Success(candles) => {
                    let provider = DataSource::History {
                        provider: source.name().to_string(),
                    };
                    match Series::new(asset.id.clone(), candles, provider) {
                        Ok(series) => {
                            tracing::info!(
                                source = source.name(),
                                candles = series.len(),
                                "historical series fetched"
                            );
                            return Ok(series);
                        }
                        Err(e) => {
                            tracing::warn!(source = source.name(), error = %e, "rejected history")
                        }
                    }
                }
                SourceOutcome::Insufficient(reason) => {
                    tracing::info!(source = source.name(), %reason, "history insufficient")
                }
                SourceOutcome::Unavailable(reason) => {
                    tracing::info!(source = source.name(), %reason, "history unavailable")
                }
            }
        }

        for source in &self.quotes {
            match source.fetch_quote(&asset) {
                SourceOutcome::Success(quote) if quote.is_usable() => {
                    tracing::warn!(
                        source = source.name(),
                        price = quote.price,
                        "no history; synthesizing series around current quote"
                    );
                    let candles = self.synthetic.generate(&asset.id, &quote, days, now);
                    let provider = DataSource::Synthetic {
                        quote_provider: source.name().to_string(),
                    };
                    return Ok(Series::new(asset.id.clone(), candles, provider)?);
                }
                SourceOutcome::Success(quote) => {
                    tracing::debug!(source = source.name(), price = quote.price, "unusable quote")
                }
                SourceOutcome::Insufficient(reason) | SourceOutcome::Unavailable(reason) => {
                    tracing::debug!(source = source.name(), %reason, "quote skipped")
                }
            }
        }

        tracing::warn!(symbol, "every data source exhausted");
        Err(unavailable())
    }
}
