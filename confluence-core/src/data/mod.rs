//! Market data acquisition.
//!
//! A symbol is resolved to a canonical id, then sources are asked in order
//! until one yields data: the CoinGecko OHLC history first, then four quote
//! endpoints. A quote alone is turned into a synthetic series anchored on the
//! real price. Only exhausting every source is fatal.

pub mod coingecko;
pub mod coinpaprika;
pub mod dexscreener;
pub mod fetcher;
pub mod geckoterminal;
pub mod http;
pub mod provider;
pub mod resolve;
pub mod synthetic;

pub use fetcher::MarketDataFetcher;
pub use http::HttpClient;
pub use provider::{
    CoinDirectory, DataError, DirectoryMatch, HistorySource, Quote, QuoteSource, SourceOutcome,
};
pub use resolve::{looks_like_address, Contract, Network, Resolution, ResolvedAsset, SymbolResolver};
pub use synthetic::SyntheticGenerator;
