//! Symbol resolution: static table, raw address, directory search, identity.

use super::provider::{CoinDirectory, SourceOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Eth,
    Bsc,
    Solana,
}

impl Network {
    /// Network slug used by GeckoTerminal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Eth => "eth",
            Network::Bsc => "bsc",
            Network::Solana => "solana",
        }
    }

    pub fn is_evm(&self) -> bool {
        matches!(self, Network::Eth | Network::Bsc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub network: Network,
    pub address: String,
}

/// How the canonical id was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Resolution {
    StaticTable,
    /// Input is a raw on-chain token address.
    Address,
    Directory { name: String },
    Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    /// Trimmed user input.
    pub query: String,
    /// Canonical id used for history, simple-price lookups and seeding.
    pub id: String,
    pub paprika_id: Option<String>,
    pub contract: Option<Contract>,
    pub resolution: Resolution,
}

impl ResolvedAsset {
    /// The input itself, when it is a token address.
    pub fn raw_address(&self) -> Option<&str> {
        match self.resolution {
            Resolution::Address => Some(&self.query),
            _ => None,
        }
    }
}

struct KnownAsset {
    aliases: &'static [&'static str],
    id: &'static str,
    paprika_id: &'static str,
    contract: Option<(Network, &'static str)>,
}

const KNOWN_ASSETS: &[KnownAsset] = &[
    KnownAsset {
        aliases: &["bitcoin", "btc"],
        id: "bitcoin",
        paprika_id: "btc-bitcoin",
        contract: None,
    },
    KnownAsset {
        aliases: &["ethereum", "eth"],
        id: "ethereum",
        paprika_id: "eth-ethereum",
        // WETH
        contract: Some((Network::Eth, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2")),
    },
    KnownAsset {
        aliases: &["solana", "sol"],
        id: "solana",
        paprika_id: "sol-solana",
        // Wrapped SOL mint
        contract: Some((Network::Solana, "So11111111111111111111111111111111111111112")),
    },
    KnownAsset {
        aliases: &["usd-coin", "usdc"],
        id: "usd-coin",
        paprika_id: "usdc-usd-coin",
        contract: Some((Network::Eth, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")),
    },
    KnownAsset {
        aliases: &["tether", "usdt"],
        id: "tether",
        paprika_id: "usdt-tether",
        contract: Some((Network::Eth, "0xdac17f958d2ee523a2206206994597c13d831ec7")),
    },
    KnownAsset {
        aliases: &["binancecoin", "bnb"],
        id: "binancecoin",
        paprika_id: "bnb-binance-coin",
        // WBNB
        contract: Some((Network::Bsc, "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c")),
    },
    KnownAsset {
        aliases: &["cardano", "ada"],
        id: "cardano",
        paprika_id: "ada-cardano",
        contract: None,
    },
];

/// True if `input` looks like an on-chain token address: more than 20
/// ASCII alphanumerics (a `0x` prefix qualifies on its own).
pub fn looks_like_address(input: &str) -> bool {
    let s = input.trim();
    s.len() > 20 && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// One entry of a coin directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Market-cap rank; `None` for unranked coins.
    pub rank: Option<u32>,
}

/// Pick the best listing for `query`: exact id/symbol/name matches beat
/// substring matches on symbol/name; within a tier the best rank wins, then
/// listing order.
pub fn best_match<'a>(coins: &'a [DirectoryCoin], query: &str) -> Option<&'a DirectoryCoin> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    let by_rank = |c: &&DirectoryCoin| c.rank.unwrap_or(u32::MAX);

    let exact = coins
        .iter()
        .filter(|c| {
            c.id.to_lowercase() == q || c.symbol.to_lowercase() == q || c.name.to_lowercase() == q
        })
        .min_by_key(by_rank);
    exact.or_else(|| {
        coins
            .iter()
            .filter(|c| c.symbol.to_lowercase().contains(&q) || c.name.to_lowercase().contains(&q))
            .min_by_key(by_rank)
    })
}

fn lookup_static(key: &str) -> Option<&'static KnownAsset> {
    KNOWN_ASSETS.iter().find(|a| a.aliases.contains(&key))
}

pub struct SymbolResolver {
    directories: Vec<Box<dyn CoinDirectory>>,
}

impl SymbolResolver {
    pub fn new(directories: Vec<Box<dyn CoinDirectory>>) -> Self {
        Self { directories }
    }

    /// Resolver that only knows the static table.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// Resolve a user-supplied symbol. Never fails: unknown input falls back
    /// to itself, lowercased.
    pub fn resolve(&self, symbol: &str) -> ResolvedAsset {
        let query = symbol.trim().to_string();
        let key = query.to_lowercase();

        if let Some(known) = lookup_static(&key) {
            tracing::debug!(symbol = %query, id = known.id, "resolved from static table");
            return ResolvedAsset {
                query,
                id: known.id.to_string(),
                paprika_id: Some(known.paprika_id.to_string()),
                contract: known.contract.map(|(network, address)| Contract {
                    network,
                    address: address.to_string(),
                }),
                resolution: Resolution::StaticTable,
            };
        }

        // Addresses are case-sensitive on some chains; keep the input as-is.
        if looks_like_address(&query) {
            tracing::debug!(symbol = %query, "input looks like a token address");
            return ResolvedAsset {
                id: query.clone(),
                query,
                paprika_id: None,
                contract: None,
                resolution: Resolution::Address,
            };
        }

        for directory in &self.directories {
            match directory.search(&key) {
                SourceOutcome::Success(hit) => {
                    // A hit without a CoinGecko id keeps the identity id.
                    let id = hit.id.unwrap_or_else(|| key.clone());
                    tracing::debug!(
                        symbol = %query,
                        %id,
                        paprika_id = ?hit.paprika_id,
                        directory = directory.name(),
                        "resolved from directory"
                    );
                    return ResolvedAsset {
                        query,
                        id,
                        paprika_id: hit.paprika_id,
                        contract: None,
                        resolution: Resolution::Directory {
                            name: directory.name().to_string(),
                        },
                    };
                }
                SourceOutcome::Insufficient(reason) | SourceOutcome::Unavailable(reason) => {
                    tracing::debug!(directory = directory.name(), %reason, "directory miss");
                }
            }
        }

        ResolvedAsset {
            query,
            id: key,
            paprika_id: None,
            contract: None,
            resolution: Resolution::Identity,
        }
    }
}
