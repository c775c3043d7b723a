use std::{collections::HashMap, env};

use alloy::primitives::Address;
use eyre::Result;
use serde::Deserialize;
use tracing::warn;

use crate::models::{
    snapshot::CoreConfigSnapshot,
    token::{canonical_symbol, TokenMetadata},
    Chain, ChainSlug,
};

/// Service configuration structure
///
/// This structure contains the parameters of the HTTP service itself. The description
/// of the bridge network (chains, tokens, contract addresses, fee parameters) lives in
/// [`NetworkConfig`].
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Host address to bind the server to (default: 127.0.0.1)
    pub host: String,

    /// Port to listen on (default: 8080)
    pub port: u16,

    /// Network slug, e.g. "mainnet" or "goerli" (default: mainnet)
    pub network: String,

    /// Path of the network description file (default: config/<network>.toml)
    pub network_config_path: String,

    /// Base URL of the hosted config/liquidity JSON files
    pub snapshot_base_url: String,

    /// Base URL of the Coingecko-compatible price API
    pub price_feed_url: String,

    /// Optional price API key
    pub price_feed_api_key: Option<String>,

    /// Timeout applied to RPC and HTTP requests, in seconds
    pub rpc_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// * `HOST` - Server host address (default: "127.0.0.1")
    /// * `PORT` - Server port (default: 8080)
    /// * `NETWORK` - Network slug (default: "mainnet")
    /// * `NETWORK_CONFIG_PATH` - Network description file (default: "config/<network>.toml")
    /// * `SNAPSHOT_BASE_URL` - Hosted snapshot base URL (default: "https://assets.hop.exchange")
    /// * `PRICE_FEED_URL` - Price API base URL (default: "https://api.coingecko.com/api/v3")
    /// * `PRICE_FEED_API_KEY` - Price API key (optional)
    /// * `RPC_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (useful for development)
        let _ = dotenv::dotenv();

        let network = env::var("NETWORK").unwrap_or_else(|_| "mainnet".to_string());
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()?,
            network_config_path: env::var("NETWORK_CONFIG_PATH")
                .unwrap_or_else(|_| format!("config/{}.toml", network)),
            network,
            snapshot_base_url: env::var("SNAPSHOT_BASE_URL")
                .unwrap_or_else(|_| "https://assets.hop.exchange".to_string()),
            price_feed_url: env::var("PRICE_FEED_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            price_feed_api_key: env::var("PRICE_FEED_API_KEY").ok().filter(|k| !k.is_empty()),
            rpc_timeout_secs: env::var("RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()?,
        })
    }
}

/// Contract addresses of one token's bridge deployment on one chain
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BridgeAddresses {
    #[serde(default)]
    pub l1_bridge: Option<Address>,
    #[serde(default)]
    pub l1_canonical_token: Option<Address>,
    #[serde(default)]
    pub l1_messenger_wrapper: Option<Address>,
    #[serde(default)]
    pub l2_bridge: Option<Address>,
    #[serde(default)]
    pub l2_canonical_token: Option<Address>,
    #[serde(default)]
    pub l2_hop_bridge_token: Option<Address>,
    #[serde(default)]
    pub l2_amm_wrapper: Option<Address>,
    #[serde(default)]
    pub l2_saddle_swap: Option<Address>,
    #[serde(default)]
    pub l2_saddle_lp_token: Option<Address>,
}

/// Chain entry of the network description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub wait_confirmations: Option<u64>,
}

/// Description of a bridge network
///
/// Token keys are canonical symbols (upper case) and chain keys are chain slugs (lower
/// case); [`NetworkConfig::normalize`] enforces both after loading because the
/// `config` crate does not preserve key case.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkConfig {
    pub network: String,

    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,

    #[serde(default)]
    pub tokens: HashMap<String, TokenMetadata>,

    /// token -> chain -> addresses
    #[serde(default)]
    pub addresses: HashMap<String, HashMap<String, BridgeAddresses>>,

    /// token -> source chain -> destination chain -> bonder
    #[serde(default)]
    pub bonders: HashMap<String, HashMap<String, HashMap<String, Address>>>,

    /// token -> destination chain -> basis points
    #[serde(default)]
    pub bonder_fee_bps: HashMap<String, HashMap<String, f64>>,

    #[serde(default = "default_destination_fee_gas_price_multiplier")]
    pub destination_fee_gas_price_multiplier: f64,

    /// destination chain -> whether L1 deposits pay a relayer fee
    #[serde(default)]
    pub relayer_fee_enabled: HashMap<String, bool>,

    /// Optimistic rollups whose transfers to L1 are bonded
    #[serde(default = "default_bondable_chains")]
    pub bondable_chains: Vec<ChainSlug>,

    /// L2s where L1 deposits are relayed for a fee
    #[serde(default = "default_relayable_chains")]
    pub relayable_chains: Vec<ChainSlug>,

    /// Gas price bump applied to populated transactions; 0 disables it
    #[serde(default)]
    pub gas_price_multiplier: f64,

    /// USD prices used when the price feed is unreachable
    #[serde(default)]
    pub fallback_prices: HashMap<String, f64>,
}

fn default_destination_fee_gas_price_multiplier() -> f64 {
    1.0
}

fn default_bondable_chains() -> Vec<ChainSlug> {
    vec![ChainSlug::Optimism, ChainSlug::Arbitrum]
}

fn default_relayable_chains() -> Vec<ChainSlug> {
    vec![ChainSlug::Arbitrum]
}

impl NetworkConfig {
    /// Load the network description from a file, with `BRIDGE__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("BRIDGE").separator("__"))
            .build()?;
        let mut network: NetworkConfig = settings.try_deserialize()?;
        network.normalize();
        Ok(network)
    }

    /// Parse a network description from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let mut network: NetworkConfig = settings.try_deserialize()?;
        network.normalize();
        Ok(network)
    }

    /// Upper-case token keys and lower-case chain keys
    pub fn normalize(&mut self) {
        fn chains<V>(map: HashMap<String, V>) -> HashMap<String, V> {
            map.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), v)).collect()
        }
        fn tokens<V>(map: HashMap<String, V>) -> HashMap<String, V> {
            map.into_iter().map(|(k, v)| (canonical_symbol(&k), v)).collect()
        }

        self.chains = chains(std::mem::take(&mut self.chains));
        self.relayer_fee_enabled = chains(std::mem::take(&mut self.relayer_fee_enabled));
        self.tokens = tokens(std::mem::take(&mut self.tokens));
        self.fallback_prices = tokens(std::mem::take(&mut self.fallback_prices));
        self.addresses = tokens(std::mem::take(&mut self.addresses))
            .into_iter()
            .map(|(token, per_chain)| (token, chains(per_chain)))
            .collect();
        self.bonder_fee_bps = tokens(std::mem::take(&mut self.bonder_fee_bps))
            .into_iter()
            .map(|(token, per_chain)| (token, chains(per_chain)))
            .collect();
        self.bonders = tokens(std::mem::take(&mut self.bonders))
            .into_iter()
            .map(|(token, per_source)| {
                let per_source = chains(per_source).into_iter().map(|(src, per_dst)| (src, chains(per_dst))).collect();
                (token, per_source)
            })
            .collect();
    }

    /// Apply the operational parameters of the hosted core config. Present sections
    /// replace the local ones wholesale.
    pub fn with_overrides(&self, snapshot: &CoreConfigSnapshot) -> NetworkConfig {
        let mut merged = self.clone();
        if let Some(bonders) = &snapshot.bonders {
            let mut parsed = HashMap::new();
            for (token, per_source) in bonders {
                for (source, per_destination) in per_source {
                    for (destination, bonder) in per_destination {
                        match bonder.parse::<Address>() {
                            Ok(address) => {
                                parsed
                                    .entry(canonical_symbol(token))
                                    .or_insert_with(HashMap::new)
                                    .entry(source.to_ascii_lowercase())
                                    .or_insert_with(HashMap::new)
                                    .insert(destination.to_ascii_lowercase(), address);
                            }
                            Err(e) => warn!("ignoring bonder {} for {}.{}->{}: {}", bonder, token, source, destination, e),
                        }
                    }
                }
            }
            merged.bonders = parsed;
        }
        if let Some(fees) = &snapshot.bonder_fee_bps {
            merged.bonder_fee_bps = fees.clone();
        }
        if let Some(multiplier) = snapshot.destination_fee_gas_price_multiplier {
            merged.destination_fee_gas_price_multiplier = multiplier;
        }
        if let Some(enabled) = &snapshot.relayer_fee_enabled {
            merged.relayer_fee_enabled = enabled.clone();
        }
        merged.normalize();
        merged
    }

    /// Resolve a chain slug to its configured description
    pub fn chain(&self, slug: ChainSlug) -> Result<Chain, crate::error::ServiceError> {
        let entry = self.chains.get(slug.as_str()).ok_or_else(|| {
            crate::error::ServiceError::UnsupportedChain(format!(
                "unsupported chain \"{}\" for network {}",
                slug, self.network
            ))
        })?;
        Ok(Chain {
            slug,
            chain_id: entry.chain_id,
            name: entry.name.clone(),
            rpc_url: entry.rpc_url.clone(),
            explorer_url: entry.explorer_url.clone(),
            wait_confirmations: entry.wait_confirmations.unwrap_or(1),
        })
    }

    /// Chains present in the configuration, in a stable order
    pub fn config_chains(&self) -> Vec<ChainSlug> {
        ChainSlug::ALL
            .into_iter()
            .filter(|slug| self.chains.contains_key(slug.as_str()))
            .collect()
    }

    pub fn token_metadata(&self, symbol: &str) -> Option<&TokenMetadata> {
        self.tokens.get(&canonical_symbol(symbol))
    }

    pub fn bridge_addresses(&self, token: &str, chain: ChainSlug) -> Option<&BridgeAddresses> {
        self.addresses.get(&canonical_symbol(token))?.get(chain.as_str())
    }

    pub fn bonder(&self, token: &str, source: ChainSlug, destination: ChainSlug) -> Option<Address> {
        self.bonders
            .get(&canonical_symbol(token))?
            .get(source.as_str())?
            .get(destination.as_str())
            .copied()
    }

    pub fn is_relayer_fee_enabled(&self, destination: ChainSlug) -> bool {
        self.relayer_fee_enabled.get(destination.as_str()).copied().unwrap_or(false)
    }

    pub fn is_bondable(&self, chain: ChainSlug) -> bool {
        self.bondable_chains.contains(&chain)
    }

    pub fn is_relayable(&self, chain: ChainSlug) -> bool {
        self.relayable_chains.contains(&chain)
    }
}
