use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServiceError;

/// Chains the bridge can route between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSlug {
    Ethereum,
    Optimism,
    Arbitrum,
    Polygon,
    Gnosis,
}

impl ChainSlug {
    pub const ALL: [ChainSlug; 5] = [
        ChainSlug::Ethereum,
        ChainSlug::Optimism,
        ChainSlug::Arbitrum,
        ChainSlug::Polygon,
        ChainSlug::Gnosis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainSlug::Ethereum => "ethereum",
            ChainSlug::Optimism => "optimism",
            ChainSlug::Arbitrum => "arbitrum",
            ChainSlug::Polygon => "polygon",
            ChainSlug::Gnosis => "gnosis",
        }
    }

    /// Only the Ethereum chain is layer 1
    pub fn is_l1(&self) -> bool {
        matches!(self, ChainSlug::Ethereum)
    }
}

impl fmt::Display for ChainSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainSlug {
    type Err = ServiceError;

    /// Parse a chain slug. The legacy `xdai` slug resolves to `gnosis`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(ChainSlug::Ethereum),
            "optimism" => Ok(ChainSlug::Optimism),
            "arbitrum" => Ok(ChainSlug::Arbitrum),
            "polygon" => Ok(ChainSlug::Polygon),
            "gnosis" => Ok(ChainSlug::Gnosis),
            "xdai" => {
                warn!("the xdai chain slug has been renamed to gnosis");
                Ok(ChainSlug::Gnosis)
            }
            other => Err(ServiceError::UnsupportedChain(format!("invalid chain \"{other}\""))),
        }
    }
}

/// Chain description resolved from the network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub slug: ChainSlug,
    pub chain_id: u64,
    pub name: String,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default = "default_wait_confirmations")]
    pub wait_confirmations: u64,
}

fn default_wait_confirmations() -> u64 {
    1
}

impl Chain {
    pub fn is_l1(&self) -> bool {
        self.slug.is_l1()
    }

    pub fn equals(&self, slug: ChainSlug) -> bool {
        self.slug == slug
    }
}
