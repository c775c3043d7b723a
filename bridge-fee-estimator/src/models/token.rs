use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::chain::ChainSlug;

pub const ETH: &str = "ETH";
pub const MATIC: &str = "MATIC";
pub const DAI: &str = "DAI";
pub const XDAI: &str = "XDAI";
pub const HOP: &str = "HOP";

/// Token metadata shared by every chain the token lives on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Token resolved on a specific chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub chain: ChainSlug,
    pub address: Option<Address>,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl Token {
    pub fn canonical_symbol(&self) -> String {
        canonical_symbol(&self.symbol)
    }

    /// Whether this token is the gas token of its chain
    pub fn is_native_token(&self) -> bool {
        native_symbol(self.chain) == self.symbol.to_ascii_uppercase()
    }
}

/// Map wrapped, bridged and renamed symbols to the symbol the network config is keyed by
pub fn canonical_symbol(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let unwrapped = match trimmed.strip_prefix('h') {
        // hUSDC, hETH, ... but not HOP itself
        Some(rest) if !rest.is_empty() && !trimmed.eq_ignore_ascii_case(HOP) => rest,
        _ => trimmed,
    }
    .to_ascii_uppercase();
    match unwrapped.as_str() {
        "WETH" => ETH.to_string(),
        "XDAI" | "WXDAI" => DAI.to_string(),
        "WMATIC" => MATIC.to_string(),
        _ => unwrapped,
    }
}

/// Symbol of the gas token on a chain
pub fn native_symbol(chain: ChainSlug) -> &'static str {
    match chain {
        ChainSlug::Polygon => MATIC,
        ChainSlug::Gnosis => XDAI,
        _ => ETH,
    }
}

/// Canonical symbol of the gas token on a chain, used for price lookups
pub fn native_canonical_symbol(chain: ChainSlug) -> &'static str {
    match chain {
        ChainSlug::Polygon => MATIC,
        ChainSlug::Gnosis => DAI,
        _ => ETH,
    }
}

/// Whether transfers of this token go through an AMM. The HOP token bridges 1:1.
pub fn uses_amm(canonical: &str) -> bool {
    canonical != HOP
}

/// Symbol the canonical token carries on a chain (DAI is XDAI on gnosis)
pub fn chain_symbol(canonical: &str, chain: ChainSlug) -> String {
    if chain == ChainSlug::Gnosis && canonical == DAI {
        XDAI.to_string()
    } else {
        canonical.to_string()
    }
}

/// Symbol and name of the bridge-wrapped representation
pub fn htoken_symbol_and_name(metadata: &TokenMetadata, canonical: &str) -> (String, String) {
    if uses_amm(canonical) {
        (format!("h{canonical}"), format!("Hop {}", metadata.name))
    } else {
        (canonical.to_string(), metadata.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_symbol_strips_wrappers() {
        assert_eq!(canonical_symbol("hUSDC"), "USDC");
        assert_eq!(canonical_symbol("WETH"), "ETH");
        assert_eq!(canonical_symbol("hETH"), "ETH");
        assert_eq!(canonical_symbol("XDAI"), "DAI");
        assert_eq!(canonical_symbol("WXDAI"), "DAI");
        assert_eq!(canonical_symbol("WMATIC"), "MATIC");
        assert_eq!(canonical_symbol("HOP"), "HOP");
        assert_eq!(canonical_symbol("usdt"), "USDT");
    }

    #[test]
    fn native_tokens_follow_the_chain() {
        let matic = Token {
            chain: ChainSlug::Polygon,
            address: None,
            symbol: "MATIC".into(),
            name: "Matic".into(),
            decimals: 18,
        };
        assert!(matic.is_native_token());

        let eth_on_polygon = Token { symbol: "ETH".into(), ..matic.clone() };
        assert!(!eth_on_polygon.is_native_token());

        let xdai = Token { chain: ChainSlug::Gnosis, symbol: "XDAI".into(), ..matic };
        assert!(xdai.is_native_token());
    }

    #[test]
    fn htoken_naming() {
        let meta = TokenMetadata { name: "USD Coin".into(), symbol: "USDC".into(), decimals: 6 };
        assert_eq!(
            htoken_symbol_and_name(&meta, "USDC"),
            ("hUSDC".to_string(), "Hop USD Coin".to_string())
        );
        let hop = TokenMetadata { name: "Hop".into(), symbol: "HOP".into(), decimals: 18 };
        assert_eq!(htoken_symbol_and_name(&hop, "HOP"), ("HOP".to_string(), "Hop".to_string()));
    }

    #[test]
    fn dai_is_xdai_on_gnosis() {
        assert_eq!(chain_symbol("DAI", ChainSlug::Gnosis), "XDAI");
        assert_eq!(chain_symbol("DAI", ChainSlug::Optimism), "DAI");
    }
}
