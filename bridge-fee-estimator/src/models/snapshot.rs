//! Payloads of the hosted JSON files the estimator blends with on-chain reads
//!
//! Keys are kept as plain strings (token symbols, chain slugs, bonder addresses)
//! because the hosted files are produced by other services and may carry chains or
//! tokens this crate does not know about.

use std::collections::HashMap;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::amount::decimal;

/// Nested `[a][b] -> value` lookup table
pub type RouteTable<T> = HashMap<String, HashMap<String, T>>;

/// Wrapper so amounts inside nested maps accept strings, hex and integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotAmount(#[serde(with = "decimal")] pub U256);

/// `v1-core-config.json`: operational parameters that override the local config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfigSnapshot {
    /// token -> source chain -> destination chain -> bonder address
    #[serde(default)]
    pub bonders: Option<HashMap<String, RouteTable<String>>>,
    /// token -> destination chain -> fee in basis points
    #[serde(default)]
    pub bonder_fee_bps: Option<RouteTable<f64>>,
    #[serde(default)]
    pub destination_fee_gas_price_multiplier: Option<f64>,
    /// destination chain -> relayer fee switch
    #[serde(default)]
    pub relayer_fee_enabled: Option<HashMap<String, bool>>,
}

/// Per-token section of `v1-available-liquidity.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLiquidity {
    #[serde(default)]
    pub base_available_credit_including_vault: RouteTable<SnapshotAmount>,
    #[serde(default)]
    pub unbonded_transfer_root_amounts: RouteTable<SnapshotAmount>,
    /// bonder address -> chain -> balance
    #[serde(default)]
    pub bonder_vault_balance: RouteTable<SnapshotAmount>,
}

/// `v1-available-liquidity.json` as published
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableLiquidityFile {
    /// Publication time in milliseconds since the epoch
    pub timestamp: u64,
    #[serde(default)]
    pub data: HashMap<String, TokenLiquidity>,
}

/// Liquidity data that passed the staleness check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailableLiquiditySnapshot {
    pub data: HashMap<String, TokenLiquidity>,
}

impl AvailableLiquiditySnapshot {
    fn token(&self, token: &str) -> Option<&TokenLiquidity> {
        self.data.get(token)
    }

    pub fn base_available_credit_including_vault(&self, token: &str, source: &str, destination: &str) -> Option<U256> {
        lookup(&self.token(token)?.base_available_credit_including_vault, source, destination)
    }

    pub fn unbonded_transfer_root_amount(&self, token: &str, source: &str, destination: &str) -> Option<U256> {
        lookup(&self.token(token)?.unbonded_transfer_root_amounts, source, destination)
    }

    pub fn bonder_vault_balance(&self, token: &str, bonder: &str, chain: &str) -> Option<U256> {
        let table = &self.token(token)?.bonder_vault_balance;
        // bonder keys are addresses; match regardless of checksum casing
        table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(bonder))
            .and_then(|(_, per_chain)| per_chain.get(chain))
            .map(|amount| amount.0)
    }
}

fn lookup(table: &RouteTable<SnapshotAmount>, a: &str, b: &str) -> Option<U256> {
    table.get(a)?.get(b).map(|amount| amount.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIQUIDITY: &str = r#"{
        "timestamp": 1700000000000,
        "data": {
            "USDC": {
                "baseAvailableCreditIncludingVault": {
                    "optimism": { "ethereum": "5000000000", "arbitrum": 123 }
                },
                "unbondedTransferRootAmounts": {
                    "optimism": { "ethereum": "0x3e8" }
                },
                "bonderVaultBalance": {
                    "0xa6A688F107851131F0E1dce493EbBebFAf99203e": { "ethereum": "42" }
                }
            }
        }
    }"#;

    #[test]
    fn reads_nested_liquidity_tables() {
        let file: AvailableLiquidityFile = serde_json::from_str(LIQUIDITY).unwrap();
        assert_eq!(file.timestamp, 1_700_000_000_000);
        let snapshot = AvailableLiquiditySnapshot { data: file.data };

        assert_eq!(
            snapshot.base_available_credit_including_vault("USDC", "optimism", "ethereum"),
            Some(U256::from(5_000_000_000u64))
        );
        assert_eq!(
            snapshot.base_available_credit_including_vault("USDC", "optimism", "arbitrum"),
            Some(U256::from(123u64))
        );
        assert_eq!(
            snapshot.unbonded_transfer_root_amount("USDC", "optimism", "ethereum"),
            Some(U256::from(1000u64))
        );
        assert_eq!(snapshot.unbonded_transfer_root_amount("USDC", "arbitrum", "ethereum"), None);
        assert_eq!(snapshot.base_available_credit_including_vault("DAI", "optimism", "ethereum"), None);
    }

    #[test]
    fn vault_balance_ignores_address_case() {
        let file: AvailableLiquidityFile = serde_json::from_str(LIQUIDITY).unwrap();
        let snapshot = AvailableLiquiditySnapshot { data: file.data };
        assert_eq!(
            snapshot.bonder_vault_balance("USDC", "0xa6a688f107851131f0e1dce493ebbebfaf99203e", "ethereum"),
            Some(U256::from(42u64))
        );
    }

    #[test]
    fn core_config_fields_are_optional() {
        let snapshot: CoreConfigSnapshot =
            serde_json::from_str(r#"{"bonderFeeBps": {"USDC": {"optimism": 14}}}"#).unwrap();
        assert!(snapshot.bonders.is_none());
        assert_eq!(snapshot.bonder_fee_bps.unwrap()["USDC"]["optimism"], 14.0);
    }
}
