use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::amount::decimal;

/// Everything the UI shows before a user sends a transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
    #[serde(with = "decimal")]
    pub amount_out: U256,
    pub rate: f64,
    pub price_impact: f64,
    #[serde(with = "decimal")]
    pub required_liquidity: U256,
    #[serde(with = "decimal")]
    pub lp_fees: U256,
    #[serde(with = "decimal")]
    pub adjusted_bonder_fee: U256,
    #[serde(with = "decimal")]
    pub adjusted_destination_tx_fee: U256,
    #[serde(with = "decimal")]
    pub total_fee: U256,
    #[serde(with = "decimal")]
    pub estimated_received: U256,
}

/// Quote for a swap between the canonical token and its hToken on one chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmmData {
    pub rate: f64,
    pub price_impact: f64,
    #[serde(with = "decimal")]
    pub amount_out_min: U256,
    #[serde(with = "decimal")]
    pub lp_fee_amount: U256,
}

/// Result of comparing bonder liquidity at the destination with what a transfer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityCheck {
    #[serde(with = "decimal")]
    pub available_liquidity: U256,
    #[serde(with = "decimal")]
    pub required_liquidity: U256,
    pub is_available: bool,
}

impl LiquidityCheck {
    pub fn new(available_liquidity: U256, required_liquidity: U256) -> Self {
        Self {
            available_liquidity,
            required_liquidity,
            is_available: available_liquidity >= required_liquidity,
        }
    }
}
