use alloy::{
    primitives::{keccak256, Address, B256, U256},
    sol,
    sol_types::SolValue,
};
use serde::{Deserialize, Serialize};

use super::amount::{decimal, decimal_opt};

sol! {
    /// ABI layout of a transfer as hashed by the bridge contracts
    struct TransferData {
        uint256 chainId;
        address sender;
        address recipient;
        uint256 amount;
        uint256 transferNonce;
        uint256 relayerFee;
        uint256 amountOutMin;
        uint256 deadline;
    }
}

/// A cross-chain transfer as seen by the bridge contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub chain_id: u64,
    pub sender: Address,
    pub recipient: Address,
    #[serde(with = "decimal")]
    pub amount: U256,
    #[serde(with = "decimal")]
    pub nonce: U256,
    #[serde(with = "decimal")]
    pub relayer_fee: U256,
    #[serde(with = "decimal")]
    pub amount_out_min: U256,
    #[serde(with = "decimal")]
    pub deadline: U256,
}

impl Transfer {
    /// keccak256 of the ABI encoded transfer fields
    pub fn transfer_hash(&self) -> B256 {
        let data = TransferData {
            chainId: U256::from(self.chain_id),
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
            transferNonce: self.nonce,
            relayerFee: self.relayer_fee,
            amountOutMin: self.amount_out_min,
            deadline: self.deadline,
        };
        keccak256(data.abi_encode())
    }
}

/// Optional knobs for building a send transaction. Unset values are derived:
/// fees from the fee estimate, deadlines from the default deadline, relayer
/// from the route's bonder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    #[serde(default)]
    pub sender: Option<Address>,
    #[serde(default)]
    pub recipient: Option<Address>,
    #[serde(default)]
    pub relayer: Option<Address>,
    #[serde(default, with = "decimal_opt")]
    pub relayer_fee: Option<U256>,
    #[serde(default, with = "decimal_opt")]
    pub bonder_fee: Option<U256>,
    #[serde(default, with = "decimal_opt")]
    pub amount_out_min: Option<U256>,
    #[serde(default)]
    pub deadline: Option<u64>,
    #[serde(default, with = "decimal_opt")]
    pub destination_amount_out_min: Option<U256>,
    #[serde(default)]
    pub destination_deadline: Option<u64>,
    #[serde(default)]
    pub check_allowance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transfer {
        Transfer {
            chain_id: 1,
            sender: Address::repeat_byte(0x11),
            recipient: Address::repeat_byte(0x22),
            amount: U256::from(12_345u64),
            nonce: U256::ZERO,
            relayer_fee: U256::from(1_000_000u64),
            amount_out_min: U256::ZERO,
            deadline: U256::ZERO,
        }
    }

    #[test]
    fn hash_matches_manual_encoding() {
        let t = sample();
        let mut encoded = Vec::new();
        for word in [
            U256::from(t.chain_id).to_be_bytes::<32>(),
            B256::left_padding_from(t.sender.as_slice()).0,
            B256::left_padding_from(t.recipient.as_slice()).0,
            t.amount.to_be_bytes::<32>(),
            t.nonce.to_be_bytes::<32>(),
            t.relayer_fee.to_be_bytes::<32>(),
            t.amount_out_min.to_be_bytes::<32>(),
            t.deadline.to_be_bytes::<32>(),
        ] {
            encoded.extend_from_slice(&word);
        }
        assert_eq!(t.transfer_hash(), keccak256(encoded));
    }

    #[test]
    fn hash_changes_with_nonce() {
        let a = sample();
        let b = Transfer { nonce: U256::from(1u64), ..a.clone() };
        assert_ne!(a.transfer_hash(), b.transfer_hash());
    }

    #[test]
    fn send_options_default_from_empty_object() {
        let opts: SendOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, SendOptions::default());
    }
}
