#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use alloy::{
    primitives::{address, Address, Bytes, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;

use bridge_fee_estimator::{
    config::NetworkConfig,
    error::ServiceError,
    estimator::BridgeEstimator,
    models::ChainSlug,
    price_feed::StaticPriceFeed,
    rpc::BridgeReader,
    snapshot::StaticSnapshotSource,
};

pub const NETWORK_TOML: &str = include_str!("../fixtures/network.toml");

pub const USDC_BONDER: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");
pub const USDC_L1_BRIDGE: Address = address!("1111111111111111111111111111111111111101");
pub const OPTIMISM_USDC_WRAPPER: Address = address!("2222222222222222222222222222222222222204");
pub const RECIPIENT: Address = address!("c0ffee0000000000000000000000000000c0ffee");

/// Chain state served by [`FakeReader`]
///
/// Swaps keep 99.9% of the input; everything not listed here reads as zero.
#[derive(Debug, Clone)]
pub struct FakeReader {
    pub block: (u64, u64),
    pub gas_price: u128,
    pub gas_limit: u64,
    pub credit: U256,
    pub debit: U256,
    pub allowance: U256,
    pub paused: bool,
    pub offline: bool,
}

impl Default for FakeReader {
    fn default() -> Self {
        Self {
            block: (19_000_000, 1_700_000_000),
            gas_price: 1_000_000_000,
            gas_limit: 120_000,
            credit: U256::from(1_000_000u64),
            debit: U256::from(400_000u64),
            allowance: U256::ZERO,
            paused: false,
            offline: false,
        }
    }
}

impl FakeReader {
    fn online(&self) -> Result<(), ServiceError> {
        if self.offline {
            return Err(ServiceError::RPCConnection("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeReader for FakeReader {
    async fn latest_block(&self, _chain: ChainSlug) -> Result<(u64, u64), ServiceError> {
        self.online()?;
        Ok(self.block)
    }

    async fn gas_price(&self, _chain: ChainSlug) -> Result<u128, ServiceError> {
        self.online()?;
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _chain: ChainSlug, _tx: TransactionRequest) -> Result<u64, ServiceError> {
        self.online()?;
        Ok(self.gas_limit)
    }

    async fn token_balance(&self, _chain: ChainSlug, _token: Address, _owner: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }

    async fn allowance(
        &self,
        _chain: ChainSlug,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(self.allowance)
    }

    async fn calculate_swap(
        &self,
        _chain: ChainSlug,
        _swap: Address,
        _from_index: u8,
        _to_index: u8,
        amount: U256,
    ) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(amount * U256::from(999u64) / U256::from(1000u64))
    }

    async fn virtual_price(&self, _chain: ChainSlug, _swap: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }

    async fn swap_token_balance(&self, _chain: ChainSlug, _swap: Address, _index: u8) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }

    async fn credit(&self, _chain: ChainSlug, _bridge: Address, _bonder: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(self.credit)
    }

    async fn debit_and_additional_debit(
        &self,
        _chain: ChainSlug,
        _bridge: Address,
        _bonder: Address,
    ) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(self.debit)
    }

    async fn min_bonder_fee_absolute(&self, _chain: ChainSlug, _l2_bridge: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }

    async fn pending_amount_for_chain_id(
        &self,
        _chain: ChainSlug,
        _l2_bridge: Address,
        _chain_id: u64,
    ) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }

    async fn is_chain_id_paused(&self, _l1_bridge: Address, _chain_id: u64) -> Result<bool, ServiceError> {
        self.online()?;
        Ok(self.paused)
    }

    async fn challenge_period(&self, _l1_bridge: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::from(86_400u64))
    }

    async fn time_slot_size(&self, _l1_bridge: Address) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::from(3_600u64))
    }

    async fn time_slot(&self, _l1_bridge: Address, time: U256) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(time / U256::from(3_600u64))
    }

    async fn time_slot_to_amount_bonded(
        &self,
        _l1_bridge: Address,
        _time_slot: U256,
        _bonder: Address,
    ) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }

    async fn l1_data_fee(&self, _chain: ChainSlug, _oracle: Address, _serialized_tx: Bytes) -> Result<U256, ServiceError> {
        self.online()?;
        Ok(U256::ZERO)
    }
}

pub fn test_network() -> NetworkConfig {
    NetworkConfig::from_toml_str(NETWORK_TOML).expect("fixture network parses")
}

pub fn test_prices() -> StaticPriceFeed {
    StaticPriceFeed::new(HashMap::from([
        ("ETH".to_string(), 2000.0),
        ("USDC".to_string(), 1.0),
        ("DAI".to_string(), 1.0),
        ("MATIC".to_string(), 0.5),
        ("HOP".to_string(), 0.05),
    ]))
}

/// Estimator over the fixture network with no published snapshots
pub fn create_estimator(reader: FakeReader) -> BridgeEstimator {
    BridgeEstimator::new(
        Arc::new(test_network()),
        Arc::new(reader),
        Arc::new(StaticSnapshotSource::default()),
        Arc::new(test_prices()),
    )
}
