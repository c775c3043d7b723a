use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use alloy::{
    // Import the pre-defined typed Ethereum network
    network::Ethereum,
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder},
    // The typed RPC request / block / transaction types
    rpc::types::{Block, BlockId, BlockNumberOrTag, TransactionInput, TransactionRequest},
    sol_types::SolCall,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[cfg(test)]
use mockall::automock;

use crate::{
    config::NetworkConfig,
    contracts::{IBridge, IGasPriceOracle, IL1Bridge, IL2Bridge, ISaddleSwap, IERC20},
    error::ServiceError,
    models::ChainSlug,
};

/// Ethereum RPC client for blockchain interactions
///
/// This client provides a typed interface for communicating with one EVM chain.
/// It uses the Alloy typed providers to ensure type safety in RPC interactions.
#[derive(Clone)]
pub struct EthereumClient {
    /// Typed provider for Ethereum network
    pub provider: Arc<dyn Provider<Ethereum>>,
}

impl EthereumClient {
    /// Create a new client with an HTTP provider. No request is made until first use.
    pub fn new(rpc_url: &str) -> Result<Self, ServiceError> {
        let url = rpc_url
            .parse()
            .map_err(|e| ServiceError::RPCConnection(format!("Bad URL {rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new().network::<Ethereum>().on_http(url);

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Verify the node answers by fetching the latest block number
    pub async fn check_connection(&self) -> Result<u64, ServiceError> {
        let block_number = self.provider.get_block_number().await?;
        info!("Connected! Latest block number: {block_number}");
        Ok(block_number)
    }

    /// Fetch the latest block from the network
    pub async fn get_latest_block(&self) -> Result<Block, ServiceError> {
        let maybe_block = self
            .provider
            .get_block(BlockId::Number(BlockNumberOrTag::Latest))
            .await?;

        maybe_block.ok_or_else(|| ServiceError::RPCConnection("No latest block returned".to_string()))
    }
}

/// Read access to the chains of a bridge network
///
/// Every method is a single read-only RPC request. Addresses are the contract to
/// query; the chain selects the node.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BridgeReader: Send + Sync {
    /// Latest block number and timestamp
    async fn latest_block(&self, chain: ChainSlug) -> Result<(u64, u64), ServiceError>;

    async fn gas_price(&self, chain: ChainSlug) -> Result<u128, ServiceError>;

    async fn estimate_gas(&self, chain: ChainSlug, tx: TransactionRequest) -> Result<u64, ServiceError>;

    async fn token_balance(&self, chain: ChainSlug, token: Address, owner: Address) -> Result<U256, ServiceError>;

    async fn allowance(
        &self,
        chain: ChainSlug,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ServiceError>;

    /// Saddle `calculateSwap` quote
    async fn calculate_swap(
        &self,
        chain: ChainSlug,
        swap: Address,
        from_index: u8,
        to_index: u8,
        amount: U256,
    ) -> Result<U256, ServiceError>;

    async fn virtual_price(&self, chain: ChainSlug, swap: Address) -> Result<U256, ServiceError>;

    async fn swap_token_balance(&self, chain: ChainSlug, swap: Address, index: u8) -> Result<U256, ServiceError>;

    async fn credit(&self, chain: ChainSlug, bridge: Address, bonder: Address) -> Result<U256, ServiceError>;

    /// Debit including the sliding-window additional debit
    async fn debit_and_additional_debit(
        &self,
        chain: ChainSlug,
        bridge: Address,
        bonder: Address,
    ) -> Result<U256, ServiceError>;

    async fn min_bonder_fee_absolute(&self, chain: ChainSlug, l2_bridge: Address) -> Result<U256, ServiceError>;

    async fn pending_amount_for_chain_id(
        &self,
        chain: ChainSlug,
        l2_bridge: Address,
        chain_id: u64,
    ) -> Result<U256, ServiceError>;

    async fn is_chain_id_paused(&self, l1_bridge: Address, chain_id: u64) -> Result<bool, ServiceError>;

    async fn challenge_period(&self, l1_bridge: Address) -> Result<U256, ServiceError>;

    async fn time_slot_size(&self, l1_bridge: Address) -> Result<U256, ServiceError>;

    async fn time_slot(&self, l1_bridge: Address, time: U256) -> Result<U256, ServiceError>;

    async fn time_slot_to_amount_bonded(
        &self,
        l1_bridge: Address,
        time_slot: U256,
        bonder: Address,
    ) -> Result<U256, ServiceError>;

    /// L1 data fee charged by a rollup gas price oracle for a serialized transaction
    async fn l1_data_fee(&self, chain: ChainSlug, oracle: Address, serialized_tx: Bytes) -> Result<U256, ServiceError>;
}

/// [`BridgeReader`] backed by one HTTP provider per configured chain
#[derive(Clone)]
pub struct RpcBridgeReader {
    clients: HashMap<ChainSlug, EthereumClient>,
    timeout: Duration,
}

impl RpcBridgeReader {
    /// Build one client for every configured chain with an RPC URL
    pub fn from_network(network: &NetworkConfig, timeout: Duration) -> Result<Self, ServiceError> {
        let mut clients = HashMap::new();
        for slug in network.config_chains() {
            let chain = network.chain(slug)?;
            match chain.rpc_url.as_deref() {
                Some(url) => {
                    clients.insert(slug, EthereumClient::new(url)?);
                }
                None => debug!("no rpc url configured for {}", slug),
            }
        }
        Ok(Self { clients, timeout })
    }

    pub fn client(&self, chain: ChainSlug) -> Result<&EthereumClient, ServiceError> {
        self.clients
            .get(&chain)
            .ok_or_else(|| ServiceError::MissingConfig(format!("no rpc url configured for {}", chain)))
    }

    async fn timed<T, F>(&self, chain: ChainSlug, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ServiceError::RPCConnection(format!("request to {} timed out", chain)))?
    }

    /// eth_call a view function and decode its return value
    async fn view<C: SolCall + Send>(&self, chain: ChainSlug, to: Address, call: C) -> Result<C::Return, ServiceError> {
        let client = self.client(chain)?;
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::new(Bytes::from(call.abi_encode())));
        let output = self
            .timed(chain, async { client.provider.call(tx).await.map_err(ServiceError::from) })
            .await?;
        C::abi_decode_returns(&output, true)
            .map_err(|e| ServiceError::RPCConnection(format!("failed to decode {}: {}", C::SIGNATURE, e)))
    }
}

#[async_trait]
impl BridgeReader for RpcBridgeReader {
    async fn latest_block(&self, chain: ChainSlug) -> Result<(u64, u64), ServiceError> {
        let client = self.client(chain)?;
        let block = self.timed(chain, client.get_latest_block()).await?;
        Ok((block.header.number, block.header.timestamp))
    }

    #[instrument(skip(self), err)]
    async fn gas_price(&self, chain: ChainSlug) -> Result<u128, ServiceError> {
        let client = self.client(chain)?;
        self.timed(chain, async { client.provider.get_gas_price().await.map_err(ServiceError::from) })
            .await
    }

    async fn estimate_gas(&self, chain: ChainSlug, tx: TransactionRequest) -> Result<u64, ServiceError> {
        let client = self.client(chain)?;
        self.timed(chain, async { client.provider.estimate_gas(tx).await.map_err(ServiceError::from) })
            .await
    }

    async fn token_balance(&self, chain: ChainSlug, token: Address, owner: Address) -> Result<U256, ServiceError> {
        Ok(self.view(chain, token, IERC20::balanceOfCall { owner }).await?.balance)
    }

    async fn allowance(
        &self,
        chain: ChainSlug,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ServiceError> {
        Ok(self
            .view(chain, token, IERC20::allowanceCall { owner, spender })
            .await?
            .remaining)
    }

    async fn calculate_swap(
        &self,
        chain: ChainSlug,
        swap: Address,
        from_index: u8,
        to_index: u8,
        amount: U256,
    ) -> Result<U256, ServiceError> {
        let call = ISaddleSwap::calculateSwapCall {
            tokenIndexFrom: from_index,
            tokenIndexTo: to_index,
            dx: amount,
        };
        Ok(self.view(chain, swap, call).await?.amount)
    }

    async fn virtual_price(&self, chain: ChainSlug, swap: Address) -> Result<U256, ServiceError> {
        Ok(self.view(chain, swap, ISaddleSwap::getVirtualPriceCall {}).await?.price)
    }

    async fn swap_token_balance(&self, chain: ChainSlug, swap: Address, index: u8) -> Result<U256, ServiceError> {
        Ok(self
            .view(chain, swap, ISaddleSwap::getTokenBalanceCall { index })
            .await?
            .balance)
    }

    async fn credit(&self, chain: ChainSlug, bridge: Address, bonder: Address) -> Result<U256, ServiceError> {
        Ok(self.view(chain, bridge, IBridge::getCreditCall { bonder }).await?.credit)
    }

    async fn debit_and_additional_debit(
        &self,
        chain: ChainSlug,
        bridge: Address,
        bonder: Address,
    ) -> Result<U256, ServiceError> {
        Ok(self
            .view(chain, bridge, IBridge::getDebitAndAdditionalDebitCall { bonder })
            .await?
            .debit)
    }

    async fn min_bonder_fee_absolute(&self, chain: ChainSlug, l2_bridge: Address) -> Result<U256, ServiceError> {
        Ok(self
            .view(chain, l2_bridge, IL2Bridge::minBonderFeeAbsoluteCall {})
            .await?
            .fee)
    }

    async fn pending_amount_for_chain_id(
        &self,
        chain: ChainSlug,
        l2_bridge: Address,
        chain_id: u64,
    ) -> Result<U256, ServiceError> {
        let call = IL2Bridge::pendingAmountForChainIdCall {
            chainId: U256::from(chain_id),
        };
        Ok(self.view(chain, l2_bridge, call).await?.amount)
    }

    async fn is_chain_id_paused(&self, l1_bridge: Address, chain_id: u64) -> Result<bool, ServiceError> {
        let call = IL1Bridge::isChainIdPausedCall {
            chainId: U256::from(chain_id),
        };
        Ok(self.view(ChainSlug::Ethereum, l1_bridge, call).await?.paused)
    }

    async fn challenge_period(&self, l1_bridge: Address) -> Result<U256, ServiceError> {
        Ok(self
            .view(ChainSlug::Ethereum, l1_bridge, IL1Bridge::challengePeriodCall {})
            .await?
            .period)
    }

    async fn time_slot_size(&self, l1_bridge: Address) -> Result<U256, ServiceError> {
        Ok(self
            .view(ChainSlug::Ethereum, l1_bridge, IL1Bridge::TIME_SLOT_SIZECall {})
            .await?
            .size)
    }

    async fn time_slot(&self, l1_bridge: Address, time: U256) -> Result<U256, ServiceError> {
        Ok(self
            .view(ChainSlug::Ethereum, l1_bridge, IL1Bridge::getTimeSlotCall { time })
            .await?
            .slot)
    }

    async fn time_slot_to_amount_bonded(
        &self,
        l1_bridge: Address,
        time_slot: U256,
        bonder: Address,
    ) -> Result<U256, ServiceError> {
        let call = IL1Bridge::timeSlotToAmountBondedCall {
            timeSlot: time_slot,
            bonder,
        };
        Ok(self.view(ChainSlug::Ethereum, l1_bridge, call).await?.amount)
    }

    async fn l1_data_fee(&self, chain: ChainSlug, oracle: Address, serialized_tx: Bytes) -> Result<U256, ServiceError> {
        Ok(self
            .view(chain, oracle, IGasPriceOracle::getL1FeeCall { data: serialized_tx })
            .await?
            .fee)
    }
}
