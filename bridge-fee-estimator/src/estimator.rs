use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    consensus::{SignableTransaction, TxLegacy},
    primitives::{address, Address, Bytes, TxKind, B256, U256},
    rpc::types::{TransactionInput, TransactionRequest},
    sol_types::SolCall,
};
use tracing::{debug, error, instrument, warn};

use crate::{
    config::{BridgeAddresses, NetworkConfig},
    contracts::{IBridge, IL2Bridge, CANONICAL_TOKEN_INDEX, HOP_BRIDGE_TOKEN_INDEX, OPTIMISM_GAS_PRICE_ORACLE},
    error::ServiceError,
    fees,
    models::{
        token::{canonical_symbol, chain_symbol, htoken_symbol_and_name, native_canonical_symbol, native_symbol, uses_amm, ETH},
        AmmData, ChainSlug, SendData, Token, TokenMetadata,
    },
    price_feed::PriceFeed,
    rpc::BridgeReader,
    snapshot::SnapshotSource,
};

/// Deadline applied to swaps when the caller gives none
pub const DEFAULT_DEADLINE_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Recipient used when estimating bond withdrawal gas
const PLACEHOLDER_RECIPIENT: Address = address!("1111111111111111111111111111111111111111");

/// Fee and liquidity estimator for one bridge network
///
/// This holds the services every estimate needs: the network description, chain
/// reads, hosted snapshots and prices. It is cheap to clone. Per-token operations
/// live on [`TokenBridge`], obtained with [`BridgeEstimator::bridge`].
#[derive(Clone)]
pub struct BridgeEstimator {
    pub network: Arc<NetworkConfig>,
    pub reader: Arc<dyn BridgeReader>,
    pub snapshots: Arc<dyn SnapshotSource>,
    pub prices: Arc<dyn PriceFeed>,
}

impl BridgeEstimator {
    pub fn new(
        network: Arc<NetworkConfig>,
        reader: Arc<dyn BridgeReader>,
        snapshots: Arc<dyn SnapshotSource>,
        prices: Arc<dyn PriceFeed>,
    ) -> Self {
        Self {
            network,
            reader,
            snapshots,
            prices,
        }
    }

    /// Estimator for a single token. Wrapped and hToken symbols resolve to the canonical token.
    pub fn bridge(&self, token: &str) -> Result<TokenBridge, ServiceError> {
        let symbol = canonical_symbol(token);
        let metadata = self
            .network
            .token_metadata(&symbol)
            .cloned()
            .ok_or_else(|| ServiceError::UnsupportedToken(format!("token \"{}\" not found", token)))?;
        Ok(TokenBridge {
            estimator: self.clone(),
            symbol,
            metadata,
        })
    }

    /// Local network description with the hosted core config applied on top
    pub async fn effective_config(&self) -> Arc<NetworkConfig> {
        match self.snapshots.core_config().await {
            Some(snapshot) => Arc::new(self.network.with_overrides(&snapshot)),
            None => self.network.clone(),
        }
    }

    /// chain -> tokens deployed on it
    pub fn supported_assets(&self) -> BTreeMap<ChainSlug, BTreeSet<String>> {
        let mut supported: BTreeMap<ChainSlug, BTreeSet<String>> = BTreeMap::new();
        for (token, per_chain) in &self.network.addresses {
            for chain in per_chain.keys() {
                match chain.parse::<ChainSlug>() {
                    Ok(slug) => {
                        supported.entry(slug).or_default().insert(token.clone());
                    }
                    Err(e) => debug!("skipping {}: {}", chain, e),
                }
            }
        }
        supported
    }

    pub fn supported_assets_for_chain(&self, chain: ChainSlug) -> BTreeSet<String> {
        self.supported_assets().remove(&chain).unwrap_or_default()
    }

    /// Latest ethereum block number and timestamp
    pub async fn latest_block(&self) -> Result<(u64, u64), ServiceError> {
        self.reader.latest_block(ChainSlug::Ethereum).await
    }
}

/// Estimates for one token of a bridge network
#[derive(Clone)]
pub struct TokenBridge {
    pub(crate) estimator: BridgeEstimator,
    pub(crate) symbol: String,
    pub(crate) metadata: TokenMetadata,
}

pub(crate) fn require(value: Option<Address>, what: &str, symbol: &str, chain: ChainSlug) -> Result<Address, ServiceError> {
    value.ok_or_else(|| ServiceError::MissingConfig(format!("{} address not found for {} on {}", what, symbol, chain)))
}

pub(crate) fn calldata<C: SolCall>(call: &C) -> TransactionInput {
    TransactionInput::new(Bytes::from(call.abi_encode()))
}

impl TokenBridge {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub(crate) fn reader(&self) -> &dyn BridgeReader {
        self.estimator.reader.as_ref()
    }

    pub(crate) fn prices(&self) -> &dyn PriceFeed {
        self.estimator.prices.as_ref()
    }

    pub(crate) fn network(&self) -> &NetworkConfig {
        &self.estimator.network
    }

    /// Whether transfers go through the canonical/hToken AMM
    pub fn does_use_amm(&self) -> bool {
        uses_amm(&self.symbol)
    }

    pub fn chain_id(&self, chain: ChainSlug) -> Result<u64, ServiceError> {
        Ok(self.network().chain(chain)?.chain_id)
    }

    pub fn addresses(&self, chain: ChainSlug) -> Result<&BridgeAddresses, ServiceError> {
        self.network()
            .bridge_addresses(&self.symbol, chain)
            .ok_or_else(|| ServiceError::UnsupportedChain(format!("{} is not supported on {}", self.symbol, chain)))
    }

    pub fn l1_bridge_address(&self) -> Result<Address, ServiceError> {
        let addresses = self.addresses(ChainSlug::Ethereum)?;
        require(addresses.l1_bridge, "L1 bridge", &self.symbol, ChainSlug::Ethereum)
    }

    pub fn l2_bridge_address(&self, chain: ChainSlug) -> Result<Address, ServiceError> {
        require(self.addresses(chain)?.l2_bridge, "L2 bridge", &self.symbol, chain)
    }

    /// Bridge contract of a chain: the L1 bridge on ethereum, the L2 bridge elsewhere
    pub fn bridge_address(&self, chain: ChainSlug) -> Result<Address, ServiceError> {
        if chain.is_l1() {
            self.l1_bridge_address()
        } else {
            self.l2_bridge_address(chain)
        }
    }

    pub fn amm_wrapper_address(&self, chain: ChainSlug) -> Result<Address, ServiceError> {
        require(self.addresses(chain)?.l2_amm_wrapper, "AMM wrapper", &self.symbol, chain)
    }

    pub fn saddle_swap_address(&self, chain: ChainSlug) -> Result<Address, ServiceError> {
        require(self.addresses(chain)?.l2_saddle_swap, "saddle swap", &self.symbol, chain)
    }

    pub fn saddle_lp_token_address(&self, chain: ChainSlug) -> Result<Address, ServiceError> {
        require(self.addresses(chain)?.l2_saddle_lp_token, "saddle LP token", &self.symbol, chain)
    }

    /// The canonical token as deployed on `chain`
    pub fn canonical_token(&self, chain: ChainSlug) -> Result<Token, ServiceError> {
        let addresses = self.addresses(chain)?;
        let address = if chain.is_l1() {
            addresses.l1_canonical_token
        } else {
            addresses.l2_canonical_token
        };
        Ok(Token {
            chain,
            address,
            symbol: chain_symbol(&self.symbol, chain),
            name: self.metadata.name.clone(),
            decimals: self.metadata.decimals,
        })
    }

    /// The bridge-wrapped token on an L2
    pub fn htoken(&self, chain: ChainSlug) -> Result<Token, ServiceError> {
        if chain.is_l1() {
            return Err(ServiceError::InvalidInput(format!("{} has no hToken on layer 1", self.symbol)));
        }
        let addresses = self.addresses(chain)?;
        let (symbol, name) = htoken_symbol_and_name(&self.metadata, &self.symbol);
        Ok(Token {
            chain,
            address: addresses.l2_hop_bridge_token,
            symbol,
            name,
            decimals: self.metadata.decimals,
        })
    }

    /// Whether the token is the gas token of `chain`
    pub fn is_native_token(&self, chain: ChainSlug) -> bool {
        native_symbol(chain) == chain_symbol(&self.symbol, chain)
    }

    /// Chains the token has contracts on
    pub fn supported_chains(&self) -> Vec<ChainSlug> {
        self.network()
            .config_chains()
            .into_iter()
            .filter(|chain| self.network().bridge_addresses(&self.symbol, *chain).is_some())
            .collect()
    }

    /// L2 chains with an AMM to provide liquidity to
    pub fn supported_lp_chains(&self) -> Vec<ChainSlug> {
        if !self.does_use_amm() {
            return Vec::new();
        }
        self.supported_chains().into_iter().filter(|chain| !chain.is_l1()).collect()
    }

    /// Unix time one week from now
    pub fn default_deadline_seconds(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        now + DEFAULT_DEADLINE_SECONDS
    }

    pub async fn bonder_address(&self, source: ChainSlug, destination: ChainSlug) -> Option<Address> {
        let config = self.estimator.effective_config().await;
        let bonder = config.bonder(&self.symbol, source, destination);
        if bonder.is_none() {
            warn!("bonder address not found for route {}.{}->{}", self.symbol, source, destination);
        }
        bonder
    }

    pub async fn messenger_wrapper_address(&self, destination: ChainSlug) -> Option<Address> {
        let wrapper = self
            .network()
            .bridge_addresses(&self.symbol, destination)
            .and_then(|addresses| addresses.l1_messenger_wrapper);
        if wrapper.is_none() {
            warn!(
                "messengerWrapper address not found for route {}. destinationChain {}",
                self.symbol, destination
            );
        }
        wrapper
    }

    /// Canonical token amount to hToken amount through the chain's AMM
    pub async fn calc_to_htoken(&self, amount: U256, chain: ChainSlug) -> Result<U256, ServiceError> {
        self.swap(amount, chain, CANONICAL_TOKEN_INDEX, HOP_BRIDGE_TOKEN_INDEX).await
    }

    /// hToken amount to canonical token amount through the chain's AMM
    pub async fn calc_from_htoken(&self, amount: U256, chain: ChainSlug) -> Result<U256, ServiceError> {
        self.swap(amount, chain, HOP_BRIDGE_TOKEN_INDEX, CANONICAL_TOKEN_INDEX).await
    }

    async fn swap(&self, amount: U256, chain: ChainSlug, from: u8, to: u8) -> Result<U256, ServiceError> {
        if !self.does_use_amm() || chain.is_l1() || amount.is_zero() {
            return Ok(amount);
        }
        let swap = self.saddle_swap_address(chain)?;
        self.reader().calculate_swap(chain, swap, from, to, amount).await
    }

    /// Amount received at the destination before fees
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn amount_out(&self, amount: U256, source: ChainSlug, destination: ChainSlug) -> Result<U256, ServiceError> {
        let htoken_amount = self.calc_to_htoken(amount, source).await?;
        self.calc_from_htoken(htoken_amount, destination).await
    }

    /// hToken liquidity the bonder needs at the destination
    pub async fn required_liquidity(&self, amount: U256, source: ChainSlug) -> Result<U256, ServiceError> {
        if source == ChainSlug::Ethereum {
            return Ok(U256::ZERO);
        }
        self.calc_to_htoken(amount, source).await
    }

    /// Bonder fee in basis points for transfers to `destination`
    pub async fn fee_bps(&self, destination: ChainSlug) -> Result<f64, ServiceError> {
        let config = self.estimator.effective_config().await;
        let fees = config
            .bonder_fee_bps
            .get(&self.symbol)
            .ok_or_else(|| ServiceError::MissingConfig("fee data not found".to_string()))?;
        Ok(fees.get(destination.as_str()).copied().unwrap_or(0.0))
    }

    pub fn lp_fees(&self, amount: U256, source: ChainSlug, destination: ChainSlug) -> Result<U256, ServiceError> {
        fees::lp_fees(amount, source.is_l1(), destination.is_l1())
    }

    pub async fn bonder_fee_relative(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
    ) -> Result<U256, ServiceError> {
        if source.is_l1() {
            // relayer fees are part of the destination fee
            return Ok(U256::ZERO);
        }
        let (htoken_amount, fee_bps) = tokio::try_join!(self.calc_to_htoken(amount, source), self.fee_bps(destination))?;
        fees::bonder_fee_relative(htoken_amount, fee_bps)
    }

    /// Smallest bonder fee accepted for transfers leaving `source`
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn bonder_fee_absolute(&self, source: ChainSlug) -> Result<U256, ServiceError> {
        let (token_price, on_chain_minimum) = tokio::try_join!(
            self.prices().price_usd(&self.symbol),
            self.on_chain_min_bonder_fee(source)
        )?;

        let usd_minimum = fees::min_bonder_fee_absolute(token_price, self.metadata.decimals, source)?;
        Ok(on_chain_minimum.max(usd_minimum))
    }

    // only the ETH bridges on gnosis and polygon enforce a minimum on-chain
    async fn on_chain_min_bonder_fee(&self, source: ChainSlug) -> Result<U256, ServiceError> {
        if self.symbol != ETH || !matches!(source, ChainSlug::Gnosis | ChainSlug::Polygon) {
            return Ok(U256::ZERO);
        }
        let bridge = self.l2_bridge_address(source)?;
        self.reader().min_bonder_fee_absolute(source, bridge).await
    }

    /// Cost of the bonder's (or relayer's) destination transaction, in the token
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn destination_transaction_fee(
        &self,
        source: ChainSlug,
        destination: ChainSlug,
    ) -> Result<U256, ServiceError> {
        let relayable = self.network().is_relayable(destination);
        if source.is_l1() && !relayable {
            return Ok(U256::ZERO);
        }

        let l1_fee = async {
            if destination == ChainSlug::Optimism {
                Ok::<_, ServiceError>(self.optimism_l1_fee(source, destination).await)
            } else {
                Ok(U256::ZERO)
            }
        };
        let bond_gas = async { Ok::<_, ServiceError>(self.estimate_bond_withdrawal_gas_limit(source, destination).await) };
        let (native_price, token_price, gas_price, bond_gas, l1_fee) = tokio::try_join!(
            self.prices().price_usd(native_canonical_symbol(destination)),
            self.prices().price_usd(&self.symbol),
            self.reader().gas_price(destination),
            bond_gas,
            l1_fee,
        )?;

        let gas_with_settlement = bond_gas + fees::settlement_gas_limit_per_tx(destination);
        let tx_fee = if source.is_l1() && relayable {
            self.relayer_fee(destination).await?
        } else {
            U256::from(gas_price) * U256::from(gas_with_settlement)
        };
        let tx_fee = tx_fee + l1_fee;

        let multiplier = match destination {
            ChainSlug::Ethereum | ChainSlug::Optimism | ChainSlug::Arbitrum => {
                Some(self.estimator.effective_config().await.destination_fee_gas_price_multiplier)
            }
            _ => None,
        };
        debug!(
            "destination tx fee: {} wei, native {} USD, token {} USD",
            tx_fee, native_price, token_price
        );
        fees::destination_fee(tx_fee, native_price, token_price, self.metadata.decimals, multiplier)
    }

    /// Target, calldata and sender of a representative bond withdrawal at the destination
    pub(crate) async fn bond_withdrawal_call(
        &self,
        source: ChainSlug,
        destination: ChainSlug,
        recipient: Option<Address>,
    ) -> Result<(Address, Bytes, Option<Address>), ServiceError> {
        let bridge = self.bridge_address(destination)?;
        let bonder = self.bonder_address(source, destination).await;
        let recipient = recipient.unwrap_or(PLACEHOLDER_RECIPIENT);
        let amount = U256::from(10u64);
        let bonder_fee = U256::from(1u64);
        let deadline = U256::from(self.default_deadline_seconds());

        // a deadline is always set, so AMM tokens distribute through the swap
        let data = if self.does_use_amm() && !destination.is_l1() {
            IL2Bridge::bondWithdrawalAndDistributeCall {
                recipient,
                amount,
                transferNonce: B256::ZERO,
                bonderFee: bonder_fee,
                amountOutMin: U256::ZERO,
                deadline,
            }
            .abi_encode()
        } else {
            IBridge::bondWithdrawalCall {
                recipient,
                amount,
                transferNonce: B256::ZERO,
                bonderFee: bonder_fee,
            }
            .abi_encode()
        };
        Ok((bridge, Bytes::from(data), bonder))
    }

    pub async fn populate_bond_withdrawal_tx(
        &self,
        source: ChainSlug,
        destination: ChainSlug,
        recipient: Option<Address>,
    ) -> Result<TransactionRequest, ServiceError> {
        let (bridge, data, bonder) = self.bond_withdrawal_call(source, destination, recipient).await?;
        let mut tx = TransactionRequest::default()
            .to(bridge)
            .input(TransactionInput::new(data));
        if let Some(bonder) = bonder {
            tx = tx.from(bonder);
        }
        Ok(tx)
    }

    /// Gas of a bond withdrawal at the destination, or a per-chain constant when estimation fails
    pub async fn estimate_bond_withdrawal_gas_limit(&self, source: ChainSlug, destination: ChainSlug) -> u64 {
        let estimate = async {
            let tx = self.populate_bond_withdrawal_tx(source, destination, None).await?;
            self.reader().estimate_gas(destination, tx).await
        };
        match estimate.await {
            Ok(gas) => gas,
            Err(e) => {
                let fallback = fees::bond_transfer_gas_limit(destination);
                error!(
                    "bond withdrawal gas estimation failed for {}->{}: {}; using {}",
                    source, destination, e, fallback
                );
                fallback
            }
        }
    }

    /// L1 data fee Optimism charges for the bond withdrawal, 0 when it cannot be priced
    pub async fn optimism_l1_fee(&self, source: ChainSlug, destination: ChainSlug) -> U256 {
        let fee = async {
            let (gas_limit, call) = tokio::join!(
                self.estimate_bond_withdrawal_gas_limit(source, destination),
                self.bond_withdrawal_call(source, destination, None)
            );
            let (to, data, _) = call?;
            let gas_price = self.reader().gas_price(ChainSlug::Optimism).await?;
            let tx = TxLegacy {
                chain_id: None,
                nonce: 0,
                gas_price,
                gas_limit,
                to: TxKind::Call(to),
                value: U256::ZERO,
                input: data,
            };
            let serialized = Bytes::from(tx.encoded_for_signing());
            self.reader()
                .l1_data_fee(ChainSlug::Optimism, OPTIMISM_GAS_PRICE_ORACLE, serialized)
                .await
        };
        match fee.await {
            Ok(fee) => fee,
            Err(e) => {
                error!("optimism L1 fee unavailable: {}", e);
                U256::ZERO
            }
        }
    }

    /// Native cost of relaying an L1 deposit to `destination`
    pub async fn relayer_fee(&self, destination: ChainSlug) -> Result<U256, ServiceError> {
        let config = self.estimator.effective_config().await;
        if !config.is_relayer_fee_enabled(destination) {
            return Ok(U256::ZERO);
        }
        if destination == ChainSlug::Arbitrum {
            let gas_price = self.reader().gas_price(destination).await?;
            return Ok(U256::from(gas_price) * U256::from(fees::DEFAULT_RELAY_GAS_LIMIT));
        }
        Ok(U256::ZERO)
    }

    /// Amount out, fees and price impact for a transfer
    ///
    /// # Arguments
    ///
    /// * `amount` - Amount of the canonical token (or hToken) sent
    /// * `source` - Source chain
    /// * `destination` - Destination chain
    /// * `is_htoken_send` - Whether hTokens are sent, which skips the fee AMM adjustment
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn send_data(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        is_htoken_send: bool,
    ) -> Result<SendData, ServiceError> {
        let htoken_amount = self.calc_to_htoken(amount, source).await?;
        let lp_fees = self.lp_fees(amount, source, destination)?;

        let amount_in_no_slippage = U256::from(fees::AMOUNT_IN_NO_SLIPPAGE);
        let (amount_out, amount_out_no_slippage, bonder_fee_relative, destination_tx_fee) = tokio::try_join!(
            self.calc_from_htoken(htoken_amount, destination),
            self.amount_out(amount_in_no_slippage, source, destination),
            self.bonder_fee_relative(amount, source, destination),
            self.destination_transaction_fee(source, destination),
        )?;

        let relayable = self.network().is_relayable(destination);
        let (adjusted_bonder_fee, adjusted_destination_tx_fee) = if source.is_l1() && !relayable {
            (U256::ZERO, U256::ZERO)
        } else if source.is_l1() {
            (U256::ZERO, destination_tx_fee)
        } else {
            let (bonder_fee, destination_fee) = if is_htoken_send {
                (bonder_fee_relative, destination_tx_fee)
            } else {
                // fees are charged in hTokens; express them in the canonical token
                tokio::try_join!(
                    self.calc_from_htoken(bonder_fee_relative, destination),
                    self.calc_from_htoken(destination_tx_fee, destination),
                )?
            };
            let absolute = self.bonder_fee_absolute(source).await?;
            (fees::enforce_absolute_minimum(bonder_fee, absolute), destination_fee)
        };
        let total_fee = adjusted_bonder_fee
            .checked_add(adjusted_destination_tx_fee)
            .ok_or_else(fees::amount_too_large)?;

        let decimals = self.metadata.decimals;
        let rate = fees::rate(amount, amount_out, decimals, decimals)?;
        let market_rate = fees::rate(amount_in_no_slippage, amount_out_no_slippage, decimals, decimals)?;

        Ok(SendData {
            amount_out,
            rate,
            price_impact: fees::price_impact(rate, market_rate),
            required_liquidity: htoken_amount,
            lp_fees,
            adjusted_bonder_fee,
            adjusted_destination_tx_fee,
            total_fee,
            estimated_received: fees::estimated_received(amount_out, total_fee),
        })
    }

    pub async fn total_fee(&self, amount: U256, source: ChainSlug, destination: ChainSlug) -> Result<U256, ServiceError> {
        Ok(self.send_data(amount, source, destination, false).await?.total_fee)
    }

    /// Quote a single swap between the canonical token and the hToken on an L2
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn amm_data(
        &self,
        chain: ChainSlug,
        amount: U256,
        is_to_htoken: bool,
        slippage_tolerance: f64,
    ) -> Result<AmmData, ServiceError> {
        let amount_in_no_slippage = U256::from(fees::AMOUNT_IN_NO_SLIPPAGE);
        let (amount_out, amount_out_no_slippage) = if is_to_htoken {
            tokio::try_join!(
                self.calc_to_htoken(amount, chain),
                self.calc_to_htoken(amount_in_no_slippage, chain)
            )?
        } else {
            tokio::try_join!(
                self.calc_from_htoken(amount, chain),
                self.calc_from_htoken(amount_in_no_slippage, chain)
            )?
        };

        let decimals = self.metadata.decimals;
        let rate = fees::rate(amount, amount_out, decimals, decimals)?;
        let market_rate = fees::rate(amount_in_no_slippage, amount_out_no_slippage, decimals, decimals)?;

        Ok(AmmData {
            rate,
            price_impact: fees::price_impact(rate, market_rate),
            amount_out_min: fees::amount_out_min(amount_out, slippage_tolerance)?,
            lp_fee_amount: fees::amm_lp_fee_amount(amount, decimals, decimals)?,
        })
    }

    pub fn calc_amount_out_min(&self, amount_out: U256, slippage_tolerance: f64) -> Result<U256, ServiceError> {
        fees::amount_out_min(amount_out, slippage_tolerance)
    }

    /// Whether the L1 bridge has paused deposits to `destination`
    pub async fn is_destination_chain_paused(&self, destination: ChainSlug) -> Result<bool, ServiceError> {
        let chain_id = self.chain_id(destination)?;
        self.reader().is_chain_id_paused(self.l1_bridge_address()?, chain_id).await
    }

    pub async fn challenge_period(&self) -> Result<U256, ServiceError> {
        self.reader().challenge_period(self.l1_bridge_address()?).await
    }

    pub async fn time_slot_size(&self) -> Result<U256, ServiceError> {
        self.reader().time_slot_size(self.l1_bridge_address()?).await
    }

    pub async fn time_slot(&self, time: U256) -> Result<U256, ServiceError> {
        self.reader().time_slot(self.l1_bridge_address()?, time).await
    }

    pub async fn time_slot_to_amount_bonded(&self, time_slot: U256, bonder: Address) -> Result<U256, ServiceError> {
        self.reader()
            .time_slot_to_amount_bonded(self.l1_bridge_address()?, time_slot, bonder)
            .await
    }

    /// Canonical and hToken balances of the chain's AMM
    pub async fn saddle_swap_reserves(&self, chain: ChainSlug) -> Result<(U256, U256), ServiceError> {
        let swap = self.saddle_swap_address(chain)?;
        tokio::try_join!(
            self.reader().swap_token_balance(chain, swap, CANONICAL_TOKEN_INDEX),
            self.reader().swap_token_balance(chain, swap, HOP_BRIDGE_TOKEN_INDEX)
        )
    }

    pub async fn reserves_total(&self, chain: ChainSlug) -> Result<U256, ServiceError> {
        let (canonical, htoken) = self.saddle_swap_reserves(chain).await?;
        Ok(canonical + htoken)
    }

    pub async fn tvl_usd(&self, chain: ChainSlug) -> Result<f64, ServiceError> {
        let (tvl, price) = tokio::try_join!(self.reserves_total(chain), self.prices().price_usd(&self.symbol))?;
        if tvl.is_zero() {
            return Ok(0.0);
        }
        Ok((fees::from_base_units(tvl, self.metadata.decimals) * price).max(0.0))
    }

    pub async fn account_lp_balance(&self, chain: ChainSlug, account: Address) -> Result<U256, ServiceError> {
        let lp_token = self.saddle_lp_token_address(chain)?;
        self.reader().token_balance(chain, lp_token, account).await
    }

    /// LP token balance valued in the canonical token through the pool's virtual price
    pub async fn account_lp_canonical_balance(&self, chain: ChainSlug, account: Address) -> Result<U256, ServiceError> {
        let swap = self.saddle_swap_address(chain)?;
        let (balance, virtual_price) = tokio::try_join!(
            self.account_lp_balance(chain, account),
            self.reader().virtual_price(chain, swap)
        )?;
        Ok(balance * virtual_price / U256::from(10u64).pow(U256::from(18u64)))
    }

    pub async fn account_lp_canonical_balance_usd(&self, chain: ChainSlug, account: Address) -> Result<f64, ServiceError> {
        let (balance, price) = tokio::try_join!(
            self.account_lp_canonical_balance(chain, account),
            self.prices().price_usd(&self.symbol)
        )?;
        if balance.is_zero() {
            return Ok(0.0);
        }
        Ok((fees::from_base_units(balance, 18) * price).max(0.0))
    }
}
