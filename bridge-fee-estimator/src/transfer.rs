//! Unsigned transaction builders for sends and approvals
//!
//! Nothing here signs or broadcasts. Every builder returns a `TransactionRequest`
//! the caller's wallet completes.

use alloy::{
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
};
use tracing::{debug, error, info, instrument};

use crate::{
    contracts::{IL1Bridge, IL2AmmWrapper, IL2Bridge, IERC20},
    error::ServiceError,
    estimator::{calldata, require, TokenBridge},
    fees,
    models::{ChainSlug, SendOptions},
};

/// Gas limit given to send transactions while estimating them
pub const SEND_GAS_ESTIMATE_LIMIT: u64 = 500_000;

/// Gas settings applied on top of a populated transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOverrides {
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

impl TxOverrides {
    pub fn apply(&self, mut tx: TransactionRequest) -> TransactionRequest {
        if let Some(gas_price) = self.gas_price {
            tx.gas_price = Some(gas_price);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx.gas = Some(gas_limit);
        }
        tx
    }
}

fn recipient(options: &SendOptions) -> Result<Address, ServiceError> {
    options
        .recipient
        .ok_or_else(|| ServiceError::InvalidInput("recipient is required".to_string()))
}

/// A caller-supplied fee of zero counts as unset
fn nonzero(value: Option<U256>) -> Option<U256> {
    value.filter(|v| !v.is_zero())
}

impl TokenBridge {
    /// Gas price bump from the network config plus the polygon minimums
    pub async fn tx_overrides(&self, chain: ChainSlug) -> Result<TxOverrides, ServiceError> {
        let multiplier = self.network().gas_price_multiplier;
        let mut overrides = TxOverrides::default();
        if multiplier > 0.0 {
            let gas_price = self.reader().gas_price(chain).await?;
            overrides.gas_price = Some(fees::bump_gas_price(gas_price, multiplier));
        }

        // not every polygon node enforces the recommended minimum
        if chain == ChainSlug::Polygon {
            overrides.gas_price = overrides
                .gas_price
                .map(|price| price.max(fees::MIN_POLYGON_GAS_PRICE));
            overrides.gas_limit = Some(fees::MIN_POLYGON_GAS_LIMIT);
        }
        Ok(overrides)
    }

    /// Fail unless `sender` allowed `spender` to move at least `amount` of `token`
    async fn ensure_allowance(
        &self,
        chain: ChainSlug,
        token: Option<Address>,
        sender: Option<Address>,
        spender: Address,
        amount: U256,
    ) -> Result<(), ServiceError> {
        let sender =
            sender.ok_or_else(|| ServiceError::InvalidInput("sender is required to check allowance".to_string()))?;
        let token = require(token, "canonical token", &self.symbol, chain)?;
        let allowance = self.reader().allowance(chain, token, sender, spender).await?;
        if allowance < amount {
            return Err(ServiceError::NotEnoughAllowance(format!(
                "allowance {} is below amount {}",
                allowance, amount
            )));
        }
        Ok(())
    }

    async fn ensure_not_paused(&self, destination: ChainSlug) -> Result<(), ServiceError> {
        if self.is_destination_chain_paused(destination).await? {
            let name = self.network().chain(destination)?.name;
            return Err(ServiceError::DestinationPaused(name));
        }
        Ok(())
    }

    /// Build the unsigned send transaction for a transfer of the canonical token
    #[instrument(skip(self, options), fields(token = %self.symbol), err)]
    pub async fn populate_send_tx(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        options: &SendOptions,
    ) -> Result<TransactionRequest, ServiceError> {
        if source.is_l1() {
            if destination.is_l1() {
                return Err(ServiceError::InvalidInput("Cannot send from layer 1 to layer 1".to_string()));
            }
            let relayer_fee = match nonzero(options.relayer_fee) {
                Some(fee) => fee,
                None => self.total_fee(amount, source, destination).await?,
            };
            return self.populate_send_l1_to_l2_tx(amount, destination, relayer_fee, options).await;
        }

        let bonder_fee = match nonzero(options.bonder_fee) {
            Some(fee) => fee,
            None => self.total_fee(amount, source, destination).await?,
        };
        if bonder_fee > amount {
            return Err(ServiceError::InvalidInput(format!(
                "amount must be greater than bonder fee. amount: {}, bonderFee: {}",
                amount, bonder_fee
            )));
        }
        self.populate_send_from_l2_tx(amount, source, destination, bonder_fee, options)
            .await
    }

    async fn populate_send_l1_to_l2_tx(
        &self,
        amount: U256,
        destination: ChainSlug,
        relayer_fee: U256,
        options: &SendOptions,
    ) -> Result<TransactionRequest, ServiceError> {
        let source = ChainSlug::Ethereum;
        let relayer = match options.relayer {
            Some(relayer) => relayer,
            None => self.bonder_address(source, destination).await.ok_or_else(|| {
                ServiceError::MissingConfig(format!("no relayer for {} {}->{}", self.symbol, source, destination))
            })?,
        };
        let deadline = options.deadline.unwrap_or_else(|| self.default_deadline_seconds());
        let amount_out_min = options.amount_out_min.unwrap_or_default();
        let recipient = recipient(options)?;

        let l1_bridge = self.l1_bridge_address()?;
        let is_native = self.is_native_token(source);
        if options.check_allowance && !is_native {
            let token = self.canonical_token(source)?;
            self.ensure_allowance(source, token.address, options.sender, l1_bridge, amount)
                .await?;
        }

        let (overrides, _) = tokio::try_join!(self.tx_overrides(source), self.ensure_not_paused(destination))?;

        let call = IL1Bridge::sendToL2Call {
            chainId: U256::from(self.chain_id(destination)?),
            recipient,
            amount,
            amountOutMin: amount_out_min,
            deadline: U256::from(deadline),
            relayer,
            relayerFee: relayer_fee,
        };
        let mut tx = TransactionRequest::default().to(l1_bridge).input(calldata(&call));
        if is_native {
            tx.value = Some(amount);
        }
        tx.from = options.sender;
        debug!("populated sendToL2 to {} for {}", destination, recipient);
        Ok(overrides.apply(tx))
    }

    async fn populate_send_from_l2_tx(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        bonder_fee: U256,
        options: &SendOptions,
    ) -> Result<TransactionRequest, ServiceError> {
        let amount_out_min = options.amount_out_min.unwrap_or_default();
        let default_deadline = self.default_deadline_seconds();
        let (deadline, destination_amount_out_min, destination_deadline) = if destination.is_l1() {
            // destination values are always 0 going to L1
            (options.deadline.unwrap_or(default_deadline), U256::ZERO, 0)
        } else {
            let or_default = |value: Option<u64>| match value {
                Some(v) if v > 0 => v,
                _ => default_deadline,
            };
            (
                or_default(options.deadline),
                options.destination_amount_out_min.unwrap_or_default(),
                or_default(options.destination_deadline),
            )
        };
        let recipient = recipient(options)?;

        let attempt_swap = self.does_use_amm() && (amount_out_min > U256::ZERO || deadline > 0);
        let l2_bridge = self.l2_bridge_address(source)?;
        let target = if attempt_swap {
            self.amm_wrapper_address(source)?
        } else {
            l2_bridge
        };

        let is_native = self.is_native_token(source);
        if options.check_allowance && !is_native {
            let token = self.canonical_token(source)?;
            self.ensure_allowance(source, token.address, options.sender, target, amount)
                .await?;
        }

        let chain_id = U256::from(self.chain_id(destination)?);
        let input = if attempt_swap {
            calldata(&IL2AmmWrapper::swapAndSendCall {
                chainId: chain_id,
                recipient,
                amount,
                bonderFee: bonder_fee,
                amountOutMin: amount_out_min,
                deadline: U256::from(deadline),
                destinationAmountOutMin: destination_amount_out_min,
                destinationDeadline: U256::from(destination_deadline),
            })
        } else {
            calldata(&IL2Bridge::sendCall {
                chainId: chain_id,
                recipient,
                amount,
                bonderFee: bonder_fee,
                amountOutMin: destination_amount_out_min,
                deadline: U256::from(destination_deadline),
            })
        };

        let mut tx = TransactionRequest::default().to(target).input(input);
        if is_native {
            tx.value = Some(amount);
        }
        tx.from = options.sender;
        Ok(self.tx_overrides(source).await?.apply(tx))
    }

    /// Build the unsigned transaction sending hTokens between L1 and an L2
    #[instrument(skip(self, options), fields(token = %self.symbol), err)]
    pub async fn populate_send_htokens_tx(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        options: &SendOptions,
    ) -> Result<TransactionRequest, ServiceError> {
        if source.is_l1() && destination.is_l1() {
            return Err(ServiceError::InvalidInput(
                "sourceChain and destinationChain cannot both be L1".to_string(),
            ));
        }
        if !source.is_l1() && !destination.is_l1() {
            return Err(ServiceError::InvalidInput(
                "Sending hToken L2 to L2 is not currently supported".to_string(),
            ));
        }
        let set = |value: Option<u64>| value.is_some_and(|v| v > 0);
        if set(options.deadline)
            || set(options.destination_deadline)
            || nonzero(options.amount_out_min).is_some()
            || nonzero(options.destination_amount_out_min).is_some()
        {
            return Err(ServiceError::InvalidInput("Invalid sendHToken option".to_string()));
        }

        let bonder_fee = match nonzero(options.bonder_fee) {
            Some(fee) => fee,
            None if source.is_l1() => U256::ZERO,
            None => self.total_fee(amount, source, destination).await?,
        };
        let recipient = recipient(options)?;
        let chain_id = U256::from(self.chain_id(destination)?);

        let mut tx = if source.is_l1() {
            if bonder_fee > U256::ZERO && !self.network().is_relayable(destination) {
                return Err(ServiceError::InvalidInput(
                    "Bonder fee should be 0 when sending hToken to a non-relayable L2".to_string(),
                ));
            }
            let relayer = self.bonder_address(source, destination).await.ok_or_else(|| {
                ServiceError::MissingConfig(format!("no relayer for {} {}->{}", self.symbol, source, destination))
            })?;
            self.ensure_not_paused(destination).await?;

            let call = IL1Bridge::sendToL2Call {
                chainId: chain_id,
                recipient,
                amount,
                amountOutMin: U256::ZERO,
                deadline: U256::ZERO,
                relayer,
                relayerFee: bonder_fee,
            };
            let mut tx = TransactionRequest::default()
                .to(self.l1_bridge_address()?)
                .input(calldata(&call));
            if self.is_native_token(source) {
                tx.value = Some(amount);
            }
            tx
        } else {
            if bonder_fee.is_zero() {
                return Err(ServiceError::InvalidInput("Send at least the minimum Bonder fee".to_string()));
            }
            let call = IL2Bridge::sendCall {
                chainId: chain_id,
                recipient,
                amount,
                bonderFee: bonder_fee,
                amountOutMin: U256::ZERO,
                deadline: U256::ZERO,
            };
            TransactionRequest::default()
                .to(self.l2_bridge_address(source)?)
                .input(calldata(&call))
        };
        tx.from = options.sender;
        Ok(self.tx_overrides(source).await?.apply(tx))
    }

    /// Contract a sender approves before sending from `source`
    pub fn send_approval_address(&self, source: ChainSlug, is_htoken: bool) -> Result<Address, ServiceError> {
        if source.is_l1() {
            return self.l1_bridge_address();
        }
        if is_htoken || !self.does_use_amm() {
            self.l2_bridge_address(source)
        } else {
            self.amm_wrapper_address(source)
        }
    }

    /// Token the sender must approve: the hToken for hToken sends, else the canonical token
    fn send_token_address(&self, chain: ChainSlug, is_htoken: bool) -> Result<Address, ServiceError> {
        let token = if is_htoken && !chain.is_l1() {
            self.htoken(chain)?
        } else {
            self.canonical_token(chain)?
        };
        require(token.address, &token.symbol, &self.symbol, chain)
    }

    /// ERC-20 approval of the send spender, or `None` when the native token is sent
    pub async fn populate_send_approval_tx(
        &self,
        amount: U256,
        source: ChainSlug,
        is_htoken: bool,
    ) -> Result<Option<TransactionRequest>, ServiceError> {
        let spender = self.send_approval_address(source, is_htoken)?;
        if self.is_native_token(source) {
            return Ok(None);
        }
        let token = self.send_token_address(source, is_htoken)?;
        let call = IERC20::approveCall { spender, amount };
        Ok(Some(TransactionRequest::default().to(token).input(calldata(&call))))
    }

    pub async fn needs_approval(
        &self,
        amount: U256,
        chain: ChainSlug,
        owner: Address,
        is_htoken: bool,
    ) -> Result<bool, ServiceError> {
        if self.is_native_token(chain) && !(is_htoken && !chain.is_l1()) {
            return Ok(false);
        }
        let spender = self.send_approval_address(chain, is_htoken)?;
        let token = self.send_token_address(chain, is_htoken)?;
        let allowance = self.reader().allowance(chain, token, owner, spender).await?;
        Ok(allowance < amount)
    }

    /// Gas the populated send transaction uses on the source chain
    pub async fn estimate_send_gas_limit(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        options: &SendOptions,
    ) -> Result<u64, ServiceError> {
        let mut tx = self.populate_send_tx(amount, source, destination, options).await?;
        if tx.from.is_none() {
            // estimation needs a sender
            tx.from = self.bonder_address(source, destination).await;
        }
        tx.gas = Some(SEND_GAS_ESTIMATE_LIMIT);
        self.reader().estimate_gas(source, tx).await
    }

    /// Native cost of the send transaction on the source chain, in wei
    pub async fn send_estimated_gas_cost(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
        options: &SendOptions,
    ) -> Result<U256, ServiceError> {
        let (gas_limit, gas_price) = tokio::try_join!(
            self.estimate_send_gas_limit(amount, source, destination, options),
            self.reader().gas_price(source)
        )?;
        Ok(U256::from(gas_price) * U256::from(gas_limit))
    }

    /// Whether delivering the native token to `recipient` at the destination would revert
    pub async fn will_transfer_fail(&self, source: ChainSlug, destination: ChainSlug, recipient: Address) -> bool {
        if !self.is_native_token(destination) {
            return false;
        }
        let simulation = async {
            let tx = if source.is_l1() {
                let mut tx = TransactionRequest::default().to(recipient).value(U256::from(1u64));
                tx.from = self.bonder_address(source, destination).await;
                tx
            } else {
                self.populate_bond_withdrawal_tx(source, destination, Some(recipient))
                    .await?
            };
            self.reader().estimate_gas(destination, tx).await
        };
        match simulation.await {
            Ok(gas) => {
                info!("transfer to {} on {} estimates at {} gas", recipient, destination, gas);
                false
            }
            Err(e) => {
                error!("willTransferFail error: {}", e);
                true
            }
        }
    }
}
