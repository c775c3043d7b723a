//! Bonder liquidity at a transfer's destination
//!
//! The hosted liquidity snapshot is preferred because it already accounts for vault
//! balances; the destination bridge's credit and debit are read when it is missing.

use alloy::primitives::{Address, U256};
use futures::future::try_join_all;
use tracing::{debug, instrument, warn};

use crate::{
    error::ServiceError,
    estimator::TokenBridge,
    fees,
    models::{ChainSlug, LiquidityCheck},
};

impl TokenBridge {
    pub async fn credit(&self, chain: ChainSlug, bonder: Address) -> Result<U256, ServiceError> {
        let bridge = self.bridge_address(chain)?;
        self.reader().credit(chain, bridge, bonder).await
    }

    /// Debit including the sliding-window additional debit
    pub async fn total_debit(&self, chain: ChainSlug, bonder: Address) -> Result<U256, ServiceError> {
        let bridge = self.bridge_address(chain)?;
        self.reader().debit_and_additional_debit(chain, bridge, bonder).await
    }

    /// On-chain credit minus total debit of `bonder` at the destination
    pub async fn available_liquidity(&self, destination: ChainSlug, bonder: Address) -> Result<U256, ServiceError> {
        let (credit, debit) = tokio::try_join!(self.credit(destination, bonder), self.total_debit(destination, bonder))?;
        Ok(credit.saturating_sub(debit))
    }

    /// Transfer-root amount not yet bonded for the route, 0 when unknown
    pub async fn unbonded_transfer_root_amount(&self, source: ChainSlug, destination: ChainSlug) -> U256 {
        self.estimator
            .snapshots
            .available_liquidity()
            .await
            .and_then(|snapshot| {
                snapshot.unbonded_transfer_root_amount(&self.symbol, source.as_str(), destination.as_str())
            })
            .unwrap_or(U256::ZERO)
    }

    pub async fn base_available_credit_including_vault(
        &self,
        source: ChainSlug,
        destination: ChainSlug,
    ) -> Option<U256> {
        let snapshot = self.estimator.snapshots.available_liquidity().await?;
        snapshot.base_available_credit_including_vault(&self.symbol, source.as_str(), destination.as_str())
    }

    /// Balance the bonder keeps in a yield vault on `destination`, 0 when unknown
    pub async fn vault_balance(&self, destination: ChainSlug, bonder: Address) -> U256 {
        self.estimator
            .snapshots
            .available_liquidity()
            .await
            .and_then(|snapshot| {
                snapshot.bonder_vault_balance(&self.symbol, &bonder.to_string(), destination.as_str())
            })
            .unwrap_or(U256::ZERO)
    }

    /// Amounts sent from the bondable rollups to L1 that are not yet in a transfer root
    async fn pending_amounts_to_l1(&self) -> Result<U256, ServiceError> {
        let ethereum_chain_id = self.chain_id(ChainSlug::Ethereum)?;
        let reads = self
            .network()
            .bondable_chains
            .iter()
            .filter_map(|chain| {
                let bridge = self.network().bridge_addresses(&self.symbol, *chain)?.l2_bridge?;
                Some(self.reader().pending_amount_for_chain_id(*chain, bridge, ethereum_chain_id))
            })
            .collect::<Vec<_>>();
        let amounts = try_join_all(reads).await?;
        Ok(amounts.into_iter().fold(U256::ZERO, |total, amount| total + amount))
    }

    /// Liquidity the UI may promise for a route
    ///
    /// Transfers to L1 also reserve the rollups' pending amounts, the unbonded
    /// transfer-root amount and a USD buffer, and routes from a bondable rollup to L1
    /// only get half of what remains.
    #[instrument(skip(self), fields(token = %self.symbol), err)]
    pub async fn frontend_available_liquidity(
        &self,
        source: ChainSlug,
        destination: ChainSlug,
    ) -> Result<U256, ServiceError> {
        let (base_credit, unbonded_root_amount) = tokio::join!(
            self.base_available_credit_including_vault(source, destination),
            self.unbonded_transfer_root_amount(source, destination)
        );

        let mut available = match base_credit {
            Some(credit) => credit,
            None => {
                debug!("no liquidity snapshot for {}->{}, reading on-chain", source, destination);
                let bonder = self.bonder_address(source, destination).await.ok_or_else(|| {
                    ServiceError::MissingConfig(format!(
                        "bonder address not found for {} {}->{}",
                        self.symbol, source, destination
                    ))
                })?;
                self.available_liquidity(destination, bonder).await?
            }
        };

        if destination.is_l1() {
            let (pending_amounts, token_price) =
                tokio::try_join!(self.pending_amounts_to_l1(), self.prices().price_usd(&self.symbol))?;
            let buffer = fees::pending_buffer_in_tokens(token_price, self.decimals())?;

            available = available
                .saturating_sub(pending_amounts)
                .saturating_sub(unbonded_root_amount)
                .saturating_sub(buffer);

            if self.network().is_bondable(source) {
                available /= U256::from(2u64);
            }
        }
        Ok(available)
    }

    /// Compare the liquidity available to a route with what `amount` needs
    pub async fn check_liquidity(
        &self,
        amount: U256,
        source: ChainSlug,
        destination: ChainSlug,
    ) -> Result<LiquidityCheck, ServiceError> {
        let (available, required) = tokio::try_join!(
            self.frontend_available_liquidity(source, destination),
            self.required_liquidity(amount, source)
        )?;
        let check = LiquidityCheck::new(available, required);
        if !check.is_available {
            warn!(
                "insufficient liquidity for {} {}->{}: available {}, required {}",
                self.symbol, source, destination, available, required
            );
        }
        Ok(check)
    }
}
