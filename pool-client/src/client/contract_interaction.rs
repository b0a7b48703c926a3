//! Implements the ledger interface for `PoolClient` against the live pool
//! contract

use std::time::Duration;

use alloy::{network::TransactionBuilder, providers::Provider, rpc::types::TransactionRequest};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use common::types::{receipt::TxReceipt, ring::RingPublicKey, token::AmountTier};
use tracing::{info, instrument};

use crate::{
    conversion::{index_to_u256, tier_to_u256, to_ring_public_keys, to_tx_receipt, u256_to_u64},
    errors::PoolClientError,
    traits::PoolLedger,
};

use super::PoolClient;

/// The timeout for awaiting the receipt of a pending transaction
const TX_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// The multiple of the gas price estimate we use for submitting a transaction
const GAS_PRICE_MULTIPLIER: u128 = 2;

impl PoolClient {
    /// Get the adjusted gas price for submitting a transaction
    ///
    /// We double the latest gas price to avoid stalling in the mempool
    async fn get_adjusted_gas_price(&self) -> Result<u128, PoolClientError> {
        let gas_price = self.provider().get_gas_price().await.map_err(PoolClientError::rpc)?;
        Ok(gas_price * GAS_PRICE_MULTIPLIER)
    }
}

#[async_trait]
impl PoolLedger for PoolClient {
    // -----------
    // | Getters |
    // -----------

    fn pool_address(&self) -> Address {
        *self.pool.address()
    }

    fn caller_address(&self) -> Address {
        self.caller
    }

    #[instrument(skip_all, err, fields(tier = %tier, index = index))]
    async fn get_ring_hash(&self, tier: AmountTier, index: u64) -> Result<Bytes, PoolClientError> {
        self.pool
            .getRingHash(tier_to_u256(tier), index_to_u256(index))
            .call()
            .await
            .map_err(PoolClientError::contract_interaction)
    }

    #[instrument(skip_all, err, fields(tier = %tier, index = index))]
    async fn get_force_close_blocks_left(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<u64, PoolClientError> {
        let blocks_left = self
            .pool
            .getForceCloseBlocksLeft(tier_to_u256(tier), index_to_u256(index))
            .call()
            .await
            .map_err(PoolClientError::contract_interaction)?;

        u256_to_u64(blocks_left)
    }

    #[instrument(skip_all, err, fields(tier = %tier, index = index))]
    async fn get_participants(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<(u64, u64), PoolClientError> {
        let participants = self
            .pool
            .getParticipants(tier_to_u256(tier), index_to_u256(index))
            .call()
            .await
            .map_err(PoolClientError::contract_interaction)?;

        Ok((u256_to_u64(participants.deposited)?, u256_to_u64(participants.withdrawn)?))
    }

    #[instrument(skip_all, err, fields(tier = %tier, index = index))]
    async fn get_public_keys(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<Vec<RingPublicKey>, PoolClientError> {
        let keys = self
            .pool
            .getPublicKeys(tier_to_u256(tier), index_to_u256(index))
            .call()
            .await
            .map_err(PoolClientError::contract_interaction)?;

        Ok(to_ring_public_keys(&keys))
    }

    // ----------------
    // | Transactions |
    // ----------------

    #[instrument(skip_all, err)]
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, PoolClientError> {
        self.provider()
            .estimate_gas(tx.clone())
            .await
            .map_err(PoolClientError::contract_interaction)
    }

    #[instrument(skip_all, err, fields(address = %address))]
    async fn get_transaction_count(&self, address: Address) -> Result<u64, PoolClientError> {
        self.provider().get_transaction_count(address).await.map_err(PoolClientError::rpc)
    }

    #[instrument(skip_all, err, fields(tx_hash))]
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxReceipt, PoolClientError> {
        let gas_price = self.get_adjusted_gas_price().await?;
        let pending_tx = self
            .provider()
            .send_transaction(tx.with_gas_price(gas_price))
            .await
            .map_err(PoolClientError::contract_interaction)?;

        let tx_hash = format!("{:#x}", pending_tx.tx_hash());
        tracing::Span::current().record("tx_hash", tx_hash.as_str());
        info!("pending tx hash: {tx_hash}");

        let receipt = pending_tx
            .with_timeout(Some(TX_RECEIPT_TIMEOUT))
            .get_receipt()
            .await
            .map_err(PoolClientError::contract_interaction)?;

        // Check for failure
        if !receipt.status() {
            let error_msg = format!("tx ({:#x}) failed with status 0", receipt.transaction_hash);
            return Err(PoolClientError::TxReverted(error_msg));
        }

        Ok(to_tx_receipt(&receipt))
    }
}
