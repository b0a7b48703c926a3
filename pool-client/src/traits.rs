//! The ledger seam consumed by the withdrawal driver

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use common::types::{receipt::TxReceipt, ring::RingPublicKey, token::AmountTier};

use crate::errors::PoolClientError;

/// The set of ledger queries and submissions needed to withdraw from a ring
///
/// Implemented by [`crate::PoolClient`] against a live node, and by in-memory
/// mocks in tests
#[async_trait]
pub trait PoolLedger: Send + Sync {
    // -----------
    // | Getters |
    // -----------

    /// The address of the pool contract
    fn pool_address(&self) -> Address;

    /// The address of the account submitting transactions
    fn caller_address(&self) -> Address;

    /// Get the hash of a ring; empty or short while the ring is open
    async fn get_ring_hash(&self, tier: AmountTier, index: u64) -> Result<Bytes, PoolClientError>;

    /// Get the number of blocks left before the ring may be closed manually
    async fn get_force_close_blocks_left(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<u64, PoolClientError>;

    /// Get the `(deposited, withdrawn)` participant counts of a ring
    async fn get_participants(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<(u64, u64), PoolClientError>;

    /// Get the fixed capacity roster of a ring, including placeholders
    async fn get_public_keys(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<Vec<RingPublicKey>, PoolClientError>;

    // ----------------
    // | Transactions |
    // ----------------

    /// Estimate the gas needed to execute a transaction
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, PoolClientError>;

    /// Get the current nonce of an account
    async fn get_transaction_count(&self, address: Address) -> Result<u64, PoolClientError>;

    /// Broadcast a transaction and await its receipt
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxReceipt, PoolClientError>;
}
