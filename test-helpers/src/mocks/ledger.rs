//! An in-memory pool contract
//!
//! Rings are stored per `(tier, index)` and calls are validated the way the
//! contract validates them: ring closure, key image reuse, and the ring
//! signature itself are all checked before a call is accepted

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, U256, address, keccak256};
use alloy_sol_types::SolInterface;
use async_trait::async_trait;
use common::types::{receipt::TxReceipt, ring::RingPublicKey, token::AmountTier};
use constants::{RING_HASH_LENGTH, RING_MAX_PARTICIPANTS};
use itertools::Itertools;
use pool_client::{
    PoolLedger,
    abi::Heiswap::HeiswapCalls,
    conversion::u256_to_u64,
    errors::PoolClientError,
};
use ring_crypto::{
    RingSignature,
    conversion::{point_from_coordinates, u256_to_scalar},
    lsag::verify,
};
use tracing::debug;

/// The address the mock pool is deployed at
const MOCK_POOL_ADDRESS: Address = address!("0x4e15a9c0ffee000000000000000000000000beef");
/// The gas every accepted call is estimated to use
const MOCK_GAS: u64 = 250_000;

// ---------
// | Rings |
// ---------

/// The stored state of a single ring
#[derive(Clone, Debug, Default)]
pub struct MockRing {
    /// The ring hash; shorter than a full hash while the ring is open
    pub hash: Bytes,
    /// The blocks left before the ring may be closed manually
    pub force_close_blocks_left: u64,
    /// The number of deposits
    pub deposited: u64,
    /// The number of withdrawals
    pub withdrawn: u64,
    /// The roster, without padding
    pub public_keys: Vec<RingPublicKey>,
}

impl MockRing {
    /// A closed ring holding the given roster
    pub fn closed(public_keys: Vec<RingPublicKey>) -> Self {
        let mut ring = Self::open(0, public_keys);
        ring.close();
        ring
    }

    /// An open ring holding the given roster
    pub fn open(force_close_blocks_left: u64, public_keys: Vec<RingPublicKey>) -> Self {
        Self {
            hash: Bytes::new(),
            force_close_blocks_left,
            deposited: public_keys.len() as u64,
            withdrawn: 0,
            public_keys,
        }
    }

    /// Whether the ring is closed
    pub fn is_closed(&self) -> bool {
        self.hash.len() == RING_HASH_LENGTH
    }

    /// The roster as the contract returns it, padded with placeholders
    pub fn padded_roster(&self) -> Vec<RingPublicKey> {
        let mut roster = self.public_keys.clone();
        roster.resize(RING_MAX_PARTICIPANTS.max(roster.len()), RingPublicKey::PLACEHOLDER);
        roster
    }

    /// Close the ring, fixing its hash over the roster
    fn close(&mut self) {
        let preimage = self
            .public_keys
            .iter()
            .flat_map(|key| key.x.to_be_bytes::<32>().into_iter().chain(key.y.to_be_bytes::<32>()))
            .collect_vec();
        self.hash = Bytes::from(keccak256(preimage).to_vec());
    }
}

// ----------
// | Ledger |
// ----------

/// The mutable state behind the mock
#[derive(Default)]
struct LedgerState {
    /// The rings, keyed by tier and index
    rings: HashMap<(AmountTier, u64), MockRing>,
    /// The key images of accepted withdrawals
    spent_key_images: HashSet<[U256; 2]>,
    /// The number of transactions sent
    nonce: u64,
    /// The calldata of every transaction sent
    submissions: Vec<Bytes>,
    /// The name of every query made, in order
    queries: Vec<&'static str>,
    /// A revert reason forced onto every submission
    forced_revert: Option<String>,
    /// Queries that fail, with the diagnostic each fails with
    failing_queries: HashMap<&'static str, String>,
}

/// An in-memory [`PoolLedger`]
#[derive(Clone)]
pub struct MockPoolLedger {
    /// The shared state
    state: Arc<Mutex<LedgerState>>,
    /// The account submitting transactions
    caller: Address,
    /// A delay applied before every ledger call
    latency: Option<Duration>,
}

impl MockPoolLedger {
    /// Create an empty ledger called into by `caller`
    pub fn new(caller: Address) -> Self {
        Self { state: Default::default(), caller, latency: None }
    }

    /// Delay every ledger call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    // -----------
    // | Setters |
    // -----------

    /// Store a ring
    pub fn set_ring(&self, tier: AmountTier, index: u64, ring: MockRing) {
        self.state.lock().unwrap().rings.insert((tier, index), ring);
    }

    /// Revert every subsequent submission with the given reason
    pub fn force_revert(&self, reason: &str) {
        self.state.lock().unwrap().forced_revert = Some(reason.to_string());
    }

    /// Fail every subsequent call of the named query with the given
    /// diagnostic
    pub fn fail_query(&self, query: &'static str, diagnostic: &str) {
        self.state.lock().unwrap().failing_queries.insert(query, diagnostic.to_string());
    }

    // -----------
    // | Getters |
    // -----------

    /// The stored state of a ring
    pub fn ring(&self, tier: AmountTier, index: u64) -> Option<MockRing> {
        self.state.lock().unwrap().rings.get(&(tier, index)).cloned()
    }

    /// The calldata of every transaction sent, in order
    pub fn submissions(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// The names of every query made, in order
    pub fn queries(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().queries.clone()
    }

    /// The number of times the named query was made
    pub fn query_count(&self, name: &str) -> usize {
        self.state.lock().unwrap().queries.iter().filter(|q| **q == name).count()
    }

    // -----------
    // | Helpers |
    // -----------

    /// Record a query, wait out the configured latency, and fail the query
    /// if it is set to fail
    async fn enter(&self, query: &'static str) -> Result<(), PoolClientError> {
        self.state.lock().unwrap().queries.push(query);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.state.lock().unwrap().failing_queries.get(query) {
            Some(diagnostic) => Err(PoolClientError::rpc(diagnostic)),
            None => Ok(()),
        }
    }

    /// Look up a ring; unknown rings read as empty and open
    fn read_ring(&self, tier: AmountTier, index: u64) -> MockRing {
        self.ring(tier, index).unwrap_or_default()
    }

    /// Run a call against the ledger, committing its effects if `commit` is
    /// set
    fn execute(&self, input: &[u8], commit: bool) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.forced_revert {
            return Err(revert(reason));
        }

        let call = HeiswapCalls::abi_decode(input).map_err(|e| revert(&e.to_string()))?;
        match call {
            HeiswapCalls::withdraw(call) => {
                let key = ring_key(call.amountEther, call.index)?;
                let ring = state.rings.get(&key).cloned().unwrap_or_default();
                if !ring.is_closed() {
                    return Err(revert("Pool isn't closed"));
                }
                if state.spent_key_images.contains(&call.keyImage) {
                    return Err(revert("Signature has been used!"));
                }

                let message = [&ring.hash[..], call.receiver.as_slice()].concat();
                if !verify_call(&message, &ring.public_keys, call.c0, call.keyImage, &call.s) {
                    return Err(revert("Invalid signature"));
                }
                if ring.withdrawn >= ring.deposited {
                    return Err(revert("All ETH from current pool has been withdrawn"));
                }

                if commit {
                    state.spent_key_images.insert(call.keyImage);
                    if let Some(ring) = state.rings.get_mut(&key) {
                        ring.withdrawn += 1;
                    }
                }
            },

            HeiswapCalls::forceCloseRing(call) => {
                let key = ring_key(call.amountEther, call.index)?;
                let ring = state.rings.get(&key).cloned().unwrap_or_default();
                if ring.is_closed() {
                    return Err(revert("Ring already closed"));
                }
                if ring.force_close_blocks_left > 0 {
                    return Err(revert("Ring cannot be closed yet"));
                }
                if !verify_call(&ring.hash, &ring.public_keys, call.c0, call.keyImage, &call.s) {
                    return Err(revert("Invalid signature"));
                }

                if commit {
                    if let Some(ring) = state.rings.get_mut(&key) {
                        ring.close();
                    }
                }
            },

            _ => return Err(revert("unsupported call")),
        }

        Ok(())
    }
}

#[async_trait]
impl PoolLedger for MockPoolLedger {
    fn pool_address(&self) -> Address {
        MOCK_POOL_ADDRESS
    }

    fn caller_address(&self) -> Address {
        self.caller
    }

    async fn get_ring_hash(&self, tier: AmountTier, index: u64) -> Result<Bytes, PoolClientError> {
        self.enter("get_ring_hash").await?;
        Ok(self.read_ring(tier, index).hash)
    }

    async fn get_force_close_blocks_left(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<u64, PoolClientError> {
        self.enter("get_force_close_blocks_left").await?;
        Ok(self.read_ring(tier, index).force_close_blocks_left)
    }

    async fn get_participants(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<(u64, u64), PoolClientError> {
        self.enter("get_participants").await?;
        let ring = self.read_ring(tier, index);
        Ok((ring.deposited, ring.withdrawn))
    }

    async fn get_public_keys(
        &self,
        tier: AmountTier,
        index: u64,
    ) -> Result<Vec<RingPublicKey>, PoolClientError> {
        self.enter("get_public_keys").await?;
        Ok(self.read_ring(tier, index).padded_roster())
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, PoolClientError> {
        self.enter("estimate_gas").await?;
        let input = tx.input.input().cloned().unwrap_or_default();
        self.execute(&input, false /* commit */).map_err(PoolClientError::contract_interaction)?;

        Ok(MOCK_GAS)
    }

    async fn get_transaction_count(&self, _address: Address) -> Result<u64, PoolClientError> {
        self.enter("get_transaction_count").await?;
        Ok(self.state.lock().unwrap().nonce)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxReceipt, PoolClientError> {
        self.enter("send_transaction").await?;
        let input = tx.input.input().cloned().unwrap_or_default();
        self.execute(&input, true /* commit */).map_err(PoolClientError::TxReverted)?;

        let mut state = self.state.lock().unwrap();
        state.submissions.push(input.clone());
        state.nonce += 1;

        let tx_hash = keccak256([&input[..], state.nonce.to_be_bytes().as_slice()].concat());
        debug!("mock ledger accepted tx {tx_hash:#x}");
        Ok(TxReceipt { tx_hash, block_number: Some(state.nonce), gas_used: MOCK_GAS })
    }
}

// -----------
// | Helpers |
// -----------

/// Format a revert the way a node reports it
fn revert(reason: &str) -> String {
    format!("execution reverted: {reason}")
}

/// Map the contract's ring arguments onto a ring key
fn ring_key(amount_ether: U256, index: U256) -> Result<(AmountTier, u64), String> {
    let ether = u256_to_u64(amount_ether).map_err(|e| revert(&e.to_string()))?;
    let tier = AmountTier::from_ether(ether).ok_or_else(|| revert("Invalid amount"))?;
    let index = u256_to_u64(index).map_err(|e| revert(&e.to_string()))?;

    Ok((tier, index))
}

/// Verify a ring signature carried in a call against a roster
fn verify_call(
    message: &[u8],
    roster: &[RingPublicKey],
    c0: U256,
    key_image: [U256; 2],
    s: &[U256],
) -> bool {
    let ring = roster
        .iter()
        .filter(|key| !key.is_placeholder())
        .map(|key| point_from_coordinates(key.x, key.y))
        .collect::<Result<Vec<_>, _>>();
    let (Ok(ring), Ok(key_image)) = (ring, point_from_coordinates(key_image[0], key_image[1]))
    else {
        return false;
    };

    let signature = RingSignature {
        challenge: u256_to_scalar(c0),
        responses: s.iter().copied().map(u256_to_scalar).collect_vec(),
        key_image,
    };
    verify(message, &ring, &signature)
}

#[cfg(test)]
mod tests {
    use alloy::network::TransactionBuilder;

    use super::*;
    use crate::fixtures::{random_secret, roster_entry};

    /// The caller in tests
    const CALLER: Address = address!("0x00000000000000000000000000000000000ca11e");

    #[test]
    fn test_ring_closure() {
        let roster = vec![roster_entry(&random_secret(), &CALLER)];
        let mut ring = MockRing::open(0, roster);
        assert!(!ring.is_closed());
        assert_eq!(ring.padded_roster().len(), RING_MAX_PARTICIPANTS);

        ring.close();
        assert!(ring.is_closed());
    }

    #[tokio::test]
    async fn test_unknown_ring_is_open() {
        let ledger = MockPoolLedger::new(CALLER);
        let hash = ledger.get_ring_hash(AmountTier::One, 0).await.unwrap();
        let roster = ledger.get_public_keys(AmountTier::One, 0).await.unwrap();

        assert!(hash.is_empty());
        assert!(roster.iter().all(RingPublicKey::is_placeholder));
        assert_eq!(ledger.queries(), vec!["get_ring_hash", "get_public_keys"]);
    }

    #[tokio::test]
    async fn test_failing_query() {
        let ledger = MockPoolLedger::new(CALLER);
        ledger.fail_query("get_force_close_blocks_left", "connection reset");

        assert!(ledger.get_ring_hash(AmountTier::One, 0).await.is_ok());
        let err = ledger.get_force_close_blocks_left(AmountTier::One, 0).await.unwrap_err();
        assert_eq!(err.diagnostic(), "connection reset");
    }

    #[tokio::test]
    async fn test_garbage_calldata_reverts() {
        let ledger = MockPoolLedger::new(CALLER);
        let tx = TransactionRequest::default().with_input(Bytes::from(vec![1u8, 2, 3]));

        let err = ledger.estimate_gas(&tx).await.unwrap_err();
        assert!(err.diagnostic().starts_with("execution reverted"));
        assert!(ledger.submissions().is_empty());
    }
}
