//! Resolves a ring's readiness from on-chain state

use alloy_primitives::B256;
use common::types::{ring::RingState, token::AmountTier};
use constants::RING_HASH_LENGTH;
use pool_client::PoolLedger;
use tracing::instrument;

use crate::error::WithdrawalTaskError;

/// Interpret a raw ring hash; a ring is closed iff its hash is exactly
/// [`RING_HASH_LENGTH`] bytes
pub fn closed_ring_hash(raw_hash: &[u8]) -> Option<B256> {
    (raw_hash.len() == RING_HASH_LENGTH).then(|| B256::from_slice(raw_hash))
}

/// Resolve the state of a ring
///
/// Participant counts are only fetched once the force-close countdown has
/// elapsed, as they are only shown when the caller may close the ring
#[instrument(skip_all, err, fields(tier = %tier, index = index))]
pub async fn resolve_ring_state(
    ledger: &dyn PoolLedger,
    tier: AmountTier,
    index: u64,
) -> Result<RingState, WithdrawalTaskError> {
    let raw_hash =
        ledger.get_ring_hash(tier, index).await.map_err(|e| WithdrawalTaskError::ledger(&e))?;
    if let Some(hash) = closed_ring_hash(&raw_hash) {
        return Ok(RingState::closed(hash));
    }

    let blocks_left = ledger
        .get_force_close_blocks_left(tier, index)
        .await
        .map_err(|e| WithdrawalTaskError::ledger(&e))?;
    if blocks_left > 0 {
        return Ok(RingState::open(blocks_left, 0, 0));
    }

    let (deposited, withdrawn) =
        ledger.get_participants(tier, index).await.map_err(|e| WithdrawalTaskError::ledger(&e))?;
    Ok(RingState::open(0, deposited, withdrawn))
}
