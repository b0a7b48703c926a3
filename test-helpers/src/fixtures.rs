//! Fixtures for building tokens and ring rosters

use alloy_primitives::Address;
use common::types::{
    ring::RingPublicKey,
    token::{AmountTier, WithdrawalSecret, WithdrawalToken},
};
use constants::FIELD_BYTE_LENGTH;
use itertools::Itertools;
use rand::{RngCore, thread_rng};
use ring_crypto::{LsagSigner, RingSigner, conversion::point_to_coordinates};

/// Generate a random withdrawal secret
pub fn random_secret() -> WithdrawalSecret {
    let mut bytes = [0u8; FIELD_BYTE_LENGTH];
    thread_rng().fill_bytes(&mut bytes);
    WithdrawalSecret::new(bytes)
}

/// Build a token for the given ring and secret
pub fn token_for(tier: AmountTier, ring_index: u64, secret: WithdrawalSecret) -> WithdrawalToken {
    WithdrawalToken { amount_tier: tier, ring_index, secret }
}

/// The roster entry a depositor with `secret` would publish for withdrawals
/// from `address`
pub fn roster_entry(secret: &WithdrawalSecret, address: &Address) -> RingPublicKey {
    let keypair = LsagSigner.derive_stealth_keypair(secret.as_bytes(), address);
    let (x, y) = point_to_coordinates(&keypair.public_point);
    RingPublicKey::new(x, y)
}

/// A roster of `n` depositors with random secrets, none of which belong to
/// the caller
pub fn stranger_roster(n: usize, address: &Address) -> Vec<RingPublicKey> {
    (0..n).map(|_| roster_entry(&random_secret(), address)).collect_vec()
}

/// A roster holding the caller's entry at `position` among `n - 1` strangers
pub fn roster_with_member(
    n: usize,
    position: usize,
    secret: &WithdrawalSecret,
    address: &Address,
) -> Vec<RingPublicKey> {
    let mut roster = stranger_roster(n - 1, address);
    roster.insert(position, roster_entry(secret, address));
    roster
}
