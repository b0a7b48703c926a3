//! Locates the caller's stealth key within a ring's roster

use alloy_primitives::Address;
use common::types::{ring::RingPublicKey, token::WithdrawalSecret};
use constants::{CurvePoint, MIN_FORCE_CLOSE_PARTICIPANTS};
use itertools::Itertools;
use ring_crypto::{
    RingSigner, StealthKeypair,
    conversion::{point_from_coordinates, point_to_coordinates},
};

use crate::error::WithdrawalTaskError;

/// Which workflow the membership check serves
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MembershipPath {
    /// Withdrawing from a closed ring; any non-empty roster may proceed
    Withdraw,
    /// Closing an open ring; requires a minimum number of participants
    ForceClose,
}

/// The caller's position in a ring
#[derive(Clone, Debug)]
pub struct MembershipMatch {
    /// The zero-based index of the caller in the filtered ring
    pub index: usize,
    /// The caller's stealth keypair
    pub keypair: StealthKeypair,
    /// The filtered ring as curve points, in canonical order
    pub ring: Vec<CurvePoint>,
}

/// Whether a roster entry is an unfilled slot
pub fn is_placeholder(key: &RingPublicKey) -> bool {
    key.is_placeholder()
}

/// Remove unfilled slots from a roster, preserving order
pub fn filter_placeholders(roster: &[RingPublicKey]) -> Vec<RingPublicKey> {
    roster.iter().filter(|key| !is_placeholder(key)).copied().collect_vec()
}

/// Find the caller in a filtered roster
///
/// The first entry whose coordinates equal the caller's stealth public key
/// wins
pub fn find_member(
    ring: &[RingPublicKey],
    secret: &WithdrawalSecret,
    caller: &Address,
    signer: &dyn RingSigner,
    path: MembershipPath,
) -> Result<MembershipMatch, WithdrawalTaskError> {
    if path == MembershipPath::ForceClose && ring.len() < MIN_FORCE_CLOSE_PARTICIPANTS {
        return Err(WithdrawalTaskError::NotEnoughParticipants(ring.len()));
    }

    let keypair = signer.derive_stealth_keypair(secret.as_bytes(), caller);
    let (x, y) = point_to_coordinates(&keypair.public_point);
    let target = RingPublicKey::new(x, y);

    let index =
        ring.iter().position(|key| *key == target).ok_or(WithdrawalTaskError::NotAMember)?;
    let ring = to_curve_points(ring)?;

    Ok(MembershipMatch { index, keypair, ring })
}

/// Convert roster entries to curve points, rejecting any off the curve
fn to_curve_points(ring: &[RingPublicKey]) -> Result<Vec<CurvePoint>, WithdrawalTaskError> {
    ring.iter()
        .map(|key| {
            point_from_coordinates(key.x, key.y)
                .map_err(|e| WithdrawalTaskError::InvalidRing(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{U256, address};
    use ring_crypto::LsagSigner;

    use super::*;

    /// The caller's address in tests
    const CALLER: Address = address!("0xcacacacacacacacacacacacacacacacacacacaca");

    /// The roster entry of the stealth key for `secret` and `address`
    fn entry(secret: u8, address: Address) -> RingPublicKey {
        let kp = LsagSigner.derive_stealth_keypair(&[secret; 32], &address);
        let (x, y) = point_to_coordinates(&kp.public_point);
        RingPublicKey::new(x, y)
    }

    /// The withdrawal secret with every byte set to `secret`
    fn secret(secret: u8) -> WithdrawalSecret {
        WithdrawalSecret::new([secret; 32])
    }

    #[test]
    fn test_filter_placeholders() {
        let roster = vec![
            entry(1, CALLER),
            RingPublicKey::PLACEHOLDER,
            entry(2, CALLER),
            RingPublicKey::PLACEHOLDER,
        ];

        let filtered = filter_placeholders(&roster);
        assert_eq!(filtered, vec![entry(1, CALLER), entry(2, CALLER)]);
        assert_eq!(filter_placeholders(&filtered), filtered);
    }

    #[test]
    fn test_only_exact_zero_is_placeholder() {
        assert!(is_placeholder(&RingPublicKey::new(U256::ZERO, U256::ZERO)));
        assert!(!is_placeholder(&RingPublicKey::new(U256::ZERO, U256::from(2u64))));
        assert!(!is_placeholder(&RingPublicKey::new(U256::from(1u64), U256::ZERO)));
    }

    #[test]
    fn test_find_member_any_position() {
        for position in 0..4 {
            let mut ring = (10..13).map(|s| entry(s, CALLER)).collect_vec();
            ring.insert(position, entry(1, CALLER));

            let found =
                find_member(&ring, &secret(1), &CALLER, &LsagSigner, MembershipPath::ForceClose)
                    .unwrap();
            assert_eq!(found.index, position);
            assert_eq!(found.ring.len(), 4);
            assert_eq!(found.ring[position], found.keypair.public_point);
        }
    }

    #[test]
    fn test_force_close_minimum() {
        let one = vec![entry(1, CALLER)];
        for ring in [vec![], one.clone()] {
            let res =
                find_member(&ring, &secret(1), &CALLER, &LsagSigner, MembershipPath::ForceClose);
            assert_eq!(res.unwrap_err(), WithdrawalTaskError::NotEnoughParticipants(ring.len()));
        }

        // The withdrawal path has no minimum
        let found =
            find_member(&one, &secret(1), &CALLER, &LsagSigner, MembershipPath::Withdraw).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn test_not_a_member() {
        let ring = vec![entry(2, CALLER), entry(3, CALLER), entry(4, CALLER)];
        let res = find_member(&ring, &secret(1), &CALLER, &LsagSigner, MembershipPath::Withdraw);
        assert_eq!(res.unwrap_err(), WithdrawalTaskError::NotAMember);

        // The same secret under another address derives another key
        let ring = vec![entry(1, Address::repeat_byte(0x01))];
        let res = find_member(&ring, &secret(1), &CALLER, &LsagSigner, MembershipPath::Withdraw);
        assert_eq!(res.unwrap_err(), WithdrawalTaskError::NotAMember);
    }

    #[test]
    fn test_off_curve_entry_is_invalid_ring() {
        let ring = vec![entry(1, CALLER), RingPublicKey::new(U256::from(1u64), U256::from(3u64))];
        let res = find_member(&ring, &secret(1), &CALLER, &LsagSigner, MembershipPath::Withdraw);
        assert!(matches!(res, Err(WithdrawalTaskError::InvalidRing(_))));
    }
}
