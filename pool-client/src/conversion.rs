//! Utilities for converting between domain types and their analogues as
//! expected by the pool contract, and for encoding contract calldata

use alloy::rpc::types::TransactionReceipt;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use common::types::{receipt::TxReceipt, ring::RingPublicKey, token::AmountTier};
use constants::RING_MAX_PARTICIPANTS;
use itertools::Itertools;
use ring_crypto::RingSignature;

use crate::{
    abi::Heiswap::{forceCloseRingCall, withdrawCall},
    errors::PoolClientError,
};

// ------------------------
// | Conversion Utilities |
// ------------------------

/// Convert an amount tier to the contract's `amountEther` argument
pub fn tier_to_u256(tier: AmountTier) -> U256 {
    U256::from(tier.ether())
}

/// Convert a ring index to the contract's `index` argument
pub fn index_to_u256(index: u64) -> U256 {
    U256::from(index)
}

/// Convert a `U256` count returned by the contract to a `u64`
pub fn u256_to_u64(value: U256) -> Result<u64, PoolClientError> {
    u64::try_from(value).map_err(PoolClientError::conversion)
}

/// Convert the contract's fixed capacity roster to public key entries,
/// preserving placeholders and order
pub fn to_ring_public_keys(keys: &[[U256; 2]; RING_MAX_PARTICIPANTS]) -> Vec<RingPublicKey> {
    keys.iter().map(|[x, y]| RingPublicKey::new(*x, *y)).collect_vec()
}

/// Project an alloy receipt onto the owned receipt type
pub fn to_tx_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    }
}

// ------------
// | Calldata |
// ------------

/// Encode a `withdraw` call paying `receiver` from the given ring
pub fn encode_withdraw_call(
    receiver: Address,
    tier: AmountTier,
    index: u64,
    signature: &RingSignature,
) -> Bytes {
    let call = withdrawCall {
        receiver,
        amountEther: tier_to_u256(tier),
        index: index_to_u256(index),
        c0: signature.challenge_u256(),
        keyImage: signature.key_image_u256(),
        s: signature.responses_u256(),
    };

    Bytes::from(call.abi_encode())
}

/// Encode a `forceCloseRing` call for the given ring
pub fn encode_force_close_call(tier: AmountTier, index: u64, signature: &RingSignature) -> Bytes {
    let call = forceCloseRingCall {
        amountEther: tier_to_u256(tier),
        index: index_to_u256(index),
        c0: signature.challenge_u256(),
        keyImage: signature.key_image_u256(),
        s: signature.responses_u256(),
    };

    Bytes::from(call.abi_encode())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use alloy_sol_types::SolCall;
    use ring_crypto::{LsagSigner, RingSigner};

    use super::*;

    /// Build a signature over a two member ring
    fn test_signature() -> RingSignature {
        let signer = LsagSigner;
        let kp1 = signer.derive_stealth_keypair(&[1u8; 32], &Address::repeat_byte(1));
        let kp2 = signer.derive_stealth_keypair(&[2u8; 32], &Address::repeat_byte(2));
        let ring = vec![kp1.public_point, kp2.public_point];

        signer.ring_sign(b"msg", &ring, &kp2.secret_scalar, 1).unwrap()
    }

    #[test]
    fn test_withdraw_calldata_decodes() {
        let sig = test_signature();
        let receiver = Address::repeat_byte(0xab);
        let calldata = encode_withdraw_call(receiver, AmountTier::Four, 7, &sig);

        assert_eq!(&calldata[..4], withdrawCall::SELECTOR.as_slice());
        let decoded = withdrawCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.receiver, receiver);
        assert_eq!(decoded.amountEther, U256::from(4u64));
        assert_eq!(decoded.index, U256::from(7u64));
        assert_eq!(decoded.c0, sig.challenge_u256());
        assert_eq!(decoded.keyImage, sig.key_image_u256());
        assert_eq!(decoded.s, sig.responses_u256());
    }

    #[test]
    fn test_force_close_calldata_decodes() {
        let sig = test_signature();
        let calldata = encode_force_close_call(AmountTier::One, 0, &sig);

        let decoded = forceCloseRingCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.amountEther, U256::from(1u64));
        assert_eq!(decoded.index, U256::ZERO);
        assert_eq!(decoded.s.len(), 2);
    }

    #[test]
    fn test_roster_conversion_keeps_placeholders() {
        let mut keys = [[U256::ZERO; 2]; RING_MAX_PARTICIPANTS];
        keys[1] = [U256::from(1u64), U256::from(2u64)];

        let roster = to_ring_public_keys(&keys);
        assert_eq!(roster.len(), RING_MAX_PARTICIPANTS);
        assert!(roster[0].is_placeholder());
        assert_eq!(roster[1], RingPublicKey::new(U256::from(1u64), U256::from(2u64)));
    }

    #[test]
    fn test_u256_to_u64_overflow() {
        assert_eq!(u256_to_u64(U256::from(5u64)).unwrap(), 5);
        assert!(u256_to_u64(U256::MAX).is_err());
    }
}
