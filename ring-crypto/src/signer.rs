//! The signing seam used by the withdrawal driver
//!
//! Abstracted behind a trait so that tests may substitute a deterministic or
//! failing signer.

use alloy_primitives::Address;
use constants::{CurvePoint, FIELD_BYTE_LENGTH, Scalar};
use rand::thread_rng;

use crate::{
    error::CryptoError,
    lsag::{self, RingSignature},
    stealth::{self, StealthKeypair},
};

/// A capability that derives stealth keys and produces ring signatures
pub trait RingSigner: Send + Sync {
    /// Recompute the stealth keypair for a deposit secret and address
    fn derive_stealth_keypair(
        &self,
        secret: &[u8; FIELD_BYTE_LENGTH],
        address: &Address,
    ) -> StealthKeypair;

    /// Sign `message` as the member at `index` of `ring`
    fn ring_sign(
        &self,
        message: &[u8],
        ring: &[CurvePoint],
        secret_key: &Scalar,
        index: usize,
    ) -> Result<RingSignature, CryptoError>;
}

/// The default signer, an LSAG over alt_bn128 using the thread-local RNG
#[derive(Clone, Copy, Debug, Default)]
pub struct LsagSigner;

impl RingSigner for LsagSigner {
    fn derive_stealth_keypair(
        &self,
        secret: &[u8; FIELD_BYTE_LENGTH],
        address: &Address,
    ) -> StealthKeypair {
        stealth::derive_stealth_keypair(secret, address)
    }

    fn ring_sign(
        &self,
        message: &[u8],
        ring: &[CurvePoint],
        secret_key: &Scalar,
        index: usize,
    ) -> Result<RingSignature, CryptoError> {
        lsag::sign(message, ring, secret_key, index, &mut thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::lsag::verify;

    #[test]
    fn test_signer_round_trip() {
        let signer = LsagSigner;
        let kp = signer.derive_stealth_keypair(&[3u8; 32], &Address::repeat_byte(0x11));
        let other = signer.derive_stealth_keypair(&[4u8; 32], &Address::repeat_byte(0x22));

        let ring = vec![other.public_point, kp.public_point];
        let sig = signer.ring_sign(b"message", &ring, &kp.secret_scalar, 1).unwrap();
        assert!(verify(b"message", &ring, &sig));
    }
}
