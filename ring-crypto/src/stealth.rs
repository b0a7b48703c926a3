//! Derivation of the one-time stealth keypair bound to a deposit
//!
//! The secret scalar is the field hash of the deposit secret concatenated with
//! the depositor's address, each left-padded to a 32-byte word. The public
//! point is the generator scaled by that secret.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use alloy_primitives::Address;
use ark_ec::{CurveGroup, Group};
use constants::{ADDRESS_BYTE_LENGTH, CurvePoint, FIELD_BYTE_LENGTH, Scalar, SystemCurveGroup};

use crate::hash::h1;

/// A stealth keypair recomputed from a withdrawal secret and an address
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StealthKeypair {
    /// The secret scalar
    pub secret_scalar: Scalar,
    /// The public point registered in the ring at deposit time
    pub public_point: CurvePoint,
}

impl Debug for StealthKeypair {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StealthKeypair")
            .field("secret_scalar", &"<redacted>")
            .field("public_point", &self.public_point)
            .finish()
    }
}

/// Derive the stealth keypair for a secret and the caller's address
pub fn derive_stealth_keypair(secret: &[u8; FIELD_BYTE_LENGTH], address: &Address) -> StealthKeypair {
    let mut preimage = [0u8; 2 * FIELD_BYTE_LENGTH];
    preimage[..FIELD_BYTE_LENGTH].copy_from_slice(secret);
    preimage[2 * FIELD_BYTE_LENGTH - ADDRESS_BYTE_LENGTH..].copy_from_slice(address.as_slice());

    let secret_scalar = h1(&preimage);
    let public_point = (SystemCurveGroup::generator() * secret_scalar).into_affine();
    StealthKeypair { secret_scalar, public_point }
}
