//! Hash functions onto the scalar field and onto the curve, along with the
//! byte serialization they absorb

use ark_ff::{BigInteger, One, PrimeField};
use constants::{BaseField, CurvePoint, FIELD_BYTE_LENGTH, Scalar};
use tiny_keccak::{Hasher, Keccak};

/// Computes a Keccak256 hash over a sequence of bytes, returning a 32-byte
/// hash output
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hash_bytes = [0_u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    hasher.finalize(&mut hash_bytes);
    hash_bytes
}

/// Hash a byte string onto the scalar field
///
/// Computes a Keccak256 hash and interprets it as a big-endian integer
/// reduced modulo the scalar field order
pub fn h1(bytes: &[u8]) -> Scalar {
    Scalar::from_be_bytes_mod_order(&keccak256(bytes))
}

/// Hash a byte string onto the curve by try-and-increment
///
/// The Keccak256 hash seeds a candidate x coordinate, which is incremented
/// until it lands on the curve. The group has cofactor one, so every curve
/// point found this way is in the prime order subgroup
pub fn hash_to_point(bytes: &[u8]) -> CurvePoint {
    let mut x = BaseField::from_be_bytes_mod_order(&keccak256(bytes));
    loop {
        if let Some(point) = CurvePoint::get_point_from_x_unchecked(x, false /* greatest */) {
            return point;
        }

        x += BaseField::one();
    }
}

// -----------------
// | Serialization |
// -----------------

/// Serialize a scalar as a 32-byte big-endian integer
pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; FIELD_BYTE_LENGTH] {
    to_fixed_bytes(&scalar.into_bigint().to_bytes_be())
}

/// Serialize a point as its big-endian affine coordinates, `x ‖ y`
///
/// The identity serializes as all zeros
pub fn point_to_bytes(point: &CurvePoint) -> [u8; 2 * FIELD_BYTE_LENGTH] {
    let mut bytes = [0u8; 2 * FIELD_BYTE_LENGTH];
    bytes[..FIELD_BYTE_LENGTH]
        .copy_from_slice(&to_fixed_bytes(&point.x.into_bigint().to_bytes_be()));
    bytes[FIELD_BYTE_LENGTH..]
        .copy_from_slice(&to_fixed_bytes(&point.y.into_bigint().to_bytes_be()));

    bytes
}

/// Serialize a sequence of points by concatenating their encodings
pub fn points_to_bytes(points: &[CurvePoint]) -> Vec<u8> {
    points.iter().flat_map(point_to_bytes).collect()
}

/// Right-align a big-endian byte string in a 32-byte buffer
fn to_fixed_bytes(bytes: &[u8]) -> [u8; FIELD_BYTE_LENGTH] {
    let mut buf = [0u8; FIELD_BYTE_LENGTH];
    let len = bytes.len().min(FIELD_BYTE_LENGTH);
    buf[FIELD_BYTE_LENGTH - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    buf
}
