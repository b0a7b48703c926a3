//! Conversions between curve types and the 256-bit integers the contract
//! stores them as

use alloy_primitives::U256;
use ark_ec::AffineRepr;
use ark_ff::{BigInt, PrimeField};
use constants::{BaseField, CurvePoint, Scalar};

use crate::error::CryptoError;

/// Converts a `Scalar` to a `U256`
pub fn scalar_to_u256(scalar: &Scalar) -> U256 {
    U256::from_limbs(scalar.into_bigint().0)
}

/// Converts a `U256` to a `Scalar`, reducing modulo the field order
pub fn u256_to_scalar(value: U256) -> Scalar {
    Scalar::from_be_bytes_mod_order(&value.to_be_bytes::<32>())
}

/// Converts a base field element to a `U256`
pub fn base_to_u256(value: &BaseField) -> U256 {
    U256::from_limbs(value.into_bigint().0)
}

/// Converts a `U256` to a base field element, rejecting values outside the
/// field
pub fn u256_to_base(value: U256) -> Result<BaseField, CryptoError> {
    BaseField::from_bigint(BigInt::new(*value.as_limbs()))
        .ok_or_else(|| CryptoError::InvalidPoint(format!("coordinate {value} exceeds modulus")))
}

/// Get the affine coordinates of a point
pub fn point_to_coordinates(point: &CurvePoint) -> (U256, U256) {
    (base_to_u256(&point.x), base_to_u256(&point.y))
}

/// Construct a curve point from its affine coordinates, checking that the
/// point lies on the curve
pub fn point_from_coordinates(x: U256, y: U256) -> Result<CurvePoint, CryptoError> {
    let point = CurvePoint::new_unchecked(u256_to_base(x)?, u256_to_base(y)?);
    if !point.is_on_curve() || point.is_zero() {
        return Err(CryptoError::InvalidPoint(format!("({x}, {y}) is not on the curve")));
    }

    Ok(point)
}
