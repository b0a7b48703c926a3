//! Defines system-wide constants for the withdrawal engine

#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(missing_docs)]

use ark_ec::Group;

// -------------------------
// | System-Wide Constants |
// -------------------------

/// The literal marker every withdrawal token begins with
pub const TOKEN_MARKER: &str = "hei";

/// The delimiter between the fields of a withdrawal token
pub const TOKEN_DELIMITER: char = '-';

/// The number of fields that follow the marker in a withdrawal token
pub const TOKEN_FIELD_COUNT: usize = 3;

/// The byte length of a ring hash; the contract only reports a hash of this
/// length once a ring is closed
pub const RING_HASH_LENGTH: usize = 32;

/// The maximum number of participants in a single ring.
///
/// The contract returns public key rosters of exactly this length, padding
/// unfilled slots with placeholder entries
pub const RING_MAX_PARTICIPANTS: usize = 6;

/// The minimum number of filtered ring members required to force-close a
/// ring; anything smaller offers no anonymity
pub const MIN_FORCE_CLOSE_PARTICIPANTS: usize = 2;

/// The byte length of an Ethereum address
pub const ADDRESS_BYTE_LENGTH: usize = 20;

/// The byte length of a serialized field element or coordinate
pub const FIELD_BYTE_LENGTH: usize = 32;

// ------------------------------------
// | System Specific Type Definitions |
// ------------------------------------

/// The curve group ring signatures are computed over (alt_bn128 G1)
pub type SystemCurveGroup = ark_bn254::G1Projective;

/// The affine representation of a point in the system curve group
pub type CurvePoint = ark_bn254::G1Affine;

/// The scalar field of the system curve group
pub type Scalar = <ark_bn254::G1Projective as Group>::ScalarField;

/// The base field the system curve is defined over
pub type BaseField = ark_bn254::Fq;
