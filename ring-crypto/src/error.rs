//! Errors emitted by the ring cryptography helpers

use thiserror::Error;

/// The error type for ring signing and point conversion
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// A ring signature was requested over an empty ring
    #[error("cannot sign over an empty ring")]
    EmptyRing,
    /// The signer index does not address a ring member
    #[error("signer index {index} out of bounds for ring of size {size}")]
    IndexOutOfBounds {
        /// The requested index
        index: usize,
        /// The size of the ring
        size: usize,
    },
    /// The ring member at the signer index is not the signer's public key
    #[error("secret key does not match the ring member at index {0}")]
    KeyMismatch(usize),
    /// A coordinate pair does not describe a point on the curve
    #[error("invalid curve point: {0}")]
    InvalidPoint(String),
}
