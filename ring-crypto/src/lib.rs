//! Cryptography helpers and primitives used to prove ring membership
//!
//! All arithmetic is over the alt_bn128 G1 group. Points and scalars are
//! serialized as 32-byte big-endian integers so that hashes agree with the
//! on-chain verifier.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod conversion;
pub mod error;
pub mod hash;
pub mod lsag;
pub mod signer;
pub mod stealth;

pub use error::CryptoError;
pub use lsag::RingSignature;
pub use signer::{LsagSigner, RingSigner};
pub use stealth::StealthKeypair;
