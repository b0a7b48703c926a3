//! Provides a client for interacting with the Heiswap pool contract and the
//! chain it is deployed on.
//!
//! This contains abstractions for handling configuration details like the RPC
//! endpoint and contract address, querying ring state, and encoding and
//! broadcasting withdrawal and force-close transactions.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abi;
pub mod client;
pub mod conversion;
pub mod errors;
pub mod relayer;
pub mod traits;

pub use client::{PoolClient, PoolClientConfig};
pub use relayer::{HttpRelayer, RelayPayload, RelayerSubmitter};
pub use traits::PoolLedger;
