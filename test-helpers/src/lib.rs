//! Groups helpers used for testing the withdrawal engine
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

pub mod assertions;
pub mod fixtures;
pub mod mocks;
