//! The anonymous withdrawal engine
//!
//! Parses a withdrawal token, resolves the target ring's on-chain state,
//! proves membership in the ring with a linkable ring signature, submits the
//! resulting call, and classifies every outcome into a [`WithdrawalState`].
//!
//! Each workflow runs as a [`traits::Task`] stepped through explicit phases.
//! The [`WithdrawalDriver`] owns the attempt's state machine and discards
//! results from attempts that have since been reset.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod membership;
pub mod ring_status;
pub mod signing;
pub mod state;
pub mod tasks;
pub mod traits;

pub use driver::{WithdrawalContext, WithdrawalDriver};
pub use error::WithdrawalTaskError;
pub use state::{AttemptSnapshot, WithdrawalState};
