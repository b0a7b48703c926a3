//! In-memory stand-ins for the pool contract and relayer

mod ledger;
mod relayer;

pub use ledger::{MockPoolLedger, MockRing};
pub use relayer::MockRelayer;
