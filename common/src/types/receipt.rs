//! An owned projection of a ledger transaction receipt

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// The receipt of a confirmed transaction, as exposed to the presentation
/// layer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The hash of the transaction
    pub tx_hash: B256,
    /// The block the transaction was included in, if known
    pub block_number: Option<u64>,
    /// The gas consumed by the transaction
    pub gas_used: u64,
}

impl TxReceipt {
    /// The transaction hash as a `0x`-prefixed hex string
    pub fn tx_hash_hex(&self) -> String {
        format!("{:#x}", self.tx_hash)
    }
}
