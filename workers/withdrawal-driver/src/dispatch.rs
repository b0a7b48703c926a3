//! Routes signed calls to direct broadcast or to a relayer

use std::sync::Arc;

use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use alloy_primitives::Bytes;
use common::types::receipt::TxReceipt;
use pool_client::{PoolLedger, RelayPayload, RelayerSubmitter};
use tracing::{info, instrument, warn};

/// How signed calls are submitted
#[derive(Clone)]
pub enum SubmissionMode {
    /// Estimate gas, assemble a transaction at the caller's nonce, and
    /// broadcast it from the caller's account
    Direct,
    /// Hand the call to a relayer
    Relayer(Arc<dyn RelayerSubmitter>),
}

/// The outcome of a dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transaction was mined
    Confirmed(TxReceipt),
    /// The call was handed to a relayer; whether it was accepted is not
    /// reported back
    Relayed,
    /// The submission failed, with the raw diagnostic
    Failed(String),
}

/// Submits signed calls to the pool contract
#[derive(Clone)]
pub struct SubmissionDispatcher {
    /// The ledger to broadcast through
    ledger: Arc<dyn PoolLedger>,
    /// How calls are submitted
    mode: SubmissionMode,
}

impl SubmissionDispatcher {
    /// Constructor
    pub fn new(ledger: Arc<dyn PoolLedger>, mode: SubmissionMode) -> Self {
        Self { ledger, mode }
    }

    /// Submit an encoded call to the pool contract
    pub async fn dispatch(&self, calldata: Bytes) -> DispatchOutcome {
        match &self.mode {
            SubmissionMode::Direct => match self.broadcast(calldata).await {
                Ok(receipt) => DispatchOutcome::Confirmed(receipt),
                Err(diagnostic) => DispatchOutcome::Failed(diagnostic),
            },
            SubmissionMode::Relayer(relayer) => {
                let payload = RelayPayload { to: self.ledger.pool_address(), data: calldata };
                if let Err(e) = relayer.submit(&payload).await {
                    warn!("relayer submission failed: {e}");
                }

                DispatchOutcome::Relayed
            },
        }
    }

    /// Broadcast a call from the caller's account and await the receipt
    #[instrument(skip_all, err)]
    async fn broadcast(&self, calldata: Bytes) -> Result<TxReceipt, String> {
        let caller = self.ledger.caller_address();
        let tx = TransactionRequest::default()
            .with_from(caller)
            .with_to(self.ledger.pool_address())
            .with_input(calldata);

        let gas = self.ledger.estimate_gas(&tx).await.map_err(|e| e.diagnostic())?;
        let nonce = self.ledger.get_transaction_count(caller).await.map_err(|e| e.diagnostic())?;
        let tx = tx.with_gas_limit(gas).with_nonce(nonce);

        let receipt = self.ledger.send_transaction(tx).await.map_err(|e| e.diagnostic())?;
        info!("confirmed tx {}", receipt.tx_hash_hex());
        Ok(receipt)
    }
}
