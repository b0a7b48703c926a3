//! Error types for the withdrawal tasks, and their mapping onto terminal
//! withdrawal states

use common::types::token::TokenParseError;
use pool_client::errors::PoolClientError;
use ring_crypto::CryptoError;
use thiserror::Error;

use crate::state::WithdrawalState;

/// The ledger revert reasons recognized in a failed submission, checked in
/// order, with the state each maps to
const REVERT_REASONS: [(&str, WithdrawalState); 4] = [
    ("Signature has been used!", WithdrawalState::SignatureUsed),
    ("Invalid signature", WithdrawalState::InvalidSignature),
    ("Pool isn't closed", WithdrawalState::RingNotClosed),
    ("All ETH from current pool", WithdrawalState::SignatureUsed),
];

/// Classify the diagnostic of a failed withdrawal submission
pub fn classify_submission_failure(diagnostic: &str) -> WithdrawalState {
    REVERT_REASONS
        .iter()
        .find(|(reason, _)| diagnostic.contains(reason))
        .map(|(_, state)| state.clone())
        .unwrap_or_else(|| WithdrawalState::UnknownError(diagnostic.to_string()))
}

/// The error type thrown by the withdrawal and force-close tasks
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WithdrawalTaskError {
    /// The token failed to parse
    #[error("corrupted token: {0}")]
    CorruptedToken(#[from] TokenParseError),
    /// The ring is still open
    #[error("ring is not closed")]
    RingNotClosed,
    /// Too few keys remain after filtering placeholders to close the ring
    #[error("ring has {0} participant(s), too few to close")]
    NotEnoughParticipants(usize),
    /// The caller's stealth key is not in the ring
    #[error("stealth public key not found in ring")]
    NotAMember,
    /// The ring's roster is malformed
    #[error("invalid ring: {0}")]
    InvalidRing(String),
    /// Signing failed in the crypto collaborator
    #[error("ring signing failed: {0}")]
    Signing(#[from] CryptoError),
    /// A ledger query failed
    #[error("ledger query failed: {0}")]
    Ledger(String),
    /// A withdrawal submission failed, with the raw diagnostic
    #[error("withdrawal submission failed: {0}")]
    WithdrawalRejected(String),
    /// A force-close submission failed, with the raw diagnostic
    #[error("force-close submission failed: {0}")]
    ForceCloseRejected(String),
    /// A step ran without the output of the step before it
    #[error("task step out of order: {0}")]
    StepOrder(String),
}

impl WithdrawalTaskError {
    /// Wrap a failed ledger query
    pub fn ledger(e: &PoolClientError) -> Self {
        Self::Ledger(e.diagnostic())
    }

    /// A step ran before the step producing `output`
    pub fn missing(output: &str) -> Self {
        Self::StepOrder(format!("{output} not yet available"))
    }

    /// The terminal state the error surfaces as
    pub fn terminal_state(&self) -> WithdrawalState {
        match self {
            Self::CorruptedToken(_) => WithdrawalState::CorruptedToken,
            Self::RingNotClosed => WithdrawalState::RingNotClosed,
            Self::NotEnoughParticipants(_) => WithdrawalState::RingNotEnoughParticipantsToClose,
            Self::NotAMember => WithdrawalState::InvalidSignature,
            Self::InvalidRing(_) => WithdrawalState::InvalidRing,
            Self::Signing(e) => WithdrawalState::UnknownError(e.to_string()),
            Self::Ledger(diagnostic) => WithdrawalState::UnknownError(diagnostic.clone()),
            Self::WithdrawalRejected(diagnostic) => classify_submission_failure(diagnostic),
            Self::ForceCloseRejected(_) => WithdrawalState::FailedCloseRing,
            Self::StepOrder(msg) => WithdrawalState::UnknownError(msg.clone()),
        }
    }
}
