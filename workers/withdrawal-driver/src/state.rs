//! The withdrawal state machine
//!
//! A [`WithdrawalAttempt`] is the single source of truth for one withdrawal
//! attempt. Every asynchronous operation is tagged with the attempt's
//! [`Generation`] when it is issued; a result whose generation no longer
//! matches is discarded rather than applied.

use std::fmt::{Display, Formatter, Result as FmtResult};

use common::types::{
    receipt::TxReceipt,
    ring::{ForceCloseEligibility, RingState},
    token::WithdrawalToken,
};
use serde::Serialize;
use tracing::{debug, warn};

// ---------
// | State |
// ---------

/// The user-facing state of a withdrawal attempt
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum WithdrawalState {
    /// No outcome yet; a submission may be pending
    #[default]
    Nothing,
    /// The token did not parse
    CorruptedToken,
    /// The ring has not been closed; see the ring snapshot for whether the
    /// caller may close it
    RingNotClosed,
    /// Too few keys in the ring to close it manually
    RingNotEnoughParticipantsToClose,
    /// A manual close of the ring is in flight
    ForceClosingRing,
    /// The ring was closed manually
    SuccessCloseRing(TxReceipt),
    /// The manual close failed to submit or revert-free execute
    FailedCloseRing,
    /// The caller's stealth key is not in the ring, or the contract rejected
    /// the signature
    InvalidSignature,
    /// The ring's key image was already used
    SignatureUsed,
    /// The ring's roster is malformed
    InvalidRing,
    /// The withdrawal went through
    Withdrawn(TxReceipt),
    /// An unclassified failure, with the raw diagnostic
    UnknownError(String),
}

impl WithdrawalState {
    /// Whether the state ends the attempt
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalState::Nothing | WithdrawalState::ForceClosingRing)
    }

    /// The receipt carried by a successful outcome
    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            WithdrawalState::SuccessCloseRing(receipt) | WithdrawalState::Withdrawn(receipt) => {
                Some(receipt)
            },
            _ => None,
        }
    }

    /// Whether the machine may move from this state to `next` outside of a
    /// reset
    pub fn can_transition_to(&self, next: &WithdrawalState) -> bool {
        use WithdrawalState::*;
        match self {
            Nothing => next.is_terminal() && !matches!(next, SuccessCloseRing(_) | FailedCloseRing),
            RingNotClosed => matches!(next, ForceClosingRing),
            ForceClosingRing => matches!(
                next,
                SuccessCloseRing(_)
                    | FailedCloseRing
                    | RingNotEnoughParticipantsToClose
                    | InvalidSignature
                    | InvalidRing
                    | UnknownError(_)
            ),
            _ => false,
        }
    }
}

impl Display for WithdrawalState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WithdrawalState::SuccessCloseRing(receipt) => {
                write!(f, "SuccessCloseRing({})", receipt.tx_hash_hex())
            },
            WithdrawalState::Withdrawn(receipt) => write!(f, "Withdrawn({})", receipt.tx_hash_hex()),
            WithdrawalState::UnknownError(diagnostic) => write!(f, "UnknownError({diagnostic})"),
            other => write!(f, "{other:?}"),
        }
    }
}

// --------------
// | Generation |
// --------------

/// The generation of an attempt; bumped on every reset and every new
/// in-flight operation
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    /// The next generation
    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// The outcome of applying a result to the attempt
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result was applied
    Applied,
    /// The result belonged to a superseded generation and was discarded
    Stale,
    /// The transition is not permitted from the current state
    Rejected,
}

// -----------
// | Attempt |
// -----------

/// A read-only view of an attempt for the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptSnapshot {
    /// The current state
    pub state: WithdrawalState,
    /// The last ring state resolved during this attempt
    pub ring_state: Option<RingState>,
    /// The receipt of the last confirmed transaction of this attempt
    pub receipt: Option<TxReceipt>,
    /// The generation the snapshot was taken at
    pub generation: Generation,
}

/// A withdrawal attempt and its transition rules
#[derive(Clone, Debug, Default)]
pub struct WithdrawalAttempt {
    /// The current state
    state: WithdrawalState,
    /// The current generation
    generation: Generation,
    /// The token of the attempt, kept until reset so that a ring found open
    /// can be closed without re-parsing
    token: Option<WithdrawalToken>,
    /// The last ring state resolved
    ring_state: Option<RingState>,
    /// The receipt of the last confirmed transaction
    receipt: Option<TxReceipt>,
}

impl WithdrawalAttempt {
    /// A fresh attempt in the `Nothing` state
    pub fn new() -> Self {
        Self::default()
    }

    // -----------
    // | Getters |
    // -----------

    /// The current state
    pub fn state(&self) -> &WithdrawalState {
        &self.state
    }

    /// The current generation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The token of the attempt, if one parsed
    pub fn token(&self) -> Option<&WithdrawalToken> {
        self.token.as_ref()
    }

    /// Take a snapshot for the presentation layer
    pub fn snapshot(&self) -> AttemptSnapshot {
        AttemptSnapshot {
            state: self.state.clone(),
            ring_state: self.ring_state,
            receipt: self.receipt,
            generation: self.generation,
        }
    }

    // ---------------
    // | Transitions |
    // ---------------

    /// Reset to `Nothing`, detaching any in-flight operation
    pub fn reset(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.state = WithdrawalState::Nothing;
        self.token = None;
        self.ring_state = None;
        self.receipt = None;

        self.generation
    }

    /// Move from `RingNotClosed` to `ForceClosingRing` under a new generation
    ///
    /// Returns the new generation and the token to close the ring with, or
    /// `None` if the attempt is not in a closable state. A ring still counting
    /// down cannot be closed; a ring with too few deposits may begin a close,
    /// which then settles in `RingNotEnoughParticipantsToClose`
    pub fn begin_force_close(&mut self) -> Option<(Generation, WithdrawalToken)> {
        let next = WithdrawalState::ForceClosingRing;
        if !self.state.can_transition_to(&next) {
            warn!("rejected transition from {} to {next}", self.state);
            return None;
        }

        let eligibility = self.ring_state.map(|ring_state| ring_state.eligibility());
        if !matches!(
            eligibility,
            Some(ForceCloseEligibility::Closable { .. } | ForceCloseEligibility::TooFewDeposits { .. })
        ) {
            warn!("rejected force close of ring with eligibility {eligibility:?}");
            return None;
        }

        let token = self.token?;
        self.generation = self.generation.next();
        self.state = next;
        Some((self.generation, token))
    }

    /// Record the token parsed by the operation issued at `generation`
    pub fn record_token(&mut self, generation: Generation, token: WithdrawalToken) -> ApplyOutcome {
        if !self.is_current(generation) {
            return ApplyOutcome::Stale;
        }

        self.token = Some(token);
        ApplyOutcome::Applied
    }

    /// Record the ring state resolved by the operation issued at `generation`
    pub fn record_ring_state(&mut self, generation: Generation, ring_state: RingState) -> ApplyOutcome {
        if !self.is_current(generation) {
            return ApplyOutcome::Stale;
        }

        self.ring_state = Some(ring_state);
        ApplyOutcome::Applied
    }

    /// Apply the result of the operation issued at `generation`
    pub fn apply(&mut self, generation: Generation, next: WithdrawalState) -> ApplyOutcome {
        if !self.is_current(generation) {
            return ApplyOutcome::Stale;
        }

        if !self.state.can_transition_to(&next) {
            warn!("rejected transition from {} to {next}", self.state);
            return ApplyOutcome::Rejected;
        }

        if let Some(receipt) = next.receipt() {
            self.receipt = Some(*receipt);
        }
        self.state = next;
        ApplyOutcome::Applied
    }

    /// Whether `generation` is the current generation, logging a discard if
    /// not
    fn is_current(&self, generation: Generation) -> bool {
        if generation != self.generation {
            debug!("discarding result from generation {generation}, current is {}", self.generation);
            return false;
        }

        true
    }
}
