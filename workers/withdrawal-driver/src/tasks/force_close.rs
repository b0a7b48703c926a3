//! Defines a task that closes an open ring before its natural close, so that
//! its deposits may be withdrawn

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::Bytes;
use async_trait::async_trait;
use common::types::token::WithdrawalToken;
use serde::Serialize;
use tracing::instrument;

use crate::{
    dispatch::DispatchOutcome,
    driver::WithdrawalContext,
    error::WithdrawalTaskError,
    membership::{MembershipMatch, MembershipPath, filter_placeholders, find_member},
    signing::{SignedCall, sign_force_close},
    state::WithdrawalState,
    traits::{Task, TaskState},
};

/// The task name for the force-close task
const FORCE_CLOSE_TASK_NAME: &str = "force-close-ring";

// --------------
// | Task State |
// --------------

/// Represents the state of the task through its async execution
#[derive(Clone, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ForceCloseTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is fetching the ring hash to sign over
    ResolvingRing,
    /// The task is locating the caller's stealth key in the ring
    MatchingMembership,
    /// The task is signing the close
    Signing,
    /// The task is submitting the close
    Submitting,
    /// The task is completed
    Completed,
}

impl TaskState for ForceCloseTaskState {
    fn completed(&self) -> bool {
        matches!(self, ForceCloseTaskState::Completed)
    }
}

impl Display for ForceCloseTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

// -------------------
// | Task Definition |
// -------------------

/// Represents a task to close a ring on behalf of one of its depositors
pub struct ForceCloseTask {
    /// The token of the depositor closing the ring
    token: WithdrawalToken,
    /// The raw ring hash as returned by the contract, signed as-is
    ring_hash: Option<Bytes>,
    /// The caller's position in the ring
    member: Option<MembershipMatch>,
    /// The signed close call
    signed_call: Option<SignedCall>,
    /// The state the close settled in, if the dispatch reported one
    outcome: Option<WithdrawalState>,
    /// The collaborators of the task
    ctx: WithdrawalContext,
    /// The state of the task's execution
    task_state: ForceCloseTaskState,
}

#[async_trait]
impl Task for ForceCloseTask {
    type State = ForceCloseTaskState;

    #[instrument(skip_all, err, fields(task = %self.name(), state = %self.state()))]
    async fn step(&mut self) -> Result<(), WithdrawalTaskError> {
        // Dispatch based on task state
        match self.task_state {
            ForceCloseTaskState::Pending => self.task_state = ForceCloseTaskState::ResolvingRing,

            ForceCloseTaskState::ResolvingRing => {
                self.fetch_ring_hash().await?;
                self.task_state = ForceCloseTaskState::MatchingMembership;
            },

            ForceCloseTaskState::MatchingMembership => {
                self.match_membership().await?;
                self.task_state = ForceCloseTaskState::Signing;
            },

            ForceCloseTaskState::Signing => {
                self.sign()?;
                self.task_state = ForceCloseTaskState::Submitting;
            },

            ForceCloseTaskState::Submitting => {
                self.submit().await?;
                self.task_state = ForceCloseTaskState::Completed;
            },

            ForceCloseTaskState::Completed => {},
        }

        Ok(())
    }

    fn name(&self) -> String {
        FORCE_CLOSE_TASK_NAME.to_string()
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }
}

// -----------------------
// | Task Implementation |
// -----------------------

impl ForceCloseTask {
    /// Constructor
    pub fn new(token: WithdrawalToken, ctx: WithdrawalContext) -> Self {
        Self {
            token,
            ring_hash: None,
            member: None,
            signed_call: None,
            outcome: None,
            ctx,
            task_state: ForceCloseTaskState::Pending,
        }
    }

    /// The state the close settled in
    ///
    /// `None` after a relayed dispatch, whose result is not reported back
    pub fn outcome(&self) -> Option<WithdrawalState> {
        self.outcome.clone()
    }

    // --------------
    // | Task Steps |
    // --------------

    /// Fetch the ring hash the close is signed over
    async fn fetch_ring_hash(&mut self) -> Result<(), WithdrawalTaskError> {
        let ring_hash = self
            .ctx
            .ledger
            .get_ring_hash(self.token.amount_tier, self.token.ring_index)
            .await
            .map_err(|e| WithdrawalTaskError::ledger(&e))?;

        self.ring_hash = Some(ring_hash);
        Ok(())
    }

    /// Locate the caller's stealth key in the ring, requiring enough
    /// participants to close it
    async fn match_membership(&mut self) -> Result<(), WithdrawalTaskError> {
        let roster = self
            .ctx
            .ledger
            .get_public_keys(self.token.amount_tier, self.token.ring_index)
            .await
            .map_err(|e| WithdrawalTaskError::ledger(&e))?;

        let ring = filter_placeholders(&roster);
        let caller = self.ctx.ledger.caller_address();
        let member = find_member(
            &ring,
            &self.token.secret,
            &caller,
            self.ctx.signer.as_ref(),
            MembershipPath::ForceClose,
        )?;

        self.member = Some(member);
        Ok(())
    }

    /// Sign the close over the ring hash
    fn sign(&mut self) -> Result<(), WithdrawalTaskError> {
        let ring_hash =
            self.ring_hash.as_ref().ok_or_else(|| WithdrawalTaskError::missing("ring hash"))?;
        let member = self.member.as_ref().ok_or_else(|| WithdrawalTaskError::missing("ring member"))?;

        let signed = sign_force_close(self.ctx.signer.as_ref(), &self.token, ring_hash, member)?;
        self.signed_call = Some(signed);
        Ok(())
    }

    /// Submit the signed close; any failure is a failed close
    async fn submit(&mut self) -> Result<(), WithdrawalTaskError> {
        let signed =
            self.signed_call.as_ref().ok_or_else(|| WithdrawalTaskError::missing("signed call"))?;

        match self.ctx.dispatcher.dispatch(signed.calldata.clone()).await {
            DispatchOutcome::Confirmed(receipt) => {
                self.outcome = Some(WithdrawalState::SuccessCloseRing(receipt));
                Ok(())
            },
            DispatchOutcome::Relayed => Ok(()),
            DispatchOutcome::Failed(diagnostic) => {
                Err(WithdrawalTaskError::ForceCloseRejected(diagnostic))
            },
        }
    }
}
