//! Defines a task that withdraws a deposit from a closed ring

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use common::types::{ring::RingState, token::WithdrawalToken};
use serde::Serialize;
use tracing::instrument;

use crate::{
    dispatch::DispatchOutcome,
    driver::WithdrawalContext,
    error::WithdrawalTaskError,
    membership::{MembershipMatch, MembershipPath, filter_placeholders, find_member},
    ring_status::resolve_ring_state,
    signing::{SignedCall, sign_withdrawal},
    state::WithdrawalState,
    traits::{Task, TaskState},
};

/// The task name for the withdraw task
const WITHDRAW_TASK_NAME: &str = "withdraw";

// --------------
// | Task State |
// --------------

/// Represents the state of the task through its async execution
#[derive(Clone, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum WithdrawTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is parsing the withdrawal token
    ParsingToken,
    /// The task is resolving whether the ring is closed
    ResolvingRing,
    /// The task is locating the caller's stealth key in the ring
    MatchingMembership,
    /// The task is signing the withdrawal
    Signing,
    /// The task is submitting the withdrawal
    Submitting,
    /// The task is completed
    Completed,
}

impl TaskState for WithdrawTaskState {
    fn completed(&self) -> bool {
        matches!(self, WithdrawTaskState::Completed)
    }
}

impl Display for WithdrawTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

// -------------------
// | Task Definition |
// -------------------

/// Represents a task to withdraw a deposit from its ring
pub struct WithdrawTask {
    /// The token as provided by the caller
    raw_token: String,
    /// The parsed token
    token: Option<WithdrawalToken>,
    /// The resolved ring state
    ring_state: Option<RingState>,
    /// The caller's position in the ring
    member: Option<MembershipMatch>,
    /// The signed withdrawal call
    signed_call: Option<SignedCall>,
    /// The state the withdrawal settled in, if the dispatch reported one
    outcome: Option<WithdrawalState>,
    /// The collaborators of the task
    ctx: WithdrawalContext,
    /// The state of the task's execution
    task_state: WithdrawTaskState,
}

#[async_trait]
impl Task for WithdrawTask {
    type State = WithdrawTaskState;

    #[instrument(skip_all, err, fields(task = %self.name(), state = %self.state()))]
    async fn step(&mut self) -> Result<(), WithdrawalTaskError> {
        // Dispatch based on task state
        match self.task_state {
            WithdrawTaskState::Pending => self.task_state = WithdrawTaskState::ParsingToken,

            WithdrawTaskState::ParsingToken => {
                self.parse_token()?;
                self.task_state = WithdrawTaskState::ResolvingRing;
            },

            WithdrawTaskState::ResolvingRing => {
                self.resolve_ring().await?;
                self.task_state = WithdrawTaskState::MatchingMembership;
            },

            WithdrawTaskState::MatchingMembership => {
                self.match_membership().await?;
                self.task_state = WithdrawTaskState::Signing;
            },

            WithdrawTaskState::Signing => {
                self.sign()?;
                self.task_state = WithdrawTaskState::Submitting;
            },

            WithdrawTaskState::Submitting => {
                self.submit().await?;
                self.task_state = WithdrawTaskState::Completed;
            },

            WithdrawTaskState::Completed => {},
        }

        Ok(())
    }

    fn name(&self) -> String {
        WITHDRAW_TASK_NAME.to_string()
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }
}

// -----------------------
// | Task Implementation |
// -----------------------

impl WithdrawTask {
    /// Constructor
    pub fn new(raw_token: String, ctx: WithdrawalContext) -> Self {
        Self {
            raw_token,
            token: None,
            ring_state: None,
            member: None,
            signed_call: None,
            outcome: None,
            ctx,
            task_state: WithdrawTaskState::Pending,
        }
    }

    // -----------
    // | Getters |
    // -----------

    /// The parsed token, once the token has been parsed
    pub fn token(&self) -> Option<WithdrawalToken> {
        self.token
    }

    /// The ring state, once resolved
    pub fn ring_state(&self) -> Option<RingState> {
        self.ring_state
    }

    /// The state the withdrawal settled in
    ///
    /// `None` after a relayed dispatch, whose result is not reported back
    pub fn outcome(&self) -> Option<WithdrawalState> {
        self.outcome.clone()
    }

    // --------------
    // | Task Steps |
    // --------------

    /// Parse the withdrawal token
    fn parse_token(&mut self) -> Result<(), WithdrawalTaskError> {
        self.token = Some(WithdrawalToken::parse(&self.raw_token)?);
        Ok(())
    }

    /// Resolve the ring's state, stopping the task if the ring is open
    async fn resolve_ring(&mut self) -> Result<(), WithdrawalTaskError> {
        let token = self.parsed_token()?;
        let ring_state =
            resolve_ring_state(self.ctx.ledger.as_ref(), token.amount_tier, token.ring_index)
                .await?;
        self.ring_state = Some(ring_state);

        if !ring_state.is_closed() {
            return Err(WithdrawalTaskError::RingNotClosed);
        }

        Ok(())
    }

    /// Locate the caller's stealth key in the ring
    async fn match_membership(&mut self) -> Result<(), WithdrawalTaskError> {
        let token = self.parsed_token()?;
        let roster = self
            .ctx
            .ledger
            .get_public_keys(token.amount_tier, token.ring_index)
            .await
            .map_err(|e| WithdrawalTaskError::ledger(&e))?;

        let ring = filter_placeholders(&roster);
        let caller = self.ctx.ledger.caller_address();
        let member = find_member(
            &ring,
            &token.secret,
            &caller,
            self.ctx.signer.as_ref(),
            MembershipPath::Withdraw,
        )?;

        self.member = Some(member);
        Ok(())
    }

    /// Sign the withdrawal to the caller's address
    fn sign(&mut self) -> Result<(), WithdrawalTaskError> {
        let token = self.parsed_token()?;
        let ring_hash = self
            .ring_state
            .and_then(|state| state.hash)
            .ok_or_else(|| WithdrawalTaskError::missing("ring hash"))?;
        let member = self.member.as_ref().ok_or_else(|| WithdrawalTaskError::missing("ring member"))?;

        let receiver = self.ctx.ledger.caller_address();
        let signed =
            sign_withdrawal(self.ctx.signer.as_ref(), &token, ring_hash.as_slice(), receiver, member)?;
        self.signed_call = Some(signed);
        Ok(())
    }

    /// Submit the signed withdrawal
    async fn submit(&mut self) -> Result<(), WithdrawalTaskError> {
        let signed =
            self.signed_call.as_ref().ok_or_else(|| WithdrawalTaskError::missing("signed call"))?;

        match self.ctx.dispatcher.dispatch(signed.calldata.clone()).await {
            DispatchOutcome::Confirmed(receipt) => {
                self.outcome = Some(WithdrawalState::Withdrawn(receipt));
                Ok(())
            },
            DispatchOutcome::Relayed => Ok(()),
            DispatchOutcome::Failed(diagnostic) => {
                Err(WithdrawalTaskError::WithdrawalRejected(diagnostic))
            },
        }
    }

    // -----------
    // | Helpers |
    // -----------

    /// The parsed token, or an error if parsing has not run
    fn parsed_token(&self) -> Result<WithdrawalToken, WithdrawalTaskError> {
        self.token.ok_or_else(|| WithdrawalTaskError::missing("token"))
    }
}
