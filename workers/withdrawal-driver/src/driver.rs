//! The withdrawal driver, which runs withdrawal workflows against the shared
//! attempt state
//!
//! Every run is tagged with the attempt generation at issue time. Results are
//! applied under the attempt's write lock, after checking that the generation
//! is still current, so a reset detaches any in-flight run

use std::sync::Arc;

use common::{AsyncShared, new_async_shared};
use pool_client::PoolLedger;
use ring_crypto::RingSigner;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::{
    dispatch::{SubmissionDispatcher, SubmissionMode},
    state::{AttemptSnapshot, Generation, WithdrawalAttempt, WithdrawalState},
    tasks::{force_close::ForceCloseTask, run_task, withdraw::WithdrawTask},
};

/// The collaborators shared by every withdrawal task
#[derive(Clone)]
pub struct WithdrawalContext {
    /// The ledger client, shared read-only
    pub ledger: Arc<dyn PoolLedger>,
    /// The ring signer
    pub signer: Arc<dyn RingSigner>,
    /// The submission dispatcher
    pub dispatcher: SubmissionDispatcher,
}

impl WithdrawalContext {
    /// Constructor
    pub fn new(
        ledger: Arc<dyn PoolLedger>,
        signer: Arc<dyn RingSigner>,
        mode: SubmissionMode,
    ) -> Self {
        let dispatcher = SubmissionDispatcher::new(ledger.clone(), mode);
        Self { ledger, signer, dispatcher }
    }
}

/// Drives withdrawal attempts and owns their state machine
#[derive(Clone)]
pub struct WithdrawalDriver {
    /// The collaborators handed to each task
    ctx: WithdrawalContext,
    /// The current attempt
    attempt: AsyncShared<WithdrawalAttempt>,
}

impl WithdrawalDriver {
    /// Constructor
    pub fn new(ctx: WithdrawalContext) -> Self {
        Self { ctx, attempt: new_async_shared(WithdrawalAttempt::new()) }
    }

    /// A snapshot of the current attempt
    pub async fn snapshot(&self) -> AttemptSnapshot {
        self.attempt.read().await.snapshot()
    }

    /// The current state
    pub async fn state(&self) -> WithdrawalState {
        self.attempt.read().await.state().clone()
    }

    /// Reset to `Nothing`, detaching any in-flight run
    pub async fn reset(&self) {
        let generation = self.attempt.write().await.reset();
        info!("reset withdrawal attempt to generation {generation}");
    }

    /// Start a new attempt and run a withdrawal to completion
    ///
    /// Returns the state of the attempt once the run's result is applied
    pub async fn withdraw(&self, token: &str) -> WithdrawalState {
        let generation = self.attempt.write().await.reset();
        self.run_withdraw(generation, token.to_string()).await
    }

    /// Start a new attempt and run the withdrawal on a spawned task, so the
    /// caller may reset while it is in flight
    ///
    /// The attempt is reset before this method returns
    pub async fn spawn_withdraw(&self, token: String) -> JoinHandle<WithdrawalState> {
        let generation = self.attempt.write().await.reset();
        let driver = self.clone();
        tokio::spawn(async move { driver.run_withdraw(generation, token).await })
    }

    /// Close the ring of an attempt found in `RingNotClosed`
    ///
    /// Rejected, leaving the state unchanged, from any other state
    #[instrument(skip_all)]
    pub async fn force_close(&self) -> WithdrawalState {
        let begun = self.attempt.write().await.begin_force_close();
        let Some((generation, token)) = begun else {
            return self.state().await;
        };

        let mut task = ForceCloseTask::new(token, self.ctx.clone());
        let next = match run_task(&mut task).await {
            Ok(()) => task.outcome(),
            Err(e) => Some(e.terminal_state()),
        };

        let mut attempt = self.attempt.write().await;
        if let Some(next) = next {
            attempt.apply(generation, next);
        }

        attempt.state().clone()
    }

    /// Run a withdrawal issued at `generation` and apply its result
    #[instrument(skip_all, fields(generation = %generation))]
    async fn run_withdraw(&self, generation: Generation, token: String) -> WithdrawalState {
        let mut task = WithdrawTask::new(token, self.ctx.clone());
        let next = match run_task(&mut task).await {
            Ok(()) => task.outcome(),
            Err(e) => Some(e.terminal_state()),
        };

        // Apply the results atomically with the generation check
        let mut attempt = self.attempt.write().await;
        if let Some(token) = task.token() {
            attempt.record_token(generation, token);
        }
        if let Some(ring_state) = task.ring_state() {
            attempt.record_ring_state(generation, ring_state);
        }
        if let Some(next) = next {
            attempt.apply(generation, next);
        }

        attempt.state().clone()
    }
}
