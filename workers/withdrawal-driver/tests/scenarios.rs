//! End-to-end withdrawal scenarios against an in-memory pool

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, U256, address};
use common::types::{
    ring::{ForceCloseEligibility, PrivacyLevel, RingPublicKey},
    token::{AmountTier, WithdrawalSecret},
};
use eyre::Result;
use pool_client::PoolLedger;
use ring_crypto::LsagSigner;
use test_helpers::{
    assert_eq_result, assert_matches_result, assert_true_result,
    fixtures::{random_secret, roster_entry, roster_with_member, stranger_roster, token_for},
    mocks::{MockPoolLedger, MockRelayer, MockRing},
};
use withdrawal_driver::{
    WithdrawalContext, WithdrawalDriver, WithdrawalState, dispatch::SubmissionMode,
};

/// The account withdrawing in every scenario
const CALLER: Address = address!("0x00000000000000000000000000000000000ca11e");
/// The tier every scenario deposits into
const TIER: AmountTier = AmountTier::Two;
/// The ring index every scenario deposits into
const RING: u64 = 7;

// -----------
// | Helpers |
// -----------

/// Build a driver over the given ledger
fn driver_with(ledger: &MockPoolLedger, mode: SubmissionMode) -> WithdrawalDriver {
    let ledger: Arc<dyn PoolLedger> = Arc::new(ledger.clone());
    WithdrawalDriver::new(WithdrawalContext::new(ledger, Arc::new(LsagSigner), mode))
}

/// Build a driver broadcasting directly, and the ledger behind it
fn setup() -> (WithdrawalDriver, MockPoolLedger) {
    let ledger = MockPoolLedger::new(CALLER);
    (driver_with(&ledger, SubmissionMode::Direct), ledger)
}

/// The raw token for the scenario ring
fn raw_token(secret: WithdrawalSecret) -> String {
    token_for(TIER, RING, secret).to_string()
}

// ---------
// | Tests |
// ---------

#[tokio::test]
async fn test_withdraw_from_closed_ring() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER)]));

    let state = driver.withdraw(&raw_token(secret)).await;
    let WithdrawalState::Withdrawn(receipt) = state else {
        eyre::bail!("expected a withdrawal, got {state}");
    };

    let snapshot = driver.snapshot().await;
    assert_eq_result!(snapshot.receipt, Some(receipt))?;
    assert_eq_result!(ledger.submissions().len(), 1)?;
    assert_eq_result!(ledger.ring(TIER, RING).map(|r| r.withdrawn), Some(1))
}

#[tokio::test]
async fn test_withdraw_from_larger_ring() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(roster_with_member(5, 3, &secret, &CALLER)));

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_matches_result!(state, WithdrawalState::Withdrawn(_))
}

#[tokio::test]
async fn test_second_withdrawal_is_linked() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(roster_with_member(3, 0, &secret, &CALLER)));

    let first = driver.withdraw(&raw_token(secret)).await;
    assert_matches_result!(first, WithdrawalState::Withdrawn(_))?;

    let second = driver.withdraw(&raw_token(secret)).await;
    assert_eq_result!(second, WithdrawalState::SignatureUsed)?;
    assert_eq_result!(ledger.submissions().len(), 1)
}

#[tokio::test]
async fn test_corrupted_token_makes_no_queries() -> Result<()> {
    let (driver, ledger) = setup();

    for raw in ["", "hei-2-7", "hei-3-7-abcd", "hei-2-x-abcd", "not a token"] {
        assert_eq_result!(driver.withdraw(raw).await, WithdrawalState::CorruptedToken)?;
    }

    assert_true_result!(ledger.queries().is_empty())
}

#[tokio::test]
async fn test_not_a_member() -> Result<()> {
    let (driver, ledger) = setup();
    ledger.set_ring(TIER, RING, MockRing::closed(stranger_roster(3, &CALLER)));

    let state = driver.withdraw(&raw_token(random_secret())).await;
    assert_eq_result!(state, WithdrawalState::InvalidSignature)?;
    assert_true_result!(ledger.submissions().is_empty())
}

#[tokio::test]
async fn test_off_curve_roster() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    let bogus = RingPublicKey::new(U256::from(1u8), U256::from(3u8));
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER), bogus]));

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_eq_result!(state, WithdrawalState::InvalidRing)
}

#[tokio::test]
async fn test_unclassified_revert_is_preserved() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER)]));
    ledger.force_revert("insufficient funds for gas");

    let state = driver.withdraw(&raw_token(secret)).await;
    let WithdrawalState::UnknownError(diagnostic) = state else {
        eyre::bail!("expected an unknown error, got {state}");
    };
    assert_true_result!(diagnostic.contains("insufficient funds for gas"))
}

#[tokio::test]
async fn test_failed_query_is_preserved() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(5, vec![roster_entry(&secret, &CALLER)]));
    ledger.fail_query("get_force_close_blocks_left", "connection refused");

    let state = driver.withdraw(&raw_token(secret)).await;
    let WithdrawalState::UnknownError(diagnostic) = state else {
        eyre::bail!("expected an unknown error, got {state}");
    };
    assert_true_result!(diagnostic.contains("connection refused"))?;
    assert_true_result!(driver.snapshot().await.ring_state.is_none())?;
    assert_true_result!(ledger.submissions().is_empty())
}

// --- Open Rings --- //

#[tokio::test]
async fn test_open_ring_must_wait() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(5, vec![roster_entry(&secret, &CALLER)]));

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_eq_result!(state, WithdrawalState::RingNotClosed)?;

    let ring_state = driver.snapshot().await.ring_state.ok_or_else(|| eyre::eyre!("no ring"))?;
    assert_eq_result!(ring_state.eligibility(), ForceCloseEligibility::Wait { blocks_left: 5 })?;
    assert_eq_result!(ring_state.eligibility().to_string(), "wait 5 blocks".to_string())?;

    // Participants are only fetched once the ring may be closed
    assert_eq_result!(ledger.query_count("get_participants"), 0)?;
    assert_eq_result!(ledger.query_count("get_public_keys"), 0)
}

#[tokio::test]
async fn test_force_close_then_withdraw() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(0, roster_with_member(3, 1, &secret, &CALLER)));

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_eq_result!(state, WithdrawalState::RingNotClosed)?;
    assert_eq_result!(ledger.query_count("get_participants"), 1)?;

    let ring_state = driver.snapshot().await.ring_state.ok_or_else(|| eyre::eyre!("no ring"))?;
    assert_eq_result!(
        ring_state.eligibility(),
        ForceCloseEligibility::Closable { deposited: 3, privacy: PrivacyLevel::Partial }
    )?;

    let closed = driver.force_close().await;
    assert_matches_result!(closed, WithdrawalState::SuccessCloseRing(_))?;
    assert_true_result!(ledger.ring(TIER, RING).is_some_and(|r| r.is_closed()))?;

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_matches_result!(state, WithdrawalState::Withdrawn(_))
}

#[tokio::test]
async fn test_force_close_single_participant() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(0, vec![roster_entry(&secret, &CALLER)]));

    assert_eq_result!(driver.withdraw(&raw_token(secret)).await, WithdrawalState::RingNotClosed)?;
    let state = driver.force_close().await;

    assert_eq_result!(state, WithdrawalState::RingNotEnoughParticipantsToClose)?;
    assert_true_result!(ledger.submissions().is_empty())
}

#[tokio::test]
async fn test_force_close_failure() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(0, roster_with_member(2, 0, &secret, &CALLER)));

    assert_eq_result!(driver.withdraw(&raw_token(secret)).await, WithdrawalState::RingNotClosed)?;
    ledger.force_revert("Signature has been used!");

    // Close failures are never classified by revert reason
    assert_eq_result!(driver.force_close().await, WithdrawalState::FailedCloseRing)
}

#[tokio::test]
async fn test_force_close_requires_open_ring_state() -> Result<()> {
    let (driver, ledger) = setup();
    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(0, roster_with_member(3, 0, &secret, &CALLER)));

    // Nothing to close before a withdrawal finds the ring open
    assert_eq_result!(driver.force_close().await, WithdrawalState::Nothing)?;
    assert_true_result!(ledger.queries().is_empty())?;

    // Nor after the attempt has been reset
    driver.withdraw(&raw_token(secret)).await;
    driver.reset().await;
    assert_eq_result!(driver.force_close().await, WithdrawalState::Nothing)
}

// --- Submission Modes + Concurrency --- //

#[tokio::test]
async fn test_relayed_withdrawal_leaves_state_unchanged() -> Result<()> {
    let ledger = MockPoolLedger::new(CALLER);
    let relayer = MockRelayer::new();
    let driver = driver_with(&ledger, SubmissionMode::Relayer(Arc::new(relayer.clone())));

    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER)]));

    let state = driver.withdraw(&raw_token(secret)).await;
    assert_eq_result!(state, WithdrawalState::Nothing)?;

    let received = relayer.received();
    assert_eq_result!(received.len(), 1)?;
    assert_eq_result!(received[0].to, ledger.pool_address())?;
    assert_true_result!(ledger.submissions().is_empty())
}

#[tokio::test]
async fn test_failed_relay_leaves_state_unchanged() -> Result<()> {
    let ledger = MockPoolLedger::new(CALLER);
    let relayer = MockRelayer::failing("relayer unavailable");
    let driver = driver_with(&ledger, SubmissionMode::Relayer(Arc::new(relayer.clone())));

    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER)]));

    assert_eq_result!(driver.withdraw(&raw_token(secret)).await, WithdrawalState::Nothing)?;
    assert_eq_result!(relayer.received().len(), 1)
}

#[tokio::test]
async fn test_reset_discards_in_flight_result() -> Result<()> {
    let ledger = MockPoolLedger::new(CALLER).with_latency(Duration::from_millis(20));
    let driver = driver_with(&ledger, SubmissionMode::Direct);

    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::closed(vec![roster_entry(&secret, &CALLER)]));

    let handle = driver.spawn_withdraw(raw_token(secret)).await;
    driver.reset().await;
    let state = handle.await?;

    assert_eq_result!(state, WithdrawalState::Nothing)?;
    let snapshot = driver.snapshot().await;
    assert_eq_result!(snapshot.state, WithdrawalState::Nothing)?;
    assert_true_result!(snapshot.ring_state.is_none())?;
    assert_true_result!(snapshot.receipt.is_none())
}

#[tokio::test]
async fn test_reset_during_force_close() -> Result<()> {
    let ledger = MockPoolLedger::new(CALLER).with_latency(Duration::from_millis(20));
    let driver = driver_with(&ledger, SubmissionMode::Direct);

    let secret = random_secret();
    ledger.set_ring(TIER, RING, MockRing::open(0, roster_with_member(3, 0, &secret, &CALLER)));
    assert_eq_result!(driver.withdraw(&raw_token(secret)).await, WithdrawalState::RingNotClosed)?;

    let closer = driver.clone();
    let handle = tokio::spawn(async move { closer.force_close().await });
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq_result!(driver.state().await, WithdrawalState::ForceClosingRing)?;

    driver.reset().await;
    assert_eq_result!(handle.await?, WithdrawalState::Nothing)?;

    let snapshot = driver.snapshot().await;
    assert_eq_result!(snapshot.state, WithdrawalState::Nothing)?;
    assert_true_result!(snapshot.ring_state.is_none())?;
    assert_true_result!(snapshot.receipt.is_none())
}
