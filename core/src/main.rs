//! The entrypoint to the withdrawer
//!
//! Withdraws a single deposit from its ring. If the ring is still open and
//! `--force-close` is given, the ring is closed first when it is eligible
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::needless_pass_by_value)]

mod setup;

use common::types::{chain::Chain, ring::ForceCloseEligibility};
use config::{WithdrawerConfig, parse_command_line_args};
use eyre::{Result, eyre};
use tracing::info;
use util::logging::{LevelFilter, setup_json_logger, setup_system_logger};
use withdrawal_driver::{WithdrawalDriver, WithdrawalState};

use crate::setup::build_driver;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI & config
    let config = parse_command_line_args().map_err(|e| eyre!(e))?;
    configure_logging(&config);

    let driver = build_driver(&config)?;
    let state = run(&driver, &config).await;
    report(config.chain, &state);

    match state {
        WithdrawalState::Withdrawn(_) | WithdrawalState::Nothing => Ok(()),
        other => Err(eyre!("withdrawal ended in state {other}")),
    }
}

/// Withdraw, closing the ring first if it is open and the caller asked to
async fn run(driver: &WithdrawalDriver, config: &WithdrawerConfig) -> WithdrawalState {
    let state = driver.withdraw(&config.token).await;
    if state != WithdrawalState::RingNotClosed {
        return state;
    }

    let Some(ring_state) = driver.snapshot().await.ring_state else {
        return state;
    };
    let eligibility = ring_state.eligibility();
    println!("ring is not closed: {eligibility}");
    if !config.force_close || !matches!(eligibility, ForceCloseEligibility::Closable { .. }) {
        return state;
    }

    info!("closing ring");
    let closed = driver.force_close().await;
    report(config.chain, &closed);
    if !matches!(closed, WithdrawalState::SuccessCloseRing(_)) {
        return closed;
    }

    driver.withdraw(&config.token).await
}

/// Print a state, and a link to its transaction if it carries one
fn report(chain: Chain, state: &WithdrawalState) {
    println!("withdrawal state: {state}");
    if let Some(receipt) = state.receipt() {
        let tx_hash = receipt.tx_hash_hex();
        match chain.explorer_tx_url(&tx_hash) {
            Some(url) => println!("view transaction: {url}"),
            None => println!("transaction: {tx_hash}"),
        }
    }
}

/// Set up the global logger
fn configure_logging(config: &WithdrawerConfig) {
    let level = if config.debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    if config.json_logs {
        setup_json_logger(level);
    } else {
        setup_system_logger(level);
    }
}
