//! Builds the withdrawal driver and its collaborators from the config

use std::sync::Arc;

use config::WithdrawerConfig;
use eyre::{Result, eyre};
use pool_client::{HttpRelayer, PoolClient, PoolLedger};
use ring_crypto::LsagSigner;
use tracing::info;
use withdrawal_driver::{WithdrawalContext, WithdrawalDriver, dispatch::SubmissionMode};

/// Build a withdrawal driver against the configured pool
pub fn build_driver(config: &WithdrawerConfig) -> Result<WithdrawalDriver> {
    let client = PoolClient::new(config.pool_client_config())?;
    info!("withdrawing as {} on {}", client.caller_address(), client.chain());
    let ledger: Arc<dyn PoolLedger> = Arc::new(client);

    let mode = submission_mode(config)?;
    Ok(WithdrawalDriver::new(WithdrawalContext::new(ledger, Arc::new(LsagSigner), mode)))
}

/// Select how signed calls are submitted
fn submission_mode(config: &WithdrawerConfig) -> Result<SubmissionMode> {
    if !config.use_relayer {
        return Ok(SubmissionMode::Direct);
    }

    let url = config.relayer_url.clone().ok_or_else(|| eyre!("relayer enabled without a URL"))?;
    info!("submitting through relayer at {url}");
    Ok(SubmissionMode::Relayer(Arc::new(HttpRelayer::new(url))))
}
