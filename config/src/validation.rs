//! Validation of a parsed config

use std::str::FromStr;

use alloy::primitives::Address;

use crate::WithdrawerConfig;

/// Validate a parsed config, returning a description of the first violation
pub(crate) fn validate_config(config: &WithdrawerConfig) -> Result<(), String> {
    if config.token.trim().is_empty() {
        return Err("a withdrawal token must be provided with `--token`".to_string());
    }

    Address::from_str(&config.pool_address)
        .map_err(|e| format!("invalid pool address {}: {e}", config.pool_address))?;

    if config.use_relayer && config.relayer_url.is_none() {
        return Err("`--use-relayer` requires `--relayer-url`".to_string());
    }

    if config.block_polling_interval.is_zero() {
        return Err("block polling interval must be non-zero".to_string());
    }

    Ok(())
}
