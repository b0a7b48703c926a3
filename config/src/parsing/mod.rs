//! Parsing logic for the withdrawer config

use std::{env, str::FromStr, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use url::Url;

use crate::{Cli, WithdrawerConfig, parsing::config_file::config_file_args, validation::validate_config};

pub mod config_file;

/// Parses command line args into the withdrawer config
///
/// We allow for configurations to come from both a config file and overrides
/// on the command line directly. To support this, we first read configuration
/// options from the config file, prepend them to the cli args string, and parse
/// with `args_override_self` so that cli args (which come after config file
/// args) take precedence.
pub fn parse_command_line_args() -> Result<WithdrawerConfig, String> {
    let command_line_args: Vec<String> =
        env::args_os().map(|val| val.to_string_lossy().to_string()).collect();
    let full_args = assemble_args(command_line_args)?;

    let cli = Cli::parse_from(full_args);
    parse_config_from_args(cli)
}

/// Merge the config file args (if any) into the command line args
///
/// Config file args are placed *before* the command line args so that clap
/// gives precedence to the command line. The first argument from the command
/// line is the executable name, so it stays in front of all args
pub(crate) fn assemble_args(mut command_line_args: Vec<String>) -> Result<Vec<String>, String> {
    let config_file_args = config_file_args(&command_line_args)?;
    if command_line_args.is_empty() {
        return Err("missing program name in command line args".to_string());
    }

    let mut full_args = vec![command_line_args.remove(0)];
    full_args.extend(config_file_args);
    full_args.extend(command_line_args);
    Ok(full_args)
}

/// Parse the config from a set of command line arguments
///
/// Separating out this functionality allows us to easily inject custom args
/// apart from what is specified on the command line
pub(crate) fn parse_config_from_args(cli_args: Cli) -> Result<WithdrawerConfig, String> {
    let private_key =
        PrivateKeySigner::from_str(&cli_args.private_key).map_err(|e| e.to_string())?;
    let pool_address = cli_args
        .pool_address
        .ok_or_else(|| "a pool address must be provided with `--pool-address`".to_string())?;
    let relayer_url = cli_args
        .relayer_url
        .map(|url| Url::parse(&url).map_err(|e| format!("invalid relayer url {url}: {e}")))
        .transpose()?;

    let config = WithdrawerConfig {
        token: cli_args.token.unwrap_or_default(),
        force_close: cli_args.force_close,
        chain: cli_args.chain,
        pool_address,
        rpc_url: cli_args.rpc_url,
        private_key,
        block_polling_interval: Duration::from_millis(cli_args.block_polling_interval_ms),
        use_relayer: cli_args.use_relayer,
        relayer_url,
        debug: cli_args.debug,
        json_logs: cli_args.json_logs,
    };

    validate_config(&config)?;
    Ok(config)
}

// ---------
// | Tests |
// ---------

#[cfg(test)]
mod test {
    use common::types::chain::Chain;

    use super::*;

    /// A valid pool address for tests
    const POOL_ADDRESS: &str = "0x00000000000000000000000000000000000000aa";

    /// Parse a config from the given args, prefixed with a program name
    fn parse(args: &[&str]) -> Result<WithdrawerConfig, String> {
        let args = std::iter::once("withdrawer").chain(args.iter().copied());
        let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
        parse_config_from_args(cli)
    }

    #[test]
    fn test_minimal_config() {
        let config = parse(&["--token", "hei-1-0-ab", "--pool-address", POOL_ADDRESS]).unwrap();

        assert_eq!(config.token, "hei-1-0-ab");
        assert_eq!(config.chain, Chain::Devnet);
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.block_polling_interval, Duration::from_millis(100));
        assert!(!config.use_relayer);
        assert!(!config.force_close);
    }

    #[test]
    fn test_missing_token() {
        assert!(parse(&["--pool-address", POOL_ADDRESS]).is_err());
    }

    #[test]
    fn test_invalid_pool_address() {
        assert!(parse(&["--token", "hei-1-0-ab", "--pool-address", "0x1234"]).is_err());
    }

    #[test]
    fn test_relayer_requires_url() {
        let base = ["--token", "hei-1-0-ab", "--pool-address", POOL_ADDRESS, "--use-relayer"];
        assert!(parse(&base).is_err());

        let mut with_url = base.to_vec();
        with_url.extend(["--relayer-url", "http://localhost:3000/relay"]);
        let config = parse(&with_url).unwrap();
        assert!(config.use_relayer);
        assert_eq!(config.relayer_url.unwrap().as_str(), "http://localhost:3000/relay");
    }

    #[test]
    fn test_chain_and_pool_client_config() {
        let config = parse(&[
            "--token",
            "hei-1-0-ab",
            "--pool-address",
            POOL_ADDRESS,
            "--chain",
            "ropsten",
        ])
        .unwrap();

        let pool_config = config.pool_client_config();
        assert_eq!(pool_config.chain, Chain::Ropsten);
        assert_eq!(pool_config.pool_addr, POOL_ADDRESS);
        assert_eq!(pool_config.private_key.address(), config.private_key.address());
    }

    #[test]
    fn test_repeated_args_take_last() {
        let config = parse(&[
            "--token",
            "hei-1-0-aa",
            "--pool-address",
            POOL_ADDRESS,
            "--token",
            "hei-2-0-bb",
        ])
        .unwrap();

        assert_eq!(config.token, "hei-2-0-bb");
    }
}
