//! The withdrawer CLI and config definitions

use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use common::types::chain::Chain;
use pool_client::PoolClientConfig;
use serde::{Deserialize, Serialize};
use url::Url;

// -------
// | CLI |
// -------

/// Defines the withdrawer command line interface
#[derive(Debug, Parser, Serialize, Deserialize)]
#[clap(author, about, long_about = None)]
#[command(args_override_self = true)]
#[rustfmt::skip]
pub struct Cli {
    // ---------------
    // | Config File |
    // ---------------
    /// A TOML config file to read options from; command line options take precedence
    #[clap(long, value_parser)]
    pub config_file: Option<String>,

    // ------------------
    // | Withdrawal Run |
    // ------------------
    /// The withdrawal token issued at deposit time, of the form `hei-<ether>-<ring>-<secret>`
    #[clap(long, value_parser, env = "HEI_TOKEN")]
    pub token: Option<String>,
    /// Close the ring manually if it is open and eligible, instead of only reporting its status
    #[clap(long, value_parser)]
    pub force_close: bool,

    // -----------------------
    // | Environment Configs |
    // -----------------------
    /// The chain the pool is deployed on
    #[clap(long, value_parser, default_value = "devnet", env = "CHAIN")]
    pub chain: Chain,
    /// The address of the pool contract
    #[clap(long = "pool-address", value_parser, env = "HEISWAP_ADDRESS")]
    pub pool_address: Option<String>,
    /// The HTTP addressable Ethereum JSON-RPC node
    #[clap(long = "rpc-url", value_parser, default_value = "http://localhost:8545", env = "RPC_URL")]
    pub rpc_url: String,
    /// The on-chain private key used to send transactions and to derive the
    /// stealth key
    ///
    /// Defaults to the first pre-funded devnet key
    #[clap(
        value_parser,
        long = "private-key",
        default_value = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        env = "PRIVATE_KEY",
    )]
    pub private_key: String,
    /// The interval at which to poll the node for pending transactions, in milliseconds
    #[clap(long, value_parser, default_value = "100")]
    pub block_polling_interval_ms: u64,

    // -----------
    // | Relayer |
    // -----------
    /// Hand the signed call to a relayer instead of broadcasting it directly
    #[clap(long, value_parser)]
    pub use_relayer: bool,
    /// The relayer endpoint that accepts signed call payloads
    #[clap(long = "relayer-url", value_parser, env = "RELAYER_URL")]
    pub relayer_url: Option<String>,

    // -----------
    // | Logging |
    // -----------
    /// Whether or not to log at debug level
    #[clap(short, long, value_parser)]
    pub debug: bool,
    /// Whether or not to emit logs as JSON
    #[clap(long, value_parser)]
    pub json_logs: bool,
}

// ----------
// | Config |
// ----------

/// Defines the validated configuration of a withdrawal run
#[derive(Clone, Debug)]
pub struct WithdrawerConfig {
    // ------------------
    // | Withdrawal Run |
    // ------------------
    /// The raw withdrawal token, parsed by the withdrawal driver so that a
    /// malformed token surfaces as a withdrawal state
    pub token: String,
    /// Whether to close an open, eligible ring
    pub force_close: bool,

    // -----------------------
    // | Environment Configs |
    // -----------------------
    /// The chain the pool is deployed on
    pub chain: Chain,
    /// The address of the pool contract
    pub pool_address: String,
    /// The HTTP addressable Ethereum JSON-RPC node
    pub rpc_url: String,
    /// The on-chain key used to send transactions
    pub private_key: PrivateKeySigner,
    /// The interval at which to poll the node for pending transactions
    pub block_polling_interval: Duration,

    // -----------
    // | Relayer |
    // -----------
    /// Whether to hand signed calls to a relayer
    pub use_relayer: bool,
    /// The relayer endpoint, always set when `use_relayer` is
    pub relayer_url: Option<Url>,

    // -----------
    // | Logging |
    // -----------
    /// Whether or not to log at debug level
    pub debug: bool,
    /// Whether or not to emit logs as JSON
    pub json_logs: bool,
}

impl WithdrawerConfig {
    /// Build the pool client configuration from this config
    pub fn pool_client_config(&self) -> PoolClientConfig {
        PoolClientConfig {
            pool_addr: self.pool_address.clone(),
            chain: self.chain,
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
            block_polling_interval: self.block_polling_interval,
        }
    }
}
