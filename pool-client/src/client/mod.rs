//! The definition of the pool client, which holds the configuration details,
//! along with a lower-level handle for the pool smart contract

use std::{str::FromStr, time::Duration};

use alloy::{
    providers::{
        DynProvider, Provider, ProviderBuilder,
        fillers::{ChainIdFiller, GasFiller},
    },
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::Address;
use common::types::chain::Chain;
use util::err_str;

use crate::{
    abi::Heiswap::{self, HeiswapInstance},
    errors::{PoolClientConfigError, PoolClientError},
};

mod contract_interaction;

/// A type alias for the RPC client, which is an alloy middleware stack that
/// includes a signer derived from a raw private key, and a provider that
/// connects to the RPC endpoint over HTTP.
pub type HeiswapProvider = DynProvider;

/// A configuration struct for the pool client, consisting of the pool contract
/// address, an endpoint for setting up an RPC client, and a private key for
/// signing transactions.
#[derive(Clone)]
pub struct PoolClientConfig {
    /// The address of the pool contract
    pub pool_addr: String,
    /// Which chain the client should interact with
    pub chain: Chain,
    /// HTTP-addressable RPC endpoint for the client to connect to
    pub rpc_url: String,
    /// The private key of the account to use for signing transactions
    pub private_key: PrivateKeySigner,
    /// The interval at which to poll for pending transactions
    pub block_polling_interval: Duration,
}

impl PoolClientConfig {
    /// Constructs RPC clients capable of signing transactions from the
    /// configuration
    fn get_provider(&self) -> Result<HeiswapProvider, PoolClientConfigError> {
        let url = Url::parse(&self.rpc_url)
            .map_err(err_str!(PoolClientConfigError::RpcClientInitialization))?;
        let key = self.private_key.clone();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .with_simple_nonce_management()
            .filler(ChainIdFiller::default())
            .filler(GasFiller)
            .wallet(key)
            .connect_http(url);
        provider.client().set_poll_interval(self.block_polling_interval);

        Ok(DynProvider::new(provider))
    }

    /// Parses the pool address from the configuration
    fn get_pool_address(&self) -> Result<Address, PoolClientConfigError> {
        Address::from_str(&self.pool_addr)
            .map_err(|e| PoolClientConfigError::AddressParsing(e.to_string()))
    }
}

/// The pool client, which provides a higher-level interface to the pool
/// contract for withdrawal access patterns.
#[derive(Clone)]
pub struct PoolClient {
    /// The pool contract instance
    pool: HeiswapInstance<HeiswapProvider>,
    /// The address of the signing account
    caller: Address,
    /// The chain the pool is deployed on
    chain: Chain,
}

impl PoolClient {
    /// Constructs a new pool client from the given configuration
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: PoolClientConfig) -> Result<Self, PoolClientError> {
        let pool_address = config.get_pool_address()?;
        let provider = config.get_provider()?;
        let pool = Heiswap::new(pool_address, provider);
        let caller = config.private_key.address();

        Ok(Self { pool, caller, chain: config.chain })
    }

    /// Get a handle to the pool contract
    pub fn pool(&self) -> &HeiswapInstance<HeiswapProvider> {
        &self.pool
    }

    /// Get the chain the client is connected to
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Get a reference to the underlying RPC client
    pub fn provider(&self) -> &HeiswapProvider {
        self.pool.provider()
    }
}
