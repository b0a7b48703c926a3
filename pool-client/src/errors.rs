//! Possible errors thrown by the pool client

use std::{error::Error, fmt::Display};

/// The error type returned by the pool client configuration interface
#[derive(Clone, Debug)]
pub enum PoolClientConfigError {
    /// Error thrown when the RPC client fails to initialize
    RpcClientInitialization(String),
    /// Error thrown when a contract address can't be parsed
    AddressParsing(String),
}

impl Display for PoolClientConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl Error for PoolClientConfigError {}

/// The error type returned by the pool client interface
#[derive(Clone, Debug)]
pub enum PoolClientError {
    /// Error thrown when the pool client configuration fails
    Config(PoolClientConfigError),
    /// Error thrown when a contract call or transaction fails, carrying the
    /// node's diagnostic (including any revert reason)
    ContractInteraction(String),
    /// Error thrown when converting between contract and domain types
    Conversion(String),
    /// Error thrown when a raw RPC request fails
    Rpc(String),
    /// Error thrown when a transaction is mined but reverts
    TxReverted(String),
}

impl PoolClientError {
    /// Create a new contract interaction error
    #[allow(clippy::needless_pass_by_value)]
    pub fn contract_interaction<T: ToString>(msg: T) -> Self {
        Self::ContractInteraction(msg.to_string())
    }

    /// Create a new conversion error
    #[allow(clippy::needless_pass_by_value)]
    pub fn conversion<T: ToString>(msg: T) -> Self {
        Self::Conversion(msg.to_string())
    }

    /// Create a new RPC error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// The raw diagnostic carried by the error, without the variant name
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::ContractInteraction(msg)
            | Self::Conversion(msg)
            | Self::Rpc(msg)
            | Self::TxReverted(msg) => msg.clone(),
        }
    }
}

impl Display for PoolClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl Error for PoolClientError {}

impl From<PoolClientConfigError> for PoolClientError {
    fn from(e: PoolClientConfigError) -> Self {
        Self::Config(e)
    }
}
