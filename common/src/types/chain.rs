//! Represents a chain environment

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// The chain environment
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Chain {
    /// Ethereum mainnet
    Mainnet,
    /// The Sepolia testnet
    Sepolia,
    /// The Ropsten testnet, where the pool was first deployed
    Ropsten,
    /// Any local devnet chain
    Devnet,
}

impl Chain {
    /// The block explorer link for a transaction on this chain, if the chain
    /// has a public explorer
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        let base = match self {
            Chain::Mainnet => "https://etherscan.io",
            Chain::Sepolia => "https://sepolia.etherscan.io",
            Chain::Ropsten => "https://ropsten.etherscan.io",
            Chain::Devnet => return None,
        };

        Some(format!("{base}/tx/{tx_hash}"))
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Mainnet => write!(f, "mainnet"),
            Chain::Sepolia => write!(f, "sepolia"),
            Chain::Ropsten => write!(f, "ropsten"),
            Chain::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Chain::Mainnet),
            "sepolia" => Ok(Chain::Sepolia),
            "ropsten" => Ok(Chain::Ropsten),
            "devnet" => Ok(Chain::Devnet),
            _ => Err(format!("Invalid chain: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_round_trip() {
        for chain in [Chain::Mainnet, Chain::Sepolia, Chain::Ropsten, Chain::Devnet] {
            assert_eq!(Chain::from_str(&chain.to_string()).unwrap(), chain);
        }
        assert!(Chain::from_str("arbitrum").is_err());
    }

    #[test]
    fn test_explorer_url() {
        let url = Chain::Ropsten.explorer_tx_url("0xabc").unwrap();
        assert_eq!(url, "https://ropsten.etherscan.io/tx/0xabc");
        assert!(Chain::Devnet.explorer_tx_url("0xabc").is_none());
    }
}
