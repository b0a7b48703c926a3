//! A client for handing signed pool calls to a relayer, which broadcasts them
//! on the caller's behalf so the withdrawing address need not hold gas

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::errors::PoolClientError;

/// The body posted to a relayer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    /// The pool contract the call targets
    pub to: Address,
    /// The ABI encoded call
    pub data: Bytes,
}

/// A capability that forwards a signed call to a relayer network
#[async_trait]
pub trait RelayerSubmitter: Send + Sync {
    /// Hand the payload to the relayer
    async fn submit(&self, payload: &RelayPayload) -> Result<(), PoolClientError>;
}

/// A relayer reachable over HTTP, accepting JSON payloads
#[derive(Clone, Debug)]
pub struct HttpRelayer {
    /// The HTTP client
    client: reqwest::Client,
    /// The relay endpoint
    url: Url,
}

impl HttpRelayer {
    /// Construct a relayer client posting to the given endpoint
    pub fn new(url: Url) -> Self {
        Self { client: reqwest::Client::new(), url }
    }
}

#[async_trait]
impl RelayerSubmitter for HttpRelayer {
    #[instrument(skip_all, err, fields(url = %self.url, to = %payload.to))]
    async fn submit(&self, payload: &RelayPayload) -> Result<(), PoolClientError> {
        self.client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(PoolClientError::rpc)?
            .error_for_status()
            .map_err(PoolClientError::rpc)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serialization() {
        let payload = RelayPayload { to: Address::repeat_byte(0x11), data: Bytes::from(vec![0xde, 0xad]) };
        let json = serde_json::to_string(&payload).unwrap();

        assert!(json.contains("\"data\":\"0xdead\""));
        let decoded: RelayPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, payload);
    }
}
