//! A relayer that records the payloads handed to it

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pool_client::{RelayPayload, RelayerSubmitter, errors::PoolClientError};

/// A mock relayer
#[derive(Clone, Default)]
pub struct MockRelayer {
    /// The payloads received so far
    received: Arc<Mutex<Vec<RelayPayload>>>,
    /// The error returned on every submission, if set
    failure: Option<String>,
}

impl MockRelayer {
    /// A relayer that accepts every payload
    pub fn new() -> Self {
        Self::default()
    }

    /// A relayer that rejects every payload with the given message
    pub fn failing(msg: &str) -> Self {
        Self { failure: Some(msg.to_string()), ..Default::default() }
    }

    /// The payloads received so far, in order
    pub fn received(&self) -> Vec<RelayPayload> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayerSubmitter for MockRelayer {
    async fn submit(&self, payload: &RelayPayload) -> Result<(), PoolClientError> {
        self.received.lock().unwrap().push(payload.clone());
        match &self.failure {
            Some(msg) => Err(PoolClientError::rpc(msg)),
            None => Ok(()),
        }
    }
}
