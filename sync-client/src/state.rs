//! StateClient - timeout discipline over any transport.
//!
//! Every read issued during a tick goes through [`StateClient`], so no
//! read can block a tick indefinitely. A read that does not finish within
//! the configured timeout is a [`TransportError::Timeout`], never absence.

use std::time::Duration;

use crate::transport::{StateTransport, TransportError};

/// Read-side wrapper around a transport.
#[derive(Debug, Clone)]
pub struct StateClient<T: StateTransport> {
    transport: T,
    timeout: Duration,
}

impl<T: StateTransport> StateClient<T> {
    /// Wrap a transport, bounding each read by `timeout`.
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Read the value at `path`; `Ok(None)` when the key is absent.
    pub async fn read_value(&self, path: &str) -> Result<Option<String>, TransportError> {
        match tokio::time::timeout(self.timeout, self.transport.read_value(path)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(path.to_string())),
        }
    }

    /// List child keys of `path`; empty when there are none.
    pub async fn read_children(&self, path: &str) -> Result<Vec<String>, TransportError> {
        match tokio::time::timeout(self.timeout, self.transport.read_children(path)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(path.to_string())),
        }
    }
}
