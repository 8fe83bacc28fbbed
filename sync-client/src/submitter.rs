//! OperationSubmitter - one network write per command.

use std::time::Duration;

use dungeon_sync_types::{OperationBody, WirePayload};
use tracing::{debug, warn};

use crate::transport::{StateTransport, TransportError};

/// Posts encoded payloads to the sequencer inbox.
///
/// Never retries and never touches the read loop: the effect of a
/// submission is observed on a later tick.
#[derive(Debug, Clone)]
pub struct OperationSubmitter<T: StateTransport> {
    transport: T,
    timeout: Duration,
}

impl<T: StateTransport> OperationSubmitter<T> {
    /// Create a submitter with a per-submission timeout.
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Submit one payload.
    pub async fn submit(&self, payload: &WirePayload) -> Result<(), TransportError> {
        let body = OperationBody::from(payload);
        debug!(payload = %payload, "submitting operation");

        let result = match tokio::time::timeout(self.timeout, self.transport.submit(&body)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout("/operations".to_string())),
        };

        if let Err(e) = &result {
            warn!(payload = %payload, error = %e, "operation submission failed");
        }
        result
    }
}
