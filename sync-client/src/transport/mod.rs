//! Transport abstraction for the rollup sequencer.
//!
//! This module provides a pluggable transport layer over the three
//! endpoints the client consumes (HTTP sequencer, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and stateless:
//! - `read_value()` fetches the hex text stored at a key path
//! - `read_children()` lists the child key names under a path
//! - `submit()` posts one operation to the inbox
//!
//! Absence is not an error: a missing value is `Ok(None)` and a path with
//! no children is `Ok(vec![])`. Every `Err` is a transport failure that the
//! next tick retries.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.set_value("/players/tz1abc/x_pos", "03");
//! let players = transport.read_children("/players").await?;
//! let x = transport.read_value("/players/tz1abc/x_pos").await?;
//! ```

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use dungeon_sync_types::OperationBody;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be sent or the response not received.
    #[error("request failed: {0}")]
    Request(String),

    /// The sequencer answered with an unexpected status.
    #[error("unexpected status {status} for {path}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Key path that was read.
        path: String,
    },

    /// The read did not complete in time.
    #[error("read timed out: {0}")]
    Timeout(String),

    /// The response body could not be interpreted.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// The sequencer refused an operation.
    #[error("operation rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },
}

/// Transport trait for reading the state tree and submitting operations.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait StateTransport: Send + Sync {
    /// Read the hex text stored at `path`, or `None` if the key is absent.
    async fn read_value(&self, path: &str) -> Result<Option<String>, TransportError>;

    /// List child key names under `path`, in the order the store returns them.
    async fn read_children(&self, path: &str) -> Result<Vec<String>, TransportError>;

    /// Post one operation to the inbox.
    ///
    /// No retries; the outcome is reported as-is.
    async fn submit(&self, body: &OperationBody) -> Result<(), TransportError>;
}
