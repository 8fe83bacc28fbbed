//! HTTP transport against the sequencer's REST endpoints.
//!
//! ```text
//! GET  /state/value?path=<key>    hex text, 404 when absent
//! GET  /state/subkeys?path=<key>  JSON array of child names
//! POST /operations                {"data": "<hex payload>"}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use dungeon_sync_types::OperationBody;
use reqwest::{Client, StatusCode};
use tracing::trace;

use super::{StateTransport, TransportError};

/// Transport talking to a sequencer over HTTP.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the sequencer at `base_url`.
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport from an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The sequencer base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str, path: &str) -> Result<Option<String>, TransportError> {
        trace!(endpoint, path, "GET");
        let response = self
            .client
            .get(self.url(endpoint))
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| request_error(e, path))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(e, path))?;
        Ok(Some(body))
    }
}

fn request_error(error: reqwest::Error, path: &str) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(path.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[async_trait]
impl StateTransport for HttpTransport {
    async fn read_value(&self, path: &str) -> Result<Option<String>, TransportError> {
        let body = self.get("/state/value", path).await?;
        Ok(body.map(|text| text.trim().trim_matches('"').to_string()))
    }

    async fn read_children(&self, path: &str) -> Result<Vec<String>, TransportError> {
        match self.get("/state/subkeys", path).await? {
            Some(body) => serde_json::from_str(&body)
                .map_err(|e| TransportError::InvalidBody(format!("{}: {}", path, e))),
            None => Ok(Vec::new()),
        }
    }

    async fn submit(&self, body: &OperationBody) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/operations"))
            .json(body)
            .send()
            .await
            .map_err(|e| request_error(e, "/operations"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let transport =
            HttpTransport::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:8080");
        assert_eq!(
            transport.url("/state/value"),
            "http://127.0.0.1:8080/state/value"
        );
    }

    #[tokio::test]
    async fn unreachable_sequencer_is_a_transport_failure() {
        // Port 9 (discard) is essentially never served on loopback.
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

        let result = transport.read_value("/state/map").await;

        assert!(matches!(
            result,
            Err(TransportError::Request(_)) | Err(TransportError::Timeout(_))
        ));
    }
}
