//! Mock transport for testing.
//!
//! Holds an in-memory state tree, lets tests inject failures and latency,
//! and captures submitted operations for verification.

use super::{StateTransport, TransportError};
use async_trait::async_trait;
use dungeon_sync_types::OperationBody;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Mock transport for testing.
///
/// Values are stored by full key path; children of a path are derived from
/// the stored keys, so `/players` lists every account that has any value
/// under `/players/<account>/`. Clones share state.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    values: BTreeMap<String, String>,
    reads: Vec<String>,
    submitted: Vec<OperationBody>,
    failing_paths: BTreeMap<String, String>,
    fail_next_read: Option<String>,
    fail_next_submit: Option<String>,
    latency: Option<Duration>,
}

impl MockTransport {
    /// Create a new, empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store hex text at a key path.
    pub fn set_value(&self, path: &str, hex: &str) {
        self.lock().values.insert(path.to_string(), hex.to_string());
    }

    /// Remove a key.
    pub fn remove_value(&self, path: &str) {
        self.lock().values.remove(path);
    }

    /// Every path read so far, values and children alike.
    pub fn reads(&self) -> Vec<String> {
        self.lock().reads.clone()
    }

    /// How many times `path` was read.
    pub fn read_count(&self, path: &str) -> usize {
        self.lock().reads.iter().filter(|p| *p == path).count()
    }

    /// Get all operations that were submitted.
    pub fn submitted(&self) -> Vec<OperationBody> {
        self.lock().submitted.clone()
    }

    /// Get the last operation that was submitted.
    pub fn last_submitted(&self) -> Option<OperationBody> {
        self.lock().submitted.last().cloned()
    }

    /// Cause the next read (of any path) to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        self.lock().fail_next_read = Some(error.to_string());
    }

    /// Cause every read of `path` to fail until [`clear_failures`](Self::clear_failures).
    pub fn fail_path(&self, path: &str, error: &str) {
        self.lock()
            .failing_paths
            .insert(path.to_string(), error.to_string());
    }

    /// Cause the next submit() to fail with the given error.
    pub fn fail_next_submit(&self, error: &str) {
        self.lock().fail_next_submit = Some(error.to_string());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.failing_paths.clear();
        inner.fail_next_read = None;
        inner.fail_next_submit = None;
    }

    /// Delay every read by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Clear all state (values, failures, captured operations).
    pub fn reset(&self) {
        *self.lock() = MockTransportInner::default();
    }

    /// Record a read, apply latency, and check injected failures.
    async fn begin_read(&self, path: &str) -> Result<(), TransportError> {
        let latency = {
            let mut inner = self.lock();
            inner.reads.push(path.to_string());
            inner.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_read.take() {
            return Err(TransportError::Request(error));
        }
        if let Some(error) = inner.failing_paths.get(path) {
            return Err(TransportError::Request(error.clone()));
        }
        Ok(())
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl StateTransport for MockTransport {
    async fn read_value(&self, path: &str) -> Result<Option<String>, TransportError> {
        self.begin_read(path).await?;
        Ok(self.lock().values.get(path).cloned())
    }

    async fn read_children(&self, path: &str) -> Result<Vec<String>, TransportError> {
        self.begin_read(path).await?;

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let inner = self.lock();
        let children: BTreeSet<String> = inner
            .values
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|child| !child.is_empty())
            .map(str::to_string)
            .collect();
        Ok(children.into_iter().collect())
    }

    async fn submit(&self, body: &OperationBody) -> Result<(), TransportError> {
        let mut inner = self.lock();

        // Check for forced failure
        if let Some(error) = inner.fail_next_submit.take() {
            return Err(TransportError::Rejected {
                status: 500,
                body: error,
            });
        }

        inner.submitted.push(body.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // MockTransport Read Tests
    // ===========================================

    #[tokio::test]
    async fn mock_transport_reads_values() {
        let transport = MockTransport::new();
        transport.set_value("/players/tz1a/x_pos", "03");

        assert_eq!(
            transport.read_value("/players/tz1a/x_pos").await.unwrap(),
            Some("03".to_string())
        );
        assert_eq!(
            transport.read_value("/players/tz1a/y_pos").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn mock_transport_derives_children() {
        let transport = MockTransport::new();
        transport.set_value("/players/tz1b/x_pos", "01");
        transport.set_value("/players/tz1a/x_pos", "01");
        transport.set_value("/players/tz1a/y_pos", "01");
        transport.set_value("/market-place/tz1a/02/value", "05");

        assert_eq!(
            transport.read_children("/players").await.unwrap(),
            vec!["tz1a", "tz1b"]
        );
        assert_eq!(
            transport.read_children("/market-place/tz1a").await.unwrap(),
            vec!["02"]
        );
        assert!(transport
            .read_children("/market-place/tz1b")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn mock_transport_records_reads() {
        let transport = MockTransport::new();
        transport.read_value("/state/map").await.unwrap();
        transport.read_value("/state/map").await.unwrap();
        transport.read_children("/players").await.unwrap();

        assert_eq!(transport.read_count("/state/map"), 2);
        assert_eq!(transport.reads().len(), 3);
    }

    // ===========================================
    // MockTransport Failure Tests
    // ===========================================

    #[tokio::test]
    async fn mock_transport_fail_next_read() {
        let transport = MockTransport::new();
        transport.set_value("/state/map", "03");
        transport.fail_next_read("connection reset");

        let result = transport.read_value("/state/map").await;
        assert!(matches!(result, Err(TransportError::Request(_))));

        // Should work after failure
        assert!(transport.read_value("/state/map").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn mock_transport_fail_path_persists() {
        let transport = MockTransport::new();
        transport.fail_path("/players", "boom");

        assert!(transport.read_children("/players").await.is_err());
        assert!(transport.read_children("/players").await.is_err());
        assert!(transport.read_value("/state/map").await.is_ok());

        transport.clear_failures();
        assert!(transport.read_children("/players").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn mock_transport_latency_delays_reads() {
        let transport = MockTransport::new();
        transport.set_latency(Duration::from_millis(250));

        let start = tokio::time::Instant::now();
        transport.read_value("/state/map").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    // ===========================================
    // MockTransport Submit Tests
    // ===========================================

    #[tokio::test]
    async fn mock_transport_captures_submissions() {
        let transport = MockTransport::new();
        let first = OperationBody { data: "aa".into() };
        let second = OperationBody { data: "bb".into() };

        transport.submit(&first).await.unwrap();
        transport.submit(&second).await.unwrap();

        assert_eq!(transport.submitted(), vec![first, second.clone()]);
        assert_eq!(transport.last_submitted(), Some(second));
    }

    #[tokio::test]
    async fn mock_transport_fail_next_submit() {
        let transport = MockTransport::new();
        transport.fail_next_submit("inbox full");

        let body = OperationBody { data: "aa".into() };
        assert!(matches!(
            transport.submit(&body).await,
            Err(TransportError::Rejected { status: 500, .. })
        ));
        assert!(transport.submitted().is_empty());

        transport.submit(&body).await.unwrap();
        assert_eq!(transport.submitted().len(), 1);
    }

    #[tokio::test]
    async fn mock_transport_clone_shares_state() {
        let transport = MockTransport::new();
        let clone = transport.clone();
        clone.set_value("/state/map", "04");

        assert!(transport.read_value("/state/map").await.unwrap().is_some());

        transport.reset();
        assert!(clone.read_value("/state/map").await.unwrap().is_none());
    }
}
