//! GameClient - the interface the rendering layer consumes.
//!
//! This module provides [`GameClient`]: a read-only snapshot stream plus
//! one function per player command.
//!
//! # Architecture
//!
//! ```text
//! Renderer ◄── watch ── SyncScheduler ── WorldSyncEngine ── StateClient ──┐
//!                                                                        ├─ Transport ─► sequencer
//! Renderer ──► GameClient::move_up() ── OperationSubmitter ──────────────┘
//! ```
//!
//! Commands are fire-and-forget relative to polling: submitting never
//! pauses or resets the tick cycle, and the effect shows up in a later
//! snapshot.
//!
//! # Example
//!
//! ```ignore
//! use dungeon_sync_client::{GameClient, SyncConfig};
//!
//! let client = GameClient::connect(&SyncConfig::new("http://127.0.0.1:8080"))?;
//! client.select_account(&AccountId::parse("tz1abc")?).await;
//!
//! let mut snapshots = client.subscribe();
//! client.move_up().await?;
//! snapshots.changed().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use dungeon_sync_types::{AccountId, Command, FormatError, ItemCode, WirePayload, WorldSnapshot};
use thiserror::Error;
use tracing::info;

use crate::engine::WorldSyncEngine;
use crate::identity::Identity;
use crate::scheduler::{SnapshotReceiver, SyncScheduler};
use crate::state::StateClient;
use crate::submitter::OperationSubmitter;
use crate::transport::{HttpTransport, StateTransport, TransportError};

/// Default sequencer endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";
/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Format error.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A command was sent before any account was selected.
    #[error("no active account")]
    NoActiveAccount,
}

/// Configuration for GameClient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the sequencer.
    pub endpoint: String,
    /// Time between polling ticks.
    pub poll_interval: Duration,
    /// Timeout applied to every read and submission.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Create a configuration for the sequencer at `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the polling period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Synchronized world view plus command dispatch for one player at a time.
pub struct GameClient<T: StateTransport + Clone + 'static> {
    scheduler: SyncScheduler<T>,
    engine: WorldSyncEngine<T>,
    submitter: OperationSubmitter<T>,
}

impl GameClient<HttpTransport> {
    /// Create a client talking HTTP to `config.endpoint`.
    pub fn connect(config: &SyncConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.endpoint, config.request_timeout)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: StateTransport + Clone + 'static> GameClient<T> {
    /// Create a client over any transport.
    pub fn new(config: &SyncConfig, transport: T) -> Self {
        let engine = WorldSyncEngine::new(StateClient::new(
            transport.clone(),
            config.request_timeout,
        ));
        Self {
            scheduler: SyncScheduler::new(engine.clone(), config.poll_interval),
            engine,
            submitter: OperationSubmitter::new(transport, config.request_timeout),
        }
    }

    /// Make `identity` the active account and start polling for it.
    pub async fn select_account(&self, identity: &impl Identity) {
        self.scheduler.select_account(identity.account_id()).await;
    }

    /// Stop polling.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    /// Stop polling and wait for background work to exit.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    /// The account commands are sent for, if one is selected.
    pub async fn active_account(&self) -> Option<AccountId> {
        self.scheduler.active_account().await
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.scheduler.subscribe()
    }

    /// The most recent snapshot.
    pub fn snapshot(&self) -> Option<Arc<WorldSnapshot>> {
        self.scheduler.latest()
    }

    /// Run a single tick for `identity` without starting the scheduler.
    pub async fn fetch_once(&self, identity: &impl Identity) -> WorldSnapshot {
        self.engine.tick(&identity.account_id(), None, 0, 1).await
    }

    /// Encode and submit a command for the active account.
    ///
    /// Returns the submitted payload. A failed submission leaves polling
    /// untouched.
    pub async fn send(&self, command: Command) -> Result<WirePayload, ClientError> {
        let account = self
            .scheduler
            .active_account()
            .await
            .ok_or(ClientError::NoActiveAccount)?;
        self.send_as(&account, command).await
    }

    /// Encode and submit a command on behalf of `identity`.
    pub async fn send_as(
        &self,
        identity: &impl Identity,
        command: Command,
    ) -> Result<WirePayload, ClientError> {
        let account = identity.account_id();
        let payload = WirePayload::encode(&account, &command);
        self.submitter.submit(&payload).await?;
        info!(%account, %command, "command submitted");
        Ok(payload)
    }

    /// Move one tile up.
    pub async fn move_up(&self) -> Result<WirePayload, ClientError> {
        self.send(Command::MoveUp).await
    }

    /// Move one tile down.
    pub async fn move_down(&self) -> Result<WirePayload, ClientError> {
        self.send(Command::MoveDown).await
    }

    /// Move one tile left.
    pub async fn move_left(&self) -> Result<WirePayload, ClientError> {
        self.send(Command::MoveLeft).await
    }

    /// Move one tile right.
    pub async fn move_right(&self) -> Result<WirePayload, ClientError> {
        self.send(Command::MoveRight).await
    }

    /// Pick up the item on the current tile.
    pub async fn pick_up(&self) -> Result<WirePayload, ClientError> {
        self.send(Command::PickUp).await
    }

    /// Drop the item in inventory `slot`.
    pub async fn drop_item(&self, slot: u8) -> Result<WirePayload, ClientError> {
        self.send(Command::Drop { slot }).await
    }

    /// List the item in inventory `slot` on the marketplace.
    pub async fn sell(&self, slot: u8) -> Result<WirePayload, ClientError> {
        self.send(Command::Sell { slot }).await
    }

    /// Buy `item` from `seller`.
    pub async fn buy(&self, seller: &AccountId, item: ItemCode) -> Result<WirePayload, ClientError> {
        self.send(Command::Buy {
            item,
            seller: seller.clone(),
        })
        .await
    }
}
