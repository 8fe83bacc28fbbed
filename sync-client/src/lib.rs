//! # sync-client
//!
//! Client library that keeps a local view of the dungeon rollup in sync and
//! dispatches player commands to it.
//!
//! This is the main library that game front ends use.
//!
//! ## Features
//!
//! - **Polling Sync**: one consistent [`WorldSnapshot`] per tick, published atomically
//! - **Partial-Failure Tolerance**: a missing or broken field never aborts a tick
//! - **Account Switching**: stale ticks are discarded, never published
//! - **Transport Abstraction**: Pluggable transport layer (HTTP, mock)
//! - **Pure State Machine**: Uses sync-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use dungeon_sync_client::{GameClient, SyncConfig};
//!
//! let client = GameClient::connect(&SyncConfig::default())?;
//! client.select_account(&"tz1abc".parse::<AccountId>()?).await;
//!
//! // Act
//! client.drop_item(0).await?;
//!
//! // Observe
//! let snapshot = client.snapshot();
//! ```
//!
//! [`WorldSnapshot`]: dungeon_sync_types::WorldSnapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod engine;
pub mod identity;
pub mod scheduler;
pub mod state;
pub mod submitter;
pub mod transport;

pub use client::{
    ClientError, GameClient, SyncConfig, DEFAULT_ENDPOINT, DEFAULT_POLL_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use engine::WorldSyncEngine;
pub use identity::Identity;
pub use scheduler::{SnapshotReceiver, SyncScheduler};
pub use state::StateClient;
pub use submitter::OperationSubmitter;
pub use transport::{HttpTransport, MockTransport, StateTransport, TransportError};
