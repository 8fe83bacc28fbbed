//! # sync-types
//!
//! Wire format and state types for the dungeon rollup client.
//!
//! This crate provides the foundational types used across all dungeon-sync crates:
//! - [`codec`] - Fixed-width hex text codec used by every stored value
//! - [`AccountId`], [`ItemCode`], [`TileCode`], [`Position`], [`GameMap`] - Game state primitives
//! - [`paths`] - Key paths of the rollup state tree
//! - [`Command`], [`WirePayload`], [`OperationBody`] - Action encoding for the inbox
//! - [`WorldSnapshot`] - The immutable aggregate published to consumers
//! - [`FormatError`] - Decoding errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
mod command;
mod error;
mod ids;
pub mod paths;
mod payload;
mod snapshot;
mod tile;

pub use command::{Command, Verb};
pub use error::FormatError;
pub use ids::{AccountId, ItemCode};
pub use payload::{OperationBody, WirePayload, SEPARATOR};
pub use snapshot::{LocalPlayerState, MarketListing, PlayerSnapshot, WorldSnapshot};
pub use tile::{map_idx, GameMap, Position, TileCode, MAP_HEIGHT, MAP_TILES, MAP_WIDTH};
