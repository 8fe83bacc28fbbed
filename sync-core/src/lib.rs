//! # sync-core
//!
//! Pure logic for dungeon-sync (no I/O, instant tests).
//!
//! This crate implements the decoding rules, snapshot assembly and the
//! polling state machine without any network I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same reads → same snapshot)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (HTTP reads, operation submission, timers) is performed by
//! `sync-client`, which feeds raw reads into [`assemble_snapshot`] and
//! interprets the actions produced by [`SchedulerState`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod decode;
pub mod scheduler;

pub use assemble::{
    assemble_snapshot, Assembly, FieldIssue, Fetched, ListingReads, PlayerReads, SellerReads,
    TickReads,
};
pub use scheduler::{Action, Event, SchedulerState};
