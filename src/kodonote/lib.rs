//! # Kodonote Architecture
//!
//! Kodonote edits a notebook (an ordered list of code and text blocks) locally
//! and commits it, whole, to a live remote collection that other writers may
//! change at any time.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UI Layer (src/kodonote/cli/)                               │
//! │  - clap parsing, terminal rendering, exit codes             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Create / list notebooks, open sessions                   │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session Layer (session.rs, blocks.rs, display.rs)          │
//! │  - Local notebook snapshot, edits, save, layout             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Sync Layer (sync.rs)                                       │
//! │  - Identity filtering, reconciler task, commit              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Remote Layer (remote/)                                     │
//! │  - query / watch / update / insert                          │
//! │  - MemoryRemote (tests), FileRemote (CLI)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing from `api.rs` inward touches stdout or stderr. Diagnostics go
//! through `tracing`; the binary decides where they end up (see [`logging`]).
//!
//! ## Consistency Model
//!
//! The remote is the source of truth and the last full notebook to arrive
//! wins. A snapshot reaching the session replaces whatever it holds, unsaved
//! edits included. See [`session`] for when snapshots are applied.
//!
//! ## Testing
//!
//! - Unit tests live next to the code, async ones on `#[tokio::test]`.
//! - [`remote::memory::fixtures`] builds populated in-memory remotes
//!   (enabled by the `test_utils` feature outside this crate).
//! - `tests/` drives whole sessions and the binary.

pub mod api;
pub mod blocks;
pub mod config;
pub mod display;
pub mod error;
pub mod init;
pub mod logging;
pub mod model;
pub mod remote;
pub mod session;
pub mod sync;
