//! # Remote Store
//!
//! The authoritative copy of every notebook lives in a remote collection. This
//! module defines the primitives the rest of the crate needs from it and
//! nothing more:
//!
//! - **query**: the whole collection, as it is right now
//! - **watch**: a live feed where every message is the whole collection after a
//!   change (never a per-document diff)
//! - **update**: overwrite one record with a full notebook
//! - **insert**: add a record and get its handle back
//!
//! Every successful write publishes a fresh snapshot to watchers, including the
//! writer's own.
//!
//! ## Implementations
//!
//! - [`memory::MemoryRemote`]: in-process, for tests and fixtures
//! - [`fs::FileRemote`]: a JSON file in the data directory, used by the CLI.
//!   Can poll for writes made by other processes.
//!
//! ## Record Format
//!
//! ```text
//! [
//!   {
//!     "id": "3f0c…",
//!     "ownerId": "u1",
//!     "color": "#f5a623",
//!     "title": "Algebra",
//!     "lastEdited": "",
//!     "blocks": [{ "sectionType": "code", "value": "print(1)" }]
//!   }
//! ]
//! ```

use crate::error::Result;
use crate::model::Notebook;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Buffered snapshots per watcher before it starts lagging.
pub const WATCH_CAPACITY: usize = 64;

/// Opaque reference to one remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteHandle(String);

impl RemoteHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(rename = "id")]
    pub handle: RemoteHandle,
    #[serde(flatten)]
    pub notebook: Notebook,
}

/// The full collection at one point in time.
pub type Snapshot = Arc<Vec<RemoteRecord>>;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every record in the collection.
    async fn query(&self) -> Result<Vec<RemoteRecord>>;

    /// Opens a live feed of full-collection snapshots. Only changes made after
    /// this call are delivered; pair it with [`RemoteStore::query`] for the
    /// current state.
    fn watch(&self) -> broadcast::Receiver<Snapshot>;

    /// Overwrites every field of the record behind `handle`.
    async fn update(&self, handle: &RemoteHandle, notebook: &Notebook) -> Result<()>;

    /// Adds a new record.
    async fn insert(&self, notebook: &Notebook) -> Result<RemoteHandle>;
}
