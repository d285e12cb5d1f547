//! # Remote Sync Adapter
//!
//! Bridges one focus identity to the remote collection.
//!
//! ## Inbound
//!
//! [`SyncAdapter::subscribe`] starts a reconciler task. The task opens the
//! remote's watch feed first, then reads the current collection, so a change
//! landing between the two is seen (at worst twice, which is harmless). For
//! the initial read and for every snapshot after it, the reconciler scans the
//! whole collection and hands each record whose `(owner_id, title)` equals the
//! identity to the callback, together with its handle.
//!
//! The scan is linear in the size of the collection for every snapshot. That
//! is fine for a personal notebook list; it is left visible in [`matching`]
//! rather than hidden behind an index the remote does not give us.
//!
//! A watcher that falls behind the feed loses intermediate snapshots. That is
//! acceptable: each snapshot is the whole collection, so the next one carries
//! everything.
//!
//! ## Outbound
//!
//! [`SyncAdapter::commit`] overwrites the remote record with the full local
//! notebook. No diffing, no retry.

use crate::error::{KodoError, Result};
use crate::model::{FocusIdentity, Notebook};
use crate::remote::{RemoteHandle, RemoteRecord, RemoteStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Records in `records` that belong to `identity`, in collection order.
pub fn matching<'a>(
    identity: &'a FocusIdentity,
    records: &'a [RemoteRecord],
) -> impl Iterator<Item = &'a RemoteRecord> + 'a {
    records.iter().filter(move |r| identity.matches(&r.notebook))
}

/// A running reconciler. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct SyncAdapter<R: RemoteStore> {
    remote: Arc<R>,
    identity: FocusIdentity,
}

impl<R: RemoteStore + 'static> SyncAdapter<R> {
    pub fn new(remote: Arc<R>, identity: FocusIdentity) -> Self {
        Self { remote, identity }
    }

    pub fn identity(&self) -> &FocusIdentity {
        &self.identity
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Starts the reconciler; `on_record` runs once per matching record per
    /// snapshot, on the reconciler task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(&self, mut on_record: F) -> Subscription
    where
        F: FnMut(Notebook, RemoteHandle) + Send + 'static,
    {
        let mut feed = self.remote.watch();
        let remote = Arc::clone(&self.remote);
        let identity = self.identity.clone();

        let task = tokio::spawn(async move {
            match remote.query().await {
                Ok(records) => dispatch(&identity, &records, &mut on_record),
                Err(e) => tracing::warn!(%identity, error = %e, "initial remote query failed"),
            }

            loop {
                match feed.recv().await {
                    Ok(snapshot) => dispatch(&identity, &snapshot, &mut on_record),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%identity, skipped, "subscription lagged, waiting for next snapshot");
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!(%identity, "remote feed closed");
                        break;
                    }
                }
            }
        });

        Subscription { task }
    }

    /// Overwrites the remote copy with `notebook`.
    ///
    /// Fails with [`KodoError::NotReady`] while `handle` is unresolved and with
    /// [`KodoError::RemoteWrite`] when the remote rejects the write.
    pub async fn commit(&self, handle: Option<&RemoteHandle>, notebook: &Notebook) -> Result<()> {
        let handle = handle.ok_or(KodoError::NotReady)?;
        tracing::debug!(identity = %self.identity, %handle, blocks = notebook.blocks.len(), "committing notebook");
        self.remote
            .update(handle, notebook)
            .await
            .map_err(|e| KodoError::RemoteWrite(e.to_string()))
    }
}

fn dispatch<F>(identity: &FocusIdentity, records: &[RemoteRecord], on_record: &mut F)
where
    F: FnMut(Notebook, RemoteHandle),
{
    for record in matching(identity, records) {
        on_record(record.notebook.clone(), record.handle.clone());
    }
}
