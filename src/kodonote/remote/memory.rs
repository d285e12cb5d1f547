use super::{RemoteHandle, RemoteRecord, RemoteStore, Snapshot, WATCH_CAPACITY};
use crate::error::{KodoError, Result};
use crate::model::Notebook;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// In-memory remote collection for testing.
///
/// Records keep insertion order, so snapshot scans are deterministic.
/// Every write publishes the whole collection to watchers.
pub struct MemoryRemote {
    records: Mutex<Vec<RemoteRecord>>,
    events: broadcast::Sender<Snapshot>,
    simulate_write_error: AtomicBool,
    update_count: AtomicUsize,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            records: Mutex::new(Vec::new()),
            events,
            simulate_write_error: AtomicBool::new(false),
            update_count: AtomicUsize::new(0),
        }
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of successful `update` calls so far.
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn get(&self, handle: &RemoteHandle) -> Option<Notebook> {
        self.records()
            .iter()
            .find(|r| &r.handle == handle)
            .map(|r| r.notebook.clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Inserts without going through the async trait. Still publishes.
    pub fn insert_now(&self, notebook: Notebook) -> RemoteHandle {
        let handle = RemoteHandle::generate();
        let mut records = self.records();
        records.push(RemoteRecord {
            handle: handle.clone(),
            notebook,
        });
        self.publish(&records);
        handle
    }

    fn records(&self) -> MutexGuard<'_, Vec<RemoteRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, records: &[RemoteRecord]) {
        // No watchers is fine.
        let _ = self.events.send(Arc::new(records.to_vec()));
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(KodoError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn query(&self) -> Result<Vec<RemoteRecord>> {
        Ok(self.records().clone())
    }

    fn watch(&self) -> broadcast::Receiver<Snapshot> {
        self.events.subscribe()
    }

    async fn update(&self, handle: &RemoteHandle, notebook: &Notebook) -> Result<()> {
        self.check_writable()?;
        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|r| &r.handle == handle)
            .ok_or_else(|| KodoError::RecordNotFound(handle.clone()))?;
        record.notebook = notebook.clone();
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.publish(&records);
        Ok(())
    }

    async fn insert(&self, notebook: &Notebook) -> Result<RemoteHandle> {
        self.check_writable()?;
        Ok(self.insert_now(notebook.clone()))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{ContentBlock, SectionType};

    pub struct RemoteFixture {
        pub remote: Arc<MemoryRemote>,
    }

    impl Default for RemoteFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RemoteFixture {
        pub fn new() -> Self {
            Self {
                remote: Arc::new(MemoryRemote::new()),
            }
        }

        pub fn with_empty_notebook(self, owner: &str, title: &str) -> Self {
            self.remote.insert_now(Notebook::new(owner, "#f5a623", title));
            self
        }

        pub fn with_notebook(self, notebook: Notebook) -> Self {
            self.remote.insert_now(notebook);
            self
        }

        /// A notebook with `count` text blocks valued "Block 1", "Block 2", ...
        pub fn with_filled_notebook(self, owner: &str, title: &str, count: usize) -> Self {
            let blocks: Vec<ContentBlock> = (1..=count)
                .map(|i| ContentBlock::with_value(SectionType::Text, format!("Block {}", i)))
                .collect();
            self.remote
                .insert_now(Notebook::new(owner, "#4a90e2", title).with_blocks(blocks));
            self
        }

        pub fn handle_of(&self, owner: &str, title: &str) -> Option<RemoteHandle> {
            self.remote
                .records()
                .iter()
                .find(|r| r.notebook.owner_id() == owner && r.notebook.title() == title)
                .map(|r| r.handle.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_query_keeps_order() {
        let remote = MemoryRemote::new();
        remote.insert(&Notebook::new("u1", "red", "A")).await.unwrap();
        remote.insert(&Notebook::new("u1", "red", "B")).await.unwrap();

        let titles: Vec<String> = remote
            .query()
            .await
            .unwrap()
            .iter()
            .map(|r| r.notebook.title().to_string())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn update_overwrites_and_publishes() {
        let remote = MemoryRemote::new();
        let handle = remote.insert_now(Notebook::new("u1", "red", "A"));
        let mut rx = remote.watch();

        let edited = Notebook::new("u1", "red", "A").with_last_edited("yesterday");
        remote.update(&handle, &edited).await.unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].notebook.last_edited(), "yesterday");
        assert_eq!(remote.get(&handle), Some(edited));
        assert_eq!(remote.update_count(), 1);
    }

    #[tokio::test]
    async fn update_unknown_handle_fails() {
        let remote = MemoryRemote::new();
        let err = remote
            .update(&RemoteHandle::new("missing"), &Notebook::new("u1", "red", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, KodoError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn simulated_write_error_leaves_record_alone() {
        let remote = MemoryRemote::new();
        let original = Notebook::new("u1", "red", "A");
        let handle = remote.insert_now(original.clone());
        remote.set_simulate_write_error(true);

        let result = remote
            .update(&handle, &Notebook::new("u1", "red", "A").with_last_edited("x"))
            .await;

        assert!(result.is_err());
        assert_eq!(remote.get(&handle), Some(original));
        assert_eq!(remote.update_count(), 0);
    }
}
