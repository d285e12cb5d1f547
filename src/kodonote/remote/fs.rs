use super::{RemoteHandle, RemoteRecord, RemoteStore, Snapshot, WATCH_CAPACITY};
use crate::error::{KodoError, Result};
use crate::model::Notebook;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

const STORE_FILENAME: &str = "notebooks.json";
const LOCK_FILENAME: &str = "notebooks.json.lock";
const LOCK_RETRY: Duration = Duration::from_millis(10);
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
/// A lock file older than this is assumed to belong to a writer that died.
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// The remote collection kept as one JSON file.
///
/// Every write is a read-modify-write of the whole file, serialized across
/// processes by a lock file next to it. The new content goes to a uniquely
/// named temp file and is renamed into place, so readers never see a partial
/// collection. Writes from this process are published immediately; writes
/// from other processes are picked up by [`FileRemote::spawn_watcher`].
pub struct FileRemote {
    path: PathBuf,
    lock_path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
    events: broadcast::Sender<Snapshot>,
    last_seen: Mutex<Option<SystemTime>>,
}

/// Held while a write is in progress. Dropping it removes the lock file.
struct FileLock {
    path: PathBuf,
}

impl FileLock {
    async fn acquire(path: &Path) -> Result<Self> {
        let started = tokio::time::Instant::now();
        loop {
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .await
            {
                Ok(_) => return Ok(Self { path: path.to_path_buf() }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Self::is_stale(path).await {
                        tracing::warn!(path = %path.display(), "removing stale remote lock");
                        let _ = tokio::fs::remove_file(path).await;
                        continue;
                    }
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(KodoError::Store(format!(
                            "Timed out waiting for lock {}",
                            path.display()
                        )));
                    }
                    tokio::time::sleep(LOCK_RETRY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn is_stale(path: &Path) -> bool {
        let Ok(meta) = tokio::fs::metadata(path).await else {
            return false;
        };
        meta.modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age > LOCK_STALE_AFTER)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl FileRemote {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            path: root.as_ref().join(STORE_FILENAME),
            lock_path: root.as_ref().join(LOCK_FILENAME),
            write_lock: tokio::sync::Mutex::new(()),
            events,
            last_seen: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Polls the file every `every` and publishes a snapshot whenever its
    /// modification time moves. The task runs until aborted.
    pub async fn spawn_watcher(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        // Start from the file as it is now, so the first tick only reports real changes.
        if let Some(mtime) = self.modified().await {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            last_seen.get_or_insert(mtime);
        }

        let remote = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                if let Err(e) = remote.poll_once().await {
                    tracing::warn!(path = %remote.path.display(), error = %e, "remote watcher poll failed");
                }
            }
        })
    }

    async fn modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path).await.ok()?.modified().ok()
    }

    async fn poll_once(&self) -> Result<()> {
        let mtime = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let changed = {
            let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *last_seen != Some(mtime);
            *last_seen = Some(mtime);
            changed
        };

        if changed {
            let records = self.load().await?;
            tracing::debug!(records = records.len(), "remote file changed, publishing snapshot");
            self.publish(records);
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<RemoteRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the collection, lets `change` edit it, and writes it back, all
    /// under both the in-process and the cross-process lock.
    async fn modify<T>(
        &self,
        change: impl FnOnce(&mut Vec<RemoteRecord>) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let _file_lock = FileLock::acquire(&self.lock_path).await?;

        let mut records = self.load().await?;
        let value = change(&mut records)?;
        self.save(&records).await?;
        self.publish(records);
        Ok(value)
    }

    async fn save(&self, records: &[RemoteRecord]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        // Our own write is published directly; keep the watcher from repeating it.
        if let Some(mtime) = self.modified().await {
            *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Some(mtime);
        }
        Ok(())
    }

    fn publish(&self, records: Vec<RemoteRecord>) {
        let _ = self.events.send(Arc::new(records));
    }
}

#[async_trait]
impl RemoteStore for FileRemote {
    async fn query(&self) -> Result<Vec<RemoteRecord>> {
        self.load().await
    }

    fn watch(&self) -> broadcast::Receiver<Snapshot> {
        self.events.subscribe()
    }

    async fn update(&self, handle: &RemoteHandle, notebook: &Notebook) -> Result<()> {
        self.modify(|records| {
            let record = records
                .iter_mut()
                .find(|r| &r.handle == handle)
                .ok_or_else(|| KodoError::RecordNotFound(handle.clone()))?;
            record.notebook = notebook.clone();
            Ok(())
        })
        .await
    }

    async fn insert(&self, notebook: &Notebook) -> Result<RemoteHandle> {
        self.modify(|records| {
            let handle = RemoteHandle::generate();
            records.push(RemoteRecord {
                handle: handle.clone(),
                notebook: notebook.clone(),
            });
            Ok(handle)
        })
        .await
    }
}
