//! # API Facade
//!
//! The single entry point for UI clients. It covers the two things a client
//! does around the editor core: manage the catalog of notebooks (create, list)
//! and open an editing session on one of them.
//!
//! ## What the API Does NOT Do
//!
//! - **Editing logic**: that lives in [`crate::session`] and [`crate::blocks`]
//! - **I/O**: no stdout, stderr, or terminal assumptions
//! - **Presentation**: returns data structures, never strings
//!
//! ## Generic Over RemoteStore
//!
//! `KodoApi<R: RemoteStore>` works against any remote:
//! - Production: `KodoApi<FileRemote>`
//! - Testing: `KodoApi<MemoryRemote>`

use crate::error::{KodoError, Result};
use crate::model::{FocusIdentity, Notebook};
use crate::remote::RemoteStore;
use crate::session::{NotebookSession, SessionOptions};
use crate::sync::matching;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub listed_notebooks: Vec<Notebook>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_notebooks(mut self, notebooks: Vec<Notebook>) -> Self {
        self.listed_notebooks = notebooks;
        self
    }
}

pub struct KodoApi<R: RemoteStore + 'static> {
    remote: Arc<R>,
    options: SessionOptions,
}

impl<R: RemoteStore + 'static> KodoApi<R> {
    pub fn new(remote: Arc<R>, options: SessionOptions) -> Self {
        Self { remote, options }
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Adds an empty notebook. `(owner, title)` must not be taken yet, since
    /// sessions locate notebooks by that pair.
    pub async fn create_notebook(&self, identity: &FocusIdentity) -> Result<CmdResult> {
        if identity.title.trim().is_empty() {
            return Err(KodoError::Api("Title cannot be empty".into()));
        }

        if self.notebook_exists(identity).await? {
            return Err(KodoError::Api(format!(
                "Notebook already exists: {}",
                identity.title
            )));
        }

        let notebook = identity.placeholder();
        self.remote.insert(&notebook).await?;

        let mut result = CmdResult::default().with_listed_notebooks(vec![notebook]);
        result.add_message(CmdMessage::success(format!(
            "Notebook created: {}",
            identity.title
        )));
        Ok(result)
    }

    /// Whether a record with this `(owner, title)` is in the remote right now.
    pub async fn notebook_exists(&self, identity: &FocusIdentity) -> Result<bool> {
        let records = self.remote.query().await?;
        let found = matching(identity, &records).next().is_some();
        Ok(found)
    }

    /// Every notebook owned by `owner`, in remote order.
    pub async fn list_notebooks(&self, owner: &str) -> Result<CmdResult> {
        let notebooks: Vec<Notebook> = self
            .remote
            .query()
            .await?
            .into_iter()
            .filter(|r| r.notebook.owner_id() == owner)
            .map(|r| r.notebook)
            .collect();

        let mut result = CmdResult::default();
        if notebooks.is_empty() {
            result.add_message(CmdMessage::info("No notebooks yet."));
        }
        Ok(result.with_listed_notebooks(notebooks))
    }

    /// Opens an editing session. Must run inside a Tokio runtime.
    pub fn open_session(&self, identity: FocusIdentity) -> NotebookSession<R> {
        NotebookSession::open(Arc::clone(&self.remote), identity, self.options.clone())
    }
}
