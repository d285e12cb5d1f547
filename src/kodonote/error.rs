use crate::remote::RemoteHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KodoError {
    /// `save()` was called before the subscription matched a remote record.
    #[error("Notebook is not ready: no remote record has been matched yet")]
    NotReady,

    /// The commit reached the remote but the write did not go through.
    /// The local notebook is left exactly as it was.
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    /// A block mutation used an index the caller never rendered.
    #[error("Block index {index} is out of range (notebook has {len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Remote record not found: {0}")]
    RecordNotFound(RemoteHandle),

    #[error("Notebook not found: {0}")]
    NotebookNotFound(String),

    #[error("Remote subscription closed")]
    SubscriptionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, KodoError>;
