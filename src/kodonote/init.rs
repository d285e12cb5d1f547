use crate::api::KodoApi;
use crate::config::KodoConfig;
use crate::error::{KodoError, Result};
use crate::remote::fs::FileRemote;
use crate::session::SessionOptions;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "KODO_HOME";

pub struct KodoContext {
    pub api: KodoApi<FileRemote>,
    pub config: KodoConfig,
    pub data_dir: PathBuf,
}

/// Picks the data directory: an explicit path, then `KODO_HOME`, then the
/// OS data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "kodonote", "kodonote")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| KodoError::Store("Could not determine data directory".to_string()))
}

pub fn initialize(explicit_home: Option<&Path>) -> Result<KodoContext> {
    let data_dir = resolve_data_dir(explicit_home)?;
    let config = KodoConfig::load(&data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    let remote = Arc::new(FileRemote::new(&data_dir));
    let api = KodoApi::new(remote, SessionOptions::from(&config));

    Ok(KodoContext {
        api,
        config,
        data_dir,
    })
}
