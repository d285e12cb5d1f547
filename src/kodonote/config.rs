//! # Configuration
//!
//! Kodonote configuration is loaded with [`confique`], layering environment
//! variables over a TOML file over compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `KODO_OWNER`, `KODO_HYDRATE_TIMEOUT_MS`
//! 2. **Config file**: `kodonote.toml` in the data directory.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! The data directory itself is picked before any of this (see the CLI's
//! `--home` flag and `KODO_HOME`), since the file lives inside it.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `owner` | none | Owner id used when `--owner` is not given |
//! | `default_layout` | `row` | Layout a session starts in (`row` or `grid`) |
//! | `grid_columns` | `2` | Columns used by the grid layout |
//! | `stamp_last_edited` | `false` | Write the save time into `lastEdited` |
//! | `hydrate_timeout_ms` | `5000` | How long to wait for the remote copy |
//! | `poll_interval_ms` | `500` | How often `show --follow` checks for outside writes |

use crate::display::Layout;
use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "kodonote.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KodoConfig {
    /// Owner id for the notebooks this client works on.
    #[config(env = "KODO_OWNER")]
    pub owner: Option<String>,

    /// Layout a session starts in: "row" or "grid".
    /// When absent, sessions start in rows.
    pub default_layout: Option<Layout>,

    /// Number of columns in the grid layout.
    #[config(default = 2)]
    pub grid_columns: usize,

    /// When true, saving writes the current time into `lastEdited`.
    #[config(default = false)]
    pub stamp_last_edited: bool,

    /// Milliseconds to wait for the first matching remote record.
    #[config(env = "KODO_HYDRATE_TIMEOUT_MS", default = 5000)]
    pub hydrate_timeout_ms: u64,

    /// Milliseconds between checks for writes made by other processes.
    #[config(default = 500)]
    pub poll_interval_ms: u64,
}

impl Default for KodoConfig {
    fn default() -> Self {
        Self {
            owner: None,
            default_layout: None,
            grid_columns: 2,
            stamp_last_edited: false,
            hydrate_timeout_ms: 5000,
            poll_interval_ms: 500,
        }
    }
}

impl KodoConfig {
    /// Loads env + `kodonote.toml` in `config_dir` (if it exists) + defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(config_dir.join(CONFIG_FILENAME))
            .load()?;
        Ok(config)
    }

    pub fn default_layout(&self) -> Layout {
        self.default_layout.unwrap_or_default()
    }

    /// Grid column count, never below one.
    pub fn grid_columns(&self) -> usize {
        self.grid_columns.max(1)
    }

    pub fn hydrate_timeout(&self) -> Duration {
        Duration::from_millis(self.hydrate_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = KodoConfig::default();
        assert_eq!(config.default_layout(), Layout::Row);
        assert_eq!(config.grid_columns(), 2);
        assert!(!config.stamp_last_edited);
        assert_eq!(config.hydrate_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_grid_columns_floor() {
        let config = KodoConfig {
            grid_columns: 0,
            ..Default::default()
        };
        assert_eq!(config.grid_columns(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "owner = \"u1\"\ndefault_layout = \"grid\"\ngrid_columns = 3\nstamp_last_edited = true\n",
        )
        .unwrap();

        let config = KodoConfig::load(dir.path()).unwrap();
        assert_eq!(config.owner.as_deref(), Some("u1"));
        assert_eq!(config.default_layout(), Layout::Grid);
        assert_eq!(config.grid_columns(), 3);
        assert!(config.stamp_last_edited);
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = KodoConfig {
            owner: Some("u1".to_string()),
            default_layout: Some(Layout::Grid),
            ..Default::default()
        };
        let toml = toml::to_string(&config).unwrap();
        let parsed: KodoConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }
}
