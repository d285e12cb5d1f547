//! # CLI Behavior
//!
//! This is **one possible UI client** for kodonote, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, the
//! Tokio runtime and the tracing subscriber.
//!
//! For the overall architecture, see the library documentation.
//!
//! ## One Command, One Session
//!
//! Each mutating command (`add`, `edit`, `remove`) runs a short editing session:
//!
//! 1. Check the notebook exists, then open a session on `(owner, title)`.
//! 2. Wait for the remote copy (bounded by `hydrate_timeout_ms`).
//! 3. Apply the edit to the local notebook.
//! 4. Save the whole notebook, print it and the saved confirmation.
//! 5. Leave the session.
//!
//! `show --follow` keeps the session open instead, polling `notebooks.json`
//! for writes from other processes and redrawing after each one. Like any
//! session it always shows the remote copy.
//!
//! ## Owner and Data Directory
//!
//! - Owner: `--owner`, else `owner` from config (or `KODO_OWNER`).
//! - Data directory: `--home`, else `KODO_HOME`, else the OS data directory.
//!
//! ## Module Structure
//!
//! - `commands`: context setup and per-command handlers
//! - `render`: template rendering (row and grid layouts, lists, messages)
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styles
//! - `templates`: output templates

mod commands;
mod render;
pub mod setup;
mod styles;
mod templates;

pub use commands::run;
