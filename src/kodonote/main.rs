//! # Kodonote CLI
//!
//! The binary is thin: the terminal client lives in `cli/`, and this file only
//! invokes `cli::run()` and turns an error into an exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/kodonote/cli/)                              │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + per-command handlers (commands.rs)      │
//! │  - Template rendering with console styles (render.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                  kodonote library (api.rs inward)
//! ```
//!
//! Everything user-facing happens in the CLI layer: argument parsing, logging
//! setup, the Tokio runtime, rendering and exit codes.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
