//! # CLI Templates
//!
//! Output templates live as standalone files under `templates/` and are embedded
//! here as string constants. They are minijinja based.
//!
//! Line breaks are explicit: every output line comes from a literal newline
//! inside a loop body, and the template's own trailing newline is dropped by
//! minijinja. Width math (padding, truncation, grid columns) is done in Rust;
//! templates only pick styles and stitch the pieces together.

pub const LIST_TEMPLATE: &str = include_str!("templates/list.tmp");
pub const NOTEBOOK_TEMPLATE: &str = include_str!("templates/notebook.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
