//! File watcher for continuous type generation
//!
//! Implements the `watch` command with:
//! - Debounced regeneration (1s trailing edge)
//! - Incremental document reloads (only reparse changed files)
//! - Opportunistic call-site annotation
//! - NDJSON output for CI

mod event;
mod run;

pub use event::{WatchEvent, WatchOptions};
pub use run::watch;
