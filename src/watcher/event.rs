//! Watch event types and options

use std::path::PathBuf;

use crate::config::Config;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Project root (config paths resolve against it)
    pub project_root: PathBuf,
    /// Config
    pub config: Config,
    /// Output as NDJSON
    pub json: bool,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        root: String,
    },
    SnapshotWritten {
        path: String,
    },
    FileChanged {
        path: String,
    },
    GenerateStarted,
    GenerateComplete {
        documents: usize,
        operations: usize,
        output: String,
    },
    FileAnnotated {
        path: String,
        injected: usize,
    },
    Error {
        phase: String,
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
