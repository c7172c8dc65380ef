//! Schema snapshot store
//!
//! Persists the current schema as canonical pretty-printed JSON, gated by a
//! content digest so repeated extractions that produce identical output never
//! touch the disk or trigger downstream work. The digest lives on the store
//! instance (one per run), not in process-global state, so isolated stores
//! can coexist in tests.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{TypesyncError, TypesyncResult};
use crate::fs::{atomic_write, hash_content};

/// Provider of the current schema as data.
///
/// This is the explicit interface the host must implement; the store never
/// reaches into host internals to observe schema changes.
pub trait SchemaSource {
    /// Return the current schema as a JSON value
    fn introspect(&self) -> TypesyncResult<Value>;
}

/// File-backed schema source.
///
/// A `.json` source is parsed as an introspection result; any other
/// extension is treated as SDL text and wrapped in a canonical envelope.
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for FileSchemaSource {
    fn introspect(&self) -> TypesyncResult<Value> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            TypesyncError::SchemaExtraction {
                message: format!("cannot read {}: {}", self.path.display(), e),
            }
        })?;

        if self.path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&text).map_err(|e| TypesyncError::SchemaExtraction {
                message: format!("invalid JSON in {}: {}", self.path.display(), e),
            })
        } else {
            Ok(serde_json::json!({ "sdl": text }))
        }
    }
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Whether the snapshot file was (re)written
    pub written: bool,
    pub path: PathBuf,
}

/// In-memory schema snapshot handed to the code generation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub content: String,
    pub digest: String,
}

/// Snapshot store: one on-disk copy plus the last-written digest
#[derive(Debug)]
pub struct SchemaStore {
    path: PathBuf,
    content: Option<String>,
    digest: Option<String>,
}

impl SchemaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
            digest: None,
        }
    }

    /// Snapshot file path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last-written digest, if an extraction has happened
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The current in-memory snapshot, if an extraction has happened
    pub fn snapshot(&self) -> Option<SchemaSnapshot> {
        match (&self.content, &self.digest) {
            (Some(content), Some(digest)) => Some(SchemaSnapshot {
                content: content.clone(),
                digest: digest.clone(),
            }),
            _ => None,
        }
    }

    /// Extract the current schema, persisting it only when its canonical
    /// serialization differs from the last stored digest.
    ///
    /// When the digests match, no I/O occurs at all. Extraction failure is
    /// fatal to the current operation; the prior snapshot (in memory and on
    /// disk) remains valid.
    pub fn extract(&mut self, source: &dyn SchemaSource) -> TypesyncResult<SnapshotOutcome> {
        let value = source.introspect()?;
        let serialized = serde_json::to_string_pretty(&value).map_err(|e| {
            TypesyncError::SchemaExtraction {
                message: format!("cannot serialize schema: {e}"),
            }
        })?;
        let digest = hash_content(&serialized);

        if self.digest.as_deref() == Some(digest.as_str()) {
            return Ok(SnapshotOutcome {
                written: false,
                path: self.path.clone(),
            });
        }

        atomic_write(&self.path, &serialized)?;
        self.content = Some(serialized);
        self.digest = Some(digest);

        Ok(SnapshotOutcome {
            written: true,
            path: self.path.clone(),
        })
    }
}
