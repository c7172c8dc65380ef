//! Regeneration engine
//!
//! Owns the schema store, the document tracker, and the code generation
//! backend; a regeneration emits declaration text from the current snapshot
//! and document set and atomically overwrites the output file. On a backend
//! failure the output file is left at its last successful state.

use std::path::PathBuf;

use crate::config::Config;
use crate::documents::DocumentStore;
use crate::emitter::CodegenBackend;
use crate::error::{TypesyncError, TypesyncResult};
use crate::fs::atomic_write;
use crate::schema::SchemaStore;

/// Result of one successful regeneration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub documents: usize,
    pub operations: usize,
    pub output: PathBuf,
}

/// One regeneration engine per run
pub struct Engine<B: CodegenBackend> {
    pub store: SchemaStore,
    pub documents: DocumentStore,
    backend: B,
    config: Config,
    output: PathBuf,
}

impl<B: CodegenBackend> Engine<B> {
    pub fn new(store: SchemaStore, documents: DocumentStore, backend: B, config: Config, output: PathBuf) -> Self {
        Self {
            store,
            documents,
            backend,
            config,
            output,
        }
    }

    /// Type-definitions output path
    pub fn output(&self) -> &PathBuf {
        &self.output
    }

    /// Run the backend against the current snapshot and document set and
    /// fully overwrite the output file.
    pub fn regenerate(&mut self) -> TypesyncResult<GenerateSummary> {
        let snapshot = self.store.snapshot().ok_or_else(|| TypesyncError::Generation {
            message: "no schema snapshot extracted yet".to_string(),
        })?;

        let documents = self.documents.documents();
        let content = self.backend.generate(&snapshot, &documents, &self.config)?;
        atomic_write(&self.output, &content)?;

        Ok(GenerateSummary {
            documents: documents.len(),
            operations: self.documents.operation_count(),
            output: self.output.clone(),
        })
    }
}
