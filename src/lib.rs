//! Typesync - GraphQL type generation watcher
//!
//! Typesync keeps a generated TypeScript declaration file synchronized with a
//! GraphQL schema and the query templates embedded in a project's source
//! files, and opportunistically rewrites untyped call sites so they reference
//! the freshly generated types.

pub mod annotate;
pub mod config;
pub mod discover;
pub mod documents;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fs;
pub mod schema;
pub mod scheduler;
pub mod watcher;

// Re-exports for convenience
pub use annotate::{annotate_file, annotate_source, AnnotateOutcome, AnnotationMatch};
pub use config::Config;
pub use documents::{DocumentStore, QueryDocument};
pub use emitter::{CodegenBackend, TypeScriptBackend};
pub use engine::{Engine, GenerateSummary};
pub use error::{TypesyncError, TypesyncResult};
pub use extract::{parse_document, Operation, OperationKind};
pub use schema::{FileSchemaSource, SchemaSnapshot, SchemaSource, SchemaStore, SnapshotOutcome};
pub use scheduler::RegenScheduler;
pub use watcher::{watch, WatchEvent, WatchOptions};
