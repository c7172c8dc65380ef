//! Error types for Typesync
//!
//! Uses `thiserror` for library errors. Failures that affect only one file
//! (document parse, annotation) never abort the watch loop; failures that
//! affect the schema snapshot or the initial file set are fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Typesync operations
pub type TypesyncResult<T> = Result<T, TypesyncError>;

/// Main error type for Typesync operations
#[derive(Error, Debug)]
pub enum TypesyncError {
    /// Schema could not be obtained or serialized - fatal to the current
    /// operation, the prior snapshot remains valid on disk
    #[error("schema extraction failed: {message}")]
    SchemaExtraction { message: String },

    /// Source file enumeration failed - fatal at startup
    #[error("source discovery failed under {root}: {message}")]
    Discovery { root: PathBuf, message: String },

    /// A single document failed to parse - local, other entries unaffected
    #[error("failed to parse queries in {file}: {message}")]
    DocumentParse { file: PathBuf, message: String },

    /// The code generation backend failed - reported, prior output kept
    #[error("type generation failed: {message}")]
    Generation { message: String },

    /// Annotating one source file failed - local, watching continues
    #[error("annotation failed for {file}: {message}")]
    Annotation { file: PathBuf, message: String },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_document_parse() {
        let err = TypesyncError::DocumentParse {
            file: PathBuf::from("src/pages/index.tsx"),
            message: "unterminated template at offset 42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse queries in src/pages/index.tsx: unterminated template at offset 42"
        );
    }

    #[test]
    fn test_error_display_discovery() {
        let err = TypesyncError::Discovery {
            root: PathBuf::from("src"),
            message: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "source discovery failed under src: permission denied"
        );
    }
}
