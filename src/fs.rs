//! Atomic file writes and content hashing
//!
//! Every file Typesync produces (schema snapshot, type definitions, annotated
//! sources) goes through `atomic_write` so readers never observe a truncated
//! file.

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::TypesyncResult;

/// Write content to a file atomically
///
/// Creates parent directories as needed, then uses the tempfile + rename
/// pattern in the destination directory so the replacement is atomic on the
/// same filesystem.
pub fn atomic_write(path: &Path, content: &str) -> TypesyncResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

/// Compute the SHA-256 hash of content, with the `sha256:` prefix
pub fn hash_content(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    format!("sha256:{:x}", hash)
}

/// Compute the SHA-256 hash of a file's content
pub fn hash_file(path: &Path) -> TypesyncResult<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}
