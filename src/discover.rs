//! Candidate source file discovery
//!
//! Enumerates the JavaScript/TypeScript files that can embed query templates,
//! honoring gitignore rules. Enumeration failure is fatal at startup: the
//! watch process must not proceed with a partial, silently-wrong file set.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{TypesyncError, TypesyncResult};

/// Extensions considered candidate sources
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Whether a path looks like a candidate source file
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Enumerate candidate source files under `source_dir`, sorted for
/// deterministic processing. Generated declaration files (`.d.ts`) are
/// excluded so the engine never tracks its own output.
pub fn discover_sources(source_dir: &Path) -> TypesyncResult<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        return Err(TypesyncError::Discovery {
            root: source_dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut paths = Vec::new();
    // respect .gitignore even when the source dir is not a git checkout
    let walker = WalkBuilder::new(source_dir).require_git(false).build();
    for entry in walker {
        let entry = entry.map_err(|e| TypesyncError::Discovery {
            root: source_dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
            && is_source_path(path)
            && !is_declaration_file(path)
        {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Whether a path is a generated declaration file (`.d.ts`), which is never
/// a candidate source
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(".d.ts"))
        .unwrap_or(false)
}
