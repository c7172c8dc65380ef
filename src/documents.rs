//! Document tracker for incremental regeneration
//!
//! Keeps the in-memory set of parsed query documents current between
//! regenerations. Only the file that changed is reparsed; every other entry
//! is left untouched, and a parse failure never corrupts or drops entries
//! that parsed successfully before.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{TypesyncError, TypesyncResult};
use crate::extract::{parse_document, Operation};

/// A source file's parsed query operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    pub source_path: PathBuf,
    pub operations: Vec<Operation>,
}

/// Path-keyed set of tracked documents, at most one entry per path
#[derive(Debug, Default)]
pub struct DocumentStore {
    entries: HashMap<PathBuf, QueryDocument>,
}

impl DocumentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&QueryDocument> {
        self.entries.get(path)
    }

    /// Bulk initial load. Files that fail to parse are reported through
    /// `on_error` and skipped; files without any named operation are not
    /// tracked.
    pub fn load_all(&mut self, paths: &[PathBuf], mut on_error: impl FnMut(&TypesyncError)) {
        for path in paths {
            match parse_path(path) {
                Ok(doc) => {
                    if !doc.operations.is_empty() {
                        self.entries.insert(path.clone(), doc);
                    }
                }
                Err(e) => on_error(&e),
            }
        }
    }

    /// Re-parse exactly one file and replace its entry in place.
    ///
    /// A previously unknown path is inserted when it parses to at least one
    /// named operation. On a parse failure the prior entry (if any) is kept
    /// so the document set passed to the emitter always reflects the latest
    /// successfully parsed version.
    pub fn update_one(&mut self, path: &Path) -> TypesyncResult<()> {
        let doc = parse_path(path)?;
        if doc.operations.is_empty() && !self.entries.contains_key(path) {
            return Ok(());
        }
        self.entries.insert(path.to_path_buf(), doc);
        Ok(())
    }

    /// Evict a removed file's entry
    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// All tracked documents, sorted by path for deterministic output
    pub fn documents(&self) -> Vec<&QueryDocument> {
        let mut docs: Vec<_> = self.entries.values().collect();
        docs.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        docs
    }

    /// Total named operations across all tracked documents
    pub fn operation_count(&self) -> usize {
        self.entries.values().map(|d| d.operations.len()).sum()
    }
}

fn parse_path(path: &Path) -> TypesyncResult<QueryDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| TypesyncError::DocumentParse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let operations = parse_document(&text).map_err(|offset| TypesyncError::DocumentParse {
        file: path.to_path_buf(),
        message: format!("unterminated template at offset {offset}"),
    })?;
    Ok(QueryDocument {
        source_path: path.to_path_buf(),
        operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_all_tracks_files_with_operations() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "graphql`query AQuery { f }`;");
        let b = write(dir.path(), "b.tsx", "const x = 1;");

        let mut store = DocumentStore::new();
        store.load_all(&[a.clone(), b], |_| panic!("no errors expected"));

        assert_eq!(store.len(), 1);
        assert!(store.contains(&a));
    }

    #[test]
    fn test_load_all_reports_but_continues_on_parse_failure() {
        let dir = tempdir().unwrap();
        let good = write(dir.path(), "good.tsx", "graphql`query Good { f }`;");
        let bad = write(dir.path(), "bad.tsx", "graphql`query Broken { f ");

        let mut store = DocumentStore::new();
        let mut errors = Vec::new();
        store.load_all(&[bad, good.clone()], |e| errors.push(e.to_string()));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("bad.tsx"));
        assert!(store.contains(&good));
    }

    #[test]
    fn test_update_one_replaces_in_place() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "graphql`query First { f }`;");
        let b = write(dir.path(), "b.tsx", "graphql`query Other { g }`;");

        let mut store = DocumentStore::new();
        store.load_all(&[a.clone(), b.clone()], |_| {});

        fs::write(&a, "graphql`query Second { f }`;").unwrap();
        store.update_one(&a).unwrap();

        assert_eq!(store.get(&a).unwrap().operations[0].name, "Second");
        // updating A never alters B's entry
        assert_eq!(store.get(&b).unwrap().operations[0].name, "Other");
    }

    #[test]
    fn test_update_one_inserts_new_file() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "graphql`query Fresh { f }`;");

        let mut store = DocumentStore::new();
        store.update_one(&a).unwrap();

        assert!(store.contains(&a));
    }

    #[test]
    fn test_update_one_ignores_untracked_file_without_operations() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "const x = 1;");

        let mut store = DocumentStore::new();
        store.update_one(&a).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_update_one_keeps_prior_entry_on_parse_failure() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "graphql`query Stable { f }`;");

        let mut store = DocumentStore::new();
        store.load_all(&[a.clone()], |_| {});

        fs::write(&a, "graphql`query Broken { f ").unwrap();
        assert!(store.update_one(&a).is_err());

        // prior entry untouched
        assert_eq!(store.get(&a).unwrap().operations[0].name, "Stable");
    }

    #[test]
    fn test_remove_evicts_entry() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.tsx", "graphql`query Gone { f }`;");

        let mut store = DocumentStore::new();
        store.load_all(&[a.clone()], |_| {});
        assert!(store.remove(&a));
        assert!(store.is_empty());
        assert!(!store.remove(&a));
    }

    #[test]
    fn test_documents_sorted_by_path() {
        let dir = tempdir().unwrap();
        let b = write(dir.path(), "b.tsx", "graphql`query B { f }`;");
        let a = write(dir.path(), "a.tsx", "graphql`query A { f }`;");

        let mut store = DocumentStore::new();
        store.load_all(&[b, a], |_| {});

        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].source_path < docs[1].source_path);
    }

    #[test]
    fn test_operation_count() {
        let dir = tempdir().unwrap();
        let a = write(
            dir.path(),
            "a.tsx",
            "graphql`query A { f }`; graphql`mutation B { g }`;",
        );

        let mut store = DocumentStore::new();
        store.load_all(&[a], |_| {});
        assert_eq!(store.operation_count(), 2);
    }
}
