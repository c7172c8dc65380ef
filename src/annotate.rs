//! Source annotator
//!
//! Locates untyped call sites that embed a named query and injects the
//! corresponding generated type name:
//!
//! - hook form: `useStaticQuery(graphql`query Page {...}`)` becomes
//!   `useStaticQuery<PageQuery>(graphql`query Page {...}`)`
//! - component form: `<StaticQuery query={graphql`query Page {...}`}>`
//!   becomes `<StaticQuery<PageQuery> query={...}>`
//!
//! A head that already carries a type argument is left untouched, so running
//! the annotator on its own output is a no-op. All edits are insertions
//! computed against the original text and applied in a single pass; template
//! bodies are never modified.

use std::path::Path;

use crate::error::{TypesyncError, TypesyncResult};
use crate::extract::{
    ident_end, is_ident_byte, is_ident_start, operation_header, skip_comment, skip_string,
    skip_template, skip_ws, TEMPLATE_TAG,
};
use crate::fs::atomic_write;

/// The hook identifier whose calls are annotated
pub const HOOK_IDENT: &str = "useStaticQuery";

/// The component name whose opening tags are annotated
pub const COMPONENT_IDENT: &str = "StaticQuery";

/// One planned injection, ephemeral per scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMatch {
    /// Byte offset where the type argument is inserted (end of the head)
    pub insert_at: usize,
    /// Generated type name, e.g. `PageQueryQuery`
    pub type_name: String,
}

/// Outcome of annotating one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateOutcome {
    pub written: bool,
    pub injected: usize,
}

/// Find every annotatable call site in document order.
///
/// Call sites that already carry a type argument and templates whose query
/// has no name are skipped. A file whose templates do not terminate is left
/// entirely alone.
pub fn find_annotations(text: &str) -> Vec<AnnotationMatch> {
    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(j) = skip_comment(bytes, i) {
            i = j;
            continue;
        }
        match bytes[i] {
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => match skip_template(bytes, i + 1) {
                Ok(end) => i = end + 1,
                Err(()) => return Vec::new(),
            },
            b'<' => {
                if let Some(m) = match_component(text, i) {
                    matches.push(m);
                }
                i += 1;
            }
            b if is_ident_start(b) => {
                let start = i;
                let end = ident_end(bytes, i);
                let bounded = start == 0 || !is_ident_byte(bytes[start - 1]);
                if bounded && &text[start..end] == HOOK_IDENT {
                    if let Some(m) = match_hook(text, end) {
                        matches.push(m);
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    matches
}

/// Rewrite a file's text, or `None` when there is nothing to inject
pub fn annotate_source(text: &str) -> Option<String> {
    let matches = find_annotations(text);
    if matches.is_empty() {
        return None;
    }
    Some(apply(text, &matches))
}

/// Annotate one file on disk, writing back only when the content changed
pub fn annotate_file(path: &Path) -> TypesyncResult<AnnotateOutcome> {
    let text = std::fs::read_to_string(path).map_err(|e| TypesyncError::Annotation {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let matches = find_annotations(&text);
    if matches.is_empty() {
        return Ok(AnnotateOutcome {
            written: false,
            injected: 0,
        });
    }

    let rewritten = apply(&text, &matches);
    atomic_write(path, &rewritten).map_err(|e| TypesyncError::Annotation {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(AnnotateOutcome {
        written: true,
        injected: matches.len(),
    })
}

/// Apply insertions against the original text in one combined pass, so
/// earlier replacements can never shift later offsets.
fn apply(text: &str, matches: &[AnnotationMatch]) -> String {
    let mut sorted: Vec<&AnnotationMatch> = matches.iter().collect();
    sorted.sort_by_key(|m| m.insert_at);

    let mut out = String::with_capacity(text.len() + matches.len() * 24);
    let mut last = 0;
    for m in sorted {
        out.push_str(&text[last..m.insert_at]);
        out.push('<');
        out.push_str(&m.type_name);
        out.push('>');
        last = m.insert_at;
    }
    out.push_str(&text[last..]);
    out
}

/// Hook shape; `head_end` is the offset just past the hook identifier
fn match_hook(text: &str, head_end: usize) -> Option<AnnotationMatch> {
    let bytes = text.as_bytes();
    let j = skip_ws(bytes, head_end);
    if bytes.get(j) == Some(&b'<') {
        // already annotated
        return None;
    }
    if bytes.get(j) != Some(&b'(') {
        return None;
    }
    let type_name = named_query_within(text, j, b'(', b')')?;
    Some(AnnotationMatch {
        insert_at: head_end,
        type_name,
    })
}

/// Component shape; `lt` is the offset of the opening `<`
fn match_component(text: &str, lt: usize) -> Option<AnnotationMatch> {
    let bytes = text.as_bytes();
    let j = lt + 1;
    if j >= bytes.len() || !is_ident_start(bytes[j]) {
        return None;
    }
    let name_end = ident_end(bytes, j);
    if &text[j..name_end] != COMPONENT_IDENT {
        return None;
    }
    if bytes.get(name_end) == Some(&b'<') {
        // already annotated
        return None;
    }
    let close = tag_end(bytes, name_end)?;
    let type_name = query_attribute(text, name_end, close)?;
    Some(AnnotationMatch {
        insert_at: name_end,
        type_name,
    })
}

/// Offset of the `>` closing the opening tag, brace- and template-aware
fn tag_end(bytes: &[u8], mut i: usize) -> Option<usize> {
    let mut brace = 0usize;
    while i < bytes.len() {
        if let Some(j) = skip_comment(bytes, i) {
            i = j;
            continue;
        }
        match bytes[i] {
            b'{' => {
                brace += 1;
                i += 1;
            }
            b'}' => {
                brace = brace.saturating_sub(1);
                i += 1;
            }
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => i = skip_template(bytes, i + 1).ok()? + 1,
            b'>' if brace == 0 => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Find the `query={...}` attribute inside the tag span and resolve the
/// embedded query's generated type name
fn query_attribute(text: &str, from: usize, to: usize) -> Option<String> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < to {
        if let Some(j) = skip_comment(bytes, i) {
            i = j;
            continue;
        }
        match bytes[i] {
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => i = skip_template(bytes, i + 1).ok()? + 1,
            b if is_ident_start(b) => {
                let start = i;
                let end = ident_end(bytes, i);
                if &text[start..end] == "query" {
                    let j = skip_ws(bytes, end);
                    if bytes.get(j) == Some(&b'=') {
                        let k = skip_ws(bytes, j + 1);
                        if bytes.get(k) == Some(&b'{') {
                            return named_query_within(text, k, b'{', b'}');
                        }
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    None
}

/// Scan a delimited span (a call's argument list or an attribute's brace
/// block) for a tagged template whose query has a name, and return the
/// generated type name for it.
fn named_query_within(text: &str, open: usize, opener: u8, closer: u8) -> Option<String> {
    let bytes = text.as_bytes();
    let mut i = open + 1;
    let mut depth = 1usize;
    while i < bytes.len() && depth > 0 {
        if let Some(j) = skip_comment(bytes, i) {
            i = j;
            continue;
        }
        let b = bytes[i];
        if b == opener {
            depth += 1;
            i += 1;
        } else if b == closer {
            depth -= 1;
            i += 1;
        } else if b == b'\'' || b == b'"' {
            i = skip_string(bytes, i);
        } else if b == b'`' {
            i = skip_template(bytes, i + 1).ok()? + 1;
        } else if is_ident_start(b) {
            let start = i;
            let end = ident_end(bytes, i);
            if &text[start..end] == TEMPLATE_TAG {
                let j = skip_ws(bytes, end);
                if bytes.get(j) == Some(&b'`') {
                    let body_end = skip_template(bytes, j + 1).ok()?;
                    if let Some((kind, Some(name))) = operation_header(&text[j + 1..body_end]) {
                        return Some(format!("{}{}", name, kind.type_suffix()));
                    }
                    // anonymous query: skip this match rather than inject
                    // an invalid type reference
                    i = body_end + 1;
                    continue;
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}
