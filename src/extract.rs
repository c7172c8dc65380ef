//! Tagged-template scanner for queries embedded in source files
//!
//! Finds `graphql`-tagged template literals in JavaScript/TypeScript source
//! text and parses the operation header and top-level selection names out of
//! each template body. A small hand-rolled scanner is used instead of
//! patterns so nested braces, backticks and `${...}` interpolations inside
//! templates cannot derail a match.

/// The tag identifier marking an embedded query template
pub const TEMPLATE_TAG: &str = "graphql";

/// Operation kind, as written in the query header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Suffix appended to the operation name to form the generated type name
    pub fn type_suffix(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "query" => Some(OperationKind::Query),
            "mutation" => Some(OperationKind::Mutation),
            "subscription" => Some(OperationKind::Subscription),
            _ => None,
        }
    }
}

/// A named operation parsed from one template body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: String,
    /// Top-level selection names (aliases win over field names)
    pub selections: Vec<String>,
}

impl Operation {
    /// Name of the generated type for this operation, e.g. `PageQueryQuery`
    pub fn type_name(&self) -> String {
        format!("{}{}", self.name, self.kind.type_suffix())
    }
}

/// Byte span of one tagged template in the scanned source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSpan {
    /// Offset of the tag identifier
    pub tag_start: usize,
    /// Offset just after the opening backtick
    pub body_start: usize,
    /// Offset of the closing backtick
    pub body_end: usize,
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

pub(crate) fn is_ident_start(b: u8) -> bool {
    is_ident_byte(b) && !b.is_ascii_digit()
}

pub(crate) fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Read the identifier starting at `i`, returning the offset past its end
pub(crate) fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

/// Skip a `'...'` or `"..."` literal; `i` points at the opening quote.
/// Returns the offset past the closing quote. An unterminated literal
/// recovers at the end of the line, matching how editors treat them.
pub(crate) fn skip_string(bytes: &[u8], mut i: usize) -> usize {
    let quote = bytes[i];
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i + 1,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Skip a template literal body; `i` points just after the opening backtick.
/// Returns the offset of the closing backtick, or `Err(())` if the template
/// never closes.
pub(crate) fn skip_template(bytes: &[u8], mut i: usize) -> Result<usize, ()> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Ok(i),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                i = skip_interpolation(bytes, i + 2)?;
            }
            _ => i += 1,
        }
    }
    Err(())
}

/// Skip a `${...}` interpolation; `i` points just after the `${`.
fn skip_interpolation(bytes: &[u8], mut i: usize) -> Result<usize, ()> {
    let mut depth = 1usize;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => i = skip_template(bytes, i + 1)? + 1,
            _ => i += 1,
        }
    }
    Err(())
}

/// Skip a `//` or `/* */` comment if one starts at `i`; returns `None` when
/// `i` does not start a comment.
pub(crate) fn skip_comment(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'/') {
        return None;
    }
    match bytes.get(i + 1) {
        Some(&b'/') => {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j] != b'\n' {
                j += 1;
            }
            Some(j)
        }
        Some(&b'*') => {
            let mut j = i + 2;
            while j + 1 < bytes.len() {
                if bytes[j] == b'*' && bytes[j + 1] == b'/' {
                    return Some(j + 2);
                }
                j += 1;
            }
            Some(bytes.len())
        }
        _ => None,
    }
}

/// Find all `graphql`-tagged templates in source text.
///
/// Tags inside comments, string literals, or other templates are ignored.
/// Returns the byte offset of the offending template on an unterminated
/// literal.
pub fn find_templates(text: &str) -> Result<Vec<TemplateSpan>, usize> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(j) = skip_comment(bytes, i) {
            i = j;
            continue;
        }
        match bytes[i] {
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => {
                i = skip_template(bytes, i + 1).map_err(|_| i)? + 1;
            }
            b if is_ident_start(b) => {
                let start = i;
                let end = ident_end(bytes, i);
                let bounded = start == 0 || !is_ident_byte(bytes[start - 1]);
                if bounded && &text[start..end] == TEMPLATE_TAG {
                    let j = skip_ws(bytes, end);
                    if bytes.get(j) == Some(&b'`') {
                        let body_start = j + 1;
                        let body_end = skip_template(bytes, body_start).map_err(|_| j)?;
                        spans.push(TemplateSpan {
                            tag_start: start,
                            body_start,
                            body_end,
                        });
                        i = body_end + 1;
                        continue;
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    Ok(spans)
}

/// Skip whitespace, commas and `#` comments inside a query body
fn skip_insignificant(bytes: &[u8], mut i: usize) -> usize {
    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
            i += 1;
        }
        if bytes.get(i) == Some(&b'#') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        return i;
    }
}

/// Parse the operation header of a template body: the kind keyword and the
/// optional operation name. Shorthand selections and fragments yield `None`.
pub fn operation_header(body: &str) -> Option<(OperationKind, Option<&str>)> {
    let bytes = body.as_bytes();
    let i = skip_insignificant(bytes, 0);
    if i >= bytes.len() || !is_ident_start(bytes[i]) {
        return None;
    }
    let kw_end = ident_end(bytes, i);
    let kind = OperationKind::from_keyword(&body[i..kw_end])?;

    let j = skip_insignificant(bytes, kw_end);
    if j < bytes.len() && is_ident_start(bytes[j]) {
        let name_end = ident_end(bytes, j);
        Some((kind, Some(&body[j..name_end])))
    } else {
        Some((kind, None))
    }
}

/// Parse one template body into a named operation.
///
/// Anonymous operations cannot be mapped to a generated type name and yield
/// `None`, as do fragments and shorthand queries.
pub fn parse_operation(body: &str) -> Option<Operation> {
    let (kind, name) = operation_header(body)?;
    let name = name?;
    Some(Operation {
        kind,
        name: name.to_string(),
        selections: top_level_selections(body),
    })
}

/// Parse every template in a source file into its named operations.
///
/// The error carries the byte offset of an unterminated template.
pub fn parse_document(text: &str) -> Result<Vec<Operation>, usize> {
    let spans = find_templates(text)?;
    let mut ops = Vec::new();
    for span in &spans {
        if let Some(op) = parse_operation(&text[span.body_start..span.body_end]) {
            ops.push(op);
        }
    }
    Ok(ops)
}

/// Skip a GraphQL string literal (including `"""` block strings)
fn skip_gql_string(bytes: &[u8], i: usize) -> usize {
    if bytes.get(i + 1) == Some(&b'"') && bytes.get(i + 2) == Some(&b'"') {
        let mut j = i + 3;
        while j + 2 < bytes.len() {
            if bytes[j] == b'"' && bytes[j + 1] == b'"' && bytes[j + 2] == b'"' {
                return j + 3;
            }
            j += 1;
        }
        return bytes.len();
    }
    skip_string(bytes, i)
}

/// Skip an argument list `( ... )`; `i` points at the opening paren
fn skip_arguments(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return i;
                }
            }
            b'"' => i = skip_gql_string(bytes, i),
            _ => i += 1,
        }
    }
    i
}

/// Collect the top-level selection names of an operation body.
///
/// Aliases shadow field names (`alias: field` yields `alias`), fragment
/// spreads and directives are skipped, nested selection sets are not
/// descended into.
fn top_level_selections(body: &str) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut i = match bytes.iter().position(|&b| b == b'{') {
        Some(p) => p + 1,
        None => return Vec::new(),
    };
    let mut depth = 1usize;
    let mut fields = Vec::new();

    while i < bytes.len() && depth > 0 {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
            }
            b'(' => i = skip_arguments(bytes, i),
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'"' => i = skip_gql_string(bytes, i),
            b'.' => {
                // fragment spread or inline fragment
                while i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                }
                let j = skip_insignificant(bytes, i);
                if j < bytes.len() && is_ident_start(bytes[j]) {
                    let end = ident_end(bytes, j);
                    if &body[j..end] == "on" {
                        let k = skip_insignificant(bytes, end);
                        i = ident_end(bytes, k);
                    } else {
                        i = end;
                    }
                } else {
                    i = j;
                }
            }
            b'@' => {
                // directive: skip the name, arguments are handled above
                i = ident_end(bytes, i + 1);
            }
            b if depth == 1 && is_ident_start(b) => {
                let end = ident_end(bytes, i);
                let name = &body[i..end];
                i = end;
                // alias form: keep the alias, consume the aliased field
                let j = skip_ws(bytes, i);
                if bytes.get(j) == Some(&b':') {
                    let k = skip_ws(bytes, j + 1);
                    if k < bytes.len() && is_ident_start(bytes[k]) {
                        i = ident_end(bytes, k);
                    } else {
                        i = k;
                    }
                }
                fields.push(name.to_string());
            }
            _ => i += 1,
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_templates_simple() {
        let src = "const data = graphql`query PageQuery { site { title } }`;";
        let spans = find_templates(src).unwrap();
        assert_eq!(spans.len(), 1);
        let body = &src[spans[0].body_start..spans[0].body_end];
        assert_eq!(body, "query PageQuery { site { title } }");
    }

    #[test]
    fn test_find_templates_whitespace_between_tag_and_backtick() {
        let src = "graphql `query A { f }`";
        let spans = find_templates(src).unwrap();
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_find_templates_ignores_comments_and_strings() {
        let src = r#"
// graphql`query InComment { f }`
/* graphql`query InBlock { f }` */
const s = "graphql`query InString { f }`";
const t = graphql`query Real { f }`;
"#;
        let spans = find_templates(src).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(src[spans[0].body_start..spans[0].body_end].contains("Real"));
    }

    #[test]
    fn test_find_templates_ignores_other_identifiers() {
        let src = "notgraphql`query A { f }`; graphqlx`query B { f }`;";
        let spans = find_templates(src).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_find_templates_unterminated_is_an_error() {
        let src = "const q = graphql`query Broken { f ";
        assert!(find_templates(src).is_err());
    }

    #[test]
    fn test_find_templates_skips_interpolation() {
        let src = "const q = graphql`query A { f ${fragment} g }`; graphql`query B { h }`;";
        let spans = find_templates(src).unwrap();
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_operation_header_named_query() {
        let (kind, name) = operation_header("query PageQuery { site }").unwrap();
        assert_eq!(kind, OperationKind::Query);
        assert_eq!(name, Some("PageQuery"));
    }

    #[test]
    fn test_operation_header_anonymous() {
        let (kind, name) = operation_header("query { site }").unwrap();
        assert_eq!(kind, OperationKind::Query);
        assert_eq!(name, None);
    }

    #[test]
    fn test_operation_header_mutation() {
        let (kind, name) = operation_header("mutation AddItem { add }").unwrap();
        assert_eq!(kind, OperationKind::Mutation);
        assert_eq!(name, Some("AddItem"));
    }

    #[test]
    fn test_operation_header_fragment_is_none() {
        assert!(operation_header("fragment Meta on Site { title }").is_none());
    }

    #[test]
    fn test_operation_header_shorthand_is_none() {
        assert!(operation_header("{ site { title } }").is_none());
    }

    #[test]
    fn test_operation_header_leading_comment() {
        let (kind, name) = operation_header("# page data\nquery PageQuery { f }").unwrap();
        assert_eq!(kind, OperationKind::Query);
        assert_eq!(name, Some("PageQuery"));
    }

    #[test]
    fn test_parse_operation_type_name() {
        let op = parse_operation("query PageQuery { site }").unwrap();
        assert_eq!(op.type_name(), "PageQueryQuery");

        let op = parse_operation("mutation AddItem { add }").unwrap();
        assert_eq!(op.type_name(), "AddItemMutation");
    }

    #[test]
    fn test_parse_operation_anonymous_is_none() {
        assert!(parse_operation("query { site }").is_none());
    }

    #[test]
    fn test_top_level_selections() {
        let op = parse_operation(
            "query PageQuery { site { siteMetadata { title } } allFile { nodes } }",
        )
        .unwrap();
        assert_eq!(op.selections, vec!["site", "allFile"]);
    }

    #[test]
    fn test_selections_alias_wins() {
        let op = parse_operation("query Q { meta: site { title } }").unwrap();
        assert_eq!(op.selections, vec!["meta"]);
    }

    #[test]
    fn test_selections_skip_arguments_and_directives() {
        let op = parse_operation(
            r#"query Q { file(relativePath: { eq: "a.png" }) @include(if: $x) { id } other }"#,
        )
        .unwrap();
        assert_eq!(op.selections, vec!["file", "other"]);
    }

    #[test]
    fn test_selections_skip_fragment_spreads() {
        let op = parse_operation("query Q { ...SiteMeta site ... on Site { x } }").unwrap();
        assert_eq!(op.selections, vec!["site"]);
    }

    #[test]
    fn test_parse_document_collects_named_operations() {
        let src = r#"
const a = graphql`query PageQuery { site }`;
const b = graphql`query { anonymous }`;
const c = graphql`fragment F on Site { title }`;
const d = graphql`mutation Save { save }`;
"#;
        let ops = parse_document(src).unwrap();
        let names: Vec<_> = ops.iter().map(|o| o.type_name()).collect();
        assert_eq!(names, vec!["PageQueryQuery", "SaveMutation"]);
    }
}
