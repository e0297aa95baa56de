//! Aggregate location and callable recovery.

use crate::docblock::clean_doc_block;
use crate::lexer::{Lexer, Token, TokenKind};
use apiproxy_core::{ProxyMetadata, ProxyMethodDescriptor};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Name of the exported aggregate.
pub const AGGREGATE_NAME: &str = "apiProxy";

static SIGNATURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][\w$]*)\s*:\s*async\s*\(([^)]*)\)").expect("valid regex")
});

/// A problem found while extracting. Extraction never fails outright; it
/// returns whatever it recovered together with these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractIssue {
    /// No `export const apiProxy = {` at the top level.
    #[error("no top-level `export const apiProxy = {{` found")]
    MissingAggregate,

    /// The aggregate's opening brace is never closed.
    #[error("`apiProxy` opened on line {line} is never closed")]
    UnterminatedAggregate {
        /// Line of the opening brace
        line: usize,
    },

    /// A string, template literal or comment inside the aggregate runs to
    /// the end of the source.
    #[error("literal or comment starting on line {line} is never closed")]
    UnterminatedLiteral {
        /// Line where the literal or comment starts
        line: usize,
    },

    /// A doc block not immediately followed by a callable signature.
    #[error("doc block on line {line} is not followed by a callable: {excerpt}")]
    OrphanDocBlock {
        /// Line where the doc block starts
        line: usize,
        /// First line of the cleaned doc text
        excerpt: String,
    },

    /// A callable name seen twice; the later definition wins.
    #[error("callable '{name}' is defined again on line {line}")]
    DuplicateCallable {
        /// The repeated name
        name: String,
        /// Line of the later definition
        line: usize,
    },
}

impl ExtractIssue {
    /// Returns `true` for issues that leave the metadata empty.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingAggregate
                | Self::UnterminatedAggregate { .. }
                | Self::UnterminatedLiteral { .. }
        )
    }
}

/// Output of [`extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Recovered callables in source order.
    pub metadata: ProxyMetadata,
    /// Problems encountered along the way.
    pub issues: Vec<ExtractIssue>,
}

impl Extraction {
    /// Returns `true` if no issues were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the first fatal issue, if any.
    #[must_use]
    pub fn fatal_issue(&self) -> Option<&ExtractIssue> {
        self.issues.iter().find(|i| i.is_fatal())
    }
}

/// Recovers callable metadata from generated module text.
///
/// Pure text processing: nothing is evaluated. The aggregate is located by
/// brace matching that ignores braces inside strings, template literals and
/// comments, and only its top-level members are inspected.
///
/// # Examples
///
/// ```
/// use apiproxy_extractor::extract;
///
/// let source = r#"
/// export const apiProxy = {
///   /**
///    * GET /api/echomsg/:msg
///    * @param {string} msg - Path segment :msg.
///    */
///   echomsg: async (msg) => {
///     return send("GET", `/api/echomsg/${encodeURIComponent(msg)}`);
///   },
///   fetch: async () => {
///     return send("GET", "/api/todos/fetch");
///   },
/// };
/// "#;
///
/// let extraction = extract(source);
/// assert!(extraction.is_clean());
///
/// let echo = extraction.metadata.get("echomsg").unwrap();
/// assert_eq!(echo.params, vec!["msg"]);
/// assert!(echo.jsdoc.starts_with("GET /api/echomsg/:msg"));
///
/// let fetch = extraction.metadata.get("fetch").unwrap();
/// assert!(fetch.params.is_empty());
/// assert!(fetch.jsdoc.is_empty());
/// ```
#[must_use]
pub fn extract(source: &str) -> Extraction {
    let mut lexer = Lexer::new(source);

    let Some(open) = find_aggregate(source, &mut lexer) else {
        tracing::warn!("proxy source has no `{AGGREGATE_NAME}` aggregate");
        return Extraction {
            metadata: ProxyMetadata::new(),
            issues: vec![ExtractIssue::MissingAggregate],
        };
    };

    let mut scan = MemberScan::new(source);
    let mut closed = false;
    let mut depth = 1usize;

    for token in lexer.by_ref() {
        match token.kind {
            TokenKind::Punct(b'{') => {
                scan.significant(&token, depth);
                depth += 1;
            }
            TokenKind::Punct(b'}') => {
                depth -= 1;
                if depth == 0 {
                    closed = true;
                    break;
                }
            }
            _ if token.is_comment() => {
                if depth == 1 && token.is_doc_block(source) {
                    scan.doc_block(token);
                }
            }
            _ => scan.significant(&token, depth),
        }
    }

    if !closed {
        let line = line_of(source, open);
        tracing::warn!(line, "proxy aggregate is never closed");
        let mut issues = vec![ExtractIssue::UnterminatedAggregate { line }];
        if let Some(start) = lexer.unterminated_at() {
            issues.push(ExtractIssue::UnterminatedLiteral {
                line: line_of(source, start),
            });
        }
        return Extraction {
            metadata: ProxyMetadata::new(),
            issues,
        };
    }

    let extraction = scan.finish();
    tracing::debug!(
        callables = extraction.metadata.len(),
        issues = extraction.issues.len(),
        "extracted proxy metadata"
    );
    extraction
}

/// Advances `lexer` past `export const apiProxy = {` at brace depth zero and
/// returns the offset of the opening brace.
fn find_aggregate(source: &str, lexer: &mut Lexer<'_>) -> Option<usize> {
    const MARKER: [&str; 4] = ["export", "const", AGGREGATE_NAME, "="];

    let mut depth = 0usize;
    let mut recent: [&str; 4] = [""; 4];

    for token in lexer.by_ref() {
        if token.is_comment() {
            continue;
        }
        match token.kind {
            TokenKind::Punct(b'{') => {
                if depth == 0 && recent == MARKER {
                    return Some(token.start);
                }
                depth += 1;
            }
            TokenKind::Punct(b'}') => depth = depth.saturating_sub(1),
            _ => {}
        }
        recent.rotate_left(1);
        recent[3] = token.text(source);
    }
    None
}

/// Walks the top-level members of the aggregate.
struct MemberScan<'a> {
    source: &'a str,
    metadata: ProxyMetadata,
    issues: Vec<ExtractIssue>,
    pending_doc: Option<Token>,
    /// Last significant top-level token, used to spot member keys.
    previous: Option<TokenKind>,
}

impl<'a> MemberScan<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            metadata: ProxyMetadata::new(),
            issues: Vec::new(),
            pending_doc: None,
            previous: Some(TokenKind::Punct(b'{')),
        }
    }

    fn doc_block(&mut self, token: Token) {
        if let Some(orphan) = self.pending_doc.replace(token) {
            self.orphan(orphan);
        }
    }

    fn significant(&mut self, token: &Token, depth: usize) {
        if depth != 1 {
            return;
        }

        let at_key = matches!(self.previous, Some(TokenKind::Punct(b'{' | b',')));
        self.previous = Some(token.kind);

        if at_key
            && token.kind == TokenKind::Ident
            && let Some(caps) = SIGNATURE_REGEX.captures(&self.source[token.start..])
        {
            let name = caps[1].to_string();
            let params = clean_params(&caps[2]);
            let jsdoc = self
                .take_adjacent_doc(token.start)
                .map(|doc| clean_doc_block(doc.text(self.source)))
                .unwrap_or_default();

            let descriptor = ProxyMethodDescriptor::new(name.clone(), jsdoc, params);
            if self.metadata.insert(descriptor).is_some() {
                self.issues.push(ExtractIssue::DuplicateCallable {
                    name,
                    line: line_of(self.source, token.start),
                });
            }
            return;
        }

        if let Some(orphan) = self.pending_doc.take() {
            self.orphan(orphan);
        }
    }

    /// Takes the pending doc block if only whitespace separates it from
    /// `position`; otherwise reports it as an orphan.
    fn take_adjacent_doc(&mut self, position: usize) -> Option<Token> {
        let doc = self.pending_doc.take()?;
        if self.source[doc.end..position].trim().is_empty() {
            Some(doc)
        } else {
            self.orphan(doc);
            None
        }
    }

    fn orphan(&mut self, doc: Token) {
        let cleaned = clean_doc_block(doc.text(self.source));
        let excerpt = cleaned.lines().next().unwrap_or_default().to_string();
        self.issues.push(ExtractIssue::OrphanDocBlock {
            line: line_of(self.source, doc.start),
            excerpt,
        });
    }

    fn finish(mut self) -> Extraction {
        if let Some(orphan) = self.pending_doc.take() {
            self.orphan(orphan);
        }
        Extraction {
            metadata: self.metadata,
            issues: self.issues,
        }
    }
}

/// Splits a parameter list into bare names.
///
/// Keeps the text before any `=`, strips destructuring brackets and rest
/// dots, and drops empty entries.
fn clean_params(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| {
            part.split('=')
                .next()
                .unwrap_or_default()
                .replace(['{', '}', '[', ']'], "")
                .replace("...", "")
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(members: &str) -> String {
        format!("const x = 1;\nexport const apiProxy = {{\n{members}\n}};\n")
    }

    #[test]
    fn test_clean_params() {
        assert_eq!(clean_params("a, b = 2, ...rest"), vec!["a", "b", "rest"]);
        assert_eq!(clean_params("{ a, b }"), vec!["a", "b"]);
        assert_eq!(clean_params("[first]"), vec!["first"]);
        assert!(clean_params("").is_empty());
        assert!(clean_params("  ,  ").is_empty());
    }

    #[test]
    fn test_missing_aggregate() {
        let extraction = extract("export const other = { a: 1 };");
        assert!(extraction.metadata.is_empty());
        assert_eq!(extraction.issues, vec![ExtractIssue::MissingAggregate]);
        assert!(extraction.fatal_issue().is_some());
    }

    #[test]
    fn test_marker_inside_string_or_comment_is_ignored() {
        let source = "// export const apiProxy = {\nconst s = 'export const apiProxy = {';";
        let extraction = extract(source);
        assert_eq!(extraction.issues, vec![ExtractIssue::MissingAggregate]);
    }

    #[test]
    fn test_unterminated_aggregate() {
        let source = "\n\nexport const apiProxy = {\n  a: async () => {\n";
        let extraction = extract(source);
        assert!(extraction.metadata.is_empty());
        assert_eq!(
            extraction.issues,
            vec![ExtractIssue::UnterminatedAggregate { line: 3 }]
        );
    }

    #[test]
    fn test_unclosed_string_in_aggregate_is_reported() {
        let source = "export const apiProxy = {\n  a: async () => {\n    return 'oops;\n  },\n};\n";
        let extraction = extract(source);
        assert!(extraction.metadata.is_empty());
        assert_eq!(
            extraction.issues,
            vec![
                ExtractIssue::UnterminatedAggregate { line: 1 },
                ExtractIssue::UnterminatedLiteral { line: 3 },
            ]
        );
        assert!(extraction.issues[1].is_fatal());
    }

    #[test]
    fn test_braces_in_bodies_do_not_confuse_scan() {
        let source = wrap(
            r#"
  /** first */
  a: async (x) => {
    const s = "}}}";
    const t = `${ { y: "}" }.y }`;
    if (x) { return { nested: { deep: true } }; }
  },
  /** second */
  b: async () => { return '{'; },"#,
        );
        let extraction = extract(&source);
        assert!(extraction.is_clean(), "{:?}", extraction.issues);
        assert_eq!(extraction.metadata.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(extraction.metadata.get("b").unwrap().jsdoc, "second");
    }

    #[test]
    fn test_nested_async_members_are_not_callables() {
        let source = wrap(
            r"
  outer: async () => {
    const inner = { hidden: async (z) => z };
    return inner;
  },",
        );
        let extraction = extract(&source);
        assert_eq!(extraction.metadata.names().collect::<Vec<_>>(), vec!["outer"]);
    }

    #[test]
    fn test_orphan_doc_block_is_reported() {
        let source = wrap(
            r"
  /** Orphaned note */
  version: 3,
  /** Real */
  ping: async () => {},",
        );
        let extraction = extract(&source);

        assert_eq!(extraction.metadata.len(), 1);
        assert_eq!(extraction.metadata.get("ping").unwrap().jsdoc, "Real");
        assert!(matches!(
            &extraction.issues[..],
            [ExtractIssue::OrphanDocBlock { excerpt, .. }] if excerpt == "Orphaned note"
        ));
    }

    #[test]
    fn test_doc_separated_by_line_comment_is_orphan() {
        let source = wrap(
            r"
  /** Detached */
  // interruption
  ping: async () => {},",
        );
        let extraction = extract(&source);

        assert_eq!(extraction.metadata.get("ping").unwrap().jsdoc, "");
        assert!(matches!(
            extraction.issues[0],
            ExtractIssue::OrphanDocBlock { .. }
        ));
    }

    #[test]
    fn test_trailing_doc_block_is_orphan() {
        let source = wrap("  ping: async () => {},\n  /** dangling */");
        let extraction = extract(&source);
        assert_eq!(extraction.metadata.len(), 1);
        assert_eq!(extraction.issues.len(), 1);
    }

    #[test]
    fn test_duplicate_callable_later_wins() {
        let source = wrap("  a: async (x) => {},\n  a: async (y) => {},");
        let extraction = extract(&source);

        assert_eq!(extraction.metadata.get("a").unwrap().params, vec!["y"]);
        assert!(matches!(
            extraction.issues[0],
            ExtractIssue::DuplicateCallable { line: 4, .. }
        ));
    }

    #[test]
    fn test_non_async_members_are_skipped() {
        let source = wrap("  name: 'proxy',\n  sync: (a) => a,\n  go: async (b) => b,");
        let extraction = extract(&source);
        assert_eq!(extraction.metadata.names().collect::<Vec<_>>(), vec!["go"]);
        assert!(extraction.is_clean());
    }

    #[test]
    fn test_empty_aggregate() {
        let extraction = extract("export const apiProxy = {};");
        assert!(extraction.metadata.is_empty());
        assert!(extraction.is_clean());
    }
}
