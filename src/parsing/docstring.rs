//! Docstring recovery.
//!
//! Two sources are recognized:
//! - a bare string literal as the first statement of a module, class or
//!   function body;
//! - a run of consecutive `#` comment lines directly in front of a
//!   statement. Lines starting with `#:` document the following assignment
//!   ("statement" doc), plain `#` lines document the enclosing body
//!   ("block" doc).

use crate::parsing::cst::{NodeId, NodeKind, SyntaxTree};
use crate::parsing::trivia::preceding_trivia;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Triple,
    Single,
}

const QUOTES: &[(&str, QuoteStyle)] = &[
    ("\"\"\"", QuoteStyle::Triple),
    ("'''", QuoteStyle::Triple),
    ("\"", QuoteStyle::Single),
    ("'", QuoteStyle::Single),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `#:` run, documents the next assignment
    Statement,
    /// `#` run, documents the enclosing body
    Block,
}

impl CommentKind {
    fn classify(line: &str) -> Option<Self> {
        if line.starts_with("#:") {
            Some(Self::Statement)
        } else if line.starts_with('#') {
            Some(Self::Block)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDoc {
    pub kind: CommentKind,
    pub text: String,
}

/// Split a string literal into its quote style and raw body.
///
/// String prefixes (`r`, `u`, `b`, `f` in any case and combination) are
/// dropped. Escape sequences are left untouched.
pub fn split_string_literal(literal: &str) -> Option<(QuoteStyle, &str)> {
    let unprefixed = literal
        .trim()
        .trim_start_matches(|c: char| matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'b' | 'f'));

    QUOTES.iter().find_map(|(quote, style)| {
        let body = unprefixed.strip_prefix(quote)?.strip_suffix(quote)?;
        Some((*style, body))
    })
}

/// Docstring text of a string literal, or `None` if it is not one
pub fn normalize_string_literal(literal: &str) -> Option<String> {
    split_string_literal(literal).map(|(_, body)| dedent_docstring(body))
}

/// Trim the first line, remove the common indentation of the remaining
/// lines, then trim the whole text.
///
/// Lines holding only spaces and tabs become empty and do not count
/// towards the common indentation.
pub fn dedent_docstring(text: &str) -> String {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default().trim();
    let rest: Vec<&str> = lines.collect();

    let margin = rest
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indentation(line))
        .reduce(common_prefix)
        .unwrap_or_default();

    let mut out = String::from(first);
    for line in rest {
        out.push('\n');
        if !is_blank(line) {
            out.push_str(line.strip_prefix(margin).unwrap_or(line));
        }
    }
    out.trim().to_string()
}

fn is_blank(line: &str) -> bool {
    line.trim_matches([' ', '\t']).is_empty()
}

fn indentation(line: &str) -> &str {
    let body = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - body.len()]
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum();
    &a[..len]
}

/// Read the comment run at the end of `trivia`.
///
/// Lines are scanned bottom-up. Blank lines below the run are skipped; the
/// first blank or non-comment line above it ends the run. The run's kind is
/// taken from the comment line nearest to the documented statement.
pub fn scan_comment_run(trivia: &str) -> Option<CommentDoc> {
    let mut lines = Vec::new();
    let mut kind = None;

    for line in trivia.lines().rev() {
        let line = line.trim();
        match CommentKind::classify(line) {
            Some(line_kind) => {
                kind.get_or_insert(line_kind);
                lines.push(strip_marker(line));
            }
            None if line.is_empty() && lines.is_empty() => continue,
            None => break,
        }
    }

    let kind = kind?;
    lines.reverse();
    let text = lines.join("\n").trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(CommentDoc { kind, text })
}

fn strip_marker(line: &str) -> &str {
    line.strip_prefix("#:")
        .or_else(|| line.strip_prefix('#'))
        .unwrap_or(line)
        .trim_start()
}

/// `SimpleStmt[ExprStmt[String]]`, the string-literal docstring shape
fn docstring_literal(tree: &SyntaxTree<'_>, stmt: NodeId) -> Option<NodeId> {
    if tree.kind(stmt) != NodeKind::SimpleStmt {
        return None;
    }
    let expr = tree.child(stmt, 0)?;
    match tree.children(expr) {
        [literal]
            if tree.kind(expr) == NodeKind::ExprStmt && tree.kind(*literal) == NodeKind::String =>
        {
            Some(*literal)
        }
        _ => None,
    }
}

/// Docstring of a module, class or function body.
///
/// A leading string literal wins; otherwise a `#` comment run in front of
/// the first statement is used.
pub fn block_docstring(tree: &SyntaxTree<'_>, body: NodeId) -> Option<String> {
    let first = tree.child(body, 0)?;
    if let Some(literal) = docstring_literal(tree, first) {
        return normalize_string_literal(tree.text(literal));
    }

    let doc = scan_comment_run(preceding_trivia(tree, first))?;
    (doc.kind == CommentKind::Block).then_some(doc.text)
}

/// `#:` docstring of an assignment.
///
/// Only a comment run on the line directly above counts; a blank line in
/// between detaches it.
pub fn statement_docstring(tree: &SyntaxTree<'_>, stmt: NodeId) -> Option<String> {
    let trivia = preceding_trivia(tree, stmt);
    let trailing_space = &trivia[trivia.trim_end().len()..];
    if trailing_space.matches('\n').count() != 1 {
        return None;
    }

    let doc = scan_comment_run(trivia)?;
    (doc.kind == CommentKind::Statement).then_some(doc.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_string_literal() {
        assert_eq!(
            split_string_literal("\"\"\"Doc.\"\"\""),
            Some((QuoteStyle::Triple, "Doc."))
        );
        assert_eq!(split_string_literal("'doc'"), Some((QuoteStyle::Single, "doc")));
        assert_eq!(split_string_literal("r'''raw\\n'''"), Some((QuoteStyle::Triple, "raw\\n")));
        assert_eq!(split_string_literal("Rb\"x\""), Some((QuoteStyle::Single, "x")));
        assert_eq!(split_string_literal("\"\""), Some((QuoteStyle::Single, "")));
        assert_eq!(split_string_literal("name"), None);
    }

    #[test]
    fn test_dedent_keeps_relative_indentation() {
        let body = "Summary line.\n\n    Details:\n      - nested\n    ";
        assert_eq!(dedent_docstring(body), "Summary line.\n\nDetails:\n  - nested");
    }

    #[test]
    fn test_dedent_trims_first_line() {
        assert_eq!(dedent_docstring("   padded   "), "padded");
        assert_eq!(dedent_docstring("\n    Body only.\n    "), "Body only.");
    }

    #[test]
    fn test_dedent_mixed_tabs_only_share_exact_prefix() {
        let body = "x\n\tone\n  two";
        assert_eq!(dedent_docstring(body), "x\n\tone\n  two");
    }

    #[test]
    fn test_scan_statement_run() {
        let doc = scan_comment_run("#: first\n#: second\n").unwrap();
        assert_eq!(doc.kind, CommentKind::Statement);
        assert_eq!(doc.text, "first\nsecond");
    }

    #[test]
    fn test_scan_stops_at_blank_line() {
        let doc = scan_comment_run("# detached\n\n# attached\n").unwrap();
        assert_eq!(doc.kind, CommentKind::Block);
        assert_eq!(doc.text, "attached");
    }

    #[test]
    fn test_scan_kind_from_nearest_line() {
        let doc = scan_comment_run("#: far\n# near\n").unwrap();
        assert_eq!(doc.kind, CommentKind::Block);
        assert_eq!(doc.text, "far\nnear");
    }

    #[test]
    fn test_scan_without_comments() {
        assert_eq!(scan_comment_run(""), None);
        assert_eq!(scan_comment_run("\n    "), None);
        assert_eq!(scan_comment_run("#\n"), None);
    }
}
