//! Locate the whitespace and comment text that precedes a node in source order.

use crate::parsing::cst::{NodeId, SyntaxTree};

/// Nearest non-empty trivia in front of `node`.
///
/// Returns the node's own leading trivia if it has any. Otherwise climbs
/// through ancestors for which the node is the first child; at the first
/// ancestor with a previous sibling, returns the trailing trivia of that
/// sibling's right-most leaf. Reaching the root yields an empty string.
pub fn preceding_trivia<'src>(tree: &SyntaxTree<'src>, node: NodeId) -> &'src str {
    let mut current = node;
    loop {
        let leading = tree.leading_trivia(current);
        if !leading.is_empty() {
            return leading;
        }
        if let Some(prev) = tree.prev_sibling(current) {
            return tree.trailing_trivia(tree.last_leaf(prev));
        }
        match tree.parent(current) {
            Some(parent) => current = parent,
            None => return "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::cst::NodeKind;
    use std::path::Path;

    fn with_tree<R>(source: &str, check: impl FnOnce(&SyntaxTree<'_>) -> R) -> R {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        let cst = SyntaxTree::build(&tree, source, Path::new("t.py")).unwrap();
        check(&cst)
    }

    #[test]
    fn test_own_leading_trivia_wins() {
        with_tree("x = 1\n\n# note\ny = 2\n", |cst| {
            let second = cst.child(cst.root(), 1).unwrap();
            assert_eq!(preceding_trivia(cst, second), "\n# note\n");
        });
    }

    #[test]
    fn test_first_statement_in_file_has_no_trivia() {
        with_tree("x = 1\n", |cst| {
            let first = cst.child(cst.root(), 0).unwrap();
            assert_eq!(preceding_trivia(cst, first), "");
        });
    }

    #[test]
    fn test_leading_comment_on_first_statement() {
        with_tree("# header\nx = 1\n", |cst| {
            let first = cst.child(cst.root(), 0).unwrap();
            assert_eq!(preceding_trivia(cst, first), "# header\n");
        });
    }

    #[test]
    fn test_nested_first_child_reports_prefix() {
        with_tree("def f():\n    # doc\n    pass\n", |cst| {
            let def = cst.child(cst.root(), 0).unwrap();
            let block = cst.find_child(def, NodeKind::Block).unwrap();
            let body = cst.child(block, 0).unwrap();
            assert_eq!(preceding_trivia(cst, body), "    # doc\n    ");
        });
    }
}
