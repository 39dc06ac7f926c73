//! Lossless concrete syntax tree consumed by the extractor.
//!
//! tree-sitter keeps comments as "extra" nodes and does not attach
//! whitespace to anything, so this module rebuilds the tree with trivia
//! attached to tokens:
//!
//! - every token becomes a leaf, comment nodes do not;
//! - the text between two consecutive leaves is split at its first newline,
//!   the part before it is the *trailing* trivia of the earlier leaf (a
//!   same-line comment) and the part after it the *leading* trivia of the
//!   later leaf;
//! - an interior node reports the leading trivia of its first leaf.
//!
//! Expressions are never interpreted, so everything below statement and
//! signature level is kept as a single opaque leaf.

use crate::parsing::error::{ParseError, ParseResult};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

/// Index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    /// Indented body of a class or function
    Block,
    /// Wrapper around a single simple statement
    SimpleStmt,
    /// Expression or assignment: `a = b = expr`, `x: T = v`, `x += 1`, `expr`
    ExprStmt,
    FuncDef,
    /// `async` keyword followed by a function or compound statement
    AsyncStmt,
    ClassDef,
    /// Parenthesized base-class list of a class header
    ClassArgs,
    /// `name=value` inside a class header
    KeywordArg,
    Decorated,
    /// Two or more decorators in front of one definition
    Decorators,
    Decorator,
    Parameters,
    /// Flat token list of a parameter list with more than one entry
    ArgList,
    /// `name: annotation`
    AnnotatedName,

    Name,
    Keyword,
    Operator,
    String,
    Expr,
    ImportStmt,
    /// Simple statement that is never reflected (`pass`, `return`, ...)
    Statement,
    /// Compound statement that is never reflected (`if`, `for`, `try`, ...)
    CompoundStmt,
}

impl NodeKind {
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::Keyword
                | Self::Operator
                | Self::String
                | Self::Expr
                | Self::ImportStmt
                | Self::Statement
                | Self::CompoundStmt
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Block => "block",
            Self::SimpleStmt => "simple_stmt",
            Self::ExprStmt => "expr_stmt",
            Self::FuncDef => "funcdef",
            Self::AsyncStmt => "async_stmt",
            Self::ClassDef => "classdef",
            Self::ClassArgs => "class_args",
            Self::KeywordArg => "keyword_arg",
            Self::Decorated => "decorated",
            Self::Decorators => "decorators",
            Self::Decorator => "decorator",
            Self::Parameters => "parameters",
            Self::ArgList => "arglist",
            Self::AnnotatedName => "annotated_name",
            Self::Name => "name",
            Self::Keyword => "keyword",
            Self::Operator => "operator",
            Self::String => "string",
            Self::Expr => "expr",
            Self::ImportStmt => "import_stmt",
            Self::Statement => "statement",
            Self::CompoundStmt => "compound_stmt",
        }
    }
}

#[derive(Debug, Clone)]
struct CstNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    span: Range<usize>,
    leading: Range<usize>,
    trailing: Range<usize>,
    line: u32,
}

/// Syntax tree of one source file.
#[derive(Debug)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    file: PathBuf,
    nodes: Vec<CstNode>,
    root: NodeId,
}

impl<'src> SyntaxTree<'src> {
    /// Build the tree from a tree-sitter-python parse of `source`.
    ///
    /// Fails with [`ParseError::Grammar`] if tree-sitter had to recover from
    /// a syntax error anywhere in the file.
    pub fn build(tree: &Tree, source: &'src str, file: &Path) -> ParseResult<Self> {
        let root = tree.root_node();
        check_grammar(root, file)?;

        let mut builder = Builder {
            file: file.to_path_buf(),
            nodes: Vec::new(),
            leaves: Vec::new(),
        };
        let root_id = builder.module(root)?;
        builder.attach_trivia(source);

        Ok(Self {
            source,
            file: builder.file,
            nodes: builder.nodes,
            root: root_id,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    fn node(&self, id: NodeId) -> &CstNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let position = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, position))
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, position) = self.position_in_parent(id)?;
        position
            .checked_sub(1)
            .and_then(|prev| self.child(parent, prev))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, position) = self.position_in_parent(id)?;
        self.child(parent, position + 1)
    }

    /// First direct child of the given kind
    pub fn find_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.kind(*child) == kind)
    }

    /// Verbatim source of the node, inner trivia included
    pub fn text(&self, id: NodeId) -> &'src str {
        &self.source[self.node(id).span.clone()]
    }

    /// Verbatim source from the start of `first` to the end of `last`
    pub fn text_between(&self, first: NodeId, last: NodeId) -> &'src str {
        let start = self.node(first).span.start;
        let end = self.node(last).span.end.max(start);
        &self.source[start..end]
    }

    /// 1-based line of the node's first token
    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    pub fn is_operator(&self, id: NodeId, op: &str) -> bool {
        self.kind(id) == NodeKind::Operator && self.text(id) == op
    }

    pub fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(first) = self.children(current).first() {
            current = *first;
        }
        current
    }

    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(last) = self.children(current).last() {
            current = *last;
        }
        current
    }

    /// Whitespace and comments directly in front of the node
    pub fn leading_trivia(&self, id: NodeId) -> &'src str {
        &self.source[self.node(self.first_leaf(id)).leading.clone()]
    }

    /// Same-line whitespace and comment after the node, up to the newline
    pub fn trailing_trivia(&self, id: NodeId) -> &'src str {
        &self.source[self.node(self.last_leaf(id)).trailing.clone()]
    }

    pub fn shape_error(&self, id: NodeId, detail: impl Into<String>) -> ParseError {
        ParseError::Shape {
            kind: self.kind(id),
            file: self.file.clone(),
            line: self.line(id),
            detail: detail.into(),
        }
    }

    pub fn expect_kind(&self, id: NodeId, kind: NodeKind) -> ParseResult<()> {
        if self.kind(id) == kind {
            Ok(())
        } else {
            Err(self.shape_error(id, format!("expected {}", kind.as_str())))
        }
    }
}

const SIMPLE_STATEMENTS: &[&str] = &[
    "print_statement",
    "assert_statement",
    "return_statement",
    "delete_statement",
    "raise_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "global_statement",
    "nonlocal_statement",
    "exec_statement",
    "type_alias_statement",
];

const IMPORT_STATEMENTS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
];

fn check_grammar(root: Node, file: &Path) -> ParseResult<()> {
    if !root.has_error() {
        return Ok(());
    }
    let offending = first_error(root).unwrap_or(root);
    let position = offending.start_position();
    let message = if offending.is_missing() {
        format!("missing `{}`", offending.kind())
    } else {
        "invalid syntax".to_string()
    };
    Err(ParseError::Grammar {
        file: file.to_path_buf(),
        line: position.row as u32 + 1,
        column: position.column as u32 + 1,
        message,
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Children that carry syntax, comments and line continuations excluded
fn syntax_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn token<'t>(node: Node<'t>, text: &str) -> Option<Node<'t>> {
    syntax_children(node)
        .into_iter()
        .find(|child| !child.is_named() && child.kind() == text)
}

fn first_named<'t>(node: Node<'t>) -> Option<Node<'t>> {
    syntax_children(node).into_iter().find(|child| child.is_named())
}

struct Builder {
    file: PathBuf,
    nodes: Vec<CstNode>,
    leaves: Vec<NodeId>,
}

impl Builder {
    fn push(&mut self, kind: NodeKind, children: Vec<NodeId>, span: Range<usize>, line: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(CstNode {
            kind,
            parent: None,
            children,
            span,
            leading: 0..0,
            trailing: 0..0,
            line,
        });
        id
    }

    /// Leaves must be created in source order
    fn leaf(&mut self, kind: NodeKind, node: Node) -> NodeId {
        self.leaf_at(kind, node.byte_range(), node.start_position().row)
    }

    fn leaf_at(&mut self, kind: NodeKind, span: Range<usize>, row: usize) -> NodeId {
        let id = self.push(kind, Vec::new(), span, row as u32 + 1);
        self.leaves.push(id);
        id
    }

    fn interior(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        let (span, line) = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let first = &self.nodes[first.index()];
                let last = &self.nodes[last.index()];
                (first.span.start..last.span.end, first.line)
            }
            _ => (0..0, 1),
        };
        self.push(kind, children, span, line)
    }

    fn unsupported(&self, context: NodeKind, node: Node) -> ParseError {
        ParseError::Shape {
            kind: context,
            file: self.file.clone(),
            line: node.start_position().row as u32 + 1,
            detail: format!("unsupported `{}`", node.kind()),
        }
    }

    fn module(&mut self, node: Node) -> ParseResult<NodeId> {
        let statements = self.statements(NodeKind::Module, node)?;
        Ok(self.interior(NodeKind::Module, statements))
    }

    fn block(&mut self, node: Node) -> ParseResult<NodeId> {
        let statements = self.statements(NodeKind::Block, node)?;
        Ok(self.interior(NodeKind::Block, statements))
    }

    /// Body statements; a `;` separator closes the simple statement before it
    fn statements(&mut self, context: NodeKind, node: Node) -> ParseResult<Vec<NodeId>> {
        let mut statements = Vec::new();
        for child in syntax_children(node) {
            if child.kind() != ";" {
                statements.push(self.statement(child)?);
                continue;
            }
            match statements.last() {
                Some(&previous) if self.nodes[previous.index()].kind == NodeKind::SimpleStmt => {
                    let separator = self.leaf(NodeKind::Operator, child);
                    self.append_child(previous, separator);
                }
                _ => return Err(self.unsupported(context, child)),
            }
        }
        Ok(statements)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let end = self.nodes[child.index()].span.end;
        self.nodes[child.index()].parent = Some(parent);
        let node = &mut self.nodes[parent.index()];
        node.children.push(child);
        node.span.end = end;
    }

    fn statement(&mut self, node: Node) -> ParseResult<NodeId> {
        match node.kind() {
            "expression_statement" => {
                let stmt = self.expression_statement(node)?;
                Ok(self.interior(NodeKind::SimpleStmt, vec![stmt]))
            }
            kind if IMPORT_STATEMENTS.contains(&kind) => {
                let import = self.leaf(NodeKind::ImportStmt, node);
                Ok(self.interior(NodeKind::SimpleStmt, vec![import]))
            }
            kind if SIMPLE_STATEMENTS.contains(&kind) => {
                let stmt = self.leaf(NodeKind::Statement, node);
                Ok(self.interior(NodeKind::SimpleStmt, vec![stmt]))
            }
            "function_definition" => self.function(node),
            "class_definition" => self.class(node),
            "decorated_definition" => self.decorated(node),
            kind if COMPOUND_STATEMENTS.contains(&kind) => Ok(self.compound(node)),
            _ => Err(self.unsupported(NodeKind::Block, node)),
        }
    }

    fn compound(&mut self, node: Node) -> NodeId {
        let children = syntax_children(node);
        match children.as_slice() {
            [keyword, rest, ..] if keyword.kind() == "async" => {
                let keyword = self.leaf(NodeKind::Keyword, *keyword);
                let body = self.leaf_at(
                    NodeKind::CompoundStmt,
                    rest.start_byte()..node.end_byte(),
                    rest.start_position().row,
                );
                self.interior(NodeKind::AsyncStmt, vec![keyword, body])
            }
            _ => self.leaf(NodeKind::CompoundStmt, node),
        }
    }

    fn expression_statement(&mut self, node: Node) -> ParseResult<NodeId> {
        let mut parts = Vec::new();
        match syntax_children(node).as_slice() {
            [single] if single.kind() == "assignment" => self.assignment(*single, &mut parts)?,
            [single] if single.kind() == "augmented_assignment" => {
                let left = single.child_by_field_name("left");
                let operator = single.child_by_field_name("operator");
                let right = single.child_by_field_name("right");
                let (Some(left), Some(operator), Some(right)) = (left, operator, right) else {
                    return Err(self.unsupported(NodeKind::ExprStmt, *single));
                };
                parts.push(self.leaf(NodeKind::Expr, left));
                parts.push(self.leaf(NodeKind::Operator, operator));
                parts.push(self.leaf(NodeKind::Expr, right));
            }
            [single] if single.kind() == "string" => parts.push(self.leaf(NodeKind::String, *single)),
            _ => parts.push(self.leaf(NodeKind::Expr, node)),
        }
        Ok(self.interior(NodeKind::ExprStmt, parts))
    }

    /// Flatten `a = b = expr` into `[a, =, b, =, expr]`
    fn assignment(&mut self, node: Node, parts: &mut Vec<NodeId>) -> ParseResult<()> {
        let left = node
            .child_by_field_name("left")
            .ok_or_else(|| self.unsupported(NodeKind::ExprStmt, node))?;
        let target = self.target(left);

        match node.child_by_field_name("type") {
            Some(annotation) => {
                let colon = token(node, ":").ok_or_else(|| self.unsupported(NodeKind::ExprStmt, node))?;
                let colon = self.leaf(NodeKind::Operator, colon);
                let annotation = self.leaf(NodeKind::Expr, annotation);
                parts.push(self.interior(NodeKind::AnnotatedName, vec![target, colon, annotation]));
            }
            None => parts.push(target),
        }

        if let Some(right) = node.child_by_field_name("right") {
            let equals = token(node, "=").ok_or_else(|| self.unsupported(NodeKind::ExprStmt, node))?;
            parts.push(self.leaf(NodeKind::Operator, equals));
            if right.kind() == "assignment" {
                self.assignment(right, parts)?;
            } else {
                parts.push(self.leaf(NodeKind::Expr, right));
            }
        }
        Ok(())
    }

    fn target(&mut self, node: Node) -> NodeId {
        if node.kind() == "identifier" {
            self.leaf(NodeKind::Name, node)
        } else {
            self.leaf(NodeKind::Expr, node)
        }
    }

    fn function(&mut self, node: Node) -> ParseResult<NodeId> {
        let name = node.child_by_field_name("name");
        let return_type = node.child_by_field_name("return_type");
        let mut keyword = None;
        let mut parts = Vec::new();

        for child in syntax_children(node) {
            match child.kind() {
                "async" => keyword = Some(self.leaf(NodeKind::Keyword, child)),
                "def" => parts.push(self.leaf(NodeKind::Keyword, child)),
                "parameters" => parts.push(self.parameters(child)?),
                "type_parameter" => parts.push(self.leaf(NodeKind::Expr, child)),
                "->" | ":" => parts.push(self.leaf(NodeKind::Operator, child)),
                "block" => parts.push(self.block(child)?),
                _ if Some(child) == name => parts.push(self.leaf(NodeKind::Name, child)),
                _ if Some(child) == return_type => parts.push(self.leaf(NodeKind::Expr, child)),
                _ => return Err(self.unsupported(NodeKind::FuncDef, child)),
            }
        }

        let funcdef = self.interior(NodeKind::FuncDef, parts);
        Ok(match keyword {
            Some(keyword) => self.interior(NodeKind::AsyncStmt, vec![keyword, funcdef]),
            None => funcdef,
        })
    }

    fn class(&mut self, node: Node) -> ParseResult<NodeId> {
        let name = node.child_by_field_name("name");
        let mut parts = Vec::new();

        for child in syntax_children(node) {
            match child.kind() {
                "class" => parts.push(self.leaf(NodeKind::Keyword, child)),
                "type_parameter" => parts.push(self.leaf(NodeKind::Expr, child)),
                "argument_list" => parts.push(self.class_args(child)?),
                ":" => parts.push(self.leaf(NodeKind::Operator, child)),
                "block" => parts.push(self.block(child)?),
                _ if Some(child) == name => parts.push(self.leaf(NodeKind::Name, child)),
                _ => return Err(self.unsupported(NodeKind::ClassDef, child)),
            }
        }
        Ok(self.interior(NodeKind::ClassDef, parts))
    }

    fn class_args(&mut self, node: Node) -> ParseResult<NodeId> {
        let mut parts = Vec::new();
        for child in syntax_children(node) {
            match child.kind() {
                "(" | ")" | "," => parts.push(self.leaf(NodeKind::Operator, child)),
                "keyword_argument" => {
                    let name = child.child_by_field_name("name");
                    let equals = token(child, "=");
                    let value = child.child_by_field_name("value");
                    let (Some(name), Some(equals), Some(value)) = (name, equals, value) else {
                        return Err(self.unsupported(NodeKind::KeywordArg, child));
                    };
                    let name = self.leaf(NodeKind::Name, name);
                    let equals = self.leaf(NodeKind::Operator, equals);
                    let value = self.leaf(NodeKind::Expr, value);
                    parts.push(self.interior(NodeKind::KeywordArg, vec![name, equals, value]));
                }
                _ if child.is_named() => parts.push(self.leaf(NodeKind::Expr, child)),
                _ => return Err(self.unsupported(NodeKind::ClassArgs, child)),
            }
        }
        Ok(self.interior(NodeKind::ClassArgs, parts))
    }

    fn decorated(&mut self, node: Node) -> ParseResult<NodeId> {
        let definition = node
            .child_by_field_name("definition")
            .ok_or_else(|| self.unsupported(NodeKind::Decorated, node))?;

        let mut decorators = Vec::new();
        for child in syntax_children(node) {
            match child.kind() {
                "decorator" => decorators.push(self.decorator(child)),
                _ if child == definition => {}
                _ => return Err(self.unsupported(NodeKind::Decorated, child)),
            }
        }

        let definition = match definition.kind() {
            "function_definition" => self.function(definition)?,
            "class_definition" => self.class(definition)?,
            _ => return Err(self.unsupported(NodeKind::Decorated, definition)),
        };

        let head = match decorators.as_slice() {
            [single] => *single,
            _ => self.interior(NodeKind::Decorators, decorators),
        };
        Ok(self.interior(NodeKind::Decorated, vec![head, definition]))
    }

    fn decorator(&mut self, node: Node) -> NodeId {
        let mut parts = Vec::new();
        for child in syntax_children(node) {
            if child.kind() == "@" {
                parts.push(self.leaf(NodeKind::Operator, child));
                continue;
            }
            if child.kind() == "call" {
                let function = child.child_by_field_name("function");
                let arguments = child.child_by_field_name("arguments");
                if let (Some(function), Some(arguments)) = (function, arguments) {
                    parts.push(self.leaf(NodeKind::Name, function));
                    parts.push(self.leaf(NodeKind::Expr, arguments));
                    continue;
                }
            }
            parts.push(self.leaf(NodeKind::Name, child));
        }
        self.interior(NodeKind::Decorator, parts)
    }

    /// Produces one of the three parameter-list shapes:
    /// `(` `)` / `(` Name `)`, `(` AnnotatedName `)`, or `(` ArgList `)`.
    fn parameters(&mut self, node: Node) -> ParseResult<NodeId> {
        let children = syntax_children(node);
        let [open, inner @ .., close] = children.as_slice() else {
            return Err(self.unsupported(NodeKind::Parameters, node));
        };
        if open.kind() != "(" || close.kind() != ")" {
            return Err(self.unsupported(NodeKind::Parameters, node));
        }

        let open = self.leaf(NodeKind::Operator, *open);
        let mut parts = vec![open];
        match inner {
            [] => {}
            [single] if single.kind() == "identifier" => {
                parts.push(self.leaf(NodeKind::Name, *single));
            }
            [single]
                if single.kind() == "typed_parameter"
                    && first_named(*single).is_some_and(|n| n.kind() == "identifier") =>
            {
                parts.push(self.typed_parameter(*single)?);
            }
            _ => {
                let mut tokens = Vec::new();
                for child in inner {
                    self.parameter_tokens(*child, &mut tokens)?;
                }
                parts.push(self.interior(NodeKind::ArgList, tokens));
            }
        }
        let close = self.leaf(NodeKind::Operator, *close);
        parts.push(close);
        Ok(self.interior(NodeKind::Parameters, parts))
    }

    /// `name: annotation` for a `typed_parameter` whose name is an identifier
    fn typed_parameter(&mut self, node: Node) -> ParseResult<NodeId> {
        let name = first_named(node).ok_or_else(|| self.unsupported(NodeKind::AnnotatedName, node))?;
        self.annotated(node, name)
    }

    fn annotated(&mut self, node: Node, name: Node) -> ParseResult<NodeId> {
        let colon = token(node, ":");
        let annotation = node.child_by_field_name("type");
        let (Some(colon), Some(annotation)) = (colon, annotation) else {
            return Err(self.unsupported(NodeKind::AnnotatedName, node));
        };
        let name = self.target(name);
        let colon = self.leaf(NodeKind::Operator, colon);
        let annotation = self.leaf(NodeKind::Expr, annotation);
        Ok(self.interior(NodeKind::AnnotatedName, vec![name, colon, annotation]))
    }

    fn splat(&mut self, node: Node, out: &mut Vec<NodeId>) -> ParseResult<()> {
        let star = token(node, "*").or_else(|| token(node, "**"));
        let (Some(star), Some(name)) = (star, first_named(node)) else {
            return Err(self.unsupported(NodeKind::ArgList, node));
        };
        out.push(self.leaf(NodeKind::Operator, star));
        out.push(self.target(name));
        Ok(())
    }

    fn default_value(&mut self, node: Node, out: &mut Vec<NodeId>) -> ParseResult<()> {
        let equals = token(node, "=");
        let value = node.child_by_field_name("value");
        let (Some(equals), Some(value)) = (equals, value) else {
            return Err(self.unsupported(NodeKind::ArgList, node));
        };
        out.push(self.leaf(NodeKind::Operator, equals));
        out.push(self.leaf(NodeKind::Expr, value));
        Ok(())
    }

    fn parameter_tokens(&mut self, node: Node, out: &mut Vec<NodeId>) -> ParseResult<()> {
        match node.kind() {
            "," | "keyword_separator" | "positional_separator" => {
                out.push(self.leaf(NodeKind::Operator, node));
            }
            "identifier" => out.push(self.leaf(NodeKind::Name, node)),
            "list_splat_pattern" | "dictionary_splat_pattern" => self.splat(node, out)?,
            "typed_parameter" => {
                let inner = first_named(node).ok_or_else(|| self.unsupported(NodeKind::ArgList, node))?;
                match inner.kind() {
                    "list_splat_pattern" | "dictionary_splat_pattern" => {
                        let star = token(inner, "*").or_else(|| token(inner, "**"));
                        let (Some(star), Some(name)) = (star, first_named(inner)) else {
                            return Err(self.unsupported(NodeKind::ArgList, inner));
                        };
                        out.push(self.leaf(NodeKind::Operator, star));
                        out.push(self.annotated(node, name)?);
                    }
                    _ => out.push(self.annotated(node, inner)?),
                }
            }
            "default_parameter" => {
                let name = node
                    .child_by_field_name("name")
                    .ok_or_else(|| self.unsupported(NodeKind::ArgList, node))?;
                out.push(self.target(name));
                self.default_value(node, out)?;
            }
            "typed_default_parameter" => {
                let name = node
                    .child_by_field_name("name")
                    .ok_or_else(|| self.unsupported(NodeKind::ArgList, node))?;
                out.push(self.annotated(node, name)?);
                self.default_value(node, out)?;
            }
            _ => out.push(self.leaf(NodeKind::Expr, node)),
        }
        Ok(())
    }

    /// Split the text between consecutive leaves into trailing and leading trivia
    fn attach_trivia(&mut self, source: &str) {
        let mut previous: Option<NodeId> = None;
        for leaf in self.leaves.clone() {
            let start = self.nodes[leaf.index()].span.start;
            let gap_start = previous.map_or(0, |prev| self.nodes[prev.index()].span.end);
            let gap = gap_start.min(start)..start;

            self.nodes[leaf.index()].leading = match (previous, source[gap.clone()].find('\n')) {
                (Some(prev), Some(newline)) => {
                    self.nodes[prev.index()].trailing = gap.start..gap.start + newline;
                    gap.start + newline + 1..gap.end
                }
                _ => gap,
            };
            previous = Some(leaf);
        }

        if let Some(last) = previous {
            let end = self.nodes[last.index()].span.end;
            let rest = &source[end..];
            let len = rest.find('\n').unwrap_or(rest.len());
            self.nodes[last.index()].trailing = end..end + len;
        }
    }
}
