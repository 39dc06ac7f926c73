//! Python reflection extractor
//!
//! Uses tree-sitter-python's LANGUAGE constant for parsing, then walks the
//! lowered [`SyntaxTree`] top to bottom and builds one [`ReflectionTree`]
//! per file.

use crate::parsing::cst::{NodeId, NodeKind, SyntaxTree};
use crate::parsing::docstring::{block_docstring, statement_docstring};
use crate::parsing::error::{ParseError, ParseResult};
use crate::parsing::paths::module_name_from_path;
use crate::parsing::signature::{annotated_name, parse_parameters};
use crate::reflection::{Class, Data, Decorator, EntityKind, Function, ReflectionTree};
use crate::types::{EntityId, Expression, Location};
use std::path::Path;
use tree_sitter::Parser;

/// Name of the class attribute that sets the metaclass in old-style code
const METACLASS_ATTRIBUTE: &str = "__metaclass__";

/// Python source reflector
///
/// Owns a tree-sitter parser, so one instance per thread.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::LanguageSetup(format!("Failed to set Python language: {e}")))?;
        Ok(Self { parser })
    }

    /// Reflect `source`, reporting locations against `file`.
    ///
    /// Without a `module_name` the module is named after the file stem.
    pub fn parse_source(
        &mut self,
        source: &str,
        file: &Path,
        module_name: Option<&str>,
    ) -> ParseResult<ReflectionTree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::NoTree {
                file: file.to_path_buf(),
            })?;
        let cst = SyntaxTree::build(&tree, source, file)?;

        let module_name = module_name
            .map(str::to_string)
            .unwrap_or_else(|| module_name_from_path(file));
        Extractor { tree: &cst }.extract(module_name)
    }

    /// Read and reflect a file from disk
    pub fn parse_file(
        &mut self,
        path: &Path,
        module_name: Option<&str>,
    ) -> ParseResult<ReflectionTree> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(&source, path, module_name)
    }
}

struct Extractor<'t, 'src> {
    tree: &'t SyntaxTree<'src>,
}

impl Extractor<'_, '_> {
    fn location(&self, node: NodeId) -> Location {
        Location::new(self.tree.file(), self.tree.line(node))
    }

    fn extract(&self, module_name: String) -> ParseResult<ReflectionTree> {
        let root = self.tree.root();
        let docstring = block_docstring(self.tree, root);
        let mut out = ReflectionTree::new(self.location(root), module_name, docstring);

        let module = out.root_id();
        for &stmt in self.tree.children(root) {
            self.declaration(&mut out, module, stmt, Vec::new())?;
        }
        Ok(out)
    }

    /// Reflect one body statement into `parent`.
    ///
    /// Returns the ids of the entities added directly to `parent`: none for
    /// statements that are not reflected, several for chained assignments.
    fn declaration(
        &self,
        out: &mut ReflectionTree,
        parent: EntityId,
        node: NodeId,
        decorators: Vec<Decorator>,
    ) -> ParseResult<Vec<EntityId>> {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::SimpleStmt => {
                if !decorators.is_empty() {
                    return Err(tree.shape_error(node, "decorators on a simple statement"));
                }
                let stmt = tree
                    .child(node, 0)
                    .ok_or_else(|| tree.shape_error(node, "empty statement"))?;
                match tree.kind(stmt) {
                    NodeKind::ImportStmt => {
                        tracing::debug!(
                            "[extract] skipping import at {}",
                            self.location(stmt)
                        );
                        Ok(Vec::new())
                    }
                    NodeKind::ExprStmt => self.statement(out, parent, stmt),
                    _ => Ok(Vec::new()),
                }
            }
            NodeKind::FuncDef => Ok(vec![self.function(out, parent, node, false, decorators)?]),
            NodeKind::AsyncStmt => {
                let inner = tree
                    .child(node, 1)
                    .ok_or_else(|| tree.shape_error(node, "`async` without a statement"))?;
                if tree.kind(inner) == NodeKind::FuncDef {
                    Ok(vec![self.function(out, parent, inner, true, decorators)?])
                } else {
                    Ok(Vec::new())
                }
            }
            NodeKind::ClassDef => Ok(vec![self.class(out, parent, node, decorators)?]),
            NodeKind::Decorated => {
                let [head, definition] = tree.children(node) else {
                    return Err(tree.shape_error(
                        node,
                        format!("{} children instead of 2", tree.children(node).len()),
                    ));
                };
                let decorator_nodes = match tree.kind(*head) {
                    NodeKind::Decorator => std::slice::from_ref(head),
                    NodeKind::Decorators => tree.children(*head),
                    other => {
                        return Err(tree.shape_error(
                            *head,
                            format!("{} in decorator position", other.as_str()),
                        ));
                    }
                };
                let decorators = decorator_nodes
                    .iter()
                    .map(|decorator| self.decorator(*decorator))
                    .collect::<ParseResult<Vec<_>>>()?;
                self.declaration(out, parent, *definition, decorators)
            }
            NodeKind::CompoundStmt => Ok(Vec::new()),
            other => Err(tree.shape_error(
                node,
                format!("{} cannot appear in a body", other.as_str()),
            )),
        }
    }

    fn decorator(&self, node: NodeId) -> ParseResult<Decorator> {
        let tree = self.tree;
        tree.expect_kind(node, NodeKind::Decorator)?;

        let [at, name, rest @ ..] = tree.children(node) else {
            return Err(tree.shape_error(node, "decorator without a name"));
        };
        if !tree.is_operator(*at, "@") {
            return Err(tree.shape_error(node, "decorator without `@`"));
        }

        let name: String = tree
            .text(*name)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let call_expr = match (rest.first(), rest.last()) {
            (Some(first), Some(last)) => Some(Expression::new(tree.text_between(*first, *last))),
            _ => None,
        }
        .filter(|expr| !expr.as_str().is_empty());

        Ok(Decorator::new(name, call_expr))
    }

    /// One Data entity per `=` target, all sharing the value and docstring
    fn statement(
        &self,
        out: &mut ReflectionTree,
        parent: EntityId,
        stmt: NodeId,
    ) -> ParseResult<Vec<EntityId>> {
        let tree = self.tree;
        let segments: Vec<&[NodeId]> = tree
            .children(stmt)
            .split(|child| tree.is_operator(*child, "="))
            .collect();
        let Some((value, targets)) = segments.split_last() else {
            return Ok(Vec::new());
        };
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let expr = match (value.first(), value.last()) {
            (Some(first), Some(last)) => Expression::new(tree.text_between(*first, *last)),
            _ => return Err(tree.shape_error(stmt, "assignment without a value")),
        };
        let docstring = statement_docstring(tree, stmt);
        let location = self.location(stmt);

        let mut ids = Vec::with_capacity(targets.len());
        for target in targets {
            let (name, annotation) = match target {
                [single] if tree.kind(*single) == NodeKind::AnnotatedName => {
                    let (name, annotation) = annotated_name(tree, *single)?;
                    (name, Some(annotation))
                }
                [single] => (tree.text(*single).to_string(), None),
                _ => return Err(tree.shape_error(stmt, "assignment target is not a single node")),
            };
            let id = out.add(
                parent,
                location.clone(),
                name,
                docstring.clone(),
                EntityKind::Data(Data {
                    expr: expr.clone(),
                    annotation,
                }),
            )?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn function(
        &self,
        out: &mut ReflectionTree,
        parent: EntityId,
        node: NodeId,
        is_async: bool,
        decorators: Vec<Decorator>,
    ) -> ParseResult<EntityId> {
        let tree = self.tree;
        let name = self.required_child(node, NodeKind::Name)?;
        let parameters = self.required_child(node, NodeKind::Parameters)?;
        let body = self.required_child(node, NodeKind::Block)?;

        let children = tree.children(node);
        let return_type = children
            .iter()
            .position(|child| tree.is_operator(*child, "->"))
            .and_then(|arrow| children.get(arrow + 1))
            .map(|annotation| Expression::new(tree.text(*annotation)));

        let function = Function {
            is_async,
            decorators,
            args: parse_parameters(tree, parameters)?,
            return_type,
        };
        let id = out.add(
            parent,
            self.location(node),
            tree.text(name),
            block_docstring(tree, body),
            EntityKind::Function(function),
        )?;
        Ok(id)
    }

    fn class(
        &self,
        out: &mut ReflectionTree,
        parent: EntityId,
        node: NodeId,
        decorators: Vec<Decorator>,
    ) -> ParseResult<EntityId> {
        let tree = self.tree;
        let name = tree.text(self.required_child(node, NodeKind::Name)?);
        let body = self.required_child(node, NodeKind::Block)?;

        let mut bases = Vec::new();
        let mut metaclass = None;
        if let Some(args) = tree.find_child(node, NodeKind::ClassArgs) {
            for &child in tree.children(args) {
                match tree.kind(child) {
                    NodeKind::Operator => {}
                    NodeKind::KeywordArg => {
                        let [key, _, value] = tree.children(child) else {
                            return Err(tree.shape_error(child, "malformed keyword argument"));
                        };
                        if tree.text(*key) == "metaclass" {
                            metaclass = Some(Expression::new(tree.text(*value)));
                        } else {
                            tracing::debug!(
                                "[extract] dropping class keyword '{}' of {name}",
                                tree.text(*key)
                            );
                        }
                    }
                    _ if tree.text(child).starts_with("**") => {
                        tracing::debug!("[extract] dropping keyword splat of class {name}");
                    }
                    _ => bases.push(Expression::new(tree.text(child))),
                }
            }
        }

        let class = Class {
            bases,
            metaclass,
            decorators,
            members: Vec::new(),
        };
        let id = out.add(
            parent,
            self.location(node),
            name,
            block_docstring(tree, body),
            EntityKind::Class(class),
        )?;

        for &stmt in tree.children(body) {
            for member in self.declaration(out, id, stmt, Vec::new())? {
                self.promote_metaclass(out, id, member)?;
            }
        }
        Ok(id)
    }

    /// Move a `__metaclass__ = X` member into the class's metaclass slot
    /// unless the header already named one.
    fn promote_metaclass(
        &self,
        out: &mut ReflectionTree,
        class: EntityId,
        member: EntityId,
    ) -> ParseResult<()> {
        let expr = match out.get(member) {
            Some(entity) if entity.name == METACLASS_ATTRIBUTE => {
                entity.as_data().map(|data| data.expr.clone())
            }
            _ => None,
        };
        let Some(expr) = expr else {
            return Ok(());
        };

        let class_entry = out.class_mut(class)?;
        if class_entry.metaclass.is_some() {
            return Ok(());
        }
        class_entry.metaclass = Some(expr);
        out.detach(member)?;
        Ok(())
    }

    fn required_child(&self, node: NodeId, kind: NodeKind) -> ParseResult<NodeId> {
        self.tree
            .find_child(node, kind)
            .ok_or_else(|| self.tree.shape_error(node, format!("missing {}", kind.as_str())))
    }
}
