//! Parameter list parsing.

use crate::parsing::cst::{NodeId, NodeKind, SyntaxTree};
use crate::parsing::error::{ParseError, ParseResult};
use crate::parsing::scanner::{Advance, ListScanner};
use crate::reflection::{Argument, ArgumentKind};
use crate::types::Expression;

/// Parse a `Parameters` node into its ordered arguments.
///
/// Empty lists and a lone bare name have no list node, a lone annotated
/// name is an `AnnotatedName`, everything else goes through the `ArgList`
/// token stream.
pub fn parse_parameters(tree: &SyntaxTree<'_>, parameters: NodeId) -> ParseResult<Vec<Argument>> {
    tree.expect_kind(parameters, NodeKind::Parameters)?;

    if let Some(arglist) = tree.find_child(parameters, NodeKind::ArgList) {
        return parse_arglist(tree, arglist);
    }
    if let Some(annotated) = tree.find_child(parameters, NodeKind::AnnotatedName) {
        let (name, annotation) = annotated_name(tree, annotated)?;
        return Ok(vec![
            Argument::new(name, ArgumentKind::Positional).with_annotation(annotation),
        ]);
    }

    match tree.children(parameters) {
        [_, _] => Ok(Vec::new()),
        [_, name, _] if tree.kind(*name) == NodeKind::Name => Ok(vec![Argument::new(
            tree.text(*name),
            ArgumentKind::Positional,
        )]),
        children => Err(tree.shape_error(
            parameters,
            format!("parameter list with {} children", children.len()),
        )),
    }
}

/// Split `AnnotatedName[name, ':', annotation]` into its parts
pub(crate) fn annotated_name(
    tree: &SyntaxTree<'_>,
    node: NodeId,
) -> ParseResult<(String, Expression)> {
    tree.expect_kind(node, NodeKind::AnnotatedName)?;
    let mut scanner = ListScanner::new(tree.children(node));

    let name = *scanner.current()?;
    scanner.advance(true)?;
    let colon = *scanner.current()?;
    if !tree.is_operator(colon, ":") {
        return Err(tree.shape_error(node, "expected `:` after the name"));
    }
    scanner.advance(true)?;
    let annotation = *scanner.current()?;

    Ok((
        tree.text(name).to_string(),
        Expression::new(tree.text(annotation)),
    ))
}

fn parse_arglist(tree: &SyntaxTree<'_>, arglist: NodeId) -> ParseResult<Vec<Argument>> {
    let mut scanner = ListScanner::new(tree.children(arglist));
    let mut kind = ArgumentKind::Positional;
    let mut args = Vec::new();

    scanner.run::<ParseError, _>(Advance::Manual, |scanner, &token| {
        if tree.is_operator(token, ",") || tree.is_operator(token, "/") {
            scanner.advance(false)?;
        } else if tree.is_operator(token, "*") {
            match scanner.advance(false)? {
                Some(&next) if tree.is_operator(next, ",") => {
                    args.push(Argument::keyword_only_separator());
                    scanner.advance(false)?;
                }
                Some(&next) => {
                    args.push(parse_argument(tree, scanner, next, ArgumentKind::PositionalRemainder)?);
                }
                None => return Err(tree.shape_error(token, "`*` without a following parameter")),
            }
            kind = ArgumentKind::KeywordOnly;
        } else if tree.is_operator(token, "**") {
            scanner.advance(true)?;
            let next = *scanner.current()?;
            args.push(parse_argument(tree, scanner, next, ArgumentKind::KeywordRemainder)?);
        } else {
            args.push(parse_argument(tree, scanner, token, kind)?);
        }
        Ok(())
    })?;

    Ok(args)
}

/// Parse the argument at the cursor plus an optional `= default`.
///
/// Leaves the cursor on the first token after the argument.
fn parse_argument(
    tree: &SyntaxTree<'_>,
    scanner: &mut ListScanner<'_, NodeId>,
    node: NodeId,
    kind: ArgumentKind,
) -> ParseResult<Argument> {
    let mut argument = match tree.kind(node) {
        NodeKind::AnnotatedName => {
            let (name, annotation) = annotated_name(tree, node)?;
            Argument::new(name, kind).with_annotation(annotation)
        }
        NodeKind::Name => Argument::new(tree.text(node), kind),
        _ => return Err(tree.shape_error(node, "expected a parameter name")),
    };

    if let Some(&next) = scanner.advance(false)? {
        if tree.is_operator(next, "=") {
            scanner.advance(true)?;
            let value = *scanner.current()?;
            argument = argument.with_default(Expression::new(tree.text(value)));
            scanner.advance(false)?;
        }
    }
    Ok(argument)
}
