//! Indented text outline of a reflection tree.

use crate::reflection::{Argument, ArgumentKind, Entity, EntityKind, Function, ReflectionTree};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render a parameter list the way it would be written in source
pub fn format_arguments(args: &[Argument]) -> String {
    let parts: Vec<String> = args.iter().map(format_argument).collect();
    parts.join(", ")
}

fn format_argument(arg: &Argument) -> String {
    let mut out = match arg.kind {
        ArgumentKind::KeywordOnlySeparator => return "*".to_string(),
        ArgumentKind::PositionalRemainder => format!("*{}", arg.name),
        ArgumentKind::KeywordRemainder => format!("**{}", arg.name),
        ArgumentKind::Positional | ArgumentKind::KeywordOnly => arg.name.clone(),
    };
    if let Some(annotation) = &arg.annotation {
        let _ = write!(out, ": {annotation}");
    }
    match (&arg.annotation, &arg.default) {
        (Some(_), Some(default)) => {
            let _ = write!(out, " = {default}");
        }
        (None, Some(default)) => {
            let _ = write!(out, "={default}");
        }
        _ => {}
    }
    out
}

fn function_header(entity: &Entity, function: &Function) -> String {
    let mut header = String::new();
    if function.is_async {
        header.push_str("async ");
    }
    let _ = write!(
        header,
        "def {}({})",
        entity.name,
        format_arguments(&function.args)
    );
    if let Some(return_type) = &function.return_type {
        let _ = write!(header, " -> {return_type}");
    }
    header
}

fn header(entity: &Entity) -> String {
    match &entity.kind {
        EntityKind::Module { .. } => format!("module {}", entity.name),
        EntityKind::Class(class) => {
            let mut bases: Vec<String> = class.bases.iter().map(ToString::to_string).collect();
            if let Some(metaclass) = &class.metaclass {
                bases.push(format!("metaclass={metaclass}"));
            }
            if bases.is_empty() {
                format!("class {}", entity.name)
            } else {
                format!("class {}({})", entity.name, bases.join(", "))
            }
        }
        EntityKind::Function(function) => function_header(entity, function),
        EntityKind::Data(data) => match &data.annotation {
            Some(annotation) => format!("{}: {annotation} = {}", entity.name, data.expr),
            None => format!("{} = {}", entity.name, data.expr),
        },
    }
}

fn decorators(entity: &Entity) -> &[crate::reflection::Decorator] {
    match &entity.kind {
        EntityKind::Class(class) => &class.decorators,
        EntityKind::Function(function) => &function.decorators,
        _ => &[],
    }
}

fn render_entity(tree: &ReflectionTree, entity: &Entity, depth: usize, locations: bool, out: &mut String) {
    let indent = INDENT.repeat(depth);
    for decorator in decorators(entity) {
        let call = decorator
            .call_expr
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let _ = writeln!(out, "{indent}@{}{call}", decorator.name);
    }

    let _ = write!(out, "{indent}{}", header(entity));
    if locations {
        let _ = write!(out, "  [{}]", entity.location);
    }
    out.push('\n');

    if let Some(summary) = entity.docstring.as_deref().and_then(|doc| doc.lines().next()) {
        let _ = writeln!(out, "{indent}{INDENT}# {summary}");
    }

    for member in tree.members(entity.id) {
        render_entity(tree, member, depth + 1, locations, out);
    }
}

/// One line per entity, members indented below their owner, followed by
/// the first docstring line as a comment.
pub fn render_outline(tree: &ReflectionTree, include_locations: bool) -> String {
    let mut out = String::new();
    render_entity(tree, tree.root(), 0, include_locations, &mut out);
    out
}
