//! Reflection tree: the language-agnostic model produced by the extractor.
//!
//! Entities live in an arena owned by [`ReflectionTree`] and refer to each
//! other by [`EntityId`]. The root is always the module at slot 0. A parent
//! owns the ordered list of its members' ids; detaching a member only removes
//! its id from that list, the slot itself stays in the arena.

use crate::types::{EntityId, Expression, Location};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown entity id {0:?}")]
    UnknownEntity(EntityId),

    #[error("Entity '{name}' is a {kind} and cannot own members")]
    NotAContainer { name: String, kind: &'static str },

    #[error("Entity '{name}' is not attached to a parent")]
    Detached { name: String },
}

/// How an argument binds in a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Positional,
    /// `*args`
    PositionalRemainder,
    /// Bare `*`; binds nothing, makes the following arguments keyword-only
    KeywordOnlySeparator,
    KeywordOnly,
    /// `**kwargs`
    KeywordRemainder,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::PositionalRemainder => "positional_remainder",
            Self::KeywordOnlySeparator => "keyword_only_separator",
            Self::KeywordOnly => "keyword_only",
            Self::KeywordRemainder => "keyword_remainder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Empty only for [`ArgumentKind::KeywordOnlySeparator`]
    pub name: String,
    pub annotation: Option<Expression>,
    pub default: Option<Expression>,
    pub kind: ArgumentKind,
}

impl Argument {
    pub fn new(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
            kind,
        }
    }

    /// The bare `*` marker
    pub fn keyword_only_separator() -> Self {
        Self::new("", ArgumentKind::KeywordOnlySeparator)
    }

    pub fn with_annotation(mut self, annotation: Expression) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_default(mut self, default: Expression) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorator {
    /// Dotted name without the `@`
    pub name: String,
    /// Parenthesized call arguments, `None` for a bare decorator
    pub call_expr: Option<Expression>,
}

impl Decorator {
    pub fn new(name: impl Into<String>, call_expr: Option<Expression>) -> Self {
        Self {
            name: name.into(),
            call_expr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Class {
    pub bases: Vec<Expression>,
    pub metaclass: Option<Expression>,
    pub decorators: Vec<Decorator>,
    pub members: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub is_async: bool,
    pub decorators: Vec<Decorator>,
    pub args: Vec<Argument>,
    pub return_type: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// Right-hand side of the (last) `=`
    pub expr: Expression,
    /// Annotation of an annotated assignment (`x: int = 1`)
    pub annotation: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Module { members: Vec<EntityId> },
    Class(Class),
    Function(Function),
    Data(Data),
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module { .. } => "module",
            Self::Class(_) => "class",
            Self::Function(_) => "function",
            Self::Data(_) => "data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    /// Enclosing entity; `None` only for the root module
    pub parent: Option<EntityId>,
    pub location: Location,
    pub name: String,
    pub docstring: Option<String>,
    pub kind: EntityKind,
}

impl Entity {
    /// Ids of owned members, empty for functions and data
    pub fn members(&self) -> &[EntityId] {
        match &self.kind {
            EntityKind::Module { members } => members,
            EntityKind::Class(class) => &class.members,
            EntityKind::Function(_) | EntityKind::Data(_) => &[],
        }
    }

    fn members_mut(&mut self) -> Result<&mut Vec<EntityId>, TreeError> {
        match &mut self.kind {
            EntityKind::Module { members } => Ok(members),
            EntityKind::Class(class) => Ok(&mut class.members),
            other => Err(TreeError::NotAContainer {
                name: self.name.clone(),
                kind: other.as_str(),
            }),
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            EntityKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            EntityKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Data> {
        match &self.kind {
            EntityKind::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, EntityKind::Module { .. })
    }
}

/// Arena holding one module and everything declared in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionTree {
    entities: Vec<Entity>,
}

impl ReflectionTree {
    /// Create a tree whose root is a module with no members yet
    pub fn new(location: Location, name: impl Into<String>, docstring: Option<String>) -> Self {
        let root = Entity {
            id: EntityId::ROOT,
            parent: None,
            location,
            name: name.into(),
            docstring,
            kind: EntityKind::Module {
                members: Vec::new(),
            },
        };
        Self {
            entities: vec![root],
        }
    }

    pub fn root_id(&self) -> EntityId {
        self.entities[0].id
    }

    pub fn root(&self) -> &Entity {
        &self.entities[0]
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity, TreeError> {
        self.entities
            .get_mut(id.index())
            .ok_or(TreeError::UnknownEntity(id))
    }

    /// Append a new entity to the members of `parent`
    pub fn add(
        &mut self,
        parent: EntityId,
        location: Location,
        name: impl Into<String>,
        docstring: Option<String>,
        kind: EntityKind,
    ) -> Result<EntityId, TreeError> {
        let id = EntityId::from_index(self.entities.len())
            .ok_or(TreeError::UnknownEntity(parent))?;
        self.get_mut(parent)?.members_mut()?.push(id);
        self.entities.push(Entity {
            id,
            parent: Some(parent),
            location,
            name: name.into(),
            docstring,
            kind,
        });
        Ok(id)
    }

    /// Remove `id` from its parent's member list.
    ///
    /// The entity stays in the arena but is no longer reachable from the root.
    pub fn detach(&mut self, id: EntityId) -> Result<(), TreeError> {
        let entity = self.get(id).ok_or(TreeError::UnknownEntity(id))?;
        let parent = entity.parent.ok_or_else(|| TreeError::Detached {
            name: entity.name.clone(),
        })?;
        self.get_mut(parent)?.members_mut()?.retain(|member| *member != id);
        Ok(())
    }

    pub(crate) fn class_mut(&mut self, id: EntityId) -> Result<&mut Class, TreeError> {
        let entity = self.get_mut(id)?;
        match &mut entity.kind {
            EntityKind::Class(class) => Ok(class),
            other => Err(TreeError::NotAContainer {
                name: entity.name.clone(),
                kind: other.as_str(),
            }),
        }
    }

    pub fn members(&self, id: EntityId) -> impl Iterator<Item = &Entity> + '_ {
        self.get(id)
            .map(Entity::members)
            .unwrap_or(&[])
            .iter()
            .filter_map(|member| self.get(*member))
    }

    pub fn parent(&self, id: EntityId) -> Option<&Entity> {
        self.get(id)?.parent.and_then(|parent| self.get(parent))
    }

    pub fn module_name(&self) -> &str {
        &self.root().name
    }

    /// Dotted path from the module down to `id`, e.g. `pkg.mod.Class.method`
    pub fn qualified_name(&self, id: EntityId) -> String {
        let mut parts = Vec::new();
        let mut current = self.get(id);
        while let Some(entity) = current {
            parts.push(entity.name.as_str());
            current = entity.parent.and_then(|parent| self.get(parent));
        }
        parts.reverse();
        parts.join(".")
    }

    /// Look up a member by its path relative to the module (`Class.method`)
    pub fn find(&self, path: &str) -> Option<&Entity> {
        let mut current = self.root();
        for part in path.split('.') {
            current = self.members(current.id).find(|entity| entity.name == part)?;
        }
        Some(current)
    }

    /// Every entity reachable from the root, depth first, parents before members
    pub fn walk(&self) -> Vec<&Entity> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(entity) = stack.pop() {
            out.push(entity);
            let members: Vec<&Entity> = self.members(entity.id).collect();
            stack.extend(members.into_iter().rev());
        }
        out
    }

    /// Nested JSON view of the reachable tree
    pub fn to_json(&self, include_locations: bool) -> Value {
        self.entity_json(self.root(), include_locations)
    }

    fn entity_json(&self, entity: &Entity, include_locations: bool) -> Value {
        let mut value = json!({
            "type": entity.kind.as_str(),
            "name": entity.name,
            "docstring": entity.docstring,
        });
        if include_locations {
            value["location"] = json!(entity.location);
        }

        match &entity.kind {
            EntityKind::Module { .. } => {}
            EntityKind::Class(class) => {
                value["bases"] = json!(class.bases);
                value["metaclass"] = json!(class.metaclass);
                value["decorators"] = json!(class.decorators);
            }
            EntityKind::Function(function) => {
                value["is_async"] = json!(function.is_async);
                value["decorators"] = json!(function.decorators);
                value["args"] = json!(function.args);
                value["return_type"] = json!(function.return_type);
            }
            EntityKind::Data(data) => {
                value["expr"] = json!(data.expr);
                value["annotation"] = json!(data.annotation);
            }
        }

        if matches!(entity.kind, EntityKind::Module { .. } | EntityKind::Class(_)) {
            let members: Vec<Value> = self
                .members(entity.id)
                .map(|member| self.entity_json(member, include_locations))
                .collect();
            value["members"] = Value::Array(members);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(line: u32) -> Location {
        Location::new("sample.py", line)
    }

    fn data(expr: &str) -> EntityKind {
        EntityKind::Data(Data {
            expr: Expression::new(expr),
            annotation: None,
        })
    }

    #[test]
    fn test_add_and_walk() {
        let mut tree = ReflectionTree::new(location(1), "sample", None);
        let root = tree.root_id();
        let class = tree
            .add(root, location(3), "Widget", None, EntityKind::Class(Class::default()))
            .unwrap();
        tree.add(class, location(4), "size", None, data("3")).unwrap();
        tree.add(root, location(6), "VERSION", None, data("'1.0'"))
            .unwrap();

        let names: Vec<&str> = tree.walk().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["sample", "Widget", "size", "VERSION"]);
        assert_eq!(tree.qualified_name(class), "sample.Widget");
        assert_eq!(tree.find("Widget.size").unwrap().location.lineno, 4);
        assert_eq!(tree.parent(class).unwrap().name, "sample");
    }

    #[test]
    fn test_detach_removes_member_only() {
        let mut tree = ReflectionTree::new(location(1), "sample", None);
        let root = tree.root_id();
        let class = tree
            .add(root, location(1), "C", None, EntityKind::Class(Class::default()))
            .unwrap();
        let member = tree
            .add(class, location(2), "__metaclass__", None, data("Meta"))
            .unwrap();

        tree.detach(member).unwrap();

        assert_eq!(tree.members(class).count(), 0);
        assert!(tree.get(member).is_some());
        assert!(tree.find("C.__metaclass__").is_none());
    }

    #[test]
    fn test_data_cannot_own_members() {
        let mut tree = ReflectionTree::new(location(1), "sample", None);
        let root = tree.root_id();
        let value = tree.add(root, location(1), "x", None, data("1")).unwrap();

        let err = tree.add(value, location(2), "y", None, data("2")).unwrap_err();
        assert!(matches!(err, TreeError::NotAContainer { kind: "data", .. }));
    }

    #[test]
    fn test_root_cannot_be_detached() {
        let mut tree = ReflectionTree::new(location(1), "sample", None);
        let root = tree.root_id();
        assert!(matches!(
            tree.detach(root),
            Err(TreeError::Detached { .. })
        ));
    }

    #[test]
    fn test_json_view() {
        let mut tree = ReflectionTree::new(location(1), "sample", Some("Doc.".into()));
        let root = tree.root_id();
        tree.add(
            root,
            location(2),
            "run",
            None,
            EntityKind::Function(Function {
                is_async: true,
                args: vec![Argument::new("x", ArgumentKind::Positional)],
                ..Function::default()
            }),
        )
        .unwrap();

        let value = tree.to_json(false);
        assert_eq!(value["docstring"], "Doc.");
        assert_eq!(value["members"][0]["type"], "function");
        assert_eq!(value["members"][0]["args"][0]["kind"], "positional");
        assert!(value.get("location").is_none());
        assert_eq!(tree.to_json(true)["location"]["lineno"], 1);
    }
}
