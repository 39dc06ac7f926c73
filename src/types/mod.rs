use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

/// Identifier of an entity inside a [`crate::reflection::ReflectionTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// Id of the root module of every tree
    pub const ROOT: EntityId = EntityId(NonZeroU32::MIN);

    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }

    /// Arena slot of this id (ids start at 1, slots at 0)
    pub fn index(&self) -> usize {
        self.0.get() as usize - 1
    }

    /// Id for the given arena slot
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index + 1).ok().and_then(Self::new)
    }
}

/// Source position of a reflected entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: PathBuf,
    /// 1-based line number
    pub lineno: u32,
}

impl Location {
    pub fn new(filename: impl Into<PathBuf>, lineno: u32) -> Self {
        Self {
            filename: filename.into(),
            lineno,
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename.display(), self.lineno)
    }
}

/// Verbatim, unevaluated source text (annotations, defaults, bases, ...).
///
/// The text is normalized once on construction by trimming surrounding
/// whitespace, so two expressions compare equal iff their normalized text does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(Box<str>);

impl Expression {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_creation() {
        assert!(EntityId::new(0).is_none());

        let id = EntityId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 41);
        assert_eq!(EntityId::from_index(41), Some(id));
    }

    #[test]
    fn test_expression_equality_is_normalized() {
        assert_eq!(Expression::new("  Base "), Expression::new("Base"));
        assert_ne!(Expression::new("a + b"), Expression::new("a+b"));
        assert_eq!(Expression::from("x").as_str(), "x");
    }

    #[test]
    fn test_location_display() {
        let location = Location::new("pkg/mod.py", 12);
        assert_eq!(location.to_string(), "pkg/mod.py:12");
    }
}
