//! Core exercise data model
//!
//! An [`Exercise`] is the shared representation of both exercise instances
//! and prototype rows: a prototype is an exercise whose kind is not
//! [`PrototypeKind::NotAPrototype`], and inheritance is never applied to a
//! prototype itself.

use serde::{Deserialize, Serialize};

use crate::field::FieldMap;

/// Identifier of a context node (scope tree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

/// Identifier of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Identifier of a persisted exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub u64);

/// Stable identity of a persisted test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestcaseId(pub u64);

/// A category node; used only for scope membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// The context this category belongs to
    pub context: ContextId,
}

/// Whether an exercise is a prototype, and of which flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrototypeKind {
    /// An ordinary exercise instance that inherits from a prototype
    #[default]
    NotAPrototype,
    /// A built-in prototype shipped with the system
    System,
    /// An author-defined prototype
    User,
}

impl PrototypeKind {
    pub fn is_prototype(self) -> bool {
        !matches!(self, PrototypeKind::NotAPrototype)
    }
}

/// An exercise instance or prototype row
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    /// Persisted identity; `None` until first saved
    pub id: Option<ExerciseId>,
    /// Name of the prototype this exercise inherits from; for a prototype
    /// row, the name it is published under
    pub type_name: String,
    pub kind: PrototypeKind,
    /// The category the exercise lives in; determines prototype visibility
    pub category: CategoryId,
    /// Explicitly set field values; unset inheritable fields defer to the
    /// prototype
    pub fields: FieldMap,
}

impl Exercise {
    /// A fresh, unsaved exercise instance with no fields set
    pub fn new(type_name: impl Into<String>, category: CategoryId) -> Exercise {
        Exercise {
            id: None,
            type_name: type_name.into(),
            kind: PrototypeKind::NotAPrototype,
            category,
            fields: FieldMap::new(),
        }
    }

    pub fn is_prototype(&self) -> bool {
        self.kind.is_prototype()
    }
}
