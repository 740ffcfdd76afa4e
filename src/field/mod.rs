//! The closed field set for exercise configurations
//!
//! Every configurable field an exercise (or prototype) can carry is listed
//! here, together with its value kind and whether it is inheritable from a
//! prototype. Field access goes through [`FieldMap`], which rejects values
//! of the wrong kind at insertion, so a typo or a mis-typed import can never
//! create an ad-hoc field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A configuration field. The set is closed: `type_name` and the prototype
/// kind are structural properties of an exercise, not members of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Inheritable fields: defer to the prototype unless overridden.
    ResultColumns,
    CombinatorTemplate,
    TestSplitter,
    EnableCombinator,
    Template,
    Language,
    EditorLanguage,
    Sandbox,
    Grader,
    TimeLimit,
    MemLimit,
    SandboxParams,
    // Non-inheritable fields: always taken from the instance itself.
    AllOrNothing,
    PenaltyRegime,
    ShowSource,
    AnswerBoxLines,
    AnswerBoxColumns,
    UseEditor,
    SampleAnswer,
    TemplateParams,
}

/// The value kind a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Text,
}

impl Field {
    /// Every field, in canonical order
    pub const ALL: &'static [Field] = &[
        Field::ResultColumns,
        Field::CombinatorTemplate,
        Field::TestSplitter,
        Field::EnableCombinator,
        Field::Template,
        Field::Language,
        Field::EditorLanguage,
        Field::Sandbox,
        Field::Grader,
        Field::TimeLimit,
        Field::MemLimit,
        Field::SandboxParams,
        Field::AllOrNothing,
        Field::PenaltyRegime,
        Field::ShowSource,
        Field::AnswerBoxLines,
        Field::AnswerBoxColumns,
        Field::UseEditor,
        Field::SampleAnswer,
        Field::TemplateParams,
    ];

    /// The wire name used in interchange documents
    pub fn name(self) -> &'static str {
        match self {
            Field::ResultColumns => "result_columns",
            Field::CombinatorTemplate => "combinator_template",
            Field::TestSplitter => "test_splitter",
            Field::EnableCombinator => "enable_combinator",
            Field::Template => "template",
            Field::Language => "language",
            Field::EditorLanguage => "editor_language",
            Field::Sandbox => "sandbox",
            Field::Grader => "grader",
            Field::TimeLimit => "time_limit",
            Field::MemLimit => "mem_limit",
            Field::SandboxParams => "sandbox_params",
            Field::AllOrNothing => "all_or_nothing",
            Field::PenaltyRegime => "penalty_regime",
            Field::ShowSource => "show_source",
            Field::AnswerBoxLines => "answer_box_lines",
            Field::AnswerBoxColumns => "answer_box_columns",
            Field::UseEditor => "use_editor",
            Field::SampleAnswer => "sample_answer",
            Field::TemplateParams => "template_params",
        }
    }

    /// Look a field up by its wire name
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// The value kind this field accepts
    pub fn kind(self) -> FieldKind {
        match self {
            Field::EnableCombinator
            | Field::AllOrNothing
            | Field::ShowSource
            | Field::UseEditor => FieldKind::Bool,
            Field::TimeLimit
            | Field::MemLimit
            | Field::AnswerBoxLines
            | Field::AnswerBoxColumns => FieldKind::Int,
            Field::ResultColumns
            | Field::CombinatorTemplate
            | Field::TestSplitter
            | Field::Template
            | Field::Language
            | Field::EditorLanguage
            | Field::Sandbox
            | Field::Grader
            | Field::SandboxParams
            | Field::PenaltyRegime
            | Field::SampleAnswer
            | Field::TemplateParams => FieldKind::Text,
        }
    }

    /// Whether the field defers to the prototype when unset
    pub fn is_inheritable(self) -> bool {
        !matches!(
            self,
            Field::AllOrNothing
                | Field::PenaltyRegime
                | Field::ShowSource
                | Field::AnswerBoxLines
                | Field::AnswerBoxColumns
                | Field::UseEditor
                | Field::SampleAnswer
                | Field::TemplateParams
        )
    }
}

/// A concrete field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Convenience constructor for text values
    pub fn text(s: impl Into<String>) -> FieldValue {
        FieldValue::Text(s.into())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Only text values can be blank (empty after trimming)
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

/// Attempt to store a value of the wrong kind in a field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}' expects {expected:?} values, got {actual:?}")]
pub struct FieldTypeError {
    pub field: &'static str,
    pub expected: FieldKind,
    pub actual: FieldKind,
}

/// A partial assignment of values to fields. Absent means "unset": for an
/// inheritable field that is "defer to the prototype".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    values: BTreeMap<Field, FieldValue>,
}

impl FieldMap {
    pub fn new() -> FieldMap {
        FieldMap::default()
    }

    /// Set a field, validating the value kind against the closed set
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldTypeError> {
        if value.kind() != field.kind() {
            return Err(FieldTypeError {
                field: field.name(),
                expected: field.kind(),
                actual: value.kind(),
            });
        }
        self.values.insert(field, value);
        Ok(())
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Clear a field back to "unset", returning the previous value
    pub fn unset(&mut self, field: Field) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    pub fn get_text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, field: Field) -> Option<i64> {
        match self.values.get(&field) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, field: Field) -> Option<bool> {
        match self.values.get(&field) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for &field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert_eq!(Field::from_name("no_such_field"), None);
        assert_eq!(Field::from_name("Template"), None); // names are exact
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut map = FieldMap::new();
        let err = map
            .set(Field::TimeLimit, FieldValue::text("5"))
            .unwrap_err();
        assert_eq!(err.field, "time_limit");
        assert_eq!(err.expected, FieldKind::Int);
        assert_eq!(err.actual, FieldKind::Text);
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_get_unset() {
        let mut map = FieldMap::new();
        map.set(Field::TimeLimit, FieldValue::Int(5)).unwrap();
        map.set(Field::Template, FieldValue::text("def f(x): pass"))
            .unwrap();
        assert_eq!(map.get_int(Field::TimeLimit), Some(5));
        assert_eq!(map.get_text(Field::Template), Some("def f(x): pass"));
        assert_eq!(map.unset(Field::TimeLimit), Some(FieldValue::Int(5)));
        assert_eq!(map.get(Field::TimeLimit), None);
    }

    #[test]
    fn test_blankness_is_text_only() {
        assert!(FieldValue::text("").is_blank());
        assert!(FieldValue::text("   \n").is_blank());
        assert!(!FieldValue::text("x").is_blank());
        assert!(!FieldValue::Int(0).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn test_every_field_accepts_a_value_of_its_kind() {
        let mut map = FieldMap::new();
        for &field in Field::ALL {
            let value = match field.kind() {
                FieldKind::Bool => FieldValue::Bool(true),
                FieldKind::Int => FieldValue::Int(1),
                FieldKind::Text => FieldValue::text("x"),
            };
            map.set(field, value).unwrap();
        }
        assert_eq!(map.len(), Field::ALL.len());
    }

    #[test]
    fn test_partition_is_fixed() {
        let inheritable: Vec<_> = Field::ALL
            .iter()
            .filter(|f| f.is_inheritable())
            .collect();
        let noninheritable: Vec<_> = Field::ALL
            .iter()
            .filter(|f| !f.is_inheritable())
            .collect();
        assert_eq!(inheritable.len(), 12);
        assert_eq!(noninheritable.len(), 8);
        assert!(!Field::SampleAnswer.is_inheritable());
        assert!(!Field::TemplateParams.is_inheritable());
        assert!(Field::Template.is_inheritable());
        assert!(Field::Sandbox.is_inheritable());
    }
}
