//! Portable interchange documents
//!
//! Serializes an exercise's delta field map (see [`crate::merge`]) plus its
//! ordered test-case list to a JSON document, and reads such documents back.
//! Test-case identities are never exported; an import is always
//! re-reconciled against storage. Import never resolves prototypes;
//! resolution happens lazily on the first effective-config load.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::exercise::{CategoryId, Exercise, PrototypeKind};
use crate::field::{Field, FieldKind, FieldMap, FieldValue};
use crate::merge::{export_delta, MergeError};
use crate::reconcile::{DisplayMode, Testcase, TestcaseDraft};

/// Schema version for exercise documents
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "protoquest/exercise@1";

/// Fractional digits used when rendering marks, for cross-platform textual
/// stability
pub const MARK_FRACTION_DIGITS: usize = 7;

/// Historic field names and their current equivalents. Applied as a rewrite
/// pass before an import document is interpreted.
pub const LEGACY_FIELD_NAMES: &[(&str, &str)] = &[
    ("per_test_template", "template"),
    ("cputimelimitsecs", "time_limit"),
    ("memlimitmb", "mem_limit"),
    ("ace_lang", "editor_language"),
    ("use_ace", "use_editor"),
    ("answer", "sample_answer"),
    ("testsplitterre", "test_splitter"),
    ("resultcolumns", "result_columns"),
];

/// Opaque reference to an attached data blob; resolved by the caller's
/// [`crate::store::BlobStore`], passed through unmodified here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub name: String,
    pub reference: String,
}

/// A test case as it appears in a document. Identity is omitted by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestcaseEntry {
    pub code: String,
    pub stdin: String,
    pub expected: String,
    pub extra: String,
    /// Decimal rendered with [`MARK_FRACTION_DIGITS`] fractional digits
    pub mark: String,
    pub display: DisplayMode,
    pub use_as_example: bool,
    pub hide_rest_if_fail: bool,
    /// Explicit sort key; assigned sequentially from document order when
    /// absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<i32>,
}

/// The interchange document for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub schema_version: u32,
    pub schema_id: String,
    pub type_name: String,
    pub kind: PrototypeKind,
    /// Delta field map keyed by wire name
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub testcases: Vec<TestcaseEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<BlobRef>,
}

impl Document {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Document, TranscodeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Document-level transcoding failures
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// A per-field problem found while interpreting an import document. Issues
/// are collected, not fatal: a partially valid document still yields an
/// inspectable result.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportIssue {
    /// Legacy and current names both present for the same logical field;
    /// the legacy value is not applied
    FieldMappingConflict { legacy: String, current: String },
    /// Name outside the closed field set
    UnknownField { name: String },
    /// Value kind does not match the field's declared kind
    TypeMismatch { name: String, expected: FieldKind },
    /// Unparseable mark; the default applies
    BadMark { index: usize, raw: String },
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportIssue::FieldMappingConflict { legacy, current } => write!(
                f,
                "both legacy field '{legacy}' and current field '{current}' are present"
            ),
            ImportIssue::UnknownField { name } => write!(f, "unknown field '{name}'"),
            ImportIssue::TypeMismatch { name, expected } => {
                write!(f, "field '{name}' expects {expected:?} values")
            }
            ImportIssue::BadMark { index, raw } => {
                write!(f, "test case {index} has unparseable mark '{raw}'")
            }
        }
    }
}

/// The outcome of an import: a freshly constructed exercise, raw test-case
/// drafts for normalization/reconciliation, and any per-field issues
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub exercise: Exercise,
    pub drafts: Vec<TestcaseDraft>,
    pub attachments: Vec<BlobRef>,
    pub issues: Vec<ImportIssue>,
}

/// Field → value defaults applied to unspecified fields on import only,
/// never during merging
fn import_defaults() -> [(Field, FieldValue); 4] {
    [
        (Field::AllOrNothing, FieldValue::Bool(true)),
        (Field::AnswerBoxLines, FieldValue::Int(15)),
        (Field::AnswerBoxColumns, FieldValue::Int(90)),
        (Field::UseEditor, FieldValue::Bool(true)),
    ]
}

fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::Number((*i).into()),
        FieldValue::Text(s) => Value::String(s.clone()),
    }
}

/// Coerce a JSON value to the field's declared kind
fn coerce(field: Field, value: &Value) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Bool => value.as_bool().map(FieldValue::Bool),
        FieldKind::Int => value.as_i64().map(FieldValue::Int),
        FieldKind::Text => value.as_str().map(FieldValue::text),
    }
}

fn render_mark(mark: f64) -> String {
    format!("{mark:.prec$}", prec = MARK_FRACTION_DIGITS)
}

/// Serialize an exercise for interchange: the delta field map against its
/// prototype (a prototype exports all fields), the full ordered test-case
/// list with identities omitted, and attachment references as-is.
pub fn export(
    instance: &Exercise,
    prototype: Option<&Exercise>,
    testcases: &[Testcase],
    attachments: Vec<BlobRef>,
) -> Result<Document, TranscodeError> {
    let delta = export_delta(instance, prototype)?;
    let fields = delta
        .iter()
        .map(|(field, value)| (field.name().to_string(), value_to_json(value)))
        .collect();
    let testcases = testcases
        .iter()
        .map(|tc| TestcaseEntry {
            code: tc.code.clone(),
            stdin: tc.stdin.clone(),
            expected: tc.expected.clone(),
            extra: tc.extra.clone(),
            mark: render_mark(tc.mark),
            display: tc.display,
            use_as_example: tc.use_as_example,
            hide_rest_if_fail: tc.hide_rest_if_fail,
            ordering: None,
        })
        .collect();
    Ok(Document {
        schema_version: SCHEMA_VERSION,
        schema_id: SCHEMA_ID.to_string(),
        type_name: instance.type_name.clone(),
        kind: instance.kind,
        fields,
        testcases,
        attachments,
    })
}

fn apply_field(
    fields: &mut FieldMap,
    field: Field,
    value: FieldValue,
    issues: &mut Vec<ImportIssue>,
) {
    if fields.set(field, value).is_err() {
        issues.push(ImportIssue::TypeMismatch {
            name: field.name().to_string(),
            expected: field.kind(),
        });
    }
}

/// Interpret a document into a fresh, unsaved exercise in the given
/// category. Legacy names are rewritten first; unknown names, kind
/// mismatches and bad marks become issues rather than aborting the import.
pub fn import(doc: &Document, category: CategoryId) -> ImportReport {
    let mut issues = Vec::new();

    // Legacy rename pass. When both names are present the conflict is
    // flagged and the legacy value dropped; picking a winner silently would
    // hide a corrupted document.
    let mut raw_fields = doc.fields.clone();
    for &(legacy, current) in LEGACY_FIELD_NAMES {
        if let Some(value) = raw_fields.remove(legacy) {
            if raw_fields.contains_key(current) {
                issues.push(ImportIssue::FieldMappingConflict {
                    legacy: legacy.to_string(),
                    current: current.to_string(),
                });
            } else {
                raw_fields.insert(current.to_string(), value);
            }
        }
    }

    let mut exercise = Exercise::new(doc.type_name.clone(), category);
    exercise.kind = doc.kind;
    for (name, value) in &raw_fields {
        match Field::from_name(name) {
            Some(field) => match coerce(field, value) {
                Some(value) => apply_field(&mut exercise.fields, field, value, &mut issues),
                None => issues.push(ImportIssue::TypeMismatch {
                    name: name.clone(),
                    expected: field.kind(),
                }),
            },
            None => issues.push(ImportIssue::UnknownField { name: name.clone() }),
        }
    }
    for (field, default) in import_defaults() {
        if exercise.fields.get(field).is_none() {
            apply_field(&mut exercise.fields, field, default, &mut issues);
        }
    }

    let mut drafts = Vec::with_capacity(doc.testcases.len());
    for (index, entry) in doc.testcases.iter().enumerate() {
        let mark = match entry.mark.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(mark) => Some(mark),
                Err(_) => {
                    issues.push(ImportIssue::BadMark {
                        index,
                        raw: raw.to_string(),
                    });
                    None
                }
            },
        };
        drafts.push(TestcaseDraft {
            code: entry.code.clone(),
            stdin: entry.stdin.clone(),
            expected: entry.expected.clone(),
            extra: entry.extra.clone(),
            mark,
            ordering: entry.ordering.unwrap_or(index as i32),
            display: entry.display,
            use_as_example: entry.use_as_example,
            hide_rest_if_fail: entry.hide_rest_if_fail,
        });
    }

    ImportReport {
        exercise,
        drafts,
        attachments: doc.attachments.clone(),
        issues,
    }
}
