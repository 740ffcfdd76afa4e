//! protoquest - effective-configuration resolution for templated exercises
//!
//! An exercise instance inherits field values from a named, versioned
//! prototype, may override any subset of them, and carries an ordered set
//! of test cases persisted with stable identity across edits. This crate
//! implements the data-reconciliation core behind that model: scope-aware
//! prototype resolution, field inheritance merging with customisation
//! tracking, positional test-case reconciliation, and delta export/import.
//! Storage, grading and UI are collaborators behind the traits in
//! [`store`].

pub mod exercise;
pub mod field;
pub mod merge;
pub mod mock;
pub mod pipeline;
pub mod prototype;
pub mod reconcile;
pub mod scope;
pub mod store;
pub mod transcode;

pub use exercise::{
    Category, CategoryId, ContextId, Exercise, ExerciseId, PrototypeKind, TestcaseId,
};
pub use field::{Field, FieldKind, FieldMap, FieldTypeError, FieldValue};
pub use merge::{
    export_delta, load_effective, prepare_for_save, EffectiveConfig, MergeError, SaveRecord,
};
pub use pipeline::{load_exercise, plan_save, PipelineError, SavePlan};
pub use prototype::{ResolveError, Resolver};
pub use reconcile::{
    normalize, reconcile, DisplayMode, MalformedTestcase, PersistedTestcase, ReconcilePlan,
    Testcase, TestcaseDraft,
};
pub use scope::ScopeIndex;
pub use transcode::{
    export, import, BlobRef, Document, ImportIssue, ImportReport, TranscodeError,
};
