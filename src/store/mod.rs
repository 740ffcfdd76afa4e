//! Collaborator store interfaces
//!
//! Persistence, querying and blob storage live outside this crate; these
//! traits are the seams the core reads and writes through. The in-crate
//! [`crate::mock::MemoryStore`] implements all of them for tests.

use crate::exercise::{Category, ContextId, Exercise, ExerciseId};
use crate::reconcile::{PersistedTestcase, ReconcilePlan};
use crate::transcode::BlobRef;

/// Category membership lookup, backing the scope index
pub trait CategoryStore {
    /// All categories belonging to any of the given contexts
    fn categories_for_contexts(&self, contexts: &[ContextId]) -> Vec<Category>;
}

/// Prototype row lookup, backing the resolver
pub trait PrototypeStore {
    /// All rows published under the given type name, regardless of scope.
    /// The resolver applies the kind and visibility filters.
    fn find_prototype_candidates(&self, type_name: &str) -> Vec<Exercise>;
}

/// Persisted test-case storage for one exercise
pub trait TestcaseStore {
    /// Persisted cases in original insertion order
    fn load_persisted(&self, exercise: ExerciseId) -> Vec<PersistedTestcase>;

    /// Apply a reconcile plan. Inserted cases must receive fresh identities
    /// never used before for this exercise.
    fn apply_plan(&mut self, exercise: ExerciseId, plan: &ReconcilePlan);
}

/// Opaque attachment storage; references pass through the transcoder
/// unmodified
pub trait BlobStore {
    fn resolve(&self, attachment: &BlobRef) -> Option<Vec<u8>>;
}
