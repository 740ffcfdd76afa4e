//! Load/save orchestration
//!
//! Composes the resolver, the field merger and the test-case reconciler
//! into the two flows callers actually run:
//!
//! - load: resolve the prototype, merge into the effective view
//! - save: unset deferred fields, normalize authoring rows, diff against
//!   the persisted set
//!
//! Everything here is synchronous and side-effect free; the caller applies
//! the resulting [`SavePlan`] inside its own transaction.

use thiserror::Error;

use crate::exercise::{ContextId, Exercise};
use crate::merge::{self, EffectiveConfig, MergeError, SaveRecord};
use crate::prototype::{ResolveError, Resolver};
use crate::reconcile::{
    self, MalformedTestcase, PersistedTestcase, ReconcilePlan, TestcaseDraft,
};
use crate::store::{CategoryStore, PrototypeStore};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("prototype resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("field merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("test case rejected: {0}")]
    Testcase(#[from] MalformedTestcase),
}

/// Everything a save needs to persist, computed up front
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    /// The type name to store; differs from the instance's own when a new
    /// prototype needed a unique suffix
    pub type_name: String,
    /// Field values with deferred fields unset
    pub record: SaveRecord,
    /// Storage operations for the test-case set
    pub testcases: ReconcilePlan,
}

/// Produce the effective runtime view of an instance. Prototypes skip
/// resolution entirely; everything else resolves its prototype within the
/// given scope first.
pub fn load_exercise<C: CategoryStore, P: PrototypeStore>(
    instance: &Exercise,
    resolver: &Resolver<'_, C, P>,
    chain: &[ContextId],
) -> Result<EffectiveConfig, PipelineError> {
    if instance.is_prototype() {
        return Ok(merge::load_effective(instance, None)?);
    }
    let prototype = resolver.resolve(&instance.type_name, chain)?;
    Ok(merge::load_effective(instance, Some(&prototype))?)
}

/// Compute the complete storage plan for one save.
///
/// A brand-new prototype gets a type name no visible prototype already
/// uses; a duplicate import or a question-duplication click would otherwise
/// collide with the original.
pub fn plan_save<C: CategoryStore, P: PrototypeStore>(
    instance: &Exercise,
    explicit_customise: bool,
    drafts: Vec<TestcaseDraft>,
    persisted: &[PersistedTestcase],
    resolver: &Resolver<'_, C, P>,
    chain: &[ContextId],
) -> Result<SavePlan, PipelineError> {
    let type_name = if instance.is_prototype() && instance.id.is_none() {
        resolver.unique_type_name(&instance.type_name, chain)?
    } else {
        instance.type_name.clone()
    };
    let record = merge::prepare_for_save(instance, explicit_customise);
    let incoming = reconcile::normalize(drafts)?;
    let testcases = reconcile::reconcile(&incoming, persisted);
    Ok(SavePlan {
        type_name,
        record,
        testcases,
    })
}
