//! Prototype resolution
//!
//! Finds the unique prototype row for a type name within a visibility scope.
//! Uniqueness is enforced at resolution time, not by a storage constraint:
//! two same-named prototypes may validly coexist in categories that are
//! never simultaneously visible (e.g. different courses).

use thiserror::Error;

use crate::exercise::{ContextId, Exercise};
use crate::scope::ScopeIndex;
use crate::store::{CategoryStore, PrototypeStore};

/// Upper bound on suffix probes when allocating a unique type name
pub const MAX_SUFFIX_ATTEMPTS: usize = 100;

/// Prototype resolution failures. These indicate a data-consistency problem,
/// not a transient condition; callers must not retry or pick arbitrarily.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no prototype named '{0}' is visible in this scope")]
    NotFound(String),

    #[error("{count} prototypes named '{type_name}' are visible in this scope")]
    Ambiguous { type_name: String, count: usize },

    #[error("no unused type name derived from '{base}' within {attempts} attempts")]
    SuffixesExhausted { base: String, attempts: usize },
}

/// One resolution session over a prototype store and a category store.
/// Holds the session-scoped [`ScopeIndex`]; drop the resolver when the
/// session ends so stale visibility is never reused.
pub struct Resolver<'a, C: CategoryStore, P: PrototypeStore> {
    prototypes: &'a P,
    scope: ScopeIndex<'a, C>,
}

impl<'a, C: CategoryStore, P: PrototypeStore> Resolver<'a, C, P> {
    pub fn new(prototypes: &'a P, categories: &'a C) -> Resolver<'a, C, P> {
        Resolver {
            prototypes,
            scope: ScopeIndex::new(categories),
        }
    }

    fn visible_rows(&self, type_name: &str, chain: &[ContextId]) -> Vec<Exercise> {
        let visible = self.scope.visible_categories(chain);
        self.prototypes
            .find_prototype_candidates(type_name)
            .into_iter()
            .filter(|row| row.kind.is_prototype() && visible.contains(&row.category))
            .collect()
    }

    /// Resolve the sole visible prototype for `type_name`, or fail.
    pub fn resolve(&self, type_name: &str, chain: &[ContextId]) -> Result<Exercise, ResolveError> {
        let mut rows = self.visible_rows(type_name, chain);
        if rows.is_empty() {
            Err(ResolveError::NotFound(type_name.to_string()))
        } else if rows.len() > 1 {
            Err(ResolveError::Ambiguous {
                type_name: type_name.to_string(),
                count: rows.len(),
            })
        } else {
            Ok(rows.remove(0))
        }
    }

    /// Whether any prototype with this name is visible in the scope
    pub fn exists(&self, type_name: &str, chain: &[ContextId]) -> bool {
        !self.visible_rows(type_name, chain).is_empty()
    }

    /// Allocate a type name not yet taken in the scope: `base`, then
    /// `base-1`, `base-2`, ... bounded by [`MAX_SUFFIX_ATTEMPTS`]. Used when
    /// saving a new prototype whose name collides (duplicate imports, or a
    /// question-duplication click).
    pub fn unique_type_name(
        &self,
        base: &str,
        chain: &[ContextId],
    ) -> Result<String, ResolveError> {
        for attempt in 0..MAX_SUFFIX_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.to_string()
            } else {
                format!("{base}-{attempt}")
            };
            if !self.exists(&candidate, chain) {
                return Ok(candidate);
            }
        }
        Err(ResolveError::SuffixesExhausted {
            base: base.to_string(),
            attempts: MAX_SUFFIX_ATTEMPTS,
        })
    }
}
