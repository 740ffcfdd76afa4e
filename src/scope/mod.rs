//! Scope visibility index
//!
//! Computes the set of categories visible from a context's ancestor chain.
//! Lookups are memoized per distinct chain for the lifetime of the index,
//! which callers scope to a single resolution session; category membership
//! can change between sessions, so the memo must not outlive one.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::exercise::{CategoryId, ContextId};
use crate::store::CategoryStore;

/// Session-scoped visibility lookup over a category store
pub struct ScopeIndex<'a, S: CategoryStore + ?Sized> {
    store: &'a S,
    memo: RefCell<HashMap<Vec<ContextId>, BTreeSet<CategoryId>>>,
}

impl<'a, S: CategoryStore + ?Sized> ScopeIndex<'a, S> {
    pub fn new(store: &'a S) -> ScopeIndex<'a, S> {
        ScopeIndex {
            store,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// The categories belonging to any context in the chain. Chain order is
    /// irrelevant to membership; the memo is keyed on the chain as given.
    pub fn visible_categories(&self, chain: &[ContextId]) -> BTreeSet<CategoryId> {
        if let Some(hit) = self.memo.borrow().get(chain) {
            return hit.clone();
        }
        let categories: BTreeSet<CategoryId> = self
            .store
            .categories_for_contexts(chain)
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.memo
            .borrow_mut()
            .insert(chain.to_vec(), categories.clone());
        categories
    }

    /// Whether a single category is visible from the chain
    pub fn is_visible(&self, category: CategoryId, chain: &[ContextId]) -> bool {
        self.visible_categories(chain).contains(&category)
    }
}
