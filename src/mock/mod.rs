//! In-memory collaborator stores for tests
//!
//! [`MemoryStore`] implements every store trait this crate consumes:
//! categories, prototype rows, persisted test cases with monotonic identity
//! allocation, and a string-keyed blob map. Unit and integration tests
//! drive the full load/save flow through it.

use std::collections::HashMap;

use crate::exercise::{Category, CategoryId, ContextId, Exercise, ExerciseId, TestcaseId};
use crate::reconcile::{PersistedTestcase, ReconcilePlan};
use crate::store::{BlobStore, CategoryStore, PrototypeStore, TestcaseStore};
use crate::transcode::BlobRef;

/// A single in-memory store backing all collaborator interfaces
#[derive(Debug)]
pub struct MemoryStore {
    categories: Vec<Category>,
    prototypes: Vec<Exercise>,
    testcases: HashMap<ExerciseId, Vec<PersistedTestcase>>,
    blobs: HashMap<String, Vec<u8>>,
    // Never reset: a retired identity is never handed out again.
    next_testcase_id: u64,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            categories: Vec::new(),
            prototypes: Vec::new(),
            testcases: HashMap::new(),
            blobs: HashMap::new(),
            next_testcase_id: 1,
        }
    }

    pub fn add_category(&mut self, id: u64, context: u64) -> CategoryId {
        let category = Category {
            id: CategoryId(id),
            context: ContextId(context),
        };
        self.categories.push(category);
        category.id
    }

    pub fn add_prototype(&mut self, row: Exercise) {
        self.prototypes.push(row);
    }

    pub fn add_blob(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(reference.into(), bytes);
    }

    /// Seed persisted cases directly, advancing the identity counter past
    /// the seeded ids
    pub fn seed_testcases(&mut self, exercise: ExerciseId, cases: Vec<PersistedTestcase>) {
        for case in &cases {
            self.next_testcase_id = self.next_testcase_id.max(case.id.0 + 1);
        }
        self.testcases.insert(exercise, cases);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl CategoryStore for MemoryStore {
    fn categories_for_contexts(&self, contexts: &[ContextId]) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| contexts.contains(&c.context))
            .copied()
            .collect()
    }
}

impl PrototypeStore for MemoryStore {
    fn find_prototype_candidates(&self, type_name: &str) -> Vec<Exercise> {
        self.prototypes
            .iter()
            .filter(|row| row.type_name == type_name)
            .cloned()
            .collect()
    }
}

impl TestcaseStore for MemoryStore {
    fn load_persisted(&self, exercise: ExerciseId) -> Vec<PersistedTestcase> {
        self.testcases.get(&exercise).cloned().unwrap_or_default()
    }

    fn apply_plan(&mut self, exercise: ExerciseId, plan: &ReconcilePlan) {
        let rows = self.testcases.entry(exercise).or_default();
        for (id, case) in &plan.to_update {
            if let Some(row) = rows.iter_mut().find(|r| r.id == *id) {
                row.case = case.clone();
            }
        }
        rows.retain(|r| !plan.to_delete.contains(&r.id));
        for case in &plan.to_insert {
            let id = TestcaseId(self.next_testcase_id);
            self.next_testcase_id += 1;
            rows.push(PersistedTestcase {
                id,
                case: case.clone(),
            });
        }
    }
}

impl BlobStore for MemoryStore {
    fn resolve(&self, attachment: &BlobRef) -> Option<Vec<u8>> {
        self.blobs.get(&attachment.reference).cloned()
    }
}
