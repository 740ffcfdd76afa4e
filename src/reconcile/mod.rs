//! Test-case normalization and reconciliation
//!
//! Incoming authoring rows are normalized (carriage returns stripped, blank
//! rows discarded, marks validated, stable sort by ordering) and then diffed
//! against the persisted set by position. Positional matching deliberately
//! avoids identity churn under edits: a case moved from slot 3 to slot 1
//! adopts slot 1's old identity, which is acceptable because identity
//! carries no meaning beyond storage efficiency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exercise::TestcaseId;

/// Mark assigned when the authoring row leaves it blank
pub const DEFAULT_MARK: f64 = 1.0;

/// How a test case is presented to the student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Show,
    Hide,
    HideIfFail,
    HideIfSucceed,
}

/// A normalized test case, ready for reconciliation or export
#[derive(Debug, Clone, PartialEq)]
pub struct Testcase {
    pub code: String,
    pub stdin: String,
    pub expected: String,
    pub extra: String,
    /// Non-negative; weight of this case in the total mark
    pub mark: f64,
    /// Sort key within the exercise
    pub ordering: i32,
    pub display: DisplayMode,
    pub use_as_example: bool,
    pub hide_rest_if_fail: bool,
}

/// A test case as retrieved from storage, with its stable identity
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTestcase {
    pub id: TestcaseId,
    pub case: Testcase,
}

/// A raw authoring row, before normalization. All-blank rows are authoring
/// filler and are discarded, not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestcaseDraft {
    pub code: String,
    pub stdin: String,
    pub expected: String,
    pub extra: String,
    /// `None` when the mark box was left blank
    pub mark: Option<f64>,
    pub ordering: i32,
    pub display: DisplayMode,
    pub use_as_example: bool,
    pub hide_rest_if_fail: bool,
}

/// A test case that fails normalization in a way that cannot be safely
/// discarded. Reported, never silently coerced.
#[derive(Debug, Error)]
pub enum MalformedTestcase {
    #[error("test case at position {index} has negative mark {mark}")]
    NegativeMark { index: usize, mark: f64 },
}

/// The storage operations a save requires. Total over its inputs: every
/// incoming case lands in `to_insert` or `to_update`, every persisted one in
/// `to_update` or `to_delete`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub to_insert: Vec<Testcase>,
    pub to_update: Vec<(TestcaseId, Testcase)>,
    pub to_delete: Vec<TestcaseId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Remove all `\r` characters and trim trailing newlines
fn filter_crs(s: &str) -> String {
    let mut out: String = s.chars().filter(|&c| c != '\r').collect();
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Normalize authoring rows into test cases: strip carriage returns,
/// discard all-blank rows, default blank marks, reject negative marks, and
/// stable-sort by ordering (ties keep their original sequence).
pub fn normalize(drafts: Vec<TestcaseDraft>) -> Result<Vec<Testcase>, MalformedTestcase> {
    let mut cases = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let code = filter_crs(&draft.code);
        let stdin = filter_crs(&draft.stdin);
        let expected = filter_crs(&draft.expected);
        let extra = filter_crs(&draft.extra);
        if code.is_empty() && stdin.is_empty() && expected.is_empty() && extra.is_empty() {
            continue;
        }
        let mark = draft.mark.unwrap_or(DEFAULT_MARK);
        if mark < 0.0 {
            return Err(MalformedTestcase::NegativeMark { index, mark });
        }
        cases.push(Testcase {
            code,
            stdin,
            expected,
            extra,
            mark,
            ordering: draft.ordering,
            display: draft.display,
            use_as_example: draft.use_as_example,
            hide_rest_if_fail: draft.hide_rest_if_fail,
        });
    }
    cases.sort_by_key(|c| c.ordering);
    Ok(cases)
}

/// Diff the normalized incoming list against the persisted set.
///
/// Walks both lists in lockstep by position: while persisted records remain
/// each incoming case adopts the next persisted identity as an update; once
/// they are exhausted the rest are inserts; leftover persisted records are
/// deletes. Never fails.
pub fn reconcile(incoming: &[Testcase], persisted: &[PersistedTestcase]) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut old = persisted.iter();
    for case in incoming {
        match old.next() {
            Some(previous) => plan.to_update.push((previous.id, case.clone())),
            None => plan.to_insert.push(case.clone()),
        }
    }
    plan.to_delete.extend(old.map(|p| p.id));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(code: &str, ordering: i32) -> TestcaseDraft {
        TestcaseDraft {
            code: code.to_string(),
            ordering,
            ..TestcaseDraft::default()
        }
    }

    fn case(code: &str, ordering: i32) -> Testcase {
        Testcase {
            code: code.to_string(),
            stdin: String::new(),
            expected: String::new(),
            extra: String::new(),
            mark: DEFAULT_MARK,
            ordering,
            display: DisplayMode::Show,
            use_as_example: false,
            hide_rest_if_fail: false,
        }
    }

    fn persisted(id: u64, code: &str) -> PersistedTestcase {
        PersistedTestcase {
            id: TestcaseId(id),
            case: case(code, 0),
        }
    }

    #[test]
    fn test_blank_rows_discarded() {
        let drafts = vec![draft("f(1)", 0), TestcaseDraft::default(), draft("f(2)", 1)];
        let cases = normalize(drafts).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].code, "f(1)");
        assert_eq!(cases[1].code, "f(2)");
    }

    #[test]
    fn test_whitespace_only_row_is_not_blank() {
        // A row of spaces is odd but not empty; it survives normalization.
        let cases = normalize(vec![draft("  ", 0)]).unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_crs_and_trailing_newlines_stripped() {
        let mut d = draft("f(1)\r\n", 0);
        d.expected = "1\r\n2\n\n".to_string();
        let cases = normalize(vec![d]).unwrap();
        assert_eq!(cases[0].code, "f(1)");
        assert_eq!(cases[0].expected, "1\n2");
    }

    #[test]
    fn test_blank_mark_defaults() {
        let cases = normalize(vec![draft("f(1)", 0)]).unwrap();
        assert_eq!(cases[0].mark, DEFAULT_MARK);
    }

    #[test]
    fn test_negative_mark_rejected() {
        let mut d = draft("f(1)", 0);
        d.mark = Some(-2.5);
        let err = normalize(vec![draft("ok", 0), d]).unwrap_err();
        match err {
            MalformedTestcase::NegativeMark { index, mark } => {
                assert_eq!(index, 1);
                assert_eq!(mark, -2.5);
            }
        }
    }

    #[test]
    fn test_stable_sort_by_ordering() {
        let cases = normalize(vec![
            draft("third", 20),
            draft("first", 10),
            draft("second-a", 15),
            draft("second-b", 15),
        ])
        .unwrap();
        let codes: Vec<&str> = cases.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["first", "second-a", "second-b", "third"]);
    }

    #[test]
    fn test_lockstep_update_then_delete() {
        // Persisted identities [7, 8, 9]; two incoming cases.
        let persisted = vec![persisted(7, "a"), persisted(8, "b"), persisted(9, "c")];
        let incoming = vec![case("x", 0), case("y", 1)];

        let plan = reconcile(&incoming, &persisted);
        assert!(plan.to_insert.is_empty());
        assert_eq!(plan.to_update.len(), 2);
        assert_eq!(plan.to_update[0].0, TestcaseId(7));
        assert_eq!(plan.to_update[0].1.code, "x");
        assert_eq!(plan.to_update[1].0, TestcaseId(8));
        assert_eq!(plan.to_update[1].1.code, "y");
        assert_eq!(plan.to_delete, vec![TestcaseId(9)]);
    }

    #[test]
    fn test_all_inserts_when_nothing_persisted() {
        let incoming = vec![case("a", 0), case("b", 1), case("c", 2)];
        let plan = reconcile(&incoming, &[]);
        assert_eq!(plan.to_insert.len(), 3);
        assert!(plan.to_update.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_empty_incoming_deletes_everything() {
        let persisted = vec![persisted(1, "a"), persisted(2, "b")];
        let plan = reconcile(&[], &persisted);
        assert!(plan.to_insert.is_empty());
        assert!(plan.to_update.is_empty());
        assert_eq!(plan.to_delete, vec![TestcaseId(1), TestcaseId(2)]);
    }

    #[test]
    fn test_conservation_across_sizes() {
        for n_incoming in 0..4usize {
            for n_persisted in 0..4usize {
                let incoming: Vec<Testcase> =
                    (0..n_incoming).map(|i| case("c", i as i32)).collect();
                let persisted: Vec<PersistedTestcase> = (0..n_persisted)
                    .map(|i| self::persisted(i as u64 + 1, "p"))
                    .collect();
                let plan = reconcile(&incoming, &persisted);
                assert_eq!(plan.to_insert.len() + plan.to_update.len(), n_incoming);
                assert_eq!(plan.to_update.len() + plan.to_delete.len(), n_persisted);
            }
        }
    }

    #[test]
    fn test_empty_both_is_empty_plan() {
        assert!(reconcile(&[], &[]).is_empty());
    }
}
