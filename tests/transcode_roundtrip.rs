//! Delta Round-Trip Tests
//!
//! Exporting an instance against its prototype and importing the document
//! back must reconstruct an equivalent effective configuration: against
//! the same prototype field-for-field, and against a different but
//! field-compatible prototype by inheriting that prototype's values for
//! every omitted field.

use protoquest::transcode::{export, import};
use protoquest::{
    load_effective, normalize, CategoryId, DisplayMode, Exercise, Field, FieldValue,
    PrototypeKind, Testcase,
};

fn prototype(template: &str, time_limit: i64) -> Exercise {
    let mut row = Exercise::new("python3", CategoryId(1));
    row.kind = PrototypeKind::System;
    row.fields
        .set(Field::Template, FieldValue::text(template))
        .unwrap();
    row.fields
        .set(Field::TimeLimit, FieldValue::Int(time_limit))
        .unwrap();
    row.fields
        .set(Field::Language, FieldValue::text("python3"))
        .unwrap();
    row
}

fn customised_instance() -> Exercise {
    let mut inst = Exercise::new("python3", CategoryId(1));
    inst.fields
        .set(Field::TimeLimit, FieldValue::Int(30))
        .unwrap();
    inst.fields
        .set(Field::SampleAnswer, FieldValue::text("def f(x): return x"))
        .unwrap();
    // Presentation fields an authoring form always supplies; keeping them
    // explicit makes the round trip exact despite the import defaults.
    inst.fields
        .set(Field::AllOrNothing, FieldValue::Bool(false))
        .unwrap();
    inst.fields
        .set(Field::AnswerBoxLines, FieldValue::Int(20))
        .unwrap();
    inst.fields
        .set(Field::AnswerBoxColumns, FieldValue::Int(100))
        .unwrap();
    inst.fields
        .set(Field::UseEditor, FieldValue::Bool(true))
        .unwrap();
    inst
}

fn testcase(code: &str, expected: &str, ordering: i32) -> Testcase {
    Testcase {
        code: code.to_string(),
        stdin: String::new(),
        expected: expected.to_string(),
        extra: String::new(),
        mark: 1.0,
        ordering,
        display: DisplayMode::Show,
        use_as_example: false,
        hide_rest_if_fail: false,
    }
}

#[test]
fn test_round_trip_against_same_prototype() {
    let proto = prototype("def f(x): pass", 5);
    let instance = customised_instance();

    let doc = export(&instance, Some(&proto), &[], Vec::new()).unwrap();
    let reparsed = protoquest::Document::from_json(&doc.to_json().unwrap()).unwrap();
    let report = import(&reparsed, CategoryId(1));
    assert!(report.issues.is_empty());

    let before = load_effective(&instance, Some(&proto)).unwrap();
    let after = load_effective(&report.exercise, Some(&proto)).unwrap();
    assert_eq!(before.customised, after.customised);
    for &field in Field::ALL {
        assert_eq!(
            before.fields.get(field),
            after.fields.get(field),
            "field {} diverged across the round trip",
            field.name()
        );
    }
}

#[test]
fn test_round_trip_against_different_prototype_inherits_its_values() {
    let old_proto = prototype("def f(x): pass", 5);
    let new_proto = prototype("def g(x): pass", 60);
    let instance = customised_instance();

    let doc = export(&instance, Some(&old_proto), &[], Vec::new()).unwrap();
    let report = import(&doc, CategoryId(1));

    let effective = load_effective(&report.exercise, Some(&new_proto)).unwrap();
    // The explicit override survives.
    assert_eq!(effective.fields.get_int(Field::TimeLimit), Some(30));
    // Omitted inheritable fields now come from the new prototype.
    assert_eq!(
        effective.fields.get_text(Field::Template),
        Some("def g(x): pass")
    );
}

#[test]
fn test_testcases_survive_export_import_normalize() {
    let proto = prototype("def f(x): pass", 5);
    let instance = customised_instance();
    let cases = vec![
        testcase("f(1)", "1", 0),
        testcase("f(2)", "2", 1),
        testcase("f(3)", "3", 2),
    ];

    let doc = export(&instance, Some(&proto), &cases, Vec::new()).unwrap();
    let report = import(&doc, CategoryId(1));
    let reimported = normalize(report.drafts).unwrap();

    assert_eq!(reimported.len(), 3);
    for (before, after) in cases.iter().zip(&reimported) {
        assert_eq!(before.code, after.code);
        assert_eq!(before.expected, after.expected);
        assert_eq!(before.mark, after.mark);
    }
    // Document order determines ordering when the entries carry none.
    assert!(reimported.windows(2).all(|w| w[0].ordering < w[1].ordering));
}

#[test]
fn test_prototype_exports_full_configuration() {
    let proto = prototype("def f(x): pass", 5);
    let doc = export(&proto, None, &[], Vec::new()).unwrap();
    assert_eq!(doc.kind, PrototypeKind::System);
    assert!(doc.fields.contains_key("template"));
    assert!(doc.fields.contains_key("time_limit"));
    assert!(doc.fields.contains_key("language"));

    // Importing it back yields a self-contained prototype.
    let report = import(&doc, CategoryId(2));
    let effective = load_effective(&report.exercise, None).unwrap();
    assert!(effective.customised);
    assert_eq!(
        effective.fields.get_text(Field::Template),
        Some("def f(x): pass")
    );
}
