//! Integration tests for instance keys of parameterized definitions.

use regex::Regex;
use rollup::model::{DataType, ParameterSpec, ParameterValues, PartDefinition, PartKind};
use serde_json::{json, Value};

fn count_by_status() -> PartDefinition {
    PartDefinition::builder(PartKind::Count, "count", DataType::Integer)
        .parameter("status", ParameterSpec::string())
        .build()
        .unwrap()
}

fn params(pairs: &[(&str, Value)]) -> ParameterValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_same_configuration_same_key() {
    let def = count_by_status();
    let open = params(&[("status", json!("open"))]);

    assert_eq!(def.instance_key(&open), def.instance_key(&open));
    assert_eq!(def.instance_key(&open), "count_open");
}

#[test]
fn test_different_values_different_keys() {
    let def = count_by_status();

    let open = def.instance_key(&params(&[("status", json!("open"))]));
    let closed = def.instance_key(&params(&[("status", json!("closed"))]));

    assert_ne!(open, closed);
    assert_eq!(closed, "count_closed");
}

#[test]
fn test_unsafe_values_yield_bare_deterministic_tokens() {
    let def = count_by_status();
    let bare = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();

    for raw in ["in review", "won't fix", "a-b", "ü/ß", ""] {
        let supplied = params(&[("status", json!(raw))]);
        let key = def.instance_key(&supplied);

        assert!(bare.is_match(&key), "{key:?} is not a bare token");
        assert!(key.starts_with("count_"));
        assert_eq!(key, def.instance_key(&supplied));
    }

    let review = def.instance_key(&params(&[("status", json!("in review"))]));
    let fix = def.instance_key(&params(&[("status", json!("won't fix"))]));
    assert_ne!(review, fix);
}

#[test]
fn test_non_ascii_values_are_hashed() {
    let def = count_by_status();
    let hashed = Regex::new(r"^count_[0-9a-f]{16}$").unwrap();

    for raw in ["géré", "已关闭"] {
        let key = def.instance_key(&params(&[("status", json!(raw))]));
        assert!(hashed.is_match(&key), "{key:?} was not hashed");
    }
}

#[test]
fn test_non_string_values() {
    let def = PartDefinition::builder(PartKind::Mean, "duration", DataType::Float)
        .parameter("status", ParameterSpec::new(DataType::Integer))
        .build()
        .unwrap();

    assert_eq!(
        def.instance_key(&params(&[("status", json!(3))])),
        "duration_3"
    );
    assert_eq!(
        def.instance_key(&params(&[("status", json!(true))])),
        "duration_true"
    );
}

#[test]
fn test_non_parameterized_key_is_identifier() {
    let def = PartDefinition::builder(PartKind::Count, "total", DataType::Integer)
        .build()
        .unwrap();

    assert_eq!(def.instance_key(&ParameterValues::new()), "total");
    assert_eq!(
        def.instance_key(&params(&[("status", json!("open")), ("unit", json!("x y"))])),
        "total"
    );
}

#[test]
fn test_keys_follow_parameter_name_order() {
    let def = PartDefinition::builder(PartKind::Mean, "duration", DataType::Float)
        .parameter("unit", ParameterSpec::string())
        .parameter("status", ParameterSpec::string())
        .build()
        .unwrap();

    let key = def.instance_key(&params(&[
        ("unit", json!("minutes")),
        ("status", json!("closed")),
    ]));
    assert_eq!(key, "duration_closed_minutes");
}
