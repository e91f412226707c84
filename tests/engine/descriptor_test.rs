//! Integration tests for engine descriptors and identifier uniqueness.

use rollup::engine::EngineDescriptor;
use rollup::error::DefinitionError;
use rollup::model::{DataType, ParameterSpec};

fn base() -> EngineDescriptor {
    EngineDescriptor::builder()
        .dimensions(|d| {
            d.column("state", DataType::String);
            d.timestamp_column("day", DataType::Timestamp);
        })
        .unwrap()
        .metrics(|m| {
            m.count("total", DataType::Integer);
        })
        .unwrap()
        .filters(|f| {
            f.exact_match("project_id", DataType::Integer).required();
        })
        .unwrap()
        .build()
}

#[test]
fn test_duplicate_within_one_block() {
    let err = EngineDescriptor::builder()
        .metrics(|m| {
            m.count("total", DataType::Integer);
            m.mean("total", DataType::Float);
        })
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Duplicate identifier 'total': dimensions and metrics share one namespace"
    );
}

#[test]
fn test_duplicate_across_kinds_in_either_order() {
    let metric_first = base().extend().dimensions(|d| {
        d.column("total", DataType::Integer);
    });
    assert!(matches!(
        metric_first,
        Err(DefinitionError::DuplicateIdentifier { ref identifier }) if identifier == "total"
    ));

    let dimension_first = base().extend().metrics(|m| {
        m.count("day", DataType::Integer);
    });
    assert!(matches!(
        dimension_first,
        Err(DefinitionError::DuplicateIdentifier { ref identifier }) if identifier == "day"
    ));
}

#[test]
fn test_declaration_errors_surface_from_registration() {
    let err = EngineDescriptor::builder()
        .dimensions(|d| {
            d.column("state", DataType::String)
                .parameter("unit", ParameterSpec::string());
        })
        .unwrap_err();

    assert!(matches!(err, DefinitionError::UnsupportedParameter { .. }));
}

#[test]
fn test_extend_leaves_base_untouched() {
    let base = base();
    let extended = base
        .extend()
        .metrics(|m| {
            m.mean("average_duration", DataType::Float);
        })
        .unwrap()
        .filters(|f| {
            f.range("created_at", DataType::Timestamp);
        })
        .unwrap()
        .build();

    assert_eq!(base.metrics().len(), 1);
    assert_eq!(base.filters().len(), 1);
    assert_eq!(extended.metrics().len(), 2);
    assert_eq!(extended.filters().len(), 2);
    assert!(extended.part("state").is_some());
    assert!(extended.filter("created_at").is_some());
    assert_eq!(extended.required_filters().count(), 1);
}

#[test]
fn test_catalog_lookups() {
    let descriptor = base();

    assert!(descriptor.dimension("state").is_some());
    assert!(descriptor.metric("state").is_none());
    assert!(descriptor.metric("total").is_some());
    assert!(descriptor.part("total").is_some());
    assert!(descriptor.part("project_id").is_none());
    assert!(descriptor.filter("project_id").is_some());

    let ids: Vec<_> = descriptor
        .dimensions()
        .iter()
        .map(|d| d.identifier())
        .collect();
    assert_eq!(ids, vec!["state", "day"]);
}
