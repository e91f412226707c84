//! Integration tests for part definitions declared through the DSL.

use rollup::dsl::{Dimensions, Metrics};
use rollup::error::DefinitionError;
use rollup::model::{
    DataType, ExpressionContext, ParameterSpec, ParameterValues, PartKind, PartRole,
};
use rollup::sql::expr::{col, func};
use rollup::sql::{DateGrain, Dialect};
use serde_json::json;

#[test]
fn test_dimension_defaults() {
    let dims = Dimensions::collect(|d| {
        d.column("state", DataType::String)
            .description("Workflow state");
        d.timestamp_column("day", DataType::Timestamp)
            .expression(|_| col("created_at"));
    })
    .unwrap();

    let state = &dims[0];
    assert_eq!(state.identifier(), "state");
    assert_eq!(state.role(), PartRole::Dimension);
    assert_eq!(state.description(), Some("Workflow state"));
    assert!(!state.is_parameterized());

    let day = &dims[1];
    assert_eq!(day.kind(), PartKind::TimestampColumn);
    assert_eq!(day.default_grain(), DateGrain::Day);

    let none = ParameterValues::new();
    assert_eq!(
        day.expression(&ExpressionContext::new(&none))
            .to_sql(Dialect::Sqlite),
        "STRFTIME('%Y-%m-%d', \"created_at\")"
    );
}

#[test]
fn test_expression_builder_sees_parameters() {
    let metrics = Metrics::collect(|m| {
        m.mean("duration", DataType::Float)
            .parameter("unit", ParameterSpec::string().one_of(["seconds", "hours"]))
            .expression(|ctx| match ctx.string("unit") {
                Some("hours") => func("julianday", vec![col("closed_at")]),
                _ => col("duration_seconds"),
            });
    })
    .unwrap();

    let duration = &metrics[0];
    let hours: ParameterValues = [("unit".to_string(), json!("hours"))].into_iter().collect();

    assert_eq!(
        duration
            .expression(&ExpressionContext::new(&hours))
            .to_sql(Dialect::Postgres),
        "AVG(JULIANDAY(\"closed_at\"))"
    );
    assert_eq!(
        duration
            .expression(&ExpressionContext::new(&ParameterValues::new()))
            .to_sql(Dialect::Postgres),
        "AVG(\"duration_seconds\")"
    );
}

#[test]
fn test_secondary_expression_is_optional() {
    let metrics = Metrics::collect(|m| {
        m.count("total", DataType::Integer);
        m.count("ranked", DataType::Integer)
            .secondary_expression(|_| col("rank"));
    })
    .unwrap();

    let none = ParameterValues::new();
    let ctx = ExpressionContext::new(&none);
    assert!(metrics[0].secondary_expression(&ctx).is_none());
    assert_eq!(
        metrics[1]
            .secondary_expression(&ctx)
            .map(|e| e.to_sql(Dialect::MySql)),
        Some("`rank`".to_string())
    );
}

#[test]
fn test_allow_lists_per_kind() {
    assert!(PartKind::Column.supported_parameters().is_empty());
    assert_eq!(PartKind::TimestampColumn.supported_parameters(), &["granularity"]);
    assert_eq!(PartKind::Count.supported_parameters(), &["status", "unit"]);

    let err = Dimensions::collect(|d| {
        d.timestamp_column("day", DataType::Timestamp)
            .parameter("status", ParameterSpec::string());
    })
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Parameter 'status' is not supported by timestamp_column 'day' (supported: granularity)"
    );
    assert!(matches!(err, DefinitionError::UnsupportedParameter { .. }));
}

#[test]
fn test_formatter_receives_parameters() {
    let metrics = Metrics::collect(|m| {
        m.mean("average_duration", DataType::Float)
            .parameter("unit", ParameterSpec::string())
            .formatter(|value, params| {
                let seconds = value.as_f64().unwrap_or_default();
                match params.get("unit").and_then(|u| u.as_str()) {
                    Some("minutes") => json!(seconds / 60.0),
                    _ => json!(seconds),
                }
            });
    })
    .unwrap();

    let def = &metrics[0];
    let minutes: ParameterValues = [("unit".to_string(), json!("minutes"))].into_iter().collect();

    assert!(def.has_formatter());
    assert_eq!(def.format_value(json!(120), &minutes), json!(2.0));
    assert_eq!(def.format_value(json!(120), &ParameterValues::new()), json!(120.0));
}
