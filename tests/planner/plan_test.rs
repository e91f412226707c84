//! Integration tests for query planning.

use rollup::prelude::*;
use serde_json::json;

fn descriptor() -> EngineDescriptor {
    EngineDescriptor::builder()
        .dimensions(|d| {
            d.column("state", DataType::String);
            d.column("project", DataType::String);
            d.timestamp_column("day", DataType::Timestamp);
        })
        .unwrap()
        .metrics(|m| {
            m.count("total", DataType::Integer)
                .parameter("status", ParameterSpec::string().one_of(["open", "closed"]));
            m.mean("duration", DataType::Float)
                .secondary_expression(|_| col("duration_p50"));
        })
        .unwrap()
        .filters(|f| {
            f.exact_match("project_id", DataType::Integer);
            f.range("created_at", DataType::Timestamp);
        })
        .unwrap()
        .build()
}

#[test]
fn test_plan_keeps_request_order() {
    let request = Request::new()
        .dimension(PartRequest::new("project"))
        .dimension(PartRequest::new("state"))
        .metric(PartRequest::new("duration"))
        .metric(PartRequest::new("total"));

    let plan = QueryPlan::build(&request, &descriptor());

    let dims: Vec<_> = plan.dimensions.iter().map(|p| p.identifier()).collect();
    let metrics: Vec<_> = plan.metrics.iter().map(|p| p.identifier()).collect();
    assert_eq!(dims, vec!["project", "state"]);
    assert_eq!(metrics, vec!["duration", "total"]);

    let parts: Vec<_> = plan.parts().map(|p| p.instance_key()).collect();
    assert_eq!(parts, vec!["project", "state", "duration", "total"]);
}

#[test]
fn test_valid_entries_before_an_error_are_kept() {
    let request = Request::new()
        .dimension(PartRequest::new("state"))
        .dimension(PartRequest::new("colour"))
        .dimension(PartRequest::new("project"));

    let plan = QueryPlan::build(&request, &descriptor());

    assert!(!plan.is_valid());
    assert_eq!(plan.dimensions.len(), 1);
    assert_eq!(plan.validation().error_map()["dimensions"], vec!["colour"]);
}

#[test]
fn test_order_uses_secondary_expression() {
    let request = Request::new()
        .order_by(OrderRequest::desc("duration"))
        .order_by(OrderRequest::asc("state"));

    let plan = QueryPlan::build(&request, &descriptor());

    assert!(plan.is_valid());
    assert_eq!(
        plan.order[0].expression().to_sql(Dialect::Postgres),
        "\"duration_p50\""
    );
    assert_eq!(plan.order[1].expression().to_sql(Dialect::Postgres), "\"state\"");
    assert_eq!(plan.order[0].direction(), Direction::Desc);
}

#[test]
fn test_order_parameters_are_checked() {
    let request = Request::new()
        .order_by(OrderRequest::asc("total").with_parameter("status", "merged"))
        .order_by(OrderRequest::asc("nothing"));

    let plan = QueryPlan::build(&request, &descriptor());

    assert_eq!(plan.validation().len(), 1);
    assert_eq!(plan.validation().error_map()["order"], vec!["total"]);
}

#[test]
fn test_filters_build_conditions() {
    let request = Request::new()
        .filter(FilterRequest::new("project_id", json!([1, 2])))
        .filter(FilterRequest::new("created_at", json!({"from": "2024-01-01"})));

    let plan = QueryPlan::build(&request, &descriptor());

    assert!(plan.is_valid());
    let conditions: Vec<_> = plan
        .filters
        .iter()
        .map(|f| f.condition().to_sql(Dialect::MySql))
        .collect();
    assert_eq!(
        conditions,
        vec![
            "`project_id` IN (1, 2)".to_string(),
            "`created_at` >= '2024-01-01'".to_string(),
        ]
    );
}

#[test]
fn test_invalid_filter_value_stops_filters() {
    let request = Request::new()
        .filter(FilterRequest::new("created_at", json!("2024-01-01")))
        .filter(FilterRequest::new("project_id", 1));

    let plan = QueryPlan::build(&request, &descriptor());

    assert!(plan.filters.is_empty());
    let validation = plan.validation();
    assert_eq!(validation.len(), 1);
    assert!(matches!(
        validation.errors[0],
        ValidationError::InvalidFilterValue { ref identifier, .. } if identifier == "created_at"
    ));
}

#[test]
fn test_empty_request_is_valid() {
    let plan = QueryPlan::build(&Request::new(), &descriptor());
    assert!(plan.is_valid());
    assert_eq!(plan.parts().count(), 0);
}
