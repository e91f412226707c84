//! End-to-end tests of the SQL engine against an in-memory SQLite database.

use std::sync::Arc;

use rollup::prelude::*;
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn executor() -> Arc<SqliteExecutor> {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor
        .execute_batch(
            "CREATE TABLE issues (
                id INTEGER PRIMARY KEY,
                project_id INTEGER NOT NULL,
                state TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                duration REAL
            );
            INSERT INTO issues (project_id, state, status, created_at, duration) VALUES
                (1, 'opened', 'open',   '2024-01-01 09:00:00', 60),
                (1, 'opened', 'open',   '2024-01-01 17:30:00', 180),
                (1, 'closed', 'closed', '2024-01-02 08:00:00', 600),
                (1, 'closed', 'open',   '2024-01-15 12:00:00', NULL),
                (2, 'opened', 'open',   '2024-01-01 10:00:00', 1200);",
        )
        .unwrap();
    Arc::new(executor)
}

fn descriptor() -> EngineDescriptor {
    EngineDescriptor::builder()
        .dimensions(|d| {
            d.column("state", DataType::String);
            d.timestamp_column("day", DataType::Timestamp)
                .expression(|_| col("created_at"));
        })
        .unwrap()
        .metrics(|m| {
            m.count("total", DataType::Integer)
                .parameter("status", ParameterSpec::string().one_of(["open", "closed"]));
            m.mean("average_duration", DataType::Float)
                .expression(|_| col("duration"))
                .parameter("unit", ParameterSpec::string().one_of(["seconds", "minutes"]))
                .formatter(|value, params| match (value.as_f64(), params.get("unit")) {
                    (Some(seconds), Some(unit)) if unit == "minutes" => json!(seconds / 60.0),
                    _ => value,
                });
        })
        .unwrap()
        .filters(|f| {
            f.exact_match("project_id", DataType::Integer).required();
            f.range("created_at", DataType::Timestamp);
        })
        .unwrap()
        .build()
}

fn engine() -> SqlEngine {
    init_tracing();
    SqlEngine::new(descriptor(), TableRef::new("issues"), executor()).with_column_prefix("agg_")
}

#[test]
fn test_grouped_by_day() {
    let engine = engine();
    let request = Request::new()
        .dimension(PartRequest::new("day"))
        .metric(PartRequest::new("total"))
        .metric(PartRequest::new("average_duration").with_parameter("unit", "minutes"))
        .order_by(OrderRequest::asc("day"))
        .filter(FilterRequest::new("project_id", 1));

    let result = engine.execute(&request).unwrap();
    let rows = result.rows().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["day"], json!("2024-01-01"));
    assert_eq!(rows[0]["total"], json!(2));
    assert_eq!(rows[0]["average_duration_minutes"], json!(2.0));
    assert_eq!(rows[1]["day"], json!("2024-01-02"));
    assert_eq!(rows[1]["average_duration_minutes"], json!(10.0));
    assert_eq!(rows[2]["average_duration_minutes"], Value::Null);
}

#[test]
fn test_parameterized_instances_side_by_side() {
    let engine = engine();
    let request = Request::new()
        .dimension(PartRequest::new("state"))
        .metric(PartRequest::new("total").with_parameter("status", "open"))
        .metric(PartRequest::new("total").with_parameter("status", "closed"))
        .order_by(OrderRequest::desc("state"))
        .filter(FilterRequest::new("project_id", json!([1, 2])));

    let rows = engine.execute(&request).unwrap().into_rows().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["state"], json!("opened"));
    assert_eq!(rows[0]["total_open"], json!(3));
    assert_eq!(rows[0]["total_closed"], json!(0));
    assert_eq!(rows[1]["state"], json!("closed"));
    assert_eq!(rows[1]["total_open"], json!(1));
    assert_eq!(rows[1]["total_closed"], json!(1));
}

#[test]
fn test_granularity_and_range_filter() {
    let engine = engine();
    let request = Request::new()
        .dimension(PartRequest::new("day").with_parameter("granularity", "month"))
        .metric(PartRequest::new("total"))
        .filter(FilterRequest::new("project_id", 1))
        .filter(FilterRequest::new(
            "created_at",
            json!({"from": "2024-01-02", "to": "2024-01-31"}),
        ));

    let rows = engine.execute(&request).unwrap().into_rows().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["day_month"], json!("2024-01-01"));
    assert_eq!(rows[0]["total"], json!(2));
}

#[test]
fn test_pagination() {
    let engine = engine();
    let request = Request::new()
        .dimension(PartRequest::new("day"))
        .metric(PartRequest::new("total"))
        .order_by(OrderRequest::asc("day"))
        .filter(FilterRequest::new("project_id", 1));

    let result = engine.execute(&request).unwrap();
    let second_page = result.offset(1).limit(1);

    let page: Vec<_> = second_page
        .iter()
        .unwrap()
        .map(|r| r["day"].clone())
        .collect();
    assert_eq!(page, vec![json!("2024-01-02")]);
    assert!(!result.is_loaded());
    assert_eq!(result.len().unwrap(), 3);
}

#[test]
fn test_missing_required_filter() {
    let engine = engine();
    let request = Request::new().metric(PartRequest::new("total"));

    let failure = engine.execute(&request).unwrap_err();
    assert_eq!(failure.error_map()["base"], vec!["project_id"]);
    assert_eq!(
        failure.messages(),
        vec!["base: filter 'project_id' is required".to_string()]
    );
}

#[test]
fn test_backend_errors_surface_on_load() {
    init_tracing();
    let engine = SqlEngine::new(descriptor(), TableRef::new("missing_table"), executor());
    let request = Request::new()
        .metric(PartRequest::new("total"))
        .filter(FilterRequest::new("project_id", 1));

    let result = engine.execute(&request).unwrap();
    assert!(matches!(result.rows(), Err(BackendError::Sqlite(_))));
    assert!(!result.is_loaded());
}
