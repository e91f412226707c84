//! End-to-end tests of `Engine::execute` against a stub backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rollup::prelude::*;
use serde_json::{json, Value};

/// Returns canned rows and counts loads.
#[derive(Debug, Clone)]
struct StubQuery {
    rows: Vec<Row>,
    loads: Arc<AtomicUsize>,
    limit: Option<u64>,
}

impl BackendQuery for StubQuery {
    fn limit(&self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }

    fn offset(&self, _offset: u64) -> Self {
        self.clone()
    }

    fn load(&self) -> Result<Vec<Row>, BackendError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let take = self.limit.map_or(self.rows.len(), |l| l as usize);
        Ok(self.rows.iter().take(take).cloned().collect())
    }
}

struct StubEngine {
    descriptor: EngineDescriptor,
    rows: Vec<Row>,
    loads: Arc<AtomicUsize>,
}

impl Engine for StubEngine {
    type Query = StubQuery;

    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn execute_query_plan(&self, _plan: &QueryPlan) -> StubQuery {
        StubQuery {
            rows: self.rows.clone(),
            loads: Arc::clone(&self.loads),
            limit: None,
        }
    }
}

fn seconds_to(value: Value, params: &ParameterValues) -> Value {
    let seconds = match value.as_f64() {
        Some(s) => s,
        None => return value,
    };
    match params.get("unit").and_then(Value::as_str) {
        Some("minutes") => json!(seconds / 60.0),
        Some("hours") => json!(seconds / 3600.0),
        _ => value,
    }
}

fn descriptor() -> EngineDescriptor {
    EngineDescriptor::builder()
        .dimensions(|d| {
            d.timestamp_column("day", DataType::Timestamp);
        })
        .unwrap()
        .metrics(|m| {
            m.count("total", DataType::Integer);
            m.mean("average_duration", DataType::Float)
                .parameter(
                    "unit",
                    ParameterSpec::string().one_of(["seconds", "minutes", "hours"]),
                )
                .formatter(seconds_to);
        })
        .unwrap()
        .build()
}

fn engine(rows: Value) -> StubEngine {
    let rows = match rows {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    StubEngine {
        descriptor: descriptor(),
        rows,
        loads: Arc::new(AtomicUsize::new(0)),
    }
}

fn scenario_request() -> Request {
    Request::new()
        .dimension(PartRequest::new("day"))
        .metric(PartRequest::new("total"))
        .metric(PartRequest::new("average_duration").with_parameter("unit", "minutes"))
}

#[test]
fn test_end_to_end_instance_key_routing() {
    let engine = engine(json!([
        {"day": "2024-01-01", "total": 5, "average_duration_minutes": 120}
    ]));

    let plan = engine.plan(&scenario_request());
    assert_eq!(plan.metrics.len(), 2);
    assert_eq!(plan.metrics[1].instance_key(), "average_duration_minutes");

    let result = engine.execute(&scenario_request()).unwrap();
    let rows = result.rows().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["day"], json!("2024-01-01"));
    assert_eq!(rows[0]["total"], json!(5));
    assert_eq!(rows[0]["average_duration_minutes"], json!(2.0));
}

#[test]
fn test_request_from_json_payload() {
    let engine = engine(json!([]));
    let request: Request = serde_json::from_value(json!({
        "dimensions": [{"identifier": "day", "parameters": {"granularity": "week"}}],
        "metrics": [{"identifier": "average_duration", "parameters": {"unit": "hours"}}],
        "order": [{"identifier": "average_duration", "direction": "desc", "parameters": {"unit": "hours"}}]
    }))
    .unwrap();

    let result = engine.execute(&request).unwrap();
    let keys: Vec<_> = result.plan().parts().map(|p| p.instance_key()).collect();
    assert_eq!(keys, vec!["day_week", "average_duration_hours"]);
    assert_eq!(result.plan().order[0].direction(), Direction::Desc);
}

#[test]
fn test_unknown_identifier_is_reported_alone() {
    let engine = engine(json!([]));
    let request = Request::new()
        .dimension(PartRequest::new("day"))
        .dimension(PartRequest::new("weekday"))
        .metric(PartRequest::new("total"));

    assert!(!engine.request_valid(&request));

    let failure = engine.execute(&request).unwrap_err();
    let map = failure.error_map();
    assert_eq!(map.len(), 1);
    assert_eq!(map["dimensions"], vec!["weekday"]);
    assert_eq!(
        failure.messages(),
        vec!["dimensions: unknown identifier 'weekday'".to_string()]
    );
}

#[test]
fn test_one_error_per_category() {
    let engine = engine(json!([]));
    let request = Request::new()
        .dimension(PartRequest::new("a"))
        .dimension(PartRequest::new("b"))
        .metric(PartRequest::new("c"))
        .metric(PartRequest::new("d"))
        .order_by(OrderRequest::asc("e"))
        .order_by(OrderRequest::asc("f"))
        .filter(FilterRequest::new("g", 1));

    let validation = engine.validate_request(&request);
    let map = validation.error_map();

    assert_eq!(map["dimensions"], vec!["a"]);
    assert_eq!(map["metrics"], vec!["c"]);
    assert_eq!(map["order"], vec!["e"]);
    assert_eq!(map["filters"], vec!["g"]);
    assert_eq!(validation.len(), 4);
}

#[test]
fn test_order_may_reference_unrequested_parts() {
    let engine = engine(json!([]));
    let request = Request::new()
        .metric(PartRequest::new("total"))
        .order_by(OrderRequest::asc("day"));

    assert!(engine.request_valid(&request));
}

#[test]
fn test_bad_parameter_value_is_a_validation_error() {
    let engine = engine(json!([]));
    let request =
        Request::new().metric(PartRequest::new("average_duration").with_parameter("unit", "days"));

    let failure = engine.execute(&request).unwrap_err();
    assert_eq!(failure.error_map()["metrics"], vec!["average_duration"]);
    assert!(failure.messages()[0].contains("days"));
}

#[test]
fn test_load_happens_once_and_lazily() {
    let engine = engine(json!([
        {"day": "2024-01-01", "total": 5},
        {"day": "2024-01-02", "total": 7}
    ]));

    let result = engine.execute(&scenario_request()).unwrap();
    assert_eq!(engine.loads.load(Ordering::SeqCst), 0);

    let first: Vec<_> = result.iter().unwrap().map(|r| r["total"].clone()).collect();
    let second = result.rows().unwrap().len();
    let third = result.get(1).unwrap().map(|r| r["day"].clone());

    assert_eq!(first, vec![json!(5), json!(7)]);
    assert_eq!(second, 2);
    assert_eq!(third, Some(json!("2024-01-02")));
    assert_eq!(engine.loads.load(Ordering::SeqCst), 1);

    let limited = result.limit(1);
    assert_eq!(limited.rows().unwrap().len(), 1);
    assert_eq!(result.rows().unwrap().len(), 2);
    assert_eq!(engine.loads.load(Ordering::SeqCst), 2);
}
