//! Integration tests for lazy results and row formatting.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rollup::prelude::*;
use serde_json::{json, Value};

/// Records every query it was asked to load.
#[derive(Debug, Clone, Default)]
struct PagedQuery {
    limit: Option<u64>,
    offset: Option<u64>,
    log: Rc<RefCell<Vec<(Option<u64>, Option<u64>)>>>,
}

impl BackendQuery for PagedQuery {
    fn limit(&self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }

    fn offset(&self, offset: u64) -> Self {
        Self {
            offset: Some(offset),
            ..self.clone()
        }
    }

    fn load(&self) -> Result<Vec<Row>, BackendError> {
        self.log.borrow_mut().push((self.limit, self.offset));
        let mut row = Row::new();
        row.insert("m_total".into(), json!(1));
        Ok(vec![row])
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn plan() -> QueryPlan {
    let descriptor = EngineDescriptor::builder()
        .dimensions(|d| {
            d.column("state", DataType::String)
                .formatter(|v, _| json!(v.as_str().unwrap_or_default().to_uppercase()));
        })
        .unwrap()
        .metrics(|m| {
            m.count("total", DataType::Integer);
            m.count("issues", DataType::Integer)
                .parameter("status", ParameterSpec::string())
                .formatter(|v, _| json!(v.as_i64().unwrap_or_default() * 10));
        })
        .unwrap()
        .build();

    let request = Request::new()
        .dimension(PartRequest::new("state"))
        .metric(PartRequest::new("total"))
        .metric(PartRequest::new("issues").with_parameter("status", "open"));

    QueryPlan::build(&request, &descriptor)
}

#[test]
fn test_pagination_is_immutable() {
    let base = AggregationResult::new(
        Arc::new(QueryPlan::default()),
        PagedQuery::default(),
        ResultOptions::default(),
    );

    let limited = base.limit(5);
    let offset = base.offset(2);

    assert_eq!(limited.query().limit, Some(5));
    assert_eq!(limited.query().offset, None);
    assert_eq!(offset.query().limit, None);
    assert_eq!(offset.query().offset, Some(2));
    assert_eq!(base.query().limit, None);
    assert_eq!(base.query().offset, None);

    let chained = base.limit(5).offset(10);
    assert_eq!(chained.query().limit, Some(5));
    assert_eq!(chained.query().offset, Some(10));

    assert!(!base.is_loaded());
    assert!(base.query().log.borrow().is_empty());
}

#[test]
fn test_each_derived_result_loads_its_own_query() {
    let base = AggregationResult::new(
        Arc::new(QueryPlan::default()),
        PagedQuery::default(),
        ResultOptions::with_column_prefix("m_"),
    );
    let log = Rc::clone(&base.query().log);

    base.limit(5).rows().unwrap();
    base.offset(2).rows().unwrap();
    let rows = base.rows().unwrap();

    assert_eq!(rows[0]["total"], json!(1));
    assert_eq!(
        *log.borrow(),
        vec![(Some(5), None), (None, Some(2)), (None, None)]
    );
}

#[test]
fn test_formatter_pass_through() {
    let plan = plan();
    let formatted = Formatter::new(&plan).format(vec![row(json!({
        "state": "open",
        "total": 3,
        "issues_open": 4,
        "issues": 5,
        "unrelated": "x"
    }))]);

    let row = &formatted[0];
    assert_eq!(row["state"], json!("OPEN"));
    assert_eq!(row["total"], json!(3));
    assert_eq!(row["issues_open"], json!(40));
    assert_eq!(row["issues"], json!(5));
    assert_eq!(row["unrelated"], json!("x"));
}

#[test]
fn test_formatter_runs_once_per_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let descriptor = EngineDescriptor::builder()
        .metrics(move |m| {
            m.count("total", DataType::Integer).formatter(move |v, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                json!(v.as_i64().unwrap_or_default() + 1)
            });
        })
        .unwrap()
        .build();
    let plan = QueryPlan::build(
        &Request::new().metric(PartRequest::new("total")),
        &descriptor,
    );

    let rows: Vec<Row> = (0..3).map(|i| row(json!({ "total": i, "other": i }))).collect();
    let formatted = Formatter::new(&plan).format(rows);

    for (i, r) in formatted.iter().enumerate() {
        assert_eq!(r["total"], json!(i as i64 + 1));
        assert_eq!(r["other"], json!(i));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
