//! Lazy aggregation results.
//!
//! An [`AggregationResult`] wraps a backend query that has not run yet.
//! `limit`/`offset` derive new results around new queries; the first call
//! to `rows`, `get` or `iter` loads, un-prefixes and formats the rows once
//! and keeps them.

use std::cell::OnceCell;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BackendError;
use crate::format::Formatter;
use crate::planner::QueryPlan;

/// One result row: column key to value.
pub type Row = Map<String, Value>;

/// A backend query that can be paginated and loaded.
///
/// Pagination returns a new query and leaves the receiver untouched.
pub trait BackendQuery {
    fn limit(&self, limit: u64) -> Self
    where
        Self: Sized;

    fn offset(&self, offset: u64) -> Self
    where
        Self: Sized;

    /// Run the query and return raw rows.
    fn load(&self) -> Result<Vec<Row>, BackendError>;
}

/// How raw rows map back onto instance keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultOptions {
    /// Prefix the backend put in front of every column name.
    pub column_prefix: Option<String>,
}

impl ResultOptions {
    pub fn with_column_prefix(prefix: &str) -> Self {
        Self {
            column_prefix: Some(prefix.to_string()),
        }
    }
}

/// Lazily loaded, formatted rows of one executed request.
#[derive(Debug)]
pub struct AggregationResult<Q> {
    plan: Arc<QueryPlan>,
    query: Q,
    options: ResultOptions,
    rows: OnceCell<Vec<Row>>,
}

impl<Q: BackendQuery> AggregationResult<Q> {
    pub fn new(plan: Arc<QueryPlan>, query: Q, options: ResultOptions) -> Self {
        Self {
            plan,
            query,
            options,
            rows: OnceCell::new(),
        }
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn options(&self) -> &ResultOptions {
        &self.options
    }

    /// A new unloaded result around the limited query.
    pub fn limit(&self, limit: u64) -> Self {
        Self::new(
            Arc::clone(&self.plan),
            self.query.limit(limit),
            self.options.clone(),
        )
    }

    /// A new unloaded result around the offset query.
    pub fn offset(&self, offset: u64) -> Self {
        Self::new(
            Arc::clone(&self.plan),
            self.query.offset(offset),
            self.options.clone(),
        )
    }

    pub fn is_loaded(&self) -> bool {
        self.rows.get().is_some()
    }

    /// All formatted rows, loading them on first use.
    ///
    /// A failed load is not remembered; the next call tries again.
    pub fn rows(&self) -> Result<&[Row], BackendError> {
        if let Some(rows) = self.rows.get() {
            return Ok(rows);
        }
        let loaded = self.load_rows()?;
        Ok(self.rows.get_or_init(|| loaded))
    }

    /// The formatted row at `index`.
    pub fn get(&self, index: usize) -> Result<Option<&Row>, BackendError> {
        Ok(self.rows()?.get(index))
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, Row>, BackendError> {
        Ok(self.rows()?.iter())
    }

    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.rows()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.rows()?.is_empty())
    }

    /// Consume the result, returning owned rows.
    pub fn into_rows(self) -> Result<Vec<Row>, BackendError> {
        self.rows()?;
        Ok(self.rows.into_inner().unwrap_or_default())
    }

    fn load_rows(&self) -> Result<Vec<Row>, BackendError> {
        let raw = self.query.load()?;
        debug!(rows = raw.len(), "loaded aggregation rows");

        let rows = match self.options.column_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => raw
                .into_iter()
                .map(|row| strip_prefix(row, prefix))
                .collect(),
            _ => raw,
        };

        Ok(Formatter::new(&self.plan).format(rows))
    }
}

fn strip_prefix(row: Row, prefix: &str) -> Row {
    row.into_iter()
        .map(|(key, value)| match key.strip_prefix(prefix) {
            Some(stripped) => (stripped.to_string(), value),
            None => (key, value),
        })
        .collect()
}
