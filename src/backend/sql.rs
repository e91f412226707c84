//! SQL engine - renders a query plan as one grouped SELECT.
//!
//! ```text
//! dimensions ─► SELECT <expr> AS <prefix><key>, ...   GROUP BY <expr>, ...
//! metrics    ─► SELECT <aggregate> AS <prefix><key>, ...
//! filters    ─► WHERE <condition> AND ...
//! order      ─► ORDER BY <secondary or primary expr> ASC|DESC
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::Settings;
use crate::engine::{Engine, EngineDescriptor};
use crate::error::BackendError;
use crate::planner::QueryPlan;
use crate::request::Direction;
use crate::result::{BackendQuery, ResultOptions, Row};
use crate::sql::{Dialect, OrderByExpr, Query, SelectExpr, TableRef};
use crate::validation::{ValidationError, ValidationResult};

/// Runs rendered SQL and returns rows keyed by column name.
pub trait SqlExecutor {
    /// Dialect the executor's database understands.
    fn dialect(&self) -> Dialect;

    fn fetch(&self, sql: &str) -> Result<Vec<Row>, BackendError>;
}

/// Shared handle to an executor.
pub type SharedExecutor = Arc<dyn SqlExecutor + Send + Sync>;

/// An [`Engine`] over one SQL table.
pub struct SqlEngine {
    descriptor: EngineDescriptor,
    table: TableRef,
    dialect: Dialect,
    executor: SharedExecutor,
    column_prefix: Option<String>,
    max_limit: Option<u64>,
}

impl SqlEngine {
    /// Engine over `table`, rendering in the executor's dialect.
    pub fn new(descriptor: EngineDescriptor, table: TableRef, executor: SharedExecutor) -> Self {
        Self {
            descriptor,
            table,
            dialect: executor.dialect(),
            executor,
            column_prefix: None,
            max_limit: None,
        }
    }

    /// Engine configured from the `[engine]` and `[sql]` sections.
    ///
    /// The configured schema qualifies `table`. A configured dialect
    /// overrides the executor's own.
    pub fn from_settings(
        descriptor: EngineDescriptor,
        table: &str,
        settings: &Settings,
        executor: SharedExecutor,
    ) -> Self {
        let mut table = TableRef::new(table);
        if let Some(schema) = &settings.sql.schema {
            table = table.with_schema(schema);
        }

        let mut engine = Self::new(descriptor, table, executor);
        if let Some(dialect) = settings.sql.dialect {
            engine.dialect = dialect;
        }
        engine.column_prefix = settings.engine.column_prefix.clone();
        engine.max_limit = settings.engine.max_limit();
        engine
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_column_prefix(mut self, prefix: &str) -> Self {
        self.column_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The SELECT for a plan, without pagination.
    pub fn to_query(&self, plan: &QueryPlan) -> Query {
        let prefix = self.column_prefix.as_deref().unwrap_or("");

        let select: Vec<SelectExpr> = plan
            .parts()
            .map(|part| {
                SelectExpr::new(part.expression())
                    .with_alias(&format!("{}{}", prefix, part.instance_key()))
            })
            .collect();

        let group_by = plan.dimensions.iter().map(|d| d.expression()).collect();

        let order_by = plan
            .order
            .iter()
            .map(|o| match o.direction() {
                Direction::Asc => OrderByExpr::asc(o.expression()),
                Direction::Desc => OrderByExpr::desc(o.expression()),
            })
            .collect();

        let mut query = Query::new()
            .select(select)
            .from(self.table.clone())
            .group_by(group_by)
            .order_by(order_by);

        for filter in &plan.filters {
            query = query.filter(filter.condition().clone());
        }

        query
    }
}

impl fmt::Debug for SqlEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlEngine")
            .field("table", &self.table)
            .field("dialect", &self.dialect)
            .field("column_prefix", &self.column_prefix)
            .field("max_limit", &self.max_limit)
            .finish()
    }
}

impl Engine for SqlEngine {
    type Query = SqlQuery;

    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.table.table.trim().is_empty() {
            result.push(ValidationError::base("no table configured"));
        }
        result
    }

    fn execute_query_plan(&self, plan: &QueryPlan) -> SqlQuery {
        let mut query = self.to_query(plan);
        if let Some(max) = self.max_limit {
            query = query.limit(max);
        }

        SqlQuery {
            query,
            dialect: self.dialect,
            executor: Arc::clone(&self.executor),
            max_limit: self.max_limit,
        }
    }

    fn result_options(&self) -> ResultOptions {
        ResultOptions {
            column_prefix: self.column_prefix.clone(),
        }
    }
}

/// A rendered, not yet executed aggregation query.
#[derive(Clone)]
pub struct SqlQuery {
    query: Query,
    dialect: Dialect,
    executor: SharedExecutor,
    max_limit: Option<u64>,
}

impl SqlQuery {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn sql(&self) -> String {
        self.query.to_sql(self.dialect)
    }
}

impl fmt::Debug for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlQuery")
            .field("dialect", &self.dialect)
            .field("sql", &self.sql())
            .finish()
    }
}

impl BackendQuery for SqlQuery {
    /// Clamped to the engine's `max_limit`.
    fn limit(&self, limit: u64) -> Self {
        let limit = self.max_limit.map_or(limit, |max| limit.min(max));
        Self {
            query: self.query.clone().limit(limit),
            ..self.clone()
        }
    }

    fn offset(&self, offset: u64) -> Self {
        Self {
            query: self.query.clone().offset(offset),
            ..self.clone()
        }
    }

    fn load(&self) -> Result<Vec<Row>, BackendError> {
        let sql = self.sql();
        debug!(dialect = %self.dialect, sql = %sql, "running aggregation query");
        self.executor.fetch(&sql)
    }
}
