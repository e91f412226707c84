//! # Rollup
//!
//! A declarative aggregation query engine.
//!
//! An engine declares named dimensions, metrics and filters once. Callers
//! then send ad-hoc requests ("group by day, count open issues, order by
//! count") which are validated against those catalogs, planned, and handed
//! to a backend that returns lazily loaded, formatted rows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │      EngineDescriptor (dimensions, metrics, filters)     │
//! │           declared through dsl::{Dimensions, ...}        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!      Request ───────────►│ [planner]
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │            QueryPlan + ValidationResult                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Engine::execute_query_plan]
//! ┌─────────────────────────────────────────────────────────┐
//! │        AggregationResult (lazy; limit / offset)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [first access: load + Formatter]
//! ┌─────────────────────────────────────────────────────────┐
//! │               Rows keyed by instance key                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rollup::prelude::*;
//!
//! let descriptor = EngineDescriptor::builder()
//!     .dimensions(|d| {
//!         d.column("state", DataType::String);
//!     })?
//!     .metrics(|m| {
//!         m.count("total", DataType::Integer);
//!     })?
//!     .build();
//!
//! let executor = Arc::new(SqliteExecutor::open_in_memory()?);
//! executor.execute_batch(
//!     "CREATE TABLE issues (state TEXT);
//!      INSERT INTO issues VALUES ('open'), ('open'), ('closed');",
//! )?;
//!
//! let engine = SqlEngine::new(descriptor, TableRef::new("issues"), executor);
//! let request = Request::new()
//!     .dimension(PartRequest::new("state"))
//!     .metric(PartRequest::new("total"))
//!     .order_by(OrderRequest::asc("state"));
//!
//! let result = engine.execute(&request)?;
//! let rows = result.rows()?;
//! assert_eq!(rows[0]["state"], "closed");
//! assert_eq!(rows[1]["total"], 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod config;
pub mod digest;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod planner;
pub mod request;
pub mod result;
pub mod sql;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{SqlEngine, SqlExecutor, SqliteExecutor};
    pub use crate::config::Settings;
    pub use crate::dsl::{Dimensions, Filters, Metrics};
    pub use crate::engine::{Engine, EngineBuilder, EngineDescriptor};
    pub use crate::error::{BackendError, DefinitionError, ExecutionFailure};
    pub use crate::format::Formatter;
    pub use crate::model::{
        DataType, ExpressionContext, FilterKind, ParameterSpec, ParameterValues, PartDefinition,
        PartKind,
    };
    pub use crate::planner::QueryPlan;
    pub use crate::request::{Direction, FilterRequest, OrderRequest, PartRequest, Request};
    pub use crate::result::{AggregationResult, BackendQuery, ResultOptions, Row};
    pub use crate::sql::{col, DateGrain, Dialect, Expr, ExprExt, TableRef};
    pub use crate::validation::{Category, ValidationError, ValidationResult};
}

pub use engine::{Engine, EngineDescriptor};
pub use request::Request;
pub use result::AggregationResult;
