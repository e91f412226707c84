//! SQL generation module.
//!
//! The backend expression language for part definitions, plus the pieces a
//! SQL backend needs to render an aggregation plan:
//!
//! - [`expr`] - Expression AST and builder DSL
//! - [`query`] - SELECT query builder
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, case_when, col, count, count_distinct, count_star, date_trunc, func, lit_bool, lit_int,
    lit_str, star, table_col, BinaryOperator, DateGrain, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};
