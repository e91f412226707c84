//! Reference SQL backend.
//!
//! [`SqlEngine`] implements [`crate::engine::Engine`] by rendering plans
//! through the [`crate::sql`] builder; any [`SqlExecutor`] runs the text.
//! [`SqliteExecutor`] is the bundled executor.

pub mod sql;
pub mod sqlite;

pub use sql::{SharedExecutor, SqlEngine, SqlExecutor, SqlQuery};
pub use sqlite::SqliteExecutor;
