//! SQLite executor.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Number, Value};
use tracing::debug;

use super::sql::SqlExecutor;
use crate::config::{ConnectionSettings, Driver};
use crate::error::BackendError;
use crate::result::Row;
use crate::sql::Dialect;

/// Executes aggregation queries against a SQLite database.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open the database a `[connections.<name>]` entry points at.
    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self, BackendError> {
        match settings.driver {
            Driver::Sqlite if settings.is_in_memory() => Self::open_in_memory(),
            Driver::Sqlite => {
                let path = settings
                    .resolved_path()
                    .map_err(|e| BackendError::Other(e.to_string()))?;
                debug!(path = %path, "opening sqlite database");
                Self::open(path)
            }
        }
    }

    /// Run statements that return no rows, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, BackendError> {
        self.conn
            .lock()
            .map_err(|_| BackendError::Other("sqlite connection lock poisoned".to_string()))
    }
}

impl SqlExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn fetch(&self, sql: &str) -> Result<Vec<Row>, BackendError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::new();
            for (i, column) in columns.iter().enumerate() {
                map.insert(column.clone(), to_json(column, row.get_ref(i)?)?);
            }
            out.push(map);
        }

        debug!(rows = out.len(), "sqlite query returned");
        Ok(out)
    }
}

fn to_json(column: &str, value: ValueRef<'_>) -> Result<Value, BackendError> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(n) => Ok(Value::from(n)),
        ValueRef::Real(f) => Ok(Number::from_f64(f).map_or(Value::Null, Value::Number)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::String(s.to_string()))
            .map_err(|e| BackendError::UnsupportedValue {
                column: column.to_string(),
                message: e.to_string(),
            }),
        ValueRef::Blob(_) => Err(BackendError::UnsupportedValue {
            column: column.to_string(),
            message: "blob values are not supported".to_string(),
        }),
    }
}
