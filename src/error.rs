//! Error types for definition-time and backend failures.
//!
//! Problems with a caller's request are not errors in this sense: they are
//! collected as [`crate::validation::ValidationError`] values and returned
//! inside an execution failure.

use std::collections::BTreeMap;

use crate::validation::ValidationResult;

/// Result type for definition-time operations.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// A defect in how an engine was declared.
///
/// Raised while building an engine descriptor, typically at process
/// start-up; never produced by a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    /// Two dimensions/metrics share an identifier.
    #[error("Duplicate identifier '{identifier}': dimensions and metrics share one namespace")]
    DuplicateIdentifier { identifier: String },

    /// Two filters share an identifier.
    #[error("Duplicate filter identifier '{identifier}'")]
    DuplicateFilter { identifier: String },

    /// A parameter outside the definition kind's allow-list.
    #[error(
        "Parameter '{parameter}' is not supported by {kind} '{definition}' (supported: {supported})"
    )]
    UnsupportedParameter {
        definition: String,
        kind: String,
        parameter: String,
        supported: String,
    },

    /// A parameter declaration that can never be satisfied.
    #[error("Invalid parameter '{parameter}' on '{definition}': {message}")]
    InvalidParameter {
        definition: String,
        parameter: String,
        message: String,
    },
}

/// Failure while a backend loads rows.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported column value in '{column}': {message}")]
    UnsupportedValue { column: String, message: String },

    #[error("Backend error: {0}")]
    Other(String),
}

/// A request rejected before any backend work was done.
///
/// Carries every validation problem found, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid aggregation request: {validation}")]
pub struct ExecutionFailure {
    validation: ValidationResult,
}

impl ExecutionFailure {
    pub fn new(validation: ValidationResult) -> Self {
        Self { validation }
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Human-readable messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        self.validation.messages()
    }

    /// Offending identifiers grouped by category name.
    pub fn error_map(&self) -> BTreeMap<&'static str, Vec<String>> {
        self.validation.error_map()
    }
}
