//! Request validation errors.
//!
//! Problems with a caller's request are collected, never raised: every
//! check appends to a [`ValidationResult`] so one round-trip reports them
//! all.

use std::collections::BTreeMap;
use std::fmt;

/// The part of a request a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Dimensions,
    Metrics,
    Order,
    Filters,
    /// Errors about the request or engine as a whole.
    Base,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dimensions => "dimensions",
            Category::Metrics => "metrics",
            Category::Order => "order",
            Category::Filters => "filters",
            Category::Base => "base",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier not registered in the category's catalog.
    UnknownIdentifier {
        category: Category,
        identifier: String,
    },
    /// Request parameters rejected by the definition.
    InvalidParameters {
        category: Category,
        identifier: String,
        message: String,
    },
    /// Filter value that cannot be turned into a condition.
    InvalidFilterValue { identifier: String, message: String },
    /// Required filter absent from the request.
    MissingRequiredFilter { identifier: String },
    /// Engine-specific rule.
    Rule {
        category: Category,
        identifier: Option<String>,
        message: String,
    },
}

impl ValidationError {
    pub fn unknown(category: Category, identifier: &str) -> Self {
        ValidationError::UnknownIdentifier {
            category,
            identifier: identifier.to_string(),
        }
    }

    /// An engine-wide rule violation, reported under `base`.
    pub fn base(message: impl Into<String>) -> Self {
        ValidationError::Rule {
            category: Category::Base,
            identifier: None,
            message: message.into(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ValidationError::UnknownIdentifier { category, .. }
            | ValidationError::InvalidParameters { category, .. }
            | ValidationError::Rule { category, .. } => *category,
            ValidationError::InvalidFilterValue { .. } => Category::Filters,
            ValidationError::MissingRequiredFilter { .. } => Category::Base,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            ValidationError::UnknownIdentifier { identifier, .. }
            | ValidationError::InvalidParameters { identifier, .. }
            | ValidationError::InvalidFilterValue { identifier, .. }
            | ValidationError::MissingRequiredFilter { identifier } => Some(identifier),
            ValidationError::Rule { identifier, .. } => identifier.as_deref(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownIdentifier {
                category,
                identifier,
            } => {
                write!(f, "{}: unknown identifier '{}'", category, identifier)
            }
            ValidationError::InvalidParameters {
                category,
                identifier,
                message,
            } => {
                write!(
                    f,
                    "{}: invalid parameters for '{}': {}",
                    category, identifier, message
                )
            }
            ValidationError::InvalidFilterValue {
                identifier,
                message,
            } => {
                write!(f, "filters: invalid value for '{}': {}", identifier, message)
            }
            ValidationError::MissingRequiredFilter { identifier } => {
                write!(f, "base: filter '{}' is required", identifier)
            }
            ValidationError::Rule {
                category, message, ..
            } => {
                write!(f, "{}: {}", category, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Accumulated validation errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append all errors of another result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn has_errors_in(&self, category: Category) -> bool {
        self.errors.iter().any(|e| e.category() == category)
    }

    /// Human-readable messages, one per error.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Offending identifiers grouped by category name.
    ///
    /// Errors without an identifier contribute their message instead.
    pub fn error_map(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut map: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            let entry = match error.identifier() {
                Some(identifier) => identifier.to_string(),
                None => match error {
                    ValidationError::Rule { message, .. } => message.clone(),
                    other => other.to_string(),
                },
            };
            map.entry(error.category().as_str()).or_default().push(entry);
        }
        map
    }
}

impl From<Vec<ValidationError>> for ValidationResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}
