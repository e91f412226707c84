//! Filter definitions - named row restrictions a request may apply.

use std::fmt;

use serde_json::Value;

use super::parameters::display_value;
use super::types::DataType;
use crate::sql::expr::col;
use crate::sql::{Expr, ExprExt, Literal};

/// How a filter value restricts rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// `= value`, or `IN (...)` for an array value.
    ExactMatch,
    /// `{"from": a, "to": b}`, both bounds inclusive and optional.
    Range,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::ExactMatch => "exact_match",
            FilterKind::Range => "range",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefinition {
    name: String,
    kind: FilterKind,
    data_type: DataType,
    expression: Option<Expr>,
    description: Option<String>,
    required: bool,
}

impl FilterDefinition {
    pub fn builder(kind: FilterKind, name: &str, data_type: DataType) -> FilterBuilder {
        FilterBuilder::new(kind, name, data_type)
    }

    pub fn identifier(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether every request must apply this filter.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The filtered expression; the identifier as a column by default.
    pub fn expression(&self) -> Expr {
        self.expression.clone().unwrap_or_else(|| col(&self.name))
    }

    /// Row condition for a request-supplied value.
    pub fn condition(&self, value: &Value) -> Result<Expr, String> {
        match self.kind {
            FilterKind::ExactMatch => self.exact_match(value),
            FilterKind::Range => self.range(value),
        }
    }

    fn exact_match(&self, value: &Value) -> Result<Expr, String> {
        match value {
            Value::Null => Ok(self.expression().is_null()),
            Value::Array(items) if items.is_empty() => {
                Err("expected at least one value".to_string())
            }
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.literal(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.expression().in_list(values))
            }
            Value::Object(_) => Err(format!("expected a {} value, got an object", self.data_type)),
            scalar => Ok(self.expression().eq(self.literal(scalar)?)),
        }
    }

    fn range(&self, value: &Value) -> Result<Expr, String> {
        let Value::Object(bounds) = value else {
            return Err(format!(
                "expected an object with 'from' and/or 'to', got {}",
                display_value(value)
            ));
        };

        if let Some(key) = bounds.keys().find(|k| *k != "from" && *k != "to") {
            return Err(format!("unknown range bound '{}'", key));
        }

        let lower = match bounds.get("from") {
            Some(Value::Null) | None => None,
            Some(from) => Some(self.expression().gte(self.literal(from)?)),
        };
        let upper = match bounds.get("to") {
            Some(Value::Null) | None => None,
            Some(to) => Some(self.expression().lte(self.literal(to)?)),
        };

        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(lower.and(upper)),
            (Some(bound), None) | (None, Some(bound)) => Ok(bound),
            (None, None) => Err("expected at least one of 'from' or 'to'".to_string()),
        }
    }

    fn literal(&self, value: &Value) -> Result<Expr, String> {
        if value.is_null() || !self.data_type.accepts(value) {
            return Err(format!("expected {}, got {}", self.data_type, value));
        }
        Literal::from_json(value)
            .map(Expr::Literal)
            .ok_or_else(|| format!("expected {}, got {}", self.data_type, value))
    }
}

/// Incremental declaration of a [`FilterDefinition`].
#[must_use = "builders have no effect until built"]
pub struct FilterBuilder {
    definition: FilterDefinition,
}

impl FilterBuilder {
    pub fn new(kind: FilterKind, name: &str, data_type: DataType) -> Self {
        Self {
            definition: FilterDefinition {
                name: name.to_string(),
                kind,
                data_type,
                expression: None,
                description: None,
                required: false,
            },
        }
    }

    pub fn identifier(&self) -> &str {
        &self.definition.name
    }

    pub fn expression(&mut self, expr: Expr) -> &mut Self {
        self.definition.expression = Some(expr);
        self
    }

    pub fn description(&mut self, text: &str) -> &mut Self {
        self.definition.description = Some(text.to_string());
        self
    }

    pub fn required(&mut self) -> &mut Self {
        self.definition.required = true;
        self
    }

    pub fn build(&self) -> FilterDefinition {
        self.definition.clone()
    }
}
