//! Part definitions - the dimensions and metrics an engine exposes.
//!
//! A [`PartDefinition`] is immutable metadata describing one selectable
//! quantity: its identifier, semantic type, how to build its backend
//! expression, and how to format raw values. Definitions are created once
//! when an engine descriptor is declared and shared behind `Arc` by every
//! plan built from it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::parameters::{self, ExpressionContext, ParameterSpec, ParameterValues};
use super::types::DataType;
use crate::error::{DefinitionError, DefinitionResult};
use crate::sql::expr::{avg, case_when, col, count, count_star, date_trunc, lit_int};
use crate::sql::{DateGrain, Expr, ExprExt, Literal};

/// Builds a backend expression from request parameters.
pub type ExpressionBuilder = Arc<dyn Fn(&ExpressionContext<'_>) -> Expr + Send + Sync>;

/// Turns a raw result value into its display value.
///
/// Receives the parameter values of the requested use, so a formatter can
/// honor e.g. a requested unit.
pub type ValueFormatter = Arc<dyn Fn(Value, &ParameterValues) -> Value + Send + Sync>;

/// Parameter selecting the time bucket of a timestamp column.
pub const GRANULARITY: &str = "granularity";

/// Parameter restricting an aggregate to rows with a matching `status`.
pub const STATUS: &str = "status";

/// Parameter naming the display unit a formatter converts to.
pub const UNIT: &str = "unit";

/// Whether a part groups rows or aggregates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartRole {
    Dimension,
    Metric,
}

impl PartRole {
    /// Category name used in validation errors.
    pub fn category(&self) -> &'static str {
        match self {
            PartRole::Dimension => "dimensions",
            PartRole::Metric => "metrics",
        }
    }
}

/// The declaration verb a part was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// Plain grouping column.
    Column,
    /// Timestamp grouped into buckets.
    TimestampColumn,
    /// AVG aggregate.
    Mean,
    /// COUNT aggregate.
    Count,
}

impl PartKind {
    pub fn role(&self) -> PartRole {
        match self {
            PartKind::Column | PartKind::TimestampColumn => PartRole::Dimension,
            PartKind::Mean | PartKind::Count => PartRole::Metric,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Column => "column",
            PartKind::TimestampColumn => "timestamp_column",
            PartKind::Mean => "mean",
            PartKind::Count => "count",
        }
    }

    /// Parameter names a definition of this kind may declare.
    pub fn supported_parameters(&self) -> &'static [&'static str] {
        match self {
            PartKind::Column => &[],
            PartKind::TimestampColumn => &[GRANULARITY],
            PartKind::Mean | PartKind::Count => &[STATUS, UNIT],
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one dimension or metric.
#[derive(Clone)]
pub struct PartDefinition {
    name: String,
    kind: PartKind,
    data_type: DataType,
    expression: Option<ExpressionBuilder>,
    secondary_expression: Option<ExpressionBuilder>,
    description: Option<String>,
    formatter: Option<ValueFormatter>,
    parameters: BTreeMap<String, ParameterSpec>,
    default_grain: DateGrain,
    status_column: Option<String>,
}

impl PartDefinition {
    /// Start declaring a definition outside of a DSL block.
    pub fn builder(kind: PartKind, name: &str, data_type: DataType) -> PartBuilder {
        PartBuilder::new(kind, name, data_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identifier requests use; unique across dimensions and metrics.
    pub fn identifier(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn role(&self) -> PartRole {
        self.kind.role()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterSpec> {
        &self.parameters
    }

    pub fn is_parameterized(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }

    /// Bucket used by a timestamp column when the request names none.
    pub fn default_grain(&self) -> DateGrain {
        self.default_grain
    }

    /// Column compared against the `status` parameter.
    pub fn status_column(&self) -> &str {
        self.status_column.as_deref().unwrap_or(STATUS)
    }

    /// Result-column key for one use of this definition.
    ///
    /// Non-parameterized definitions always return the bare identifier.
    pub fn instance_key(&self, supplied: &ParameterValues) -> String {
        parameters::instance_key(&self.name, self.parameters.keys(), supplied)
    }

    /// Check request-supplied parameter values against the declarations.
    pub fn check_parameters(&self, supplied: &ParameterValues) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, value) in supplied {
            match self.parameters.get(name) {
                None => problems.push(format!(
                    "'{}' does not accept parameter '{}'",
                    self.name, name
                )),
                Some(spec) => {
                    if let Err(message) = spec.check(value) {
                        problems.push(format!(
                            "invalid value for parameter '{}' of '{}': {}",
                            name, self.name, message
                        ));
                    }
                }
            }
        }
        problems
    }

    /// Full backend expression for this part.
    ///
    /// A supplied expression builder yields the grouped or aggregated
    /// operand; the kind wraps it (bucketing, AVG, COUNT, status filter).
    pub fn expression(&self, ctx: &ExpressionContext<'_>) -> Expr {
        let operand = self.expression.as_ref().map(|build| build(ctx));

        match self.kind {
            PartKind::Column => operand.unwrap_or_else(|| col(&self.name)),
            PartKind::TimestampColumn => {
                let grain = ctx
                    .string(GRANULARITY)
                    .and_then(|g| g.parse().ok())
                    .unwrap_or(self.default_grain);
                date_trunc(grain, operand.unwrap_or_else(|| col(&self.name)))
            }
            PartKind::Mean => {
                let operand = operand.unwrap_or_else(|| col(&self.name));
                avg(self.apply_status(operand, ctx))
            }
            PartKind::Count => match (operand, self.status_condition(ctx)) {
                (Some(operand), Some(condition)) => count(case_when(condition, operand)),
                (None, Some(condition)) => count(case_when(condition, lit_int(1))),
                (Some(operand), None) => count(operand),
                (None, None) => count_star(),
            },
        }
    }

    /// Alternate expression, when one was declared.
    pub fn secondary_expression(&self, ctx: &ExpressionContext<'_>) -> Option<Expr> {
        self.secondary_expression.as_ref().map(|build| build(ctx))
    }

    /// Apply the formatter, or return the value unchanged.
    pub fn format_value(&self, value: Value, supplied: &ParameterValues) -> Value {
        match &self.formatter {
            Some(format) => format(value, supplied),
            None => value,
        }
    }

    fn status_condition(&self, ctx: &ExpressionContext<'_>) -> Option<Expr> {
        if !self.parameters.contains_key(STATUS) {
            return None;
        }
        let value = ctx.parameter(STATUS)?;
        let literal = Literal::from_json(value).unwrap_or(Literal::Null);
        Some(col(self.status_column()).eq(Expr::Literal(literal)))
    }

    fn apply_status(&self, operand: Expr, ctx: &ExpressionContext<'_>) -> Expr {
        match self.status_condition(ctx) {
            Some(condition) => case_when(condition, operand),
            None => operand,
        }
    }
}

impl fmt::Debug for PartDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("data_type", &self.data_type)
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("status_column", &self.status_column)
            .field("has_expression", &self.expression.is_some())
            .field("has_secondary_expression", &self.secondary_expression.is_some())
            .field("has_formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Incremental declaration of a [`PartDefinition`].
///
/// Methods return `&mut Self` so DSL calls can be chained; the first
/// declaration error is kept and reported by [`PartBuilder::build`].
#[must_use = "builders have no effect until built"]
pub struct PartBuilder {
    definition: PartDefinition,
    error: Option<DefinitionError>,
}

impl PartBuilder {
    pub fn new(kind: PartKind, name: &str, data_type: DataType) -> Self {
        let mut parameters = BTreeMap::new();
        if kind == PartKind::TimestampColumn {
            parameters.insert(
                GRANULARITY.to_string(),
                ParameterSpec::string()
                    .one_of(DateGrain::ALL.iter().map(|g| g.as_str()))
                    .describe("Time bucket to group by"),
            );
        }

        Self {
            definition: PartDefinition {
                name: name.to_string(),
                kind,
                data_type,
                expression: None,
                secondary_expression: None,
                description: None,
                formatter: None,
                parameters,
                default_grain: DateGrain::default(),
                status_column: None,
            },
            error: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.definition.name
    }

    /// Builder for the grouped/aggregated operand.
    pub fn expression<F>(&mut self, build: F) -> &mut Self
    where
        F: Fn(&ExpressionContext<'_>) -> Expr + Send + Sync + 'static,
    {
        self.definition.expression = Some(Arc::new(build));
        self
    }

    pub fn secondary_expression<F>(&mut self, build: F) -> &mut Self
    where
        F: Fn(&ExpressionContext<'_>) -> Expr + Send + Sync + 'static,
    {
        self.definition.secondary_expression = Some(Arc::new(build));
        self
    }

    pub fn description(&mut self, text: &str) -> &mut Self {
        self.definition.description = Some(text.to_string());
        self
    }

    pub fn formatter<F>(&mut self, format: F) -> &mut Self
    where
        F: Fn(Value, &ParameterValues) -> Value + Send + Sync + 'static,
    {
        self.definition.formatter = Some(Arc::new(format));
        self
    }

    /// Bucket used when a request does not pick a granularity.
    pub fn granularity(&mut self, grain: DateGrain) -> &mut Self {
        self.definition.default_grain = grain;
        self
    }

    /// Column the `status` parameter is matched against; `status` by default.
    pub fn status_column(&mut self, column: &str) -> &mut Self {
        self.definition.status_column = Some(column.to_string());
        self
    }

    /// Declare a runtime parameter, checked against the kind's allow-list.
    pub fn parameter(&mut self, name: &str, spec: ParameterSpec) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        let kind = self.definition.kind;
        if !kind.supported_parameters().contains(&name) {
            self.error = Some(DefinitionError::UnsupportedParameter {
                definition: self.definition.name.clone(),
                kind: kind.to_string(),
                parameter: name.to_string(),
                supported: supported_list(kind),
            });
            return self;
        }

        if let Some(allowed) = &spec.allowed_values {
            if allowed.is_empty() {
                self.error = Some(DefinitionError::InvalidParameter {
                    definition: self.definition.name.clone(),
                    parameter: name.to_string(),
                    message: "allowed values must not be empty".to_string(),
                });
                return self;
            }
        }

        self.definition.parameters.insert(name.to_string(), spec);
        self
    }

    /// Finish the declaration.
    pub fn build(&self) -> DefinitionResult<PartDefinition> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.definition.clone()),
        }
    }
}

fn supported_list(kind: PartKind) -> String {
    let supported = kind.supported_parameters();
    if supported.is_empty() {
        "none".to_string()
    } else {
        supported.join(", ")
    }
}
