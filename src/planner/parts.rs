//! Resolved plan entries: a catalog definition paired with its request.

use std::sync::Arc;

use serde_json::Value;

use crate::model::{ExpressionContext, FilterDefinition, ParameterValues, PartDefinition};
use crate::request::{Direction, FilterRequest, OrderRequest, PartRequest};
use crate::sql::Expr;

/// A requested dimension or metric resolved against the catalog.
#[derive(Debug, Clone)]
pub struct PartPlan {
    definition: Arc<PartDefinition>,
    request: PartRequest,
}

/// Plan entry for a requested dimension.
pub type DimensionPlan = PartPlan;

/// Plan entry for a requested metric.
pub type MetricPlan = PartPlan;

impl PartPlan {
    pub fn new(definition: Arc<PartDefinition>, request: PartRequest) -> Self {
        Self {
            definition,
            request,
        }
    }

    pub fn definition(&self) -> &PartDefinition {
        &self.definition
    }

    pub fn request(&self) -> &PartRequest {
        &self.request
    }

    pub fn identifier(&self) -> &str {
        self.definition.identifier()
    }

    pub fn parameters(&self) -> &ParameterValues {
        &self.request.parameters
    }

    /// Result-column key of this use of the definition.
    pub fn instance_key(&self) -> String {
        self.definition.instance_key(&self.request.parameters)
    }

    pub fn expression(&self) -> Expr {
        self.definition
            .expression(&ExpressionContext::new(&self.request.parameters))
    }

    pub fn secondary_expression(&self) -> Option<Expr> {
        self.definition
            .secondary_expression(&ExpressionContext::new(&self.request.parameters))
    }

    pub fn format_value(&self, value: Value) -> Value {
        self.definition.format_value(value, &self.request.parameters)
    }
}

/// A requested ordering resolved against the dimension and metric catalogs.
#[derive(Debug, Clone)]
pub struct OrderPlan {
    definition: Arc<PartDefinition>,
    request: OrderRequest,
}

impl OrderPlan {
    pub fn new(definition: Arc<PartDefinition>, request: OrderRequest) -> Self {
        Self {
            definition,
            request,
        }
    }

    pub fn definition(&self) -> &PartDefinition {
        &self.definition
    }

    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    pub fn direction(&self) -> Direction {
        self.request.direction
    }

    /// Key of the result column this entry sorts by.
    pub fn instance_key(&self) -> String {
        self.definition.instance_key(&self.request.parameters)
    }

    /// Sort expression: the secondary expression when declared.
    pub fn expression(&self) -> Expr {
        let ctx = ExpressionContext::new(&self.request.parameters);
        self.definition
            .secondary_expression(&ctx)
            .unwrap_or_else(|| self.definition.expression(&ctx))
    }
}

/// A requested filter with its row condition.
#[derive(Debug, Clone)]
pub struct FilterPlan {
    definition: Arc<FilterDefinition>,
    request: FilterRequest,
    condition: Expr,
}

impl FilterPlan {
    pub fn new(definition: Arc<FilterDefinition>, request: FilterRequest, condition: Expr) -> Self {
        Self {
            definition,
            request,
            condition,
        }
    }

    pub fn definition(&self) -> &FilterDefinition {
        &self.definition
    }

    pub fn identifier(&self) -> &str {
        self.definition.identifier()
    }

    pub fn value(&self) -> &Value {
        &self.request.value
    }

    pub fn condition(&self) -> &Expr {
        &self.condition
    }
}
