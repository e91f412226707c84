//! Caller-supplied aggregation requests.
//!
//! A [`Request`] is plain data: it is never validated on construction and
//! deserializes straight from a transport payload.
//!
//! ```
//! use rollup::request::{PartRequest, Request};
//! use serde_json::json;
//!
//! let request: Request = serde_json::from_value(json!({
//!     "dimensions": [{"identifier": "day"}],
//!     "metrics": [
//!         {"identifier": "total"},
//!         {"identifier": "average_duration", "parameters": {"unit": "minutes"}}
//!     ],
//!     "order": [{"identifier": "total", "direction": "desc"}]
//! }))
//! .unwrap();
//!
//! assert_eq!(request.metrics[0], PartRequest::new("total"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ParameterValues;

/// One requested dimension or metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRequest {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "ParameterValues::is_empty")]
    pub parameters: ParameterValues,
}

impl PartRequest {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            parameters: ParameterValues::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

/// Sort direction of an order entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One requested ordering.
///
/// Parameters select the instance of a parameterized part to sort by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub identifier: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "ParameterValues::is_empty")]
    pub parameters: ParameterValues,
}

impl OrderRequest {
    pub fn asc(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            direction: Direction::Asc,
            parameters: ParameterValues::new(),
        }
    }

    pub fn desc(identifier: &str) -> Self {
        Self {
            direction: Direction::Desc,
            ..Self::asc(identifier)
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

/// One applied filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub identifier: String,
    pub value: Value,
}

impl FilterRequest {
    pub fn new(identifier: &str, value: impl Into<Value>) -> Self {
        Self {
            identifier: identifier.to_string(),
            value: value.into(),
        }
    }
}

/// An aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[must_use = "builders have no effect until used"]
pub struct Request {
    pub metrics: Vec<PartRequest>,
    pub dimensions: Vec<PartRequest>,
    pub order: Vec<OrderRequest>,
    pub filters: Vec<FilterRequest>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(mut self, metric: PartRequest) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn dimension(mut self, dimension: PartRequest) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn order_by(mut self, order: OrderRequest) -> Self {
        self.order.push(order);
        self
    }

    pub fn filter(mut self, filter: FilterRequest) -> Self {
        self.filters.push(filter);
        self
    }
}
