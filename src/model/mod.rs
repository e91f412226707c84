//! Definition types: dimensions, metrics, filters and their parameters.

pub mod filter;
pub mod parameters;
pub mod part;
pub mod types;

pub use filter::{FilterBuilder, FilterDefinition, FilterKind};
pub use parameters::{instance_key, ExpressionContext, ParameterSpec, ParameterValues};
pub use part::{
    ExpressionBuilder, PartBuilder, PartDefinition, PartKind, PartRole, ValueFormatter,
};
pub use types::DataType;
