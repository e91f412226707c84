//! Declaration blocks for dimensions, metrics and filters.
//!
//! Each block type exposes exactly the verbs legal inside it, so a metric
//! verb in a dimension block is a compile error rather than a missing
//! definition at request time.
//!
//! # Example
//!
//! ```
//! use rollup::dsl::{Dimensions, Metrics};
//! use rollup::model::{DataType, ParameterSpec};
//!
//! let dimensions = Dimensions::collect(|d| {
//!     d.column("state", DataType::String);
//!     d.timestamp_column("day", DataType::Timestamp);
//! })
//! .unwrap();
//!
//! let metrics = Metrics::collect(|m| {
//!     m.count("total", DataType::Integer);
//!     m.mean("average_duration", DataType::Float)
//!         .parameter("unit", ParameterSpec::string().one_of(["seconds", "minutes"]));
//! })
//! .unwrap();
//!
//! assert_eq!(dimensions.len(), 2);
//! assert_eq!(metrics[1].identifier(), "average_duration");
//! ```

pub mod collector;
pub mod dimensions;
pub mod filters;
pub mod metrics;

pub use collector::{DefinitionsCollector, Draft};
pub use dimensions::Dimensions;
pub use filters::Filters;
pub use metrics::Metrics;
