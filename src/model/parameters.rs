//! Runtime parameters for parameterized dimensions and metrics.
//!
//! A parameterized definition declares which parameters it accepts. A
//! request then supplies values for them, and each distinct set of values
//! becomes its own result column, named by [`instance_key`].
//!
//! # Instance keys
//!
//! ```text
//! count                                   -> "count"
//! count  {status: "open"}                 -> "count_open"
//! count  {status: "in review"}            -> "count_<16 hex chars>"
//! ```
//!
//! Values are joined with `_` in parameter-name order. A postfix made only
//! of ASCII letters, digits and `_` is used verbatim; anything else,
//! non-ASCII letters included, is replaced by the
//! first 16 hex characters (64 bits) of its SHA-256. The chance of two
//! distinct hashed postfixes of one identifier colliding stays below one in
//! a billion up to about 190,000 distinct values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::DataType;
use crate::digest::short_digest;

/// Parameter values supplied by a request, keyed by parameter name.
pub type ParameterValues = BTreeMap<String, Value>;

/// Hex characters kept from the digest of a non-bare-word postfix.
pub const POSTFIX_DIGEST_LEN: usize = 16;

static BARE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Declaration of one accepted parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub data_type: DataType,
    /// When set, request values must be one of these.
    #[serde(default)]
    pub allowed_values: Option<Vec<Value>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterSpec {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            allowed_values: None,
            description: None,
        }
    }

    /// A string parameter.
    pub fn string() -> Self {
        Self::new(DataType::String)
    }

    /// Restrict accepted values.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check a request-supplied value, returning a problem description.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if !self.data_type.accepts(value) {
            return Err(format!("expected {}, got {}", self.data_type, value));
        }
        if let Some(allowed) = &self.allowed_values {
            if !allowed.contains(value) {
                let allowed: Vec<String> = allowed.iter().map(display_value).collect();
                return Err(format!(
                    "{} is not one of: {}",
                    display_value(value),
                    allowed.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// Parameter values as seen by an expression builder.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionContext<'a> {
    parameters: &'a ParameterValues,
}

impl<'a> ExpressionContext<'a> {
    pub fn new(parameters: &'a ParameterValues) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &'a ParameterValues {
        self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&'a Value> {
        self.parameters.get(name)
    }

    /// A parameter value as a string slice, if it is a JSON string.
    pub fn string(&self, name: &str) -> Option<&'a str> {
        self.parameter(name).and_then(Value::as_str)
    }
}

/// Deterministic result-column key for one use of a definition.
///
/// `declared` are the definition's parameter names in declaration order;
/// `supplied` are the caller's values. Without declared parameters, or when
/// none of them has a value, the key is the bare identifier.
pub fn instance_key<'a, I>(identifier: &str, declared: I, supplied: &ParameterValues) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let values: Vec<String> = declared
        .into_iter()
        .filter_map(|name| supplied.get(name))
        .map(display_value)
        .collect();

    if values.is_empty() {
        return identifier.to_string();
    }

    let joined = values.join("_");
    let postfix = if BARE_WORD.is_match(&joined) {
        joined
    } else {
        short_digest(&joined, POSTFIX_DIGEST_LEN)
    };

    format!("{}_{}", identifier, postfix)
}

/// Strings render bare; everything else renders as JSON text.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
