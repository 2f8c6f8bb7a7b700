//! Error types for response transformation

use thiserror::Error;

/// Errors raised while mapping a raw payload into typed records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A record mapper was given something other than a positional array
    #[error("expected a positional array, got {found}")]
    NotAnArray { found: &'static str },

    /// A row in a 2-D payload was not itself an array
    #[error("row {index} is not an array")]
    RowNotAnArray { index: usize },

    /// Row is shorter than the schema requires
    #[error("{schema} row too short: expected at least {expected} fields, got {actual}")]
    RowTooShort {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A field could not be converted to the requested type
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Error raised by a caller-supplied transform function
    #[error("{0}")]
    Custom(String),
}

impl TransformError {
    /// Create a custom error from any displayable value
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Human-readable name of a JSON value's kind
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
