//! Positional row schemas
//!
//! Most v2 endpoints return records as bare JSON arrays. A [`RowSchema`] names
//! each index once, as static metadata, so mapping a row into a record is a
//! lookup rather than shape inspection at call sites.

use crate::error::{json_kind, TransformError};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Static field-name to index table for one positional record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSchema {
    /// Record type name, used in error messages
    pub name: &'static str,
    /// Field names in positional order
    pub fields: &'static [&'static str],
}

impl RowSchema {
    /// Create a schema
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    /// Position of a field, if the schema defines it
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builds a typed record from one positional row
pub trait FromRow: Sized {
    /// Convert the row. Rows may be longer than the fields the record reads.
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError>;
}

/// Rows mapped to themselves
impl FromRow for Vec<Value> {
    fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
        Ok(row)
    }
}

/// A positional row paired with the schema that names its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    schema: &'static RowSchema,
    values: Vec<Value>,
}

impl Row {
    /// Wrap raw values with a schema
    pub fn new(schema: &'static RowSchema, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    /// The schema for this row
    pub fn schema(&self) -> &'static RowSchema {
        self.schema
    }

    /// Raw positional values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row, returning the raw values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value of a named field; `None` if the schema lacks it or the row is short
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .index_of(field)
            .and_then(|idx| self.values.get(idx))
    }

    /// Named field as a string slice
    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Named field as an exact decimal
    pub fn decimal(&self, field: &'static str) -> Result<Option<Decimal>, TransformError> {
        match self.get(field) {
            Some(value) => value_to_decimal(field, value),
            None => Ok(None),
        }
    }

    /// Named field as an unsigned integer
    pub fn u64(&self, field: &'static str) -> Result<Option<u64>, TransformError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| TransformError::InvalidField {
                field,
                reason: format!("expected unsigned integer, got {}", json_kind(value)),
            }),
        }
    }

    /// Fail unless the row carries at least `min` fields
    pub fn require_len(&self, min: usize) -> Result<(), TransformError> {
        if self.values.len() < min {
            return Err(TransformError::RowTooShort {
                schema: self.schema.name,
                expected: min,
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}

/// Convert a JSON number or numeric string into a `Decimal`
///
/// Null maps to `None`. Goes through the textual form so no binary float
/// rounding leaks into prices and amounts.
pub fn value_to_decimal(
    field: &'static str,
    value: &Value,
) -> Result<Option<Decimal>, TransformError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => {
            return Err(TransformError::InvalidField {
                field,
                reason: format!("expected number, got {}", json_kind(other)),
            })
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|e| TransformError::InvalidField {
            field,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    static PAIR_SCHEMA: RowSchema = RowSchema::new("Pair", &["LEFT", "RIGHT"]);

    #[test]
    fn test_index_of() {
        assert_eq!(PAIR_SCHEMA.index_of("LEFT"), Some(0));
        assert_eq!(PAIR_SCHEMA.index_of("RIGHT"), Some(1));
        assert_eq!(PAIR_SCHEMA.index_of("MIDDLE"), None);
        assert_eq!(PAIR_SCHEMA.len(), 2);
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(&PAIR_SCHEMA, vec![json!("a"), json!(2.5)]);
        assert_eq!(row.str("LEFT"), Some("a"));
        assert_eq!(row.decimal("RIGHT").unwrap(), Some(dec!(2.5)));
        assert_eq!(row.get("MIDDLE"), None);
    }

    #[test]
    fn test_short_row() {
        let row = Row::new(&PAIR_SCHEMA, vec![json!("a")]);
        assert_eq!(row.get("RIGHT"), None);
        assert!(matches!(
            row.require_len(2),
            Err(TransformError::RowTooShort { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(value_to_decimal("X", &json!(null)).unwrap(), None);
        assert_eq!(value_to_decimal("X", &json!("0.1")).unwrap(), Some(dec!(0.1)));
        assert_eq!(value_to_decimal("X", &json!(1e-7)).unwrap(), Some(dec!(0.0000001)));
        assert!(value_to_decimal("X", &json!([1])).is_err());
    }

    #[test]
    fn test_vec_from_row_is_identity() {
        let row = vec![json!(1), json!(2)];
        assert_eq!(Vec::<Value>::from_row(row.clone()).unwrap(), row);
    }
}
