//! Response transformation
//!
//! Each call may carry a [`Transformer`] describing how to turn the parsed
//! JSON payload into domain records. The variant is chosen at the call site,
//! so nothing inspects types at runtime; only the payload's array shape is
//! looked at, and only for record mappers.

use bfx_types::{FromRow, Row, RowSchema, TransformError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type RowFn<T> = Arc<dyn Fn(Vec<Value>) -> Result<T, TransformError> + Send + Sync>;
type DataFn<T> = Arc<dyn Fn(Value) -> Result<T, TransformError> + Send + Sync>;

/// How to convert a payload
pub enum Transformer<T> {
    /// Return the payload unchanged
    Passthrough,
    /// Map each positional row into a record
    Record(RowFn<T>),
    /// Hand the whole payload to a function
    Function(DataFn<T>),
}

impl<T> Transformer<T> {
    /// Record mapper from a closure over one row
    pub fn rows<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<T, TransformError> + Send + Sync + 'static,
    {
        Self::Record(Arc::new(f))
    }

    /// Free function over the whole payload
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<T, TransformError> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }
}

impl<T: FromRow + 'static> Transformer<T> {
    /// Record mapper for a [`FromRow`] type
    pub fn record() -> Self {
        Self::Record(Arc::new(T::from_row))
    }
}

impl Transformer<Row> {
    /// Record mapper producing schema-named [`Row`]s
    pub fn schema(schema: &'static RowSchema) -> Self {
        Self::rows(move |values| Ok(Row::new(schema, values)))
    }
}

impl Transformer<Value> {
    /// No transformation
    pub fn none() -> Self {
        Self::Passthrough
    }
}

impl<T> Clone for Transformer<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Passthrough => Self::Passthrough,
            Self::Record(f) => Self::Record(Arc::clone(f)),
            Self::Function(f) => Self::Function(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Transformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "Transformer::Passthrough"),
            Self::Record(_) => write!(f, "Transformer::Record"),
            Self::Function(_) => write!(f, "Transformer::Function"),
        }
    }
}

/// Output of the transform step
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed<T> {
    /// Transform disabled or no transformer: the parsed payload as received
    Raw(Value),
    /// One record (flat row) or a function's result
    One(T),
    /// One record per row of a 2-D payload
    Many(Vec<T>),
}

impl<T> Transformed<T> {
    /// The untransformed payload, if that is what this is
    pub fn into_raw(self) -> Option<Value> {
        match self {
            Self::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// The single record, if that is what this is
    pub fn into_one(self) -> Option<T> {
        match self {
            Self::One(t) => Some(t),
            _ => None,
        }
    }

    /// Records as a list; a single record becomes a one-element list
    pub fn into_many(self) -> Option<Vec<T>> {
        match self {
            Self::Many(v) => Some(v),
            Self::One(t) => Some(vec![t]),
            Self::Raw(_) => None,
        }
    }

    /// Whether the payload went through untouched
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// JavaScript-style falsiness, used to short-circuit record mapping
fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

/// Map a payload through a record constructor
///
/// Empty payloads give an empty list; a 2-D array maps row by row; a flat
/// array becomes one record.
pub fn record_transform<T>(
    data: Value,
    map_row: &(dyn Fn(Vec<Value>) -> Result<T, TransformError> + Send + Sync),
) -> Result<Transformed<T>, TransformError> {
    if is_empty_payload(&data) {
        return Ok(Transformed::Many(Vec::new()));
    }

    let items = match data {
        Value::Array(items) => items,
        Value::Object(_) => return Err(TransformError::NotAnArray { found: "object" }),
        Value::String(_) => return Err(TransformError::NotAnArray { found: "string" }),
        Value::Number(_) => return Err(TransformError::NotAnArray { found: "number" }),
        Value::Bool(_) => return Err(TransformError::NotAnArray { found: "bool" }),
        Value::Null => return Err(TransformError::NotAnArray { found: "null" }),
    };

    if matches!(items.first(), Some(Value::Array(_))) {
        return items
            .into_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Array(values) => map_row(values),
                _ => Err(TransformError::RowNotAnArray { index }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Transformed::Many);
    }

    map_row(items).map(Transformed::One)
}

/// Apply `transformer` to `data`, or pass it through when disabled
pub fn apply<T>(
    data: Value,
    transformer: &Transformer<T>,
    enabled: bool,
) -> Result<Transformed<T>, TransformError> {
    if !enabled {
        return Ok(Transformed::Raw(data));
    }

    match transformer {
        Transformer::Passthrough => Ok(Transformed::Raw(data)),
        Transformer::Record(map_row) => record_transform(data, map_row.as_ref()),
        Transformer::Function(f) => f(data).map(Transformed::One),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Model(Vec<Value>);

    impl FromRow for Model {
        fn from_row(row: Vec<Value>) -> Result<Self, TransformError> {
            Ok(Model(row))
        }
    }

    #[test]
    fn test_disabled_is_identity() {
        let data = json!([[1, 2], [3, 4]]);
        for transformer in [
            Transformer::<Model>::record(),
            Transformer::function(|_| Ok(Model(vec![]))),
            Transformer::Passthrough,
        ] {
            assert_eq!(
                apply(data.clone(), &transformer, false).unwrap(),
                Transformed::Raw(data.clone())
            );
        }
    }

    #[test]
    fn test_passthrough_when_enabled() {
        let data = json!({"a": 1});
        assert_eq!(
            apply(data.clone(), &Transformer::none(), true).unwrap(),
            Transformed::Raw(data)
        );
    }

    #[test]
    fn test_two_dimensional_rows() {
        let out = apply(json!([[1, 2], [3, 4]]), &Transformer::<Model>::record(), true).unwrap();
        assert_eq!(
            out,
            Transformed::Many(vec![
                Model(vec![json!(1), json!(2)]),
                Model(vec![json!(3), json!(4)]),
            ])
        );
    }

    #[test]
    fn test_flat_row_is_one_record() {
        let out = apply(json!([1, 2, 3]), &Transformer::<Model>::record(), true).unwrap();
        assert_eq!(out, Transformed::One(Model(vec![json!(1), json!(2), json!(3)])));
    }

    #[test]
    fn test_empty_inputs_give_empty_list() {
        for data in [json!([]), json!(null), json!(false), json!(0), json!("")] {
            let out = apply(data, &Transformer::<Model>::record(), true).unwrap();
            assert_eq!(out, Transformed::Many(vec![]));
        }
    }

    #[test]
    fn test_function_gets_whole_payload() {
        let transformer = Transformer::function(|data: Value| {
            Ok(data.as_array().map(|a| a.len()).unwrap_or_default())
        });
        assert_eq!(
            apply(json!([[1], [2], [3]]), &transformer, true).unwrap(),
            Transformed::One(3)
        );
        assert_eq!(apply(json!([]), &transformer, true).unwrap(), Transformed::One(0));
    }

    #[test]
    fn test_errors_propagate() {
        let failing = Transformer::<Model>::rows(|_| Err(TransformError::custom("bad row")));
        assert_eq!(
            apply(json!([[1], [2]]), &failing, true),
            Err(TransformError::Custom("bad row".into()))
        );

        let mixed = apply(json!([[1], 2]), &Transformer::<Model>::record(), true);
        assert_eq!(mixed, Err(TransformError::RowNotAnArray { index: 1 }));

        let object = apply(json!({"a": 1}), &Transformer::<Model>::record(), true);
        assert_eq!(object, Err(TransformError::NotAnArray { found: "object" }));
    }

    #[test]
    fn test_schema_rows() {
        static SCHEMA: RowSchema = RowSchema::new("Pair", &["A", "B"]);
        let out = apply(json!([["x", 1]]), &Transformer::schema(&SCHEMA), true).unwrap();
        let rows = out.into_many().unwrap();
        assert_eq!(rows[0].str("A"), Some("x"));
        assert_eq!(rows[0].get("B"), Some(&json!(1)));
    }
}
