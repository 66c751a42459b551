use serde::{Deserialize, Serialize};

use crate::DataType;

/// A single cell of a `Frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Value {
    /// Reads the value as `f64`, widening integers. `None` for strings and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Float(x) => Some(x),
            Value::Str(_) | Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of type `dtype`.
    pub fn fits(&self, dtype: DataType) -> bool {
        match (self, dtype) {
            (Value::Null, _) => true,
            (Value::Int(i), DataType::Int32) => i32::try_from(*i).is_ok(),
            (Value::Int(_), DataType::Int64 | DataType::Float32 | DataType::Float64) => true,
            (Value::Float(_), DataType::Float32 | DataType::Float64) => true,
            (Value::Str(_), DataType::Str) => true,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_float() {
        assert_eq!(Value::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::Str("3".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn int32_range_is_checked() {
        assert!(Value::Int(7).fits(DataType::Int32));
        assert!(!Value::Int(i64::MAX).fits(DataType::Int32));
        assert!(!Value::Float(1.5).fits(DataType::Int64));
    }

    #[test]
    fn json_cells_are_untagged() {
        let row: Vec<Value> = serde_json::from_str(r#"[1, 2.5, "a", null]"#).unwrap();
        assert_eq!(
            row,
            [
                Value::Int(1),
                Value::Float(2.5),
                Value::Str("a".into()),
                Value::Null
            ]
        );
    }
}
