//! Cell values and binding tuples.

use serde::{Deserialize, Serialize};

/// A single cell of a fetched row, or one element of a binding tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Concrete values for the binding columns, identifying one group.
pub type BindingTuple = Vec<CellValue>;

impl CellValue {
    /// Returns true for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Type-matched equality.
    ///
    /// Values of the same kind compare by value. `Int` and `Float` are both
    /// numbers and compare numerically without going through `f64`, so large
    /// integer ids stay distinct. No other coercion takes place, so
    /// `Text("1")` is not equal to `Int(1)`.
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.num_eq(b),
                _ => false,
            },
        }
    }

    /// Coercing equality for untyped upstream data.
    ///
    /// Extends [`strict_eq`](Self::strict_eq): when the kinds differ, text,
    /// numbers and booleans are converted to numbers before comparing
    /// (`"2" == 2`, `true == 1`, `"" == 0`). `Null` only equals `Null`.
    pub fn loose_eq(&self, other: &Self) -> bool {
        if self.strict_eq(other) {
            return true;
        }
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(_), Self::Text(_)) => false,
            _ => match (self.coerce_number(), other.coerce_number()) {
                (Some(a), Some(b)) => a.num_eq(b),
                _ => false,
            },
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn coerce_number(&self) -> Option<Number> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Number::Int(i64::from(*b))),
            Self::Int(_) | Self::Float(_) => self.as_number(),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(Number::Int(0))
                } else if let Ok(i) = trimmed.parse::<i64>() {
                    Some(Number::Int(i))
                } else {
                    trimmed.parse::<f64>().ok().map(Number::Float)
                }
            }
        }
    }

    /// JSON form used for key derivation. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn num_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => int_eq_float(i, f),
        }
    }
}

/// Exact comparison: `f` must be integral and inside the `i64` range.
fn int_eq_float(i: i64, f: f64) -> bool {
    // 2^63, exact as f64
    const BOUND: f64 = -(i64::MIN as f64);
    f.fract() == 0.0 && (-BOUND..BOUND).contains(&f) && f as i64 == i
}

/// JSON array form of a binding tuple.
pub fn tuple_to_json(tuple: &[CellValue]) -> serde_json::Value {
    serde_json::Value::Array(tuple.iter().map(CellValue::to_json).collect())
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
