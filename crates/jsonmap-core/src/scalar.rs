//! Scalar wire values
//!
//! Codes in a substitution spec and the native values of enumerated fields
//! are compared through [`Scalar`], a closed set of the JSON scalar kinds.
//! Comparison goes through [`Scalar::canonical_key`] so that `1`, `1.0` and
//! `1e0` all name the same code.

use serde_json::{Number, Value};
use std::fmt;

/// Largest magnitude at which every integer is exactly representable in `f64`
const EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Convert a JSON value; arrays and objects are not scalars
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Self::from_number(n)),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_number(n: &Number) -> Self {
        if let Some(u) = n.as_u64() {
            Scalar::Integer(i128::from(u))
        } else if let Some(i) = n.as_i64() {
            Scalar::Integer(i128::from(i))
        } else {
            Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Parse the code half of a substitution pair
    ///
    /// Text that is a JSON scalar is taken as that scalar (`2`, `true`,
    /// `"x"`); anything else is taken verbatim as a string.
    pub fn parse_code(text: &str) -> Self {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|value| Self::from_value(&value))
            .unwrap_or_else(|| Scalar::String(text.to_string()))
    }

    /// Text used to match a native value against a table code
    pub fn canonical_key(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < EXACT_F64_INTEGER {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Scalar::String(s) => s.clone(),
        }
    }

    /// Convert back into a JSON value
    ///
    /// Integers outside the 64-bit JSON number range and non-finite floats
    /// have no JSON number form and become strings.
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Integer(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    Value::from(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    Value::from(v)
                } else {
                    Value::String(i.to_string())
                }
            }
            Scalar::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }

    /// Name of the scalar kind
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::String(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.canonical_key()),
        }
    }
}

/// Read a wire value as a substitution label
///
/// Strings are taken verbatim; every other value by its JSON text.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
