//! Record, collection and top-level transcoders
//!
//! All three are `impl Mapper` blocks, so every entry point carries the
//! session's cache and configuration:
//!
//! - [`record`]: one record to and from a JSON object, fields in declaration order
//! - [`collection`]: a sequence of records to and from a JSON array
//! - [`dispatch`]: classify the root value or destination and route it

pub mod collection;
pub mod dispatch;
pub mod record;

use serde_json::Value;

/// Name of a JSON value's type, for error messages
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&json!(null)), "null");
        assert_eq!(describe(&json!([1])), "an array");
        assert_eq!(describe(&json!({})), "an object");
        assert_eq!(describe(&json!("x")), "a string");
    }
}
