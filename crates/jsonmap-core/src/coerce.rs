//! Checked numeric coercion from wire values into native field types
//!
//! [`from_value`] deserializes a `serde_json::Value` the way serde_json does,
//! except that integer targets also accept integral floats (`2.0` into `u8`)
//! and every narrowing is range checked. Out-of-range and fractional values
//! fail with [`CoerceError::Narrowing`] instead of being truncated.
//!
//! The coercion applies to the value itself and through `Option` and newtype
//! wrappers. Values inside sequences and maps use the plain serde_json rules.

use serde::de::{self, DeserializeOwned, Visitor};
use serde::Deserializer;
use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

/// Upper bound (exclusive) of the magnitudes an integral `f64` may have here
const INTEGRAL_F64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Failure to convert a wire value into a native type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// Number outside the target type's range or not integral
    #[error("{value} does not fit in {target}")]
    Narrowing { value: String, target: &'static str },

    /// Any other type mismatch reported by serde
    #[error("{0}")]
    Invalid(String),
}

impl de::Error for CoerceError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CoerceError::Invalid(msg.to_string())
    }
}

impl From<serde_json::Error> for CoerceError {
    fn from(err: serde_json::Error) -> Self {
        CoerceError::Invalid(err.to_string())
    }
}

/// Deserialize `T` from a wire value with checked numeric narrowing
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, CoerceError> {
    T::deserialize(Coercing { value })
}

fn narrow<N: TryFrom<i128>>(number: &Number, target: &'static str) -> Result<N, CoerceError> {
    let wide = if let Some(u) = number.as_u64() {
        Some(i128::from(u))
    } else if let Some(i) = number.as_i64() {
        Some(i128::from(i))
    } else {
        number
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < INTEGRAL_F64_LIMIT)
            .map(|f| f as i128)
    };

    wide.and_then(|n| N::try_from(n).ok())
        .ok_or_else(|| CoerceError::Narrowing {
            value: number.to_string(),
            target,
        })
}

struct Coercing<'de> {
    value: &'de Value,
}

macro_rules! forward_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.value.$method(visitor).map_err(CoerceError::from)
            }
        )*
    };
}

macro_rules! narrow_integer {
    ($($method:ident => $visit:ident($ty:ty))*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                match self.value {
                    Value::Number(number) => visitor.$visit(narrow::<$ty>(number, stringify!($ty))?),
                    other => other.$method(visitor).map_err(CoerceError::from),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for Coercing<'de> {
    type Error = CoerceError;

    narrow_integer! {
        deserialize_i8 => visit_i8(i8)
        deserialize_i16 => visit_i16(i16)
        deserialize_i32 => visit_i32(i32)
        deserialize_i64 => visit_i64(i64)
        deserialize_i128 => visit_i128(i128)
        deserialize_u8 => visit_u8(u8)
        deserialize_u16 => visit_u16(u16)
        deserialize_u32 => visit_u32(u32)
        deserialize_u64 => visit_u64(u64)
        deserialize_u128 => visit_u128(u128)
    }

    forward_to_value! {
        deserialize_any deserialize_bool deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_unit deserialize_seq deserialize_map deserialize_identifier
        deserialize_ignored_any
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Number(number) => {
                let wide = number
                    .as_f64()
                    .ok_or_else(|| CoerceError::Invalid(format!("{} is not a float", number)))?;
                if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
                    return Err(CoerceError::Narrowing {
                        value: number.to_string(),
                        target: "f32",
                    });
                }
                visitor.visit_f32(wide as f32)
            }
            other => other.deserialize_f32(visitor).map_err(CoerceError::from),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value
            .deserialize_unit_struct(name, visitor)
            .map_err(CoerceError::from)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value
            .deserialize_tuple(len, visitor)
            .map_err(CoerceError::from)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value
            .deserialize_tuple_struct(name, len, visitor)
            .map_err(CoerceError::from)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value
            .deserialize_struct(name, fields, visitor)
            .map_err(CoerceError::from)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.value
            .deserialize_enum(name, variants, visitor)
            .map_err(CoerceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_integral_float_narrows() {
        assert_eq!(from_value::<u8>(&json!(2.0)), Ok(2));
        assert_eq!(from_value::<i32>(&json!(-40.0)), Ok(-40));
        assert_eq!(from_value::<u64>(&json!(7)), Ok(7));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(
            from_value::<u8>(&json!(300)),
            Err(CoerceError::Narrowing {
                value: "300".to_string(),
                target: "u8"
            })
        );
        assert!(matches!(
            from_value::<u32>(&json!(-1)),
            Err(CoerceError::Narrowing { target: "u32", .. })
        ));
        assert!(matches!(
            from_value::<i64>(&json!(1e30)),
            Err(CoerceError::Narrowing { target: "i64", .. })
        ));
    }

    #[test]
    fn test_fractional_float_is_rejected_for_integers() {
        assert!(matches!(
            from_value::<u8>(&json!(2.5)),
            Err(CoerceError::Narrowing { .. })
        ));
    }

    #[test]
    fn test_f32_range() {
        assert_eq!(from_value::<f32>(&json!(1.5)), Ok(1.5f32));
        assert_eq!(from_value::<f32>(&json!(3)), Ok(3.0f32));
        assert!(matches!(
            from_value::<f32>(&json!(1e300)),
            Err(CoerceError::Narrowing { target: "f32", .. })
        ));
    }

    #[test]
    fn test_option_and_newtype_keep_coercion() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Level(u8);

        assert_eq!(from_value::<Option<u8>>(&json!(4.0)), Ok(Some(4)));
        assert_eq!(from_value::<Option<u8>>(&json!(null)), Ok(None));
        assert_eq!(from_value::<Level>(&json!(9.0)), Ok(Level(9)));
        assert!(matches!(
            from_value::<Option<u8>>(&json!(256)),
            Err(CoerceError::Narrowing { .. })
        ));
    }

    #[test]
    fn test_non_numeric_values_use_serde_rules() {
        assert_eq!(from_value::<String>(&json!("cow")), Ok("cow".to_string()));
        assert_eq!(from_value::<Vec<u8>>(&json!([1, 2])), Ok(vec![1, 2]));
        assert_eq!(from_value::<bool>(&json!(true)), Ok(true));
        assert!(matches!(
            from_value::<u8>(&json!("2")),
            Err(CoerceError::Invalid(_))
        ));
        assert!(matches!(
            from_value::<String>(&json!(2)),
            Err(CoerceError::Invalid(_))
        ));
    }

    #[test]
    fn test_structs_deserialize_normally() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        assert_eq!(
            from_value::<Point>(&json!({"x": 1, "y": -2})),
            Ok(Point { x: 1, y: -2 })
        );
    }
}
