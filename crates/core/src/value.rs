//! Property values compared by exact-match queries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::EntityKey;

/// A field value read from an entity through its descriptor.
///
/// Values are compared by value. Integers compare numerically regardless of
/// signedness, so `Int(5) == Uint(5)`. `Null` stands for an absent field, so an
/// absent query value matches entities whose field is absent as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Int(signed), Value::Uint(unsigned)) | (Value::Uint(unsigned), Value::Int(signed)) => {
                u64::try_from(*signed).is_ok_and(|signed| signed == *unsigned)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Int(i64::from(value))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Uint(u64::from(value))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<EntityKey> for Value {
    fn from(value: EntityKey) -> Self {
        Value::Uuid(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_of_different_widths_compare_equal() {
        assert_eq!(Value::from(5i32), Value::from(5i64));
        assert_eq!(Value::from(5u8), Value::from(5u64));
    }

    #[test]
    fn signedness_does_not_affect_integer_equality() {
        assert_eq!(Value::from(5), Value::from(5u32));
        assert_eq!(Value::from(7u64), Value::from(7i16));
        assert_ne!(Value::from(-1), Value::from(u64::MAX));
        assert_ne!(Value::from(5), Value::from(6u32));
        assert_ne!(Value::from(5), Value::from(5.0));
    }

    #[test]
    fn absent_option_is_null() {
        let none: Option<String> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn values_serialize_untagged() {
        let value = Value::List(vec![Value::from(1), Value::from("a"), Value::Null]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,"a",null]"#);

        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);

        let unsigned = Value::from(5u32);
        let parsed: Value = serde_json::from_str(&serde_json::to_string(&unsigned).unwrap()).unwrap();
        assert_eq!(parsed, unsigned);

        let large = Value::from(u64::MAX);
        let parsed: Value = serde_json::from_str(&serde_json::to_string(&large).unwrap()).unwrap();
        assert!(matches!(parsed, Value::Uint(u64::MAX)));
        assert_eq!(parsed, large);
    }
}
