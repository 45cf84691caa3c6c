//! Bindable literal values.
//!
//! A [`Value`] is what a placeholder stands for. Values never reach SQL text
//! directly; the renderer swaps each one for an `@pN` token and stores it in
//! [`Parameters`](crate::qb::Parameters).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::{self, Write as _};
use uuid::Uuid;

/// A literal bound to a placeholder, or a field value read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Json(serde_json::Value),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
}

impl Value {
    /// Check if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Encode the value for use inside a cache key.
    ///
    /// Integers, booleans and NULL are written as-is and text as a JSON string.
    /// Every other variant carries a short type prefix, so two values of
    /// different variants never share an encoding. Floats keep NaN, infinities
    /// and the sign of zero.
    pub fn to_key_string(&self) -> String {
        let mut out = String::new();
        let _ = match self {
            Value::Null => write!(out, "null"),
            Value::Bool(v) => write!(out, "{v}"),
            Value::Int(v) => write!(out, "{v}"),
            Value::Float(v) => write!(out, "f:{v:?}"),
            Value::Text(v) => write!(out, "{}", serde_json::Value::from(v.as_str())),
            Value::Bytes(v) => {
                out.push_str("x:");
                v.iter().try_for_each(|b| write!(out, "{b:02x}"))
            }
            Value::Uuid(v) => write!(out, "u:{v}"),
            Value::Timestamp(v) => write!(out, "ts:{}", v.to_rfc3339()),
            Value::Date(v) => write!(out, "d:{v}"),
            Value::Json(v) => write!(out, "j:{v}"),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => write!(out, "m:{v}"),
        };
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Date(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_string_distinguishes_text_and_int() {
        assert_eq!(Value::from(1).to_key_string(), "1");
        assert_eq!(Value::from("1").to_key_string(), "\"1\"");
    }

    #[test]
    fn key_string_escapes_separators() {
        let v = Value::from("a,@p1=b");
        assert_eq!(v.to_key_string(), "\"a,@p1=b\"");
    }

    #[test]
    fn key_string_distinguishes_variants() {
        let bytes = Value::Bytes(vec![1, 2]);
        let json = Value::Json(serde_json::json!([1, 2]));
        assert_eq!(bytes.to_key_string(), "x:0102");
        assert_eq!(json.to_key_string(), "j:[1,2]");

        let json_text = Value::Json(serde_json::json!("a"));
        assert_ne!(json_text.to_key_string(), Value::from("a").to_key_string());

        assert_eq!(Value::Null.to_key_string(), "null");
        assert_eq!(Value::Float(f64::NAN).to_key_string(), "f:NaN");
        assert_eq!(Value::Float(f64::INFINITY).to_key_string(), "f:inf");
        assert_ne!(
            Value::Float(f64::NEG_INFINITY).to_key_string(),
            Value::Float(f64::INFINITY).to_key_string()
        );
        assert_ne!(Value::Float(1.0).to_key_string(), Value::Int(1).to_key_string());
        assert_ne!(
            Value::Float(-0.0).to_key_string(),
            Value::Float(0.0).to_key_string()
        );
        assert_ne!(
            Value::from(true).to_key_string(),
            Value::from("true").to_key_string()
        );
    }

    #[test]
    fn option_maps_to_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(Value::from("snow").to_string(), "snow");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_string(), "<3 bytes>");
    }
}
