//! Result rows and typed row mapping.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CraftError, CraftResult};
use crate::value::Value;

/// One result row: field names paired with values, in select-list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style field append, handy in executors and tests.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    ///
    /// An exact match wins; otherwise the first ASCII case-insensitive match is
    /// returned, since SQL Server field names are case-insensitive.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.fields.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v)
    }

    /// Field by position.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.fields.get(idx).map(|(_, v)| v)
    }

    /// Iterate `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Decode a field into `T`, returning [`CraftError::Decode`] on failure.
    pub fn try_get<T: FromValue>(&self, column: &str) -> CraftResult<T> {
        match self.get(column) {
            Some(value) => T::from_value(value).map_err(|message| CraftError::decode(column, message)),
            None => T::from_missing().ok_or_else(|| CraftError::decode(column, "no such field")),
        }
    }
}

/// Conversion from a single field value.
pub trait FromValue: Sized {
    /// Convert, describing the mismatch on failure.
    fn from_value(value: &Value) -> Result<Self, String>;

    /// Value to use when the field is absent; `None` makes absence an error.
    fn from_missing() -> Option<Self> {
        None
    }
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {got:?}")
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    /// Accepts integers, integral floats, numeric text and (with the feature) decimals,
    /// since drivers disagree on how `@@IDENTITY` comes back.
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
            Value::Text(s) => s.trim().parse().map_err(|_| mismatch("integer", value)),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => {
                use rust_decimal::prelude::ToPrimitive;
                if d.fract().is_zero() {
                    d.to_i64().ok_or_else(|| mismatch("integer", value))
                } else {
                    Err(mismatch("integer", value))
                }
            }
            _ => Err(mismatch("integer", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| format!("{v} out of range for i32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            _ => Err(mismatch("text", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bytes(v) => Ok(v.clone()),
            _ => Err(mismatch("bytes", value)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(v) => Ok(*v),
            Value::Text(s) => Uuid::parse_str(s).map_err(|e| e.to_string()),
            _ => Err(mismatch("uuid", value)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            _ => Err(mismatch("timestamp", value)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(v) => Ok(*v),
            _ => Err(mismatch("date", value)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            other => serde_json::to_value(other).map_err(|e| e.to_string()),
        }
    }
}

#[cfg(feature = "rust_decimal")]
impl FromValue for rust_decimal::Decimal {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Decimal(v) => Ok(*v),
            Value::Int(v) => Ok(rust_decimal::Decimal::from(*v)),
            _ => Err(mismatch("decimal", value)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn from_missing() -> Option<Self> {
        Some(None)
    }
}

/// Trait for types that can be built from a result row.
pub trait FromRow: Sized {
    /// Convert a row into Self
    fn from_row(row: &Row) -> CraftResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> CraftResult<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        nick: Option<String>,
    }

    impl FromRow for Person {
        fn from_row(row: &Row) -> CraftResult<Self> {
            Ok(Person {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                nick: row.try_get("nick")?,
            })
        }
    }

    #[test]
    fn get_is_case_insensitive_fallback() {
        let row = Row::new().with("Name", "Ada").with("name", "exact");
        assert_eq!(row.get("name"), Some(&Value::from("exact")));
        assert_eq!(row.get("NAME"), Some(&Value::from("Ada")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn identity_accepts_driver_shapes() {
        assert_eq!(i64::from_value(&Value::Int(5)), Ok(5));
        assert_eq!(i64::from_value(&Value::Float(5.0)), Ok(5));
        assert_eq!(i64::from_value(&Value::from("12")), Ok(12));
        assert!(i64::from_value(&Value::Float(5.5)).is_err());
        assert!(i64::from_value(&Value::Null).is_err());
    }

    #[test]
    fn try_get_reports_column() {
        let row = Row::new().with("id", "abc");
        let err = row.try_get::<i64>("id").unwrap_err();
        match err {
            CraftError::Decode { column, .. } => assert_eq!(column, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_row_maps_optional_fields() {
        let row = Row::new().with("id", 1).with("name", "Ada");
        let person = Person::from_row(&row).unwrap();
        assert_eq!(
            person,
            Person {
                id: 1,
                name: "Ada".into(),
                nick: None,
            }
        );

        let row = Row::new().with("id", 2).with("name", "Grace").with("nick", Value::Null);
        assert_eq!(Person::from_row(&row).unwrap().nick, None);
    }

    #[test]
    fn missing_required_field_fails() {
        let row = Row::new().with("id", 1);
        assert!(Person::from_row(&row).is_err());
    }
}
