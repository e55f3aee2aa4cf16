//! Typed values stored in a [`Document`].
//!
//! This module provides the [`Value`] enum for every value a TOML document
//! can hold, and [`ValueKind`], the payload-free kind used for array
//! homogeneity checks and error messages.
//!
//! ## Usage Patterns
//!
//! ### Type Checking
//!
//! ```rust
//! use strict_toml::Value;
//!
//! let value = Value::from(42);
//! assert!(value.is_integer());
//! assert!(!value.is_string());
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use strict_toml::parse;
//!
//! let doc = parse("ports = [8001, 8001, 8002]").unwrap();
//! let ports: Vec<i64> = doc.get_array_of("ports").unwrap();
//! assert_eq!(ports, vec![8001, 8001, 8002]);
//! ```

use crate::Document;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};
use std::fmt;

/// An absolute instant together with the offset it was written in.
pub type Datetime = DateTime<FixedOffset>;

/// A value held by a document.
///
/// Arrays are homogeneous by [`ValueKind`]: all elements are the same scalar
/// kind, all are arrays (of any element kind), or all are tables.
///
/// # Examples
///
/// ```rust
/// use strict_toml::{Value, ValueKind};
///
/// let array = Value::Array(vec![Value::from(1), Value::from(2)]);
/// assert_eq!(array.kind(), ValueKind::Array);
/// assert_eq!(array.as_array().map(|items| items.len()), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Vec<Value>),
    Table(Document),
}

/// The kind of a [`Value`], ignoring its payload.
///
/// Displays with the classic short names (`Int`, `Double`, `Bool`, ...)
/// reported by [`Error::MixedArrayType`](crate::Error::MixedArrayType).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Array,
    Table,
}

impl ValueKind {
    /// Returns `true` for kinds that are not arrays or tables.
    #[inline]
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, ValueKind::Array | ValueKind::Table)
    }

    /// Returns a descriptive lower-case name, used in type mismatch errors.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Datetime => "datetime",
            ValueKind::Array => "array",
            ValueKind::Table => "table",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "String",
            ValueKind::Integer => "Int",
            ValueKind::Float => "Double",
            ValueKind::Boolean => "Bool",
            ValueKind::Datetime => "Date",
            ValueKind::Array => "Array",
            ValueKind::Table => "Table",
        };
        f.write_str(name)
    }
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Datetime(_) => ValueKind::Datetime,
            Value::Array(_) => ValueKind::Array,
            Value::Table(_) => ValueKind::Table,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Value::Datetime(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// Returns `true` for a non-empty array whose elements are all tables.
    #[must_use]
    pub fn is_array_of_tables(&self) -> bool {
        match self {
            Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_table),
            _ => false,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::from(42).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a float or an integer, returns it as `f64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Value;
    ///
    /// assert_eq!(Value::Float(3.14).as_f64(), Some(3.14));
    /// assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
    /// assert_eq!(Value::Boolean(true).as_f64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Value::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Document> {
        match self {
            Value::Table(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Conversion from a borrowed [`Value`] used by the typed document getters.
///
/// Implemented for the scalar types, [`Document`], [`Value`] itself and
/// `Vec<T>` of any implementor, so nested arrays can be extracted directly.
///
/// # Examples
///
/// ```rust
/// use strict_toml::parse;
///
/// let doc = parse("data = [[1, 2], [3]]").unwrap();
/// let data: Vec<Vec<i64>> = doc.get_as("data").unwrap();
/// assert_eq!(data, vec![vec![1, 2], vec![3]]);
/// ```
pub trait FromValue: Sized {
    /// Describes the expected kind in type mismatch errors.
    fn expected() -> String;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn expected() -> String {
        "string".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for i64 {
    fn expected() -> String {
        "integer".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for f64 {
    fn expected() -> String {
        "float".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    fn expected() -> String {
        "boolean".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for Datetime {
    fn expected() -> String {
        "datetime".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_datetime().copied()
    }
}

impl FromValue for Document {
    fn expected() -> String {
        "table".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_table().cloned()
    }
}

impl FromValue for Value {
    fn expected() -> String {
        "value".to_string()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn expected() -> String {
        format!("array of {}", T::expected())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }
}

impl fmt::Display for Value {
    /// Formats the value in TOML surface syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::ser::write_value(&mut out, self);
        f.write_str(&out)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Datetime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Array(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for element in items {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Table(doc) => doc.serialize(serializer),
        }
    }
}

// From implementations for building values by hand
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Datetime> for Value {
    fn from(value: Datetime) -> Self {
        Value::Datetime(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Table(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from("a").kind(), ValueKind::String);
        assert_eq!(Value::from(1).kind(), ValueKind::Integer);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Float);
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(Vec::new()).kind(), ValueKind::Array);
        assert_eq!(Value::from(Document::new()).kind(), ValueKind::Table);
        assert!(ValueKind::Datetime.is_scalar());
        assert!(!ValueKind::Array.is_scalar());
    }

    #[test]
    fn test_kind_display_names() {
        let names: Vec<String> = [
            ValueKind::Integer,
            ValueKind::Float,
            ValueKind::String,
            ValueKind::Boolean,
            ValueKind::Datetime,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(names, vec!["Int", "Double", "String", "Bool", "Date"]);
    }

    #[test]
    fn test_from_value_nested_arrays() {
        let value = Value::Array(vec![
            Value::Array(vec![Value::from(1), Value::from(2)]),
            Value::Array(vec![Value::from(3)]),
        ]);
        let nested: Option<Vec<Vec<i64>>> = FromValue::from_value(&value);
        assert_eq!(nested, Some(vec![vec![1, 2], vec![3]]));

        let wrong: Option<Vec<String>> = FromValue::from_value(&value);
        assert_eq!(wrong, None);
        assert_eq!(<Vec<Vec<i64>>>::expected(), "array of array of integer");
    }

    #[test]
    fn test_array_of_tables() {
        let tables = Value::Array(vec![Value::from(Document::new())]);
        assert!(tables.is_array_of_tables());
        assert!(!Value::Array(Vec::new()).is_array_of_tables());
        assert!(!Value::Array(vec![Value::from(1)]).is_array_of_tables());
    }

    #[test]
    fn test_integer_widens_to_float() {
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(7.5).as_i64(), None);
    }
}
