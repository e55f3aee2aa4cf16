//! Deserialization of documents into Rust types.
//!
//! This module provides the [`Deserializer`] that feeds a parsed
//! [`Document`] to any type implementing `Deserialize`.
//!
//! ## Overview
//!
//! - Tables (declared, implied, inline and array elements) are maps
//! - Arrays are sequences
//! - Date/times are RFC 3339 strings
//! - Enums are either a unit variant name as a string, or a table with a
//!   single key naming the variant
//!
//! ## Usage
//!
//! The crate-level [`from_str`](crate::from_str) parses and deserializes in one step:
//!
//! ```rust
//! use serde::Deserialize;
//! use strict_toml::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Database {
//!     server: String,
//!     ports: Vec<u16>,
//!     enabled: bool,
//! }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config {
//!     database: Database,
//! }
//!
//! let config: Config = from_str(r#"
//! [database]
//! server = "192.168.1.1"
//! ports = [8001, 8001, 8002]
//! enabled = true
//! "#).unwrap();
//! assert_eq!(config.database.ports, vec![8001, 8001, 8002]);
//! ```

use crate::document::Document;
use crate::value::Value;
use crate::{Error, Result};
use chrono::SecondsFormat;
use serde::{de, forward_to_deserialize_any};

/// Deserializes Rust values from a parsed document.
///
/// Created via [`Deserializer::new`].
pub struct Deserializer {
    document: Document,
}

impl Deserializer {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Deserializer { document }
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(MapDeserializer::new(self.document))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(String, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(document: Document) -> Self {
        MapDeserializer {
            iter: document.into_entries().into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("table value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = ValueDeserializer::new(Value::String(self.variant));
        Ok((seed.deserialize(name)?, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(_) => Err(Error::custom("unit variant must be written as a plain string")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("newtype variant needs a value")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("tuple variant needs an array value")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Table(doc)) => visitor.visit_map(MapDeserializer::new(doc)),
            _ => Err(Error::custom("struct variant needs a table value")),
        }
    }
}

struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Boolean(b) => visitor.visit_bool(b),
            Value::Datetime(dt) => {
                visitor.visit_string(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Table(doc) => visitor.visit_map(MapDeserializer::new(doc)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Table(doc) => {
                let mut entries = doc.into_entries();
                match (entries.pop(), entries.is_empty()) {
                    (Some((variant, value)), true) => visitor.visit_enum(EnumDeserializer {
                        variant,
                        value: Some(value),
                    }),
                    _ => Err(Error::custom(
                        "Expected a table with a single key naming the variant",
                    )),
                }
            }
            other => Err(Error::custom(format!(
                "Expected enum variant, found {}",
                other.kind().describe()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Deserializes an instance of `T` from a parsed document.
///
/// # Errors
///
/// Returns [`Error::Custom`] when the document does not match the shape of `T`.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use strict_toml::{from_document, parse};
///
/// let doc = parse("a = 1\nb = 2").unwrap();
/// let map: BTreeMap<String, i64> = from_document(doc).unwrap();
/// assert_eq!(map["b"], 2);
/// ```
pub fn from_document<T>(document: Document) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(Deserializer::new(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Mode {
        Fast,
        Limited { rate: u32 },
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Settings {
        name: String,
        retries: Option<u8>,
        timeout: Option<f64>,
        mode: Mode,
        other: Mode,
    }

    #[test]
    fn test_struct_with_options_and_enums() {
        let doc = parse(
            "name = \"svc\"\nretries = 3\nmode = \"Fast\"\n[other.Limited]\nrate = 10",
        )
        .unwrap();
        let settings: Settings = from_document(doc).unwrap();
        assert_eq!(
            settings,
            Settings {
                name: "svc".to_string(),
                retries: Some(3),
                timeout: None,
                mode: Mode::Fast,
                other: Mode::Limited { rate: 10 },
            }
        );
    }

    #[test]
    fn test_integers_widen_into_floats() {
        #[derive(Deserialize)]
        struct Ratio {
            value: f64,
        }
        let ratio: Ratio = from_document(parse("value = 2").unwrap()).unwrap();
        assert_eq!(ratio.value, 2.0);
    }

    #[test]
    fn test_dates_as_strings() {
        let map: BTreeMap<String, String> =
            from_document(parse("when = 1979-05-27T07:32:00Z").unwrap()).unwrap();
        assert_eq!(map["when"], "1979-05-27T07:32:00Z");
    }

    #[test]
    fn test_type_errors() {
        #[derive(Deserialize, Debug)]
        struct Port {
            #[allow(dead_code)]
            port: u16,
        }
        let result: Result<Port> = from_document(parse("port = \"x\"").unwrap());
        assert!(matches!(result, Err(Error::Custom(_))));

        let result: Result<Port> = from_document(parse("port = 70000").unwrap());
        assert!(result.is_err());
    }
}
