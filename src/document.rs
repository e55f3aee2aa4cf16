//! The parsed document and its query API.
//!
//! A [`Document`] is a flat, insertion-ordered map from [`KeyPath`] to
//! [`Value`], plus the set of explicitly declared table paths. Tables
//! implied by a deeper header or key (`[a.b]` implies `a`) are never
//! declared, but [`Document::contains_table`] recognizes them.
//!
//! ## Examples
//!
//! ```rust
//! use strict_toml::{parse, KeyPath};
//!
//! let doc = parse(r#"
//! [servers.alpha]
//! ip = "10.0.0.1"
//!
//! [servers.beta]
//! ip = "10.0.0.2"
//! "#).unwrap();
//!
//! assert_eq!(doc.get_str(["servers", "alpha", "ip"]).unwrap(), "10.0.0.1");
//! assert!(doc.contains_table("servers"));
//!
//! let names: Vec<String> = doc.tables("servers").into_iter().map(|(name, _)| name).collect();
//! assert_eq!(names, vec!["alpha", "beta"]);
//! ```

use crate::key::KeyPath;
use crate::options::ParseOptions;
use crate::parser::Parser;
use crate::value::{Datetime, FromValue, Value};
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// A parsed TOML document.
///
/// Equality compares the stored values and the declared tables, regardless
/// of insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    values: IndexMap<KeyPath, Value>,
    tables: IndexSet<KeyPath>,
    /// Every strict prefix of a stored value or declared table path
    implied: IndexSet<KeyPath>,
}

/// A direct child of a document root: a stored value, or a table
/// materialized from the paths beneath it.
pub(crate) enum Child<'a> {
    Value(&'a Value),
    Table(Document),
}

impl Document {
    /// Creates an empty document.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Document;
    ///
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Document {
            values: IndexMap::new(),
            tables: IndexSet::new(),
            implied: IndexSet::new(),
        }
    }

    /// Parses `text` with custom options.
    ///
    /// # Errors
    ///
    /// See [`crate::parse`].
    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Self> {
        Parser::new(options).parse(text)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise see [`crate::parse`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::parse_file(path)
    }

    /// Reads all of `reader` and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails, otherwise see [`crate::parse`].
    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::io(&e.to_string()))?;
        text.parse()
    }

    /// Number of stored values (table declarations are not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the document holds no values and declares no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.tables.is_empty()
    }

    /// Stores a value, failing if the path is already taken.
    pub(crate) fn insert_value(&mut self, path: KeyPath, value: Value) -> Result<()> {
        if self.values.contains_key(&path)
            || self.tables.contains(&path)
            || self.has_descendants(&path)
        {
            return Err(Error::duplicate_key(&path));
        }
        self.check_ancestors(&path)?;
        self.store_value(path, value);
        Ok(())
    }

    /// Records an explicit `[table]` declaration.
    pub(crate) fn declare_table(&mut self, path: KeyPath) -> Result<()> {
        if self.tables.contains(&path) || self.values.contains_key(&path) {
            return Err(Error::duplicate_key(&path));
        }
        self.check_ancestors(&path)?;
        self.store_table(path);
        Ok(())
    }

    /// Appends one `[[table array]]` element, creating the array on first use.
    pub(crate) fn push_table_array_element(
        &mut self,
        path: KeyPath,
        element: Document,
    ) -> Result<()> {
        if self.tables.contains(&path) || self.has_descendants(&path) {
            return Err(Error::duplicate_key(&path));
        }
        self.check_ancestors(&path)?;

        match self.values.get_mut(&path) {
            Some(Value::Array(items))
                if !items.is_empty() && items.iter().all(Value::is_table) =>
            {
                items.push(Value::Table(element));
                Ok(())
            }
            Some(_) => Err(Error::duplicate_key(&path)),
            None => {
                self.store_value(path, Value::Array(vec![Value::Table(element)]));
                Ok(())
            }
        }
    }

    fn store_value(&mut self, path: KeyPath, value: Value) {
        self.implied.extend(path.ancestors());
        self.values.insert(path, value);
    }

    fn store_table(&mut self, path: KeyPath) {
        self.implied.extend(path.ancestors());
        self.tables.insert(path);
    }

    /// A value stored above `path` leaves no room for a table or key below it.
    fn check_ancestors(&self, path: &KeyPath) -> Result<()> {
        match path
            .ancestors()
            .find(|ancestor| self.values.contains_key(ancestor))
        {
            Some(_) => Err(Error::duplicate_key(path)),
            None => Ok(()),
        }
    }

    fn has_descendants(&self, path: &KeyPath) -> bool {
        !path.is_empty() && self.implied.contains(path)
    }

    /// Finds the value at `path`, descending into inline tables on the way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::{parse, KeyPath, Value};
    ///
    /// let doc = parse("point = { x = 1, y = 2 }").unwrap();
    /// let y = doc.lookup(&KeyPath::from(["point", "y"]));
    /// assert_eq!(y, Some(&Value::Integer(2)));
    /// ```
    #[must_use]
    pub fn lookup(&self, path: &KeyPath) -> Option<&Value> {
        if let Some(value) = self.values.get(path) {
            return Some(value);
        }
        for len in (1..path.len()).rev() {
            if let Some(Value::Table(inner)) = self.values.get(&path.truncated(len)) {
                let rest: KeyPath = path.segments()[len..].iter().cloned().collect();
                return inner.lookup(&rest);
            }
        }
        None
    }

    /// Returns the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if nothing is stored at `path`.
    pub fn get<P: Into<KeyPath>>(&self, path: P) -> Result<&Value> {
        let path = path.into();
        self.lookup(&path).ok_or_else(|| Error::key_error(&path))
    }

    /// Returns the value at `path` converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if the path is absent and
    /// [`Error::TypeMismatch`] if the value cannot be converted.
    pub fn get_as<T: FromValue, P: Into<KeyPath>>(&self, path: P) -> Result<T> {
        let path = path.into();
        let value = self.lookup(&path).ok_or_else(|| Error::key_error(&path))?;
        T::from_value(value)
            .ok_or_else(|| Error::type_mismatch(&path, &T::expected(), value.kind().describe()))
    }

    /// Returns the string at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::parse;
    ///
    /// let doc = parse("[owner]\nname = \"Tom\"").unwrap();
    /// assert_eq!(doc.get_str(["owner", "name"]).unwrap(), "Tom");
    /// assert!(doc.get_i64(["owner", "name"]).is_err());
    /// ```
    pub fn get_str<P: Into<KeyPath>>(&self, path: P) -> Result<&str> {
        let path = path.into();
        let value = self.lookup(&path).ok_or_else(|| Error::key_error(&path))?;
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch(&path, "string", value.kind().describe()))
    }

    /// Returns the integer at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not an integer.
    pub fn get_i64<P: Into<KeyPath>>(&self, path: P) -> Result<i64> {
        self.get_as(path)
    }

    /// Returns the float at `path`. Integers are widened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not a number.
    pub fn get_f64<P: Into<KeyPath>>(&self, path: P) -> Result<f64> {
        self.get_as(path)
    }

    /// Returns the float at `path` narrowed to `f32`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not a number.
    pub fn get_f32<P: Into<KeyPath>>(&self, path: P) -> Result<f32> {
        self.get_f64(path).map(|f| f as f32)
    }

    /// Returns the boolean at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not a boolean.
    pub fn get_bool<P: Into<KeyPath>>(&self, path: P) -> Result<bool> {
        self.get_as(path)
    }

    /// Returns the date/time at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not a date/time.
    pub fn get_datetime<P: Into<KeyPath>>(&self, path: P) -> Result<Datetime> {
        self.get_as(path)
    }

    /// Returns the array at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent, [`Error::TypeMismatch`] if not an array.
    pub fn get_array<P: Into<KeyPath>>(&self, path: P) -> Result<&[Value]> {
        let path = path.into();
        let value = self.lookup(&path).ok_or_else(|| Error::key_error(&path))?;
        value
            .as_array()
            .ok_or_else(|| Error::type_mismatch(&path, "array", value.kind().describe()))
    }

    /// Returns the array at `path` with every element converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if absent and [`Error::TypeMismatch`] if
    /// the value is not an array or an element cannot be converted.
    pub fn get_array_of<T: FromValue, P: Into<KeyPath>>(&self, path: P) -> Result<Vec<T>> {
        self.get_as(path)
    }

    /// Returns the table at `path`: an inline table value, or the subtree
    /// of a declared or implied table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyError`] if no table exists at `path` and
    /// [`Error::TypeMismatch`] if a non-table value is stored there.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::parse;
    ///
    /// let doc = parse("[database]\nport = 5432").unwrap();
    /// let database = doc.get_table("database").unwrap();
    /// assert_eq!(database.get_i64("port").unwrap(), 5432);
    /// ```
    pub fn get_table<P: Into<KeyPath>>(&self, path: P) -> Result<Document> {
        let path = path.into();
        match self.lookup(&path) {
            Some(Value::Table(doc)) => Ok(doc.clone()),
            Some(other) => Err(Error::type_mismatch(
                &path,
                "table",
                other.kind().describe(),
            )),
            None if self.contains_table(&path) => Ok(self.subtree(&path)),
            None => Err(Error::key_error(&path)),
        }
    }

    /// Returns `true` if a value is stored at `path`.
    #[must_use]
    pub fn contains_key<P: Into<KeyPath>>(&self, path: P) -> bool {
        self.lookup(&path.into()).is_some()
    }

    /// Returns `true` if `path` is a declared table or is implied by a
    /// deeper table header or key.
    ///
    /// Inline table values are not counted; see [`Document::contains_any_table`].
    #[must_use]
    pub fn contains_table<P: Into<KeyPath>>(&self, path: P) -> bool {
        let path = path.into();
        path.is_empty() || self.tables.contains(&path) || self.has_descendants(&path)
    }

    /// Returns `true` if `path` is a table of any kind, inline tables included.
    #[must_use]
    pub fn contains_any_table<P: Into<KeyPath>>(&self, path: P) -> bool {
        let path = path.into();
        self.contains_table(&path) || matches!(self.lookup(&path), Some(Value::Table(_)))
    }

    /// Returns `true` if `path` was declared with a `[table]` header.
    #[must_use]
    pub fn is_declared_table(&self, path: &KeyPath) -> bool {
        self.tables.contains(path)
    }

    /// Lists the tables directly beneath `parent`, each as its own document.
    ///
    /// A table appears if it, or any table below it, was declared; names are
    /// listed in order of first declaration.
    #[must_use]
    pub fn tables<P: Into<KeyPath>>(&self, parent: P) -> Vec<(String, Document)> {
        let parent = parent.into();
        let names: IndexSet<&String> = self
            .tables
            .iter()
            .filter(|table| table.is_strictly_under(&parent))
            .map(|table| &table.segments()[parent.len()])
            .collect();

        names
            .into_iter()
            .map(|name| (name.clone(), self.subtree(&parent.join(name.as_str()))))
            .collect()
    }

    /// Returns everything stored beneath `path`, re-rooted at `path`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::parse;
    ///
    /// let doc = parse("[a.b]\nc = 1").unwrap();
    /// let a = doc.subtree("a");
    /// assert_eq!(a.get_i64(["b", "c"]).unwrap(), 1);
    /// ```
    #[must_use]
    pub fn subtree<P: Into<KeyPath>>(&self, path: P) -> Document {
        let path = path.into();
        let mut doc = Document::new();
        for (key, value) in &self.values {
            if let Some(rest) = key.strip_prefix(&path).filter(|rest| !rest.is_empty()) {
                doc.store_value(rest, value.clone());
            }
        }
        for table in &self.tables {
            if let Some(rest) = table.strip_prefix(&path).filter(|rest| !rest.is_empty()) {
                doc.store_table(rest);
            }
        }
        doc
    }

    /// Names of the values stored directly at the root.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .filter(|path| path.len() == 1)
            .filter_map(|path| path.first())
    }

    /// Paths of every stored value, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &KeyPath> {
        self.values.keys()
    }

    /// Paths of every declared table, in declaration order.
    pub fn table_paths(&self) -> impl Iterator<Item = &KeyPath> {
        self.tables.iter()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, KeyPath, Value> {
        self.values.iter()
    }

    /// The direct children of the root, in order of first appearance.
    pub(crate) fn children(&self) -> Vec<(String, Child<'_>)> {
        let names: IndexSet<&str> = self
            .values
            .keys()
            .chain(self.tables.iter())
            .filter_map(KeyPath::first)
            .collect();

        names
            .into_iter()
            .map(|name| {
                let child = match self.values.get(&KeyPath::from(name)) {
                    Some(value) => Child::Value(value),
                    None => Child::Table(self.subtree(name)),
                };
                (name.to_string(), child)
            })
            .collect()
    }

    /// Converts the root into named values, materializing tables.
    pub(crate) fn into_entries(self) -> Vec<(String, Value)> {
        self.children()
            .into_iter()
            .map(|(name, child)| match child {
                Child::Value(value) => (name, value.clone()),
                Child::Table(doc) => (name, Value::Table(doc)),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a KeyPath, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, KeyPath, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parse(s)
    }
}

impl fmt::Display for Document {
    /// Writes the document as TOML text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::to_string(self))
    }
}

impl Serialize for Document {
    /// Serializes as a nested map: tables become maps, dates become strings.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let children = self.children();
        let mut map = serializer.serialize_map(Some(children.len()))?;
        for (name, child) in &children {
            match child {
                Child::Value(value) => map.serialize_entry(name, value)?,
                Child::Table(doc) => map.serialize_entry(name, doc)?,
            }
        }
        map.end()
    }
}
