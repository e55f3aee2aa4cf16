//! TOML text output.
//!
//! This module provides the [`Serializer`] that writes a [`Document`] back
//! out as TOML text which parses to an equal document.
//!
//! ## Overview
//!
//! - Root values come first, then one `[table]` section per table that is
//!   declared or holds values of its own
//! - Arrays of tables are written as `[[table array]]` blocks, one per element
//! - Arrays and inline tables nested inside values are written inline
//! - Strings are always basic strings with control characters escaped
//! - Floats always carry a `.` or an exponent, so they read back as floats
//! - Date/times are written in RFC 3339 form with their offset
//!
//! ## Usage
//!
//! ```rust
//! use strict_toml::{parse, to_string};
//!
//! let doc = parse("[server]\nport = 8080\nhosts = [\"a\", \"b\"]").unwrap();
//! let text = to_string(&doc);
//! assert_eq!(text, "[server]\nport = 8080\nhosts = [\"a\", \"b\"]\n");
//! assert_eq!(parse(&text).unwrap(), doc);
//! ```

use crate::document::{Child, Document};
use crate::key::{write_key, KeyPath};
use crate::value::Value;
use crate::{Error, Result};
use chrono::SecondsFormat;
use indexmap::IndexSet;
use std::io;

/// Writes documents as TOML text.
///
/// # Examples
///
/// ```rust
/// use strict_toml::{parse, Serializer};
///
/// let doc = parse("a = 1").unwrap();
/// let mut serializer = Serializer::new();
/// serializer.write_document(&doc);
/// assert_eq!(serializer.into_inner(), "a = 1\n");
/// ```
#[derive(Debug, Default)]
pub struct Serializer {
    output: String,
}

impl Serializer {
    #[must_use]
    pub fn new() -> Self {
        Serializer {
            output: String::new(),
        }
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends `doc` to the output.
    pub fn write_document(&mut self, doc: &Document) {
        self.write_sections(doc, &KeyPath::root());
    }

    /// Writes every section of `doc`, with headers prefixed by `base`.
    fn write_sections(&mut self, doc: &Document, base: &KeyPath) {
        let mut sections: IndexSet<KeyPath> = IndexSet::new();
        sections.insert(KeyPath::root());
        sections.extend(doc.paths().filter_map(KeyPath::parent));
        sections.extend(doc.table_paths().cloned());

        for section in &sections {
            let (tables, plain): (Vec<_>, Vec<_>) = doc
                .iter()
                .filter(|(path, _)| path.parent().as_ref() == Some(section))
                .partition(|(_, value)| value.is_array_of_tables());

            if !section.is_empty() && (doc.is_declared_table(section) || !plain.is_empty()) {
                self.write_separator();
                self.output.push('[');
                self.write_path(&concat(base, section));
                self.output.push_str("]\n");
            }

            for (path, value) in plain {
                self.write_key_value(path.last().unwrap_or_default(), value);
            }

            for (path, value) in tables {
                let absolute = concat(base, path);
                for element in value.as_array().unwrap_or_default() {
                    self.write_separator();
                    self.output.push_str("[[");
                    self.write_path(&absolute);
                    self.output.push_str("]]\n");
                    if let Value::Table(element) = element {
                        self.write_sections(element, &absolute);
                    }
                }
            }
        }
    }

    fn write_key_value(&mut self, key: &str, value: &Value) {
        write_key(&mut self.output, key);
        self.output.push_str(" = ");
        write_value(&mut self.output, value);
        self.output.push('\n');
    }

    fn write_path(&mut self, path: &KeyPath) {
        self.output.push_str(&path.to_string());
    }

    /// Leaves a blank line before a header, except at the very start.
    fn write_separator(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }
}

fn concat(base: &KeyPath, path: &KeyPath) -> KeyPath {
    base.iter().chain(path.iter()).cloned().collect()
}

/// Writes a value in inline form.
pub(crate) fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => write_basic_string(out, s),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => write_float(out, *f),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Datetime(dt) => out.push_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Table(doc) => write_inline_table(out, doc),
    }
}

fn write_inline_table(out: &mut String, doc: &Document) {
    let children = doc.children();
    if children.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{ ");
    for (i, (name, child)) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_key(out, name);
        out.push_str(" = ");
        match child {
            Child::Value(value) => write_value(out, value),
            Child::Table(table) => write_inline_table(out, table),
        }
    }
    out.push_str(" }");
}

fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "inf" } else { "-inf" });
    } else {
        // Debug formatting always keeps a `.` or an exponent
        out.push_str(&format!("{:?}", f));
    }
}

/// Writes `s` as a double-quoted string, escaping quotes, backslashes and
/// control characters.
pub(crate) fn write_basic_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Writes `doc` as TOML text.
///
/// # Examples
///
/// ```rust
/// use strict_toml::{parse, to_string};
///
/// let doc = parse("[[fruit]]\nname = \"apple\"\n[[fruit]]\nname = \"banana\"").unwrap();
/// assert_eq!(
///     to_string(&doc),
///     "[[fruit]]\nname = \"apple\"\n\n[[fruit]]\nname = \"banana\"\n"
/// );
/// ```
#[must_use]
pub fn to_string(doc: &Document) -> String {
    let mut serializer = Serializer::new();
    serializer.write_document(doc);
    serializer.into_inner()
}

/// Writes `doc` as TOML text into `writer`.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn to_writer<W: io::Write>(mut writer: W, doc: &Document) -> Result<()> {
    writer
        .write_all(to_string(doc).as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}
