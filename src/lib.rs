//! # strict_toml
//!
//! A strict reader for TOML configuration files. Text is tokenized by a
//! stack-of-grammars lexer, assembled into a queryable [`Document`], and
//! can be written back out or deserialized into Rust types with serde.
//!
//! ## Key Features
//!
//! - **Strict**: duplicate keys and tables, mixed-kind arrays, bad escapes,
//!   impossible dates and trailing text are all rejected with a typed [`Error`]
//! - **Queryable**: typed getters by key path, table enumeration and subtrees
//! - **Round-trip**: [`to_string`] output parses back to an equal document
//! - **Serde Compatible**: [`from_str`] into any `#[derive(Deserialize)]` type
//!
//! ## Quick Start
//!
//! ```rust
//! use strict_toml::parse;
//!
//! let doc = parse(r#"
//! title = "TOML Example"
//!
//! [owner]
//! name = "Tom Preston-Werner"
//! dob = 1979-05-27T07:32:00Z
//!
//! [database]
//! ports = [ 8001, 8001, 8002 ]
//! enabled = true
//! "#).unwrap();
//!
//! assert_eq!(doc.get_str("title").unwrap(), "TOML Example");
//! assert_eq!(doc.get_str(["owner", "name"]).unwrap(), "Tom Preston-Werner");
//! assert_eq!(doc.get_array_of::<i64, _>(["database", "ports"]).unwrap(), vec![8001, 8001, 8002]);
//! assert!(doc.get_bool(["database", "enabled"]).unwrap());
//! ```
//!
//! ### Deserializing Into Types
//!
//! ```rust
//! use serde::Deserialize;
//! use strict_toml::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     ip: String,
//!     dc: String,
//! }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config {
//!     servers: std::collections::BTreeMap<String, Server>,
//! }
//!
//! let config: Config = from_str(r#"
//! [servers.alpha]
//! ip = "10.0.0.1"
//! dc = "eqdc10"
//! "#).unwrap();
//! assert_eq!(config.servers["alpha"].dc, "eqdc10");
//! ```
//!
//! ### Errors
//!
//! ```rust
//! use strict_toml::{parse, Error, ValueKind};
//!
//! assert_eq!(
//!     parse("data = [1, 2.0]").unwrap_err(),
//!     Error::MixedArrayType(ValueKind::Integer)
//! );
//! assert!(matches!(parse("[a]\n[a]"), Err(Error::DuplicateKey(_))));
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Nesting depth is bounded by [`ParseOptions::max_depth`]
//! - No panics in the public API
//!
//! ## Logging
//!
//! Tokenizing and building emit [`tracing`] events: `trace` for every token
//! and context change, `debug` for table declarations and whole-document
//! parses. Nothing is printed unless the application installs a subscriber.

pub mod date;
pub mod de;
pub mod document;
pub mod error;
pub mod escape;
pub mod key;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod ser;
pub mod token;
pub mod value;

pub use de::{from_document, Deserializer};
pub use document::Document;
pub use error::{Error, Result};
pub use key::KeyPath;
pub use lexer::{tokenize, Lexer};
pub use options::ParseOptions;
pub use parser::Parser;
pub use ser::{to_string, to_writer, Serializer};
pub use token::{Token, TokenKind};
pub use value::{Datetime, FromValue, Value, ValueKind};

use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;

/// Parses TOML text into a [`Document`] with default options.
///
/// # Examples
///
/// ```rust
/// use strict_toml::parse;
///
/// let doc = parse("answer = 42").unwrap();
/// assert_eq!(doc.get_i64("answer").unwrap(), 42);
/// ```
///
/// # Errors
///
/// Returns a parse error ([`Error::is_parse_error`]) describing the first
/// problem found; no partial document is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(input: &str) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parses TOML text into a [`Document`] with custom options.
///
/// # Examples
///
/// ```rust
/// use chrono::FixedOffset;
/// use strict_toml::{parse_with_options, ParseOptions};
///
/// let options = ParseOptions::new().with_local_offset(FixedOffset::east_opt(3600).unwrap());
/// let doc = parse_with_options("d = 1979-05-27", &options).unwrap();
/// assert_eq!(doc.get_datetime("d").unwrap().to_rfc3339(), "1979-05-27T00:00:00+01:00");
/// ```
///
/// # Errors
///
/// See [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Document> {
    Parser::new(options).parse(input)
}

/// Reads and parses a TOML file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise see [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| Error::io(&format!("{}: {}", path.as_ref().display(), e)))?;
    parse(&text)
}

/// Deserializes an instance of type `T` from TOML text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use strict_toml::from_str;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns a parse error if the text is not valid, or [`Error::Custom`] if
/// the document cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_document(parse(s)?)
}

/// Deserializes an instance of type `T` from an I/O stream of TOML.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use std::io::Cursor;
/// use strict_toml::from_reader;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise see [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserializes an instance of type `T` from bytes of TOML text.
///
/// # Errors
///
/// Returns [`Error::Custom`] if the bytes are not valid UTF-8, otherwise
/// see [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
