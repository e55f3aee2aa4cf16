//! Error types for parsing and querying TOML documents.
//!
//! Every failure while tokenizing or building a document is fatal to that
//! parse; no partial [`Document`](crate::Document) is ever returned. Query
//! failures ([`Error::KeyError`], [`Error::TypeMismatch`]) only affect the
//! single call that produced them.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: unmatched text, malformed headers, text after a closed construct
//! - **Duplicate Keys**: a value or table path declared twice
//! - **Mixed Arrays**: array elements of more than one kind
//! - **Literal Errors**: bad dates, escape sequences and unicode code points
//! - **Query Errors**: absent paths and type mismatches in typed getters
//!
//! ## Examples
//!
//! ```rust
//! use strict_toml::{parse, Error};
//!
//! let err = parse("a = 1\na = 2").unwrap_err();
//! assert_eq!(err, Error::DuplicateKey("a".to_string()));
//! ```

use crate::value::ValueKind;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input or structure that cannot be placed by the tokenizer or builder
    #[error("Syntax error: {msg}\n{context}")]
    Syntax { msg: String, context: String },

    /// A value or table path declared a second time
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// An array whose elements are not all of the expected kind
    #[error("Mixed array type: expected all elements to be {0}")]
    MixedArrayType(ValueKind),

    /// A date/time literal that matched lexically but is not a real instant
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    /// An unrecognized backslash escape inside a quoted string
    #[error("Invalid escape sequence: {0}")]
    InvalidEscapeSequence(String),

    /// A `\u`/`\U` escape naming a surrogate or out-of-range code point
    #[error("Invalid unicode character: U+{0:X}")]
    InvalidUnicodeCharacter(u32),

    /// A query addressed a path absent from the document
    #[error("Key not found: {0}")]
    KeyError(String),

    /// A typed getter found a value of another kind
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// IO error while reading a document
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error without additional context.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Error;
    ///
    /// let err = Error::syntax("Table name must not be blank");
    /// assert!(err.to_string().contains("must not be blank"));
    /// ```
    pub fn syntax(msg: &str) -> Self {
        Error::Syntax {
            msg: msg.to_string(),
            context: String::new(),
        }
    }

    /// Creates a syntax error carrying the offending text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Error;
    ///
    /// let err = Error::syntax_with_context("unexpected input at line 2, column 7", "a = 1 b");
    /// assert!(err.to_string().contains("a = 1 b"));
    /// ```
    pub fn syntax_with_context(msg: &str, context: &str) -> Self {
        Error::Syntax {
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates a duplicate key error for the given dotted path.
    pub fn duplicate_key<P: fmt::Display>(path: P) -> Self {
        Error::DuplicateKey(path.to_string())
    }

    /// Creates a key error for the given dotted path.
    pub fn key_error<P: fmt::Display>(path: P) -> Self {
        Error::KeyError(path.to_string())
    }

    /// Creates a type mismatch error for a typed getter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strict_toml::Error;
    ///
    /// let err = Error::type_mismatch("owner.name", "integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch<P: fmt::Display>(path: P, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors that abort a parse, as opposed to query errors.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::DuplicateKey(_)
                | Error::MixedArrayType(_)
                | Error::InvalidDateFormat(_)
                | Error::InvalidEscapeSequence(_)
                | Error::InvalidUnicodeCharacter(_)
        )
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::MixedArrayType(ValueKind::Integer).to_string(),
            "Mixed array type: expected all elements to be Int"
        );
        assert_eq!(
            Error::InvalidUnicodeCharacter(0xD800).to_string(),
            "Invalid unicode character: U+D800"
        );
        assert_eq!(Error::key_error("a.b").to_string(), "Key not found: a.b");
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(Error::syntax("x").is_parse_error());
        assert!(Error::duplicate_key("a").is_parse_error());
        assert!(!Error::key_error("a").is_parse_error());
        assert!(!Error::type_mismatch("a", "string", "integer").is_parse_error());
    }
}
