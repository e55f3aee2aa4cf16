//! Tokens produced by the [`Lexer`](crate::lexer::Lexer).
//!
//! Tokens carry no position; their meaning comes from emission order alone.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// A single lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A string value or a table header path segment
    Identifier(String),
    /// The key of a `key = value` pair
    Key(String),
    IntegerNumber(i64),
    DoubleNumber(f64),
    Boolean(bool),
    DateTime(DateTime<FixedOffset>),
    ArrayBegin,
    ArrayEnd,
    TableArrayBegin,
    TableArrayEnd,
    InlineTableBegin,
    InlineTableEnd,
    TableBegin,
    /// The `.` between segments of a table header
    TableSep,
    TableEnd,
    /// Comment text, only emitted when comments are kept
    Comment(String),
}

/// The payload-free kind of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Key,
    IntegerNumber,
    DoubleNumber,
    Boolean,
    DateTime,
    ArrayBegin,
    ArrayEnd,
    TableArrayBegin,
    TableArrayEnd,
    InlineTableBegin,
    InlineTableEnd,
    TableBegin,
    TableSep,
    TableEnd,
    Comment,
}

impl Token {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Key(_) => TokenKind::Key,
            Token::IntegerNumber(_) => TokenKind::IntegerNumber,
            Token::DoubleNumber(_) => TokenKind::DoubleNumber,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::DateTime(_) => TokenKind::DateTime,
            Token::ArrayBegin => TokenKind::ArrayBegin,
            Token::ArrayEnd => TokenKind::ArrayEnd,
            Token::TableArrayBegin => TokenKind::TableArrayBegin,
            Token::TableArrayEnd => TokenKind::TableArrayEnd,
            Token::InlineTableBegin => TokenKind::InlineTableBegin,
            Token::InlineTableEnd => TokenKind::InlineTableEnd,
            Token::TableBegin => TokenKind::TableBegin,
            Token::TableSep => TokenKind::TableSep,
            Token::TableEnd => TokenKind::TableEnd,
            Token::Comment(_) => TokenKind::Comment,
        }
    }

    /// Returns `true` for tokens that are a complete value on their own.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_)
                | Token::IntegerNumber(_)
                | Token::DoubleNumber(_)
                | Token::Boolean(_)
                | Token::DateTime(_)
        )
    }

    /// Returns `true` for tokens opening a `[table]` or `[[table array]]` header.
    #[inline]
    #[must_use]
    pub const fn is_header(&self) -> bool {
        matches!(self, Token::TableBegin | Token::TableArrayBegin)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Key => "key",
            TokenKind::IntegerNumber => "integer",
            TokenKind::DoubleNumber => "float",
            TokenKind::Boolean => "boolean",
            TokenKind::DateTime => "datetime",
            TokenKind::ArrayBegin => "'['",
            TokenKind::ArrayEnd => "']'",
            TokenKind::TableArrayBegin => "'[['",
            TokenKind::TableArrayEnd => "']]'",
            TokenKind::InlineTableBegin => "'{'",
            TokenKind::InlineTableEnd => "'}'",
            TokenKind::TableBegin => "table header",
            TokenKind::TableSep => "'.'",
            TokenKind::TableEnd => "end of table header",
            TokenKind::Comment => "comment",
        };
        f.write_str(name)
    }
}
