//! Builds a [`Document`] from a token stream.
//!
//! The builder walks the tokens once, tracking the current table prefix and
//! the most recent key. Scalars are stored at `prefix + key`, `[table]`
//! headers move the prefix, and every `[[table array]]` element is built as
//! its own document from the tokens that belong to it.
//!
//! ```rust
//! use strict_toml::{tokenize, ParseOptions, Parser};
//!
//! let tokens = tokenize("[owner]\nname = \"Tom\"").unwrap();
//! let options = ParseOptions::default();
//! let doc = Parser::new(&options).parse_tokens(&tokens).unwrap();
//! assert_eq!(doc.get_str(["owner", "name"]).unwrap(), "Tom");
//! ```

use crate::document::Document;
use crate::key::KeyPath;
use crate::lexer::Lexer;
use crate::options::ParseOptions;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use crate::{Error, Result};
use tracing::debug;

/// The document builder.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'o> {
    options: &'o ParseOptions,
}

/// Where the next key/value pair lands.
struct Scope {
    prefix: KeyPath,
    key: String,
}

impl Scope {
    fn at(prefix: KeyPath) -> Self {
        Scope {
            prefix,
            key: String::new(),
        }
    }

    fn path(&self) -> KeyPath {
        self.prefix.join(self.key.as_str())
    }
}

impl<'o> Parser<'o> {
    #[must_use]
    pub fn new(options: &'o ParseOptions) -> Self {
        Parser { options }
    }

    /// Tokenizes and builds `input`, ignoring a leading byte order mark.
    ///
    /// # Errors
    ///
    /// Any tokenizer error, plus the builder errors listed on
    /// [`Parser::parse_tokens`].
    pub fn parse(&self, input: &str) -> Result<Document> {
        debug!(bytes = input.len(), "parsing document");
        // A leading byte order mark is not part of the document
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let tokens = Lexer::with_options(input, self.options).tokenize()?;
        let doc = self.parse_tokens(&tokens)?;
        debug!(
            tokens = tokens.len(),
            values = doc.len(),
            "parsed document"
        );
        Ok(doc)
    }

    /// Builds a document from already produced tokens.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`] when a value or table path is declared twice
    /// - [`Error::MixedArrayType`] for arrays with elements of different kinds
    /// - [`Error::Syntax`] for malformed headers, unbalanced brackets and
    ///   structural tokens out of place
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<Document> {
        let mut doc = Document::new();
        self.build(tokens, &mut doc, 0)?;
        Ok(doc)
    }

    fn build(&self, tokens: &[Token], doc: &mut Document, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        let mut scope = Scope::at(KeyPath::root());
        let mut pos = 0;

        while pos < tokens.len() {
            let token = &tokens[pos];
            pos += 1;

            match token {
                Token::Comment(_) => {}
                Token::Key(key) => scope.key = key.clone(),
                Token::TableBegin => {
                    let (path, used) = read_header(&tokens[pos..], TokenKind::TableEnd)?;
                    pos += used;
                    debug!(table = %path, "declaring table");
                    doc.declare_table(path.clone())?;
                    scope = Scope::at(path);
                }
                Token::TableArrayBegin => {
                    let (path, used) = read_header(&tokens[pos..], TokenKind::TableArrayEnd)?;
                    pos += used;
                    let (body, used) = slice_table_array_body(&tokens[pos..], &path)?;
                    pos += used;

                    let mut element = Document::new();
                    self.build(&body, &mut element, depth + 1)?;
                    debug!(table_array = %path, "appending table array element");
                    doc.push_table_array_element(path.clone(), element)?;
                    scope = Scope::at(path);
                }
                Token::InlineTableBegin => {
                    let len = inline_table_len(&tokens[pos..])?;
                    let table = self.inline_table(&tokens[pos..pos + len], depth + 1)?;
                    pos += len + 1;
                    doc.insert_value(scope.path(), Value::Table(table))?;
                }
                Token::ArrayBegin => {
                    let (items, used) = self.array(&tokens[pos..], depth + 1)?;
                    pos += used;
                    doc.insert_value(scope.path(), Value::Array(items))?;
                }
                scalar if scalar.is_scalar() => {
                    doc.insert_value(scope.path(), scalar_value(scalar)?)?;
                }
                other => return Err(unexpected(other)),
            }
        }
        Ok(())
    }

    fn inline_table(&self, tokens: &[Token], depth: usize) -> Result<Document> {
        let mut table = Document::new();
        self.build(tokens, &mut table, depth)?;
        Ok(table)
    }

    /// Collects array elements up to the matching `]`, returning them with
    /// the number of tokens consumed (the `]` included).
    fn array(&self, tokens: &[Token], depth: usize) -> Result<(Vec<Value>, usize)> {
        self.check_depth(depth)?;
        let mut items = Vec::new();
        let mut pos = 0;

        while pos < tokens.len() {
            let token = &tokens[pos];
            pos += 1;

            match token {
                Token::ArrayEnd => {
                    check_homogeneous(&items)?;
                    return Ok((items, pos));
                }
                Token::Comment(_) => {}
                Token::ArrayBegin => {
                    let (inner, used) = self.array(&tokens[pos..], depth + 1)?;
                    pos += used;
                    items.push(Value::Array(inner));
                }
                Token::InlineTableBegin => {
                    let len = inline_table_len(&tokens[pos..])?;
                    let table = self.inline_table(&tokens[pos..pos + len], depth + 1)?;
                    pos += len + 1;
                    items.push(Value::Table(table));
                }
                scalar if scalar.is_scalar() => items.push(scalar_value(scalar)?),
                other => return Err(unexpected(other)),
            }
        }
        Err(Error::syntax("Array must be closed with ']'"))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::syntax_with_context(
                "maximum nesting depth exceeded",
                &format!("limit {}", self.options.max_depth),
            ));
        }
        Ok(())
    }
}

/// Reads a header path up to its closing token, returning the path and the
/// number of tokens consumed (the closing token included).
fn read_header(tokens: &[Token], close: TokenKind) -> Result<(KeyPath, usize)> {
    let mut path = KeyPath::root();
    let mut expect_segment = true;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Identifier(segment) if expect_segment => {
                path.push(segment.as_str());
                expect_segment = false;
            }
            Token::Identifier(segment) => {
                return Err(Error::syntax_with_context(
                    "Table name segments must be separated by '.'",
                    segment,
                ))
            }
            Token::TableSep if expect_segment => {
                return Err(Error::syntax_with_context(
                    "Must not have un-named implicit tables",
                    &path.to_string(),
                ))
            }
            Token::TableSep => expect_segment = true,
            closing if closing.kind() == close => {
                if path.is_empty() {
                    return Err(Error::syntax("Table name must not be blank"));
                }
                if expect_segment {
                    return Err(Error::syntax_with_context(
                        "Must not have un-named implicit tables",
                        &path.to_string(),
                    ));
                }
                return Ok((path, i + 1));
            }
            other => return Err(unexpected(other)),
        }
    }
    Err(Error::syntax("Table header must be closed"))
}

/// Returns the tokens belonging to one `[[table array]]` element and the
/// number of tokens consumed.
///
/// The element extends over its key/value pairs and over every following
/// header strictly below `array`; those headers are rewritten relative to
/// the element. Any other header ends the element.
pub(crate) fn slice_table_array_body(
    tokens: &[Token],
    array: &KeyPath,
) -> Result<(Vec<Token>, usize)> {
    let mut body = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let token = &tokens[pos];
        if token.is_header() {
            let close = match token {
                Token::TableBegin => Token::TableEnd,
                _ => Token::TableArrayEnd,
            };
            let (path, used) = read_header(&tokens[pos + 1..], close.kind())?;
            match path.strip_prefix(array).filter(|rest| !rest.is_empty()) {
                Some(relative) => {
                    body.push(token.clone());
                    for (i, segment) in relative.iter().enumerate() {
                        if i > 0 {
                            body.push(Token::TableSep);
                        }
                        body.push(Token::Identifier(segment.clone()));
                    }
                    body.push(close);
                    pos += 1 + used;
                    continue;
                }
                None => break,
            }
        }
        body.push(token.clone());
        pos += 1;
    }
    Ok((body, pos))
}

/// Returns the index of the `}` closing an inline table whose `{` was
/// already consumed.
fn inline_table_len(tokens: &[Token]) -> Result<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::InlineTableBegin => depth += 1,
            Token::InlineTableEnd if depth == 0 => return Ok(i),
            Token::InlineTableEnd => depth -= 1,
            _ => {}
        }
    }
    Err(Error::syntax("Inline table must be closed with '}'"))
}

/// Arrays hold elements of one kind only. Nested arrays may differ from
/// each other in what they contain.
pub(crate) fn check_homogeneous(items: &[Value]) -> Result<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let expected = first.kind();
    if items.iter().all(|item| item.kind() == expected) {
        Ok(())
    } else {
        Err(Error::MixedArrayType(expected))
    }
}

fn scalar_value(token: &Token) -> Result<Value> {
    match token {
        Token::Identifier(s) => Ok(Value::String(s.clone())),
        Token::IntegerNumber(i) => Ok(Value::Integer(*i)),
        Token::DoubleNumber(f) => Ok(Value::Float(*f)),
        Token::Boolean(b) => Ok(Value::Boolean(*b)),
        Token::DateTime(dt) => Ok(Value::Datetime(*dt)),
        other => Err(unexpected(other)),
    }
}

fn unexpected(token: &Token) -> Error {
    Error::syntax_with_context("unexpected token", &token.kind().to_string())
}
