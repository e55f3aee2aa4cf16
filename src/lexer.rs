//! Stack-of-grammars tokenizer.
//!
//! The lexer keeps a stack of [`Context`]s. Each context owns an ordered
//! list of [`Rule`]s; at every position the first rule of the top context
//! whose pattern matches a non-empty prefix of the remaining input wins.
//! A winning rule may emit a [`Token`], then optionally pops the current
//! context and pushes further contexts (pushed in order, so the last one
//! becomes the new top).
//!
//! ```rust
//! use strict_toml::{tokenize, Token};
//!
//! let tokens = tokenize("answer = 42").unwrap();
//! assert_eq!(
//!     tokens,
//!     vec![Token::Key("answer".to_string()), Token::IntegerNumber(42)]
//! );
//! ```
//!
//! Input ending while a value, string, array, inline table or header is
//! still open is a syntax error; ending after a complete line is not.

use crate::date::{self, DateShape};
use crate::escape;
use crate::options::ParseOptions;
use crate::token::Token;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::trace;

const BLANKS: &str = r"[ \t]+";
const WHITESPACE: &str = r"[ \t\r\n]+";
const NEWLINE: &str = r"\r?\n";
const BARE_KEY: &str = r"[A-Za-z0-9_-]+";
const BASIC_CHARS: &str = r#"(?:[^"\\\x00-\x08\x0A-\x1F\x7F]|\\.)+"#;
const LITERAL_CHARS: &str = r"[^'\x00-\x08\x0A-\x1F\x7F]+";
const MULTILINE_BASIC_BODY: &str = r#"(?:[^"\\]|"{1,2}[^"\\]|"{0,2}\\(?s:.))+"#;
const MULTILINE_LITERAL_BODY: &str = r"(?:[^']|'{1,2}[^'])+";
const INTEGER: &str = r"[-+]?(?:0|[1-9](?:_?[0-9])*)";
const FRACTION: &str = r"\.[0-9](?:_?[0-9])*";
const EXPONENT: &str = r"[eE][-+]?[0-9](?:_?[0-9])*";

/// A tokenizer state. Each context accepts a different set of rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    /// Top level: keys, table headers, comments and blank lines
    Root,
    /// After a complete key/value pair or header: blanks, a comment or a newline
    LineEnd,
    /// The body of a `#` comment
    Comment,
    /// A value is expected after `key =`
    Value,
    /// Inside `[...]`, expecting an element or `]`
    Array,
    /// Inside `[...]` after an element, expecting `,` or `]`
    ArrayNext,
    /// Inside `{...}`
    InlineTable,
    /// Inside `"..."`
    String,
    /// Inside `'...'`
    LiteralString,
    /// Inside `"""..."""`
    MultilineString,
    /// Inside `'''...'''`
    MultilineLiteralString,
    /// Inside a `[table]` header
    TableName,
    /// Inside a `[[table array]]` header
    TableArray,
}

impl Context {
    /// Every context, in table order.
    pub const ALL: [Context; 13] = [
        Context::Root,
        Context::LineEnd,
        Context::Comment,
        Context::Value,
        Context::Array,
        Context::ArrayNext,
        Context::InlineTable,
        Context::String,
        Context::LiteralString,
        Context::MultilineString,
        Context::MultilineLiteralString,
        Context::TableName,
        Context::TableArray,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Context::Root => "root",
            Context::LineEnd => "lineEnd",
            Context::Comment => "comment",
            Context::Value => "value",
            Context::Array => "array",
            Context::ArrayNext => "arrayNext",
            Context::InlineTable => "inlineTable",
            Context::String => "string",
            Context::LiteralString => "literalString",
            Context::MultilineString => "multilineString",
            Context::MultilineLiteralString => "multilineLiteralString",
            Context::TableName => "tableName",
            Context::TableArray => "tableArray",
        }
    }

    /// Returns `true` if the input may end while this context is on the stack.
    #[inline]
    #[must_use]
    pub const fn may_end_input(self) -> bool {
        matches!(self, Context::Root | Context::LineEnd | Context::Comment)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a matched rule produces from its text.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Consume the text without a token
    Skip,
    /// Comment text, emitted only when comments are kept
    Comment,
    /// Emit a fixed structural token
    Emit(Token),
    /// `""` or `''`, an empty string value
    EmptyString,
    /// `key =`
    BareKey,
    /// `"key" =`, escapes decoded
    QuotedKey,
    /// `'key' =`, taken verbatim
    LiteralKey,
    /// A bare table header segment
    Segment,
    BasicString,
    LiteralString,
    MultilineBasic,
    MultilineLiteral,
    Date(DateShape),
    Float,
    Integer,
    Boolean,
    /// Input that is recognized only to be rejected with a clearer message
    Reject(&'static str),
}

/// One entry of a context's rule table.
#[derive(Clone, Debug)]
pub struct Rule {
    regex: Regex,
    action: Action,
    push: Vec<Context>,
    pop: bool,
}

impl Rule {
    fn new(pattern: &str, action: Action) -> std::result::Result<Self, regex::Error> {
        Ok(Rule {
            regex: Regex::new(&format!("^(?:{})", pattern))?,
            action,
            push: Vec::new(),
            pop: false,
        })
    }

    fn pop(mut self) -> Self {
        self.pop = true;
        self
    }

    fn push(mut self, contexts: &[Context]) -> Self {
        self.push.extend_from_slice(contexts);
        self
    }

    /// The same rule used for an array element: once the value completes,
    /// the array expects a separator or its end.
    fn in_array(&self) -> Self {
        let mut rule = self.clone();
        if rule.pop {
            rule.push.insert(0, Context::ArrayNext);
        }
        rule
    }

    /// The anchored pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[must_use]
    pub fn pushes(&self) -> &[Context] {
        &self.push
    }

    #[must_use]
    pub fn pops(&self) -> bool {
        self.pop
    }

    /// Returns the length of the non-empty prefix of `input` this rule matches.
    #[must_use]
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.regex
            .find(input)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }

    fn apply(&self, text: &str, options: &ParseOptions) -> Result<Option<Token>> {
        let token = match &self.action {
            Action::Skip => return Ok(None),
            Action::Comment => {
                return Ok(options
                    .keep_comments
                    .then(|| Token::Comment(text.trim().to_string())))
            }
            Action::Emit(token) => token.clone(),
            Action::EmptyString => Token::Identifier(String::new()),
            Action::BareKey => Token::Key(key_text(text).to_string()),
            Action::QuotedKey => Token::Key(escape::unescape(strip_quotes(key_text(text)))?),
            Action::LiteralKey => Token::Key(strip_quotes(key_text(text)).to_string()),
            Action::Segment | Action::LiteralString => Token::Identifier(text.to_string()),
            Action::BasicString => Token::Identifier(escape::unescape(text)?),
            Action::MultilineBasic => Token::Identifier(escape::unescape_multiline(
                escape::strip_leading_newline(text),
            )?),
            Action::MultilineLiteral => {
                Token::Identifier(escape::strip_leading_newline(text).to_string())
            }
            Action::Date(shape) => Token::DateTime(date::decode(text, *shape, options.local_offset)?),
            Action::Float => Token::DoubleNumber(parse_float(text)?),
            Action::Integer => Token::IntegerNumber(parse_integer(text)?),
            Action::Boolean => Token::Boolean(text == "true"),
            Action::Reject(msg) => return Err(Error::syntax_with_context(msg, text)),
        };
        Ok(Some(token))
    }
}

/// Strips the trailing `=` and blanks of a key rule match.
fn key_text(text: &str) -> &str {
    text.strip_suffix('=')
        .unwrap_or(text)
        .trim_end_matches(&[' ', '\t'][..])
}

fn strip_quotes(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or("")
}

fn parse_integer(text: &str) -> Result<i64> {
    text.replace('_', "")
        .parse()
        .map_err(|_| Error::syntax_with_context("integer out of range", text))
}

fn parse_float(text: &str) -> Result<f64> {
    match text.replace('_', "").parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::syntax_with_context("float out of range", text)),
    }
}

/// The compiled rule tables for every context.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Vec<Rule>>,
}

impl Grammar {
    /// Returns the process-wide grammar, compiling it on first use.
    pub fn get() -> Result<&'static Grammar> {
        static GRAMMAR: OnceLock<std::result::Result<Grammar, regex::Error>> = OnceLock::new();
        GRAMMAR
            .get_or_init(Grammar::build)
            .as_ref()
            .map_err(Error::custom)
    }

    /// The ordered rules of `context`.
    #[must_use]
    pub fn rules(&self, context: Context) -> &[Rule] {
        &self.rules[context.index()]
    }

    fn build() -> std::result::Result<Grammar, regex::Error> {
        let value = value_rules()?;
        let rules = Context::ALL
            .iter()
            .map(|&context| match context {
                Context::Root => root_rules(),
                Context::LineEnd => line_end_rules(),
                Context::Comment => comment_rules(),
                Context::Value => Ok(value.clone()),
                Context::Array => array_rules(&value),
                Context::ArrayNext => array_next_rules(),
                Context::InlineTable => inline_table_rules(),
                Context::String => Ok(vec![
                    Rule::new("\"", Action::Skip)?.pop(),
                    Rule::new(BASIC_CHARS, Action::BasicString)?,
                ]),
                Context::LiteralString => Ok(vec![
                    Rule::new("'", Action::Skip)?.pop(),
                    Rule::new(LITERAL_CHARS, Action::LiteralString)?,
                ]),
                Context::MultilineString => Ok(vec![
                    Rule::new("\"\"\"", Action::Skip)?.pop(),
                    Rule::new(MULTILINE_BASIC_BODY, Action::MultilineBasic)?,
                ]),
                Context::MultilineLiteralString => Ok(vec![
                    Rule::new("'''", Action::Skip)?.pop(),
                    Rule::new(MULTILINE_LITERAL_BODY, Action::MultilineLiteral)?,
                ]),
                Context::TableName => header_rules(Rule::new(r"\]", Action::Emit(Token::TableEnd))?),
                Context::TableArray => {
                    header_rules(Rule::new(r"\]\]", Action::Emit(Token::TableArrayEnd))?)
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Grammar { rules })
    }
}

type Rules = std::result::Result<Vec<Rule>, regex::Error>;

fn key_rules(after: &[Context]) -> Rules {
    Ok(vec![
        Rule::new(&format!(r"{}[ \t]*=", BARE_KEY), Action::BareKey)?.push(after),
        Rule::new(&format!(r#""(?:{})?"[ \t]*="#, BASIC_CHARS), Action::QuotedKey)?.push(after),
        Rule::new(&format!(r"'(?:{})?'[ \t]*=", LITERAL_CHARS), Action::LiteralKey)?.push(after),
    ])
}

fn root_rules() -> Rules {
    let mut rules = vec![
        Rule::new(WHITESPACE, Action::Skip)?,
        Rule::new("#", Action::Skip)?.push(&[Context::Comment]),
    ];
    rules.extend(key_rules(&[Context::LineEnd, Context::Value])?);
    rules.push(Rule::new(r"\[\[", Action::Emit(Token::TableArrayBegin))?.push(&[Context::TableArray]));
    rules.push(Rule::new(r"\[", Action::Emit(Token::TableBegin))?.push(&[Context::TableName]));
    Ok(rules)
}

fn line_end_rules() -> Rules {
    Ok(vec![
        Rule::new(BLANKS, Action::Skip)?,
        Rule::new("#", Action::Skip)?.pop().push(&[Context::Comment]),
        Rule::new(NEWLINE, Action::Skip)?.pop(),
    ])
}

fn comment_rules() -> Rules {
    Ok(vec![
        Rule::new(r"[^\r\n]+", Action::Comment)?.pop(),
        Rule::new(NEWLINE, Action::Skip)?.pop(),
    ])
}

fn value_rules() -> Rules {
    let mut rules = vec![
        Rule::new(BLANKS, Action::Skip)?,
        Rule::new(r"\[", Action::Emit(Token::ArrayBegin))?.pop().push(&[Context::Array]),
        Rule::new(r"\{", Action::Emit(Token::InlineTableBegin))?
            .pop()
            .push(&[Context::InlineTable]),
        Rule::new("\"\"\"\"\"\"", Action::EmptyString)?.pop(),
        Rule::new("''''''", Action::EmptyString)?.pop(),
        Rule::new("\"\"\"", Action::Skip)?.pop().push(&[Context::MultilineString]),
        Rule::new("'''", Action::Skip)?.pop().push(&[Context::MultilineLiteralString]),
        Rule::new("\"\"", Action::EmptyString)?.pop(),
        Rule::new("''", Action::EmptyString)?.pop(),
        Rule::new("\"", Action::Skip)?.pop().push(&[Context::String]),
        Rule::new("'", Action::Skip)?.pop().push(&[Context::LiteralString]),
    ];
    for shape in DateShape::ALL {
        rules.push(Rule::new(&shape.pattern(), Action::Date(shape))?.pop());
    }
    rules.extend([
        Rule::new(
            &format!("{}(?:{})?{}", INTEGER, FRACTION, EXPONENT),
            Action::Float,
        )?
        .pop(),
        Rule::new(&format!("{}{}", INTEGER, FRACTION), Action::Float)?.pop(),
        Rule::new(INTEGER, Action::Integer)?.pop(),
        Rule::new("true", Action::Boolean)?.pop(),
        Rule::new("false", Action::Boolean)?.pop(),
    ]);
    Ok(rules)
}

fn array_rules(value: &[Rule]) -> Rules {
    let mut rules = vec![
        Rule::new(WHITESPACE, Action::Skip)?,
        Rule::new("#", Action::Skip)?.push(&[Context::Comment]),
        Rule::new(r"\]", Action::Emit(Token::ArrayEnd))?.pop(),
    ];
    rules.extend(value.iter().map(Rule::in_array));
    Ok(rules)
}

fn array_next_rules() -> Rules {
    Ok(vec![
        Rule::new(WHITESPACE, Action::Skip)?,
        Rule::new("#", Action::Skip)?.push(&[Context::Comment]),
        Rule::new(",", Action::Skip)?.pop().push(&[Context::Array]),
        Rule::new(r"\]", Action::Emit(Token::ArrayEnd))?.pop(),
    ])
}

fn inline_table_rules() -> Rules {
    let mut rules = vec![
        Rule::new(r"[ \t,]+", Action::Skip)?,
        Rule::new(r"\{", Action::Emit(Token::InlineTableBegin))?.push(&[Context::InlineTable]),
        Rule::new(r"\}", Action::Emit(Token::InlineTableEnd))?.pop(),
    ];
    rules.extend(key_rules(&[Context::Value])?);
    Ok(rules)
}

fn header_rules(close: Rule) -> Rules {
    Ok(vec![
        Rule::new(BLANKS, Action::Skip)?,
        Rule::new("\"\"|''", Action::EmptyString)?,
        Rule::new("\"", Action::Skip)?.push(&[Context::String]),
        Rule::new("'", Action::Skip)?.push(&[Context::LiteralString]),
        Rule::new(r"\.", Action::Emit(Token::TableSep))?,
        close.pop().push(&[Context::LineEnd]),
        Rule::new(
            r"\[",
            Action::Reject(
                "Invalid table declaration: '[' is not allowed in a table name, quote the name instead",
            ),
        )?,
        Rule::new(
            "#",
            Action::Reject("Invalid table declaration: close the table header before a comment"),
        )?,
        Rule::new(BARE_KEY, Action::Segment)?,
    ])
}

/// Converts source text into tokens.
///
/// # Examples
///
/// ```rust
/// use strict_toml::{Lexer, ParseOptions, Token};
///
/// let options = ParseOptions::new().with_comments(true);
/// let tokens = Lexer::with_options("[a] # note", &options).tokenize().unwrap();
/// assert_eq!(tokens.last(), Some(&Token::Comment("note".to_string())));
/// ```
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    options: ParseOptions,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, &ParseOptions::default())
    }

    #[must_use]
    pub fn with_options(input: &'a str, options: &ParseOptions) -> Self {
        Lexer {
            input,
            options: options.clone(),
        }
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    ///
    /// - [`Error::Syntax`] when no rule of the current context matches, when
    ///   contexts nest deeper than the configured limit, or when the input
    ///   ends inside an unfinished construct
    /// - [`Error::InvalidEscapeSequence`], [`Error::InvalidUnicodeCharacter`]
    ///   and [`Error::InvalidDateFormat`] from literal decoding
    pub fn tokenize(&self) -> Result<Vec<Token>> {
        let grammar = Grammar::get()?;
        let mut tokens = Vec::new();
        let mut stack = vec![Context::Root];
        let mut pos = 0;

        while pos < self.input.len() {
            let rest = &self.input[pos..];
            let context = match stack.last() {
                Some(context) => *context,
                None => return Err(self.unexpected(pos, Context::Root)),
            };

            let (rule, len) = grammar
                .rules(context)
                .iter()
                .find_map(|rule| rule.match_len(rest).map(|len| (rule, len)))
                .ok_or_else(|| self.unexpected(pos, context))?;

            if let Some(token) = rule.apply(&rest[..len], &self.options)? {
                trace!(?token, context = context.name(), "token");
                tokens.push(token);
            }
            pos += len;

            if rule.pop {
                stack.pop();
                trace!(context = context.name(), "pop");
            }
            for &pushed in &rule.push {
                trace!(context = pushed.name(), "push");
                stack.push(pushed);
            }
            if stack.len() > self.options.max_depth {
                return Err(Error::syntax_with_context(
                    "maximum nesting depth exceeded",
                    &format!("limit {}", self.options.max_depth),
                ));
            }
        }

        if let Some(open) = stack.iter().find(|context| !context.may_end_input()) {
            return Err(Error::syntax_with_context(
                "unexpected end of input",
                &format!("unterminated {}", open),
            ));
        }
        Ok(tokens)
    }

    fn unexpected(&self, pos: usize, context: Context) -> Error {
        let before = &self.input[..pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        let remainder: String = self.input[pos..]
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(40)
            .collect();
        Error::syntax_with_context(
            &format!(
                "unexpected input in {} at line {}, column {}",
                context, line, column
            ),
            &remainder,
        )
    }
}

/// Tokenizes `input` with default options.
///
/// # Errors
///
/// See [`Lexer::tokenize`].
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}
