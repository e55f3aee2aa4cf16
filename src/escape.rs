//! Escape sequence decoding for basic strings.
//!
//! Recognized escapes are `\b`, `\t`, `\n`, `\f`, `\r`, `\"`, `\\`, `\uXXXX`
//! and `\UXXXXXXXX`. Anything else after a backslash is an
//! [`Error::InvalidEscapeSequence`]; a unicode escape naming a surrogate or a
//! code point above `U+10FFFF` is an [`Error::InvalidUnicodeCharacter`].
//!
//! ```rust
//! use strict_toml::escape::unescape;
//!
//! assert_eq!(unescape(r"a\tb\u00e9").unwrap(), "a\tb\u{e9}");
//! assert!(unescape(r"\q").is_err());
//! ```

use crate::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Decodes the escapes of a single-line basic string body.
pub fn unescape(raw: &str) -> Result<String> {
    decode(raw, false)
}

/// Decodes the escapes of a multi-line basic string body.
///
/// A backslash followed only by blanks up to the end of its line is a line
/// continuation: it is removed together with every whitespace character and
/// newline that follows it.
pub fn unescape_multiline(raw: &str) -> Result<String> {
    decode(raw, true)
}

/// Removes a single newline directly following an opening `"""` or `'''`.
#[must_use]
pub fn strip_leading_newline(body: &str) -> &str {
    body.strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body)
}

fn decode(raw: &str, continuation: bool) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let esc = match chars.next() {
            Some(esc) => esc,
            None => return Err(Error::InvalidEscapeSequence("\\".to_string())),
        };

        match esc {
            'b' => out.push('\u{0008}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{000C}'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'u' => out.push(read_code_point(&mut chars, 'u', 4)?),
            'U' => out.push(read_code_point(&mut chars, 'U', 8)?),
            ' ' | '\t' | '\r' | '\n' if continuation && ends_line(esc, chars.clone()) => {
                while chars.peek().map_or(false, |c| c.is_whitespace()) {
                    chars.next();
                }
            }
            other => return Err(Error::InvalidEscapeSequence(format!("\\{}", other))),
        }
    }

    Ok(out)
}

/// Checks that only blanks separate the backslash from the next newline.
fn ends_line(first: char, rest: impl Iterator<Item = char>) -> bool {
    std::iter::once(first)
        .chain(rest)
        .find(|c| !matches!(c, ' ' | '\t' | '\r'))
        == Some('\n')
}

fn read_code_point(chars: &mut Peekable<Chars<'_>>, marker: char, width: usize) -> Result<char> {
    let mut hex = String::with_capacity(width);
    for _ in 0..width {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => return Err(Error::InvalidEscapeSequence(format!("\\{}{}", marker, hex))),
        }
    }

    let code = u32::from_str_radix(&hex, 16)
        .map_err(|_| Error::InvalidEscapeSequence(format!("\\{}{}", marker, hex)))?;

    if (0xD800..=0xDFFF).contains(&code) || code > 0x10FFFF {
        return Err(Error::InvalidUnicodeCharacter(code));
    }

    char::from_u32(code).ok_or(Error::InvalidUnicodeCharacter(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_escapes() {
        assert_eq!(
            unescape(r#"\b\t\n\f\r\"\\"#).unwrap(),
            "\u{0008}\t\n\u{000C}\r\"\\"
        );
        assert_eq!(unescape("plain text").unwrap(), "plain text");
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(unescape(r"\u03B4").unwrap(), "\u{03B4}");
        assert_eq!(unescape(r"\U000003B4").unwrap(), "\u{03B4}");
        assert_eq!(unescape(r"\U0001F600!").unwrap(), "\u{1F600}!");
        // the decoded backslash is not re-read as an escape
        assert_eq!(unescape(r"\u005Cu escape").unwrap(), "\\u escape");
    }

    #[test]
    fn test_invalid_escape() {
        assert_eq!(
            unescape(r"\q"),
            Err(Error::InvalidEscapeSequence("\\q".to_string()))
        );
        assert_eq!(
            unescape(r"\u12"),
            Err(Error::InvalidEscapeSequence("\\u12".to_string()))
        );
        assert!(unescape("trailing \\").is_err());
    }

    #[test]
    fn test_invalid_unicode() {
        assert_eq!(
            unescape(r"\uD800"),
            Err(Error::InvalidUnicodeCharacter(0xD800))
        );
        assert_eq!(
            unescape(r"\U00110000"),
            Err(Error::InvalidUnicodeCharacter(0x110000))
        );
    }

    #[test]
    fn test_line_continuation() {
        let raw = "The quick brown \\\n       fox jumps over \\  \r\n   the lazy dog.\\\n   ";
        assert_eq!(
            unescape_multiline(raw).unwrap(),
            "The quick brown fox jumps over the lazy dog."
        );
        // not a continuation when text follows on the same line
        assert!(unescape_multiline("a\\ b").is_err());
        // single-line strings never continue
        assert!(unescape("a\\\nb").is_err());
    }

    #[test]
    fn test_escaped_backslash_before_newline() {
        assert_eq!(unescape_multiline("a\\\\\nb").unwrap(), "a\\\nb");
    }

    #[test]
    fn test_strip_leading_newline() {
        assert_eq!(strip_leading_newline("\nabc"), "abc");
        assert_eq!(strip_leading_newline("\r\nabc"), "abc");
        assert_eq!(strip_leading_newline("\n\nabc"), "\nabc");
        assert_eq!(strip_leading_newline("abc\n"), "abc\n");
    }
}
