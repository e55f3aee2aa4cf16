//! Configuration options for parsing.
//!
//! [`ParseOptions`] controls how date/time literals without an offset are
//! interpreted, how deeply structures may nest, and whether comments are
//! kept as tokens.
//!
//! ## Examples
//!
//! ```rust
//! use chrono::FixedOffset;
//! use strict_toml::{parse_with_options, ParseOptions};
//!
//! let options = ParseOptions::new()
//!     .with_local_offset(FixedOffset::east_opt(0).unwrap())
//!     .with_max_depth(32);
//!
//! let doc = parse_with_options("when = 1979-05-27T07:32:00", &options).unwrap();
//! assert_eq!(doc.get_datetime("when").unwrap().to_rfc3339(), "1979-05-27T07:32:00+00:00");
//! ```

use chrono::FixedOffset;

/// Default limit for nested arrays, inline tables and tokenizer contexts.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for the tokenizer and the document builder.
///
/// # Examples
///
/// ```rust
/// use strict_toml::ParseOptions;
///
/// let options = ParseOptions::new();
/// assert_eq!(options.local_offset, None);
/// assert_eq!(options.max_depth, 128);
/// assert!(!options.keep_comments);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Offset applied to date/time literals written without one.
    /// `None` uses the process local offset.
    pub local_offset: Option<FixedOffset>,
    /// Maximum structural nesting before a syntax error is raised.
    pub max_depth: usize,
    /// Emit `Comment` tokens instead of discarding comments.
    pub keep_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            local_offset: None,
            max_depth: DEFAULT_MAX_DEPTH,
            keep_comments: false,
        }
    }
}

impl ParseOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interprets offset-less date/time literals in `offset`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::FixedOffset;
    /// use strict_toml::ParseOptions;
    ///
    /// let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    /// let options = ParseOptions::new().with_local_offset(plus_two);
    /// assert_eq!(options.local_offset, Some(plus_two));
    /// ```
    #[must_use]
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = Some(offset);
        self
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Keeps comments as [`Token::Comment`](crate::Token::Comment) tokens.
    ///
    /// The builder ignores comment tokens, so this only changes the
    /// output of the tokenizer.
    #[must_use]
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let options = ParseOptions::new()
            .with_local_offset(utc)
            .with_max_depth(4)
            .with_comments(true);
        assert_eq!(options.local_offset, Some(utc));
        assert_eq!(options.max_depth, 4);
        assert!(options.keep_comments);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(ParseOptions::default(), ParseOptions::new());
    }
}
