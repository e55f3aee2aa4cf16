//! Key paths addressing values and tables.
//!
//! A [`KeyPath`] is the ordered list of unescaped key segments from the
//! document root (or from the root of an array-of-tables element). It is
//! normalized once, when built, and compared structurally afterwards.
//!
//! ```rust
//! use strict_toml::KeyPath;
//!
//! let path = KeyPath::from(["servers", "alpha", "ip"]);
//! assert_eq!(path.to_string(), "servers.alpha.ip");
//!
//! let quoted = KeyPath::from(["key#group", "answer"]);
//! assert_eq!(quoted.to_string(), "\"key#group\".answer");
//! ```

use std::fmt;

/// An owned, hashable sequence of key segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Creates the empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn push<S: Into<String>>(&mut self, segment: S) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join<S: Into<String>>(&self, segment: S) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    /// Returns the path without its last segment, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<KeyPath> {
        match self.0.split_last() {
            Some((_, rest)) => Some(KeyPath(rest.to_vec())),
            None => None,
        }
    }

    /// Returns `true` if `prefix` is a (not necessarily strict) prefix of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns `true` if `prefix` is a prefix of this path and shorter than it.
    #[must_use]
    pub fn is_strictly_under(&self, prefix: &KeyPath) -> bool {
        self.len() > prefix.len() && self.starts_with(prefix)
    }

    /// Returns the remainder of this path below `prefix`.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &KeyPath) -> Option<KeyPath> {
        self.0
            .strip_prefix(prefix.0.as_slice())
            .map(|rest| KeyPath(rest.to_vec()))
    }

    /// Returns the first `len` segments as a new path.
    #[must_use]
    pub fn truncated(&self, len: usize) -> KeyPath {
        KeyPath(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterates over every strict, non-empty prefix, shortest first.
    pub fn ancestors(&self) -> impl Iterator<Item = KeyPath> + '_ {
        (1..self.len()).map(move |len| self.truncated(len))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

/// Returns `true` if `segment` can be written without quotes.
#[must_use]
pub fn is_bare_key(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Writes `segment` bare when possible, quoted and escaped otherwise.
pub(crate) fn write_key(out: &mut String, segment: &str) {
    if is_bare_key(segment) {
        out.push_str(segment);
    } else {
        crate::ser::write_basic_string(out, segment);
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            write_key(&mut out, segment);
        }
        f.write_str(&out)
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        KeyPath(vec![key.to_string()])
    }
}

impl From<String> for KeyPath {
    fn from(key: String) -> Self {
        KeyPath(vec![key])
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        segments.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self {
        segments.into_iter().collect()
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        KeyPath(segments)
    }
}

impl From<&KeyPath> for KeyPath {
    fn from(path: &KeyPath) -> Self {
        path.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        KeyPath(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality_and_hashing() {
        let a = KeyPath::from(["a", "b"]);
        let b: KeyPath = vec!["a".to_string(), "b".to_string()].into();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        // segments are never re-split on dots
        assert!(!set.contains(&KeyPath::from("a.b")));
    }

    #[test]
    fn test_prefix_operations() {
        let path = KeyPath::from(["albums", "songs", "name"]);
        let albums = KeyPath::from("albums");

        assert!(path.starts_with(&albums));
        assert!(path.is_strictly_under(&albums));
        assert!(!albums.is_strictly_under(&albums));
        assert_eq!(
            path.strip_prefix(&albums),
            Some(KeyPath::from(["songs", "name"]))
        );
        assert_eq!(path.strip_prefix(&KeyPath::from("x")), None);
        assert_eq!(path.parent(), Some(KeyPath::from(["albums", "songs"])));
        assert_eq!(KeyPath::root().parent(), None);

        let ancestors: Vec<KeyPath> = path.ancestors().collect();
        assert_eq!(
            ancestors,
            vec![KeyPath::from("albums"), KeyPath::from(["albums", "songs"])]
        );
    }

    #[test]
    fn test_display_quotes_non_bare_segments() {
        assert_eq!(KeyPath::from(["a", "b c"]).to_string(), "a.\"b c\"");
        assert_eq!(KeyPath::from("dot.ted").to_string(), "\"dot.ted\"");
        assert_eq!(KeyPath::from("").to_string(), "\"\"");
        assert_eq!(KeyPath::root().to_string(), "");
    }

    #[test]
    fn test_is_bare_key() {
        assert!(is_bare_key("bare_key-1"));
        assert!(is_bare_key("1234"));
        assert!(!is_bare_key("key#group"));
        assert!(!is_bare_key("ʎǝʞ"));
        assert!(!is_bare_key(""));
    }
}
