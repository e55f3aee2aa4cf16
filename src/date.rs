//! Date/time literal decoding.
//!
//! The tokenizer recognizes five literal shapes, tried from most to least
//! specific so that a longer literal is never lexed as a shorter one:
//!
//! | Shape                   | Example                              |
//! |-------------------------|--------------------------------------|
//! | fractional + offset     | `1979-05-27T00:32:00.999999-07:00`   |
//! | offset                  | `1979-05-27T07:32:00Z`               |
//! | fractional, no offset   | `1979-05-27T07:32:00.5`              |
//! | no offset               | `1979-05-27T07:32:00`                |
//! | date only               | `1979-05-27` (midnight)              |
//!
//! Literals without an offset are interpreted in a caller-supplied offset,
//! or in the process local offset when none is supplied. A literal whose
//! shape matched but whose fields are not a real instant (month 13, hour 25,
//! February 30th) fails with [`Error::InvalidDateFormat`].

use crate::{Error, Result};
use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
};

const DATE: &str = r"[0-9]{4}-[0-9]{2}-[0-9]{2}";
const TIME: &str = r"T[0-9]{2}:[0-9]{2}:[0-9]{2}";
const FRACTION: &str = r"\.[0-9]+";
const OFFSET: &str = r"(?:Z|z|[-+][0-9]{2}:[0-9]{2})";

/// The accepted spellings of a date/time literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateShape {
    FractionalWithOffset,
    WithOffset,
    LocalFractional,
    Local,
    DateOnly,
}

impl DateShape {
    /// Every shape, most specific first.
    pub const ALL: [DateShape; 5] = [
        DateShape::FractionalWithOffset,
        DateShape::WithOffset,
        DateShape::LocalFractional,
        DateShape::Local,
        DateShape::DateOnly,
    ];

    /// Returns the lexical pattern of this shape (unanchored regex source).
    #[must_use]
    pub fn pattern(self) -> String {
        match self {
            DateShape::FractionalWithOffset => format!("{}{}{}{}", DATE, TIME, FRACTION, OFFSET),
            DateShape::WithOffset => format!("{}{}{}", DATE, TIME, OFFSET),
            DateShape::LocalFractional => format!("{}{}{}", DATE, TIME, FRACTION),
            DateShape::Local => format!("{}{}", DATE, TIME),
            DateShape::DateOnly => DATE.to_string(),
        }
    }

    /// Returns `true` if literals of this shape carry their own offset.
    #[inline]
    #[must_use]
    pub const fn has_offset(self) -> bool {
        matches!(
            self,
            DateShape::FractionalWithOffset | DateShape::WithOffset
        )
    }

    const fn naive_format(self) -> &'static str {
        match self {
            DateShape::FractionalWithOffset | DateShape::LocalFractional => "%Y-%m-%dT%H:%M:%S%.f",
            DateShape::WithOffset | DateShape::Local => "%Y-%m-%dT%H:%M:%S",
            DateShape::DateOnly => "%Y-%m-%d",
        }
    }
}

/// Decodes a literal of the given shape into an absolute instant.
///
/// `local_offset` is used for shapes without an offset; `None` means the
/// process local offset in effect at that wall-clock time.
///
/// # Examples
///
/// ```rust
/// use chrono::FixedOffset;
/// use strict_toml::date::{decode, DateShape};
///
/// let utc = decode("1979-05-27T07:32:00Z", DateShape::WithOffset, None).unwrap();
/// let plus_two = FixedOffset::east_opt(2 * 3600);
/// let local = decode("1979-05-27T09:32:00", DateShape::Local, plus_two).unwrap();
/// assert_eq!(utc, local);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidDateFormat`] carrying the literal when its fields
/// do not form a valid date/time or offset.
pub fn decode(
    literal: &str,
    shape: DateShape,
    local_offset: Option<FixedOffset>,
) -> Result<DateTime<FixedOffset>> {
    let invalid = || Error::InvalidDateFormat(literal.to_string());

    let (naive, offset) = if shape.has_offset() {
        let (wall, offset) = split_offset(literal).ok_or_else(invalid)?;
        let naive =
            NaiveDateTime::parse_from_str(wall, shape.naive_format()).map_err(|_| invalid())?;
        (naive, offset)
    } else {
        let naive = if shape == DateShape::DateOnly {
            NaiveDate::parse_from_str(literal, shape.naive_format())
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(invalid)?
        } else {
            NaiveDateTime::parse_from_str(literal, shape.naive_format()).map_err(|_| invalid())?
        };
        let offset = local_offset.unwrap_or_else(|| system_offset(&naive));
        (naive, offset)
    };

    offset.from_local_datetime(&naive).single().ok_or_else(invalid)
}

/// Returns the process local offset in effect at the given wall-clock time.
///
/// Ambiguous wall-clock times (a DST fall-back) resolve to the earlier
/// offset; skipped ones (a DST gap) use the offset at that UTC instant.
#[must_use]
pub fn system_offset(naive: &NaiveDateTime) -> FixedOffset {
    match Local.offset_from_local_datetime(naive) {
        LocalResult::Single(offset) => offset.fix(),
        LocalResult::Ambiguous(earliest, _) => earliest.fix(),
        LocalResult::None => Local.offset_from_utc_datetime(naive).fix(),
    }
}

fn split_offset(literal: &str) -> Option<(&str, FixedOffset)> {
    if let Some(wall) = literal.strip_suffix(&['Z', 'z'][..]) {
        return Some((wall, FixedOffset::east_opt(0)?));
    }

    let split = literal.len().checked_sub(6)?;
    if !literal.is_char_boundary(split) {
        return None;
    }
    let (wall, tz) = literal.split_at(split);
    let bytes = tz.as_bytes();

    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    if bytes[3] != b':' {
        return None;
    }

    let hours: i32 = tz.get(1..3)?.parse().ok()?;
    let minutes: i32 = tz.get(4..6)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(|offset| (wall, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    fn offset(hours: i32) -> Option<FixedOffset> {
        FixedOffset::east_opt(hours * 3600)
    }

    fn utc(literal: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(literal)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_with_offset() {
        let dt = decode("1979-05-27T07:32:00Z", DateShape::WithOffset, None).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("1979-05-27T07:32:00Z"));
        assert_eq!(dt.offset().local_minus_utc(), 0);

        let dt = decode("1979-05-27T00:32:00-07:00", DateShape::WithOffset, None).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("1979-05-27T07:32:00Z"));
        assert_eq!(dt.offset().local_minus_utc(), -7 * 3600);

        let dt = decode("1979-05-27T07:32:00z", DateShape::WithOffset, None).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("1979-05-27T07:32:00Z"));
    }

    #[test]
    fn test_fractional_with_offset() {
        let dt = decode(
            "1979-05-27T07:32:00.999999+07:00",
            DateShape::FractionalWithOffset,
            None,
        )
        .unwrap();
        assert_eq!(dt.nanosecond(), 999_999_000);
        assert_eq!(
            dt.with_timezone(&Utc),
            utc("1979-05-27T00:32:00.999999Z")
        );
    }

    #[test]
    fn test_local_shapes_use_supplied_offset() {
        let reference = utc("1979-05-27T05:32:00Z");

        let local = decode("1979-05-27T07:32:00", DateShape::Local, offset(2)).unwrap();
        assert_eq!(local.with_timezone(&Utc), reference);

        let fractional =
            decode("1979-05-27T07:32:00.5", DateShape::LocalFractional, offset(2)).unwrap();
        assert_eq!(
            fractional.with_timezone(&Utc),
            utc("1979-05-27T05:32:00.5Z")
        );

        let midnight = decode("1979-05-27", DateShape::DateOnly, offset(2)).unwrap();
        assert_eq!(midnight.with_timezone(&Utc), utc("1979-05-26T22:00:00Z"));
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_shapes_differ_only_by_offset() {
        let with_offset = decode("1979-05-27T07:32:00Z", DateShape::WithOffset, None).unwrap();
        let local = decode("1979-05-27T07:32:00", DateShape::Local, offset(-5)).unwrap();
        assert_eq!(
            local.timestamp() - with_offset.timestamp(),
            5 * 3600,
            "local literal is five hours behind UTC"
        );
    }

    #[test]
    fn test_calendar_validation() {
        for literal in ["1979-13-27", "1979-02-30", "2021-00-10"] {
            assert_eq!(
                decode(literal, DateShape::DateOnly, offset(0)),
                Err(Error::InvalidDateFormat(literal.to_string()))
            );
        }
        assert!(decode("1979-05-27T25:32:00Z", DateShape::WithOffset, None).is_err());
        assert!(decode("1979-05-27T07:32:00+24:00", DateShape::WithOffset, None).is_err());
        assert!(decode("1979-05-27T07:32:00+01:60", DateShape::WithOffset, None).is_err());
    }

    #[test]
    fn test_system_offset_is_used_by_default() {
        let literal = "2001-02-03T04:05:06";
        let naive = NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S").unwrap();
        let dt = decode(literal, DateShape::Local, None).unwrap();
        assert_eq!(*dt.offset(), system_offset(&naive));
    }

    #[test]
    fn test_patterns_are_ordered_most_specific_first() {
        let lengths: Vec<usize> = DateShape::ALL.iter().map(|s| s.pattern().len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }
}
