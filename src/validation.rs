//! Format checks for request input.
//!
//! Every predicate is total: malformed input yields `false` (or `None` from
//! the matching `parse_*` function), never a panic. Handlers run these before
//! touching the database.

use chrono::NaiveDate;

use crate::models::date_format::DATE_FORMAT;

/// Parses a `YYYY-MM-DDZ` string into a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 11 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'Z' {
        return None;
    }
    let digits_ok = [0..4, 5..7, 8..10]
        .into_iter()
        .all(|range| bytes[range].iter().all(u8::is_ascii_digit));
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

pub fn parse_non_negative_integer(s: &str) -> Option<u64> {
    if s.starts_with('+') {
        return None;
    }
    s.parse().ok()
}

pub fn is_valid_non_negative_integer(s: &str) -> bool {
    parse_non_negative_integer(s).is_some()
}

pub fn parse_offset(s: &str) -> Option<i64> {
    if s.starts_with('+') {
        return None;
    }
    s.parse().ok()
}

pub fn is_valid_offset(s: &str) -> bool {
    parse_offset(s).is_some()
}

/// Checks a `weight x reps` list such as `40x10;50x8;52.5x6`.
///
/// The empty string means no sets recorded and is valid.
pub fn is_valid_workout_content(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    s.split(';').all(|set| {
        let mut parts = set.split('x');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(weight), Some(reps), None) => {
                is_non_negative_number(weight) && is_non_negative_number(reps)
            }
            _ => false,
        }
    })
}

fn is_non_negative_number(token: &str) -> bool {
    token
        .parse::<f64>()
        .map(|n| n.is_finite() && n >= 0.0)
        .unwrap_or(false)
}
