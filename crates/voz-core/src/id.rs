//! Ticket ID allocation
//!
//! Format: PREFIX-N (e.g. VOZ-101). The next number is one past the
//! highest number already in use, never below the configured floor, so
//! numbering does not depend on how many rows the sheet holds.

use crate::{Error, Result};

/// Build a ticket ID from prefix and number
pub fn format_id(prefix: &str, number: u64) -> String {
    format!("{}-{}", prefix, number)
}

/// Parse the numeric part of an ID carrying the given prefix
///
/// Matching on the prefix is case-insensitive; anything that is not
/// `PREFIX-<digits>` yields `None`.
pub fn parse_number(prefix: &str, id: &str) -> Option<u64> {
    let (head, tail) = id.trim().split_once('-')?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    tail.parse().ok()
}

/// Allocate the next ticket ID given the IDs already stored
///
/// Fails with [`Error::Store`] when the highest stored number cannot be
/// incremented.
pub fn next_id<'a>(
    prefix: &str,
    floor: u64,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let next = match existing
        .into_iter()
        .filter_map(|id| parse_number(prefix, id))
        .max()
    {
        Some(max) => max.checked_add(1).ok_or_else(|| {
            Error::Store(format!("ticket numbering exhausted at {}", format_id(prefix, max)))
        })?,
        None => floor,
    };
    Ok(format_id(prefix, next.max(floor)))
}

/// Normalize a user-typed ID for lookup
pub fn normalize(id: &str) -> String {
    id.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_uses_floor() {
        assert_eq!(next_id("VOZ", 101, []).unwrap(), "VOZ-101");
    }

    #[test]
    fn test_next_id_follows_highest() {
        let ids = ["VOZ-101", "VOZ-107", "VOZ-102"];
        assert_eq!(next_id("VOZ", 101, ids).unwrap(), "VOZ-108");
    }

    #[test]
    fn test_next_id_ignores_gaps_and_foreign_ids() {
        // A removed row must not cause the last ID to be handed out again.
        let ids = ["VOZ-101", "VOZ-103", "OTHER-900", "VOZ-abc"];
        assert_eq!(next_id("VOZ", 101, ids).unwrap(), "VOZ-104");
    }

    #[test]
    fn test_next_id_respects_floor() {
        assert_eq!(next_id("VOZ", 101, ["VOZ-5"]).unwrap(), "VOZ-101");
    }

    #[test]
    fn test_next_id_at_numbering_limit() {
        let last = format_id("VOZ", u64::MAX);
        assert!(matches!(
            next_id("VOZ", 101, [last.as_str()]),
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("VOZ", "voz-120"), Some(120));
        assert_eq!(parse_number("VOZ", " VOZ-7 "), Some(7));
        assert_eq!(parse_number("VOZ", "VOZ120"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  voz-101 "), "VOZ-101");
    }
}
