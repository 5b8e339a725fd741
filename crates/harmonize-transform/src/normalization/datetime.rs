//! Calendar date parsing into ISO 8601 (`YYYY-MM-DD`).

use chrono::{Datelike, NaiveDate};
use harmonize_model::DATE_FORMATS;

/// Tries each supported pattern in order; the first that parses wins.
///
/// Years must have four digits, so `24-01-15` is not read as year 24.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .filter(|date| (1000..=9999).contains(&date.year()))
    })
}

/// ISO calendar-date text for `value`, if any pattern matches.
pub fn normalize_date(value: &str) -> Option<String> {
    parse_date(value).map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_in_order() {
        assert_eq!(normalize_date("2024-01-15").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("15/01/2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("15.01.2024").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date("15-01-2024").as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn day_first_wins_when_ambiguous() {
        assert_eq!(normalize_date("03/04/2024").as_deref(), Some("2024-04-03"));
    }

    #[test]
    fn month_first_when_day_first_is_impossible() {
        assert_eq!(normalize_date("01/15/2024").as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn unparseable_inputs() {
        assert!(parse_date("").is_none());
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2023-13-01").is_none());
        assert!(parse_date("24-01-15").is_none());
    }
}
