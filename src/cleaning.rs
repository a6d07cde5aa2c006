//! Field coercion utilities for uploaded delivery exports
//!
//! Every function here is total: a value that cannot be converted becomes
//! `None` (a polars null once written back to a frame) rather than an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A raw cell as it arrives from a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl From<f64> for RawValue<'_> {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue<'_> {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(value: &'a str) -> Self {
        RawValue::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for RawValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Text)
    }
}

impl From<Option<f64>> for RawValue<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

/// Clean a locale formatted number such as `"12,345.67"` or `"₹1,000"`
///
/// Numbers pass through unchanged. Text keeps only digits, `.` and `-`
/// before parsing, so currency symbols, thousands separators and
/// whitespace are discarded.
pub fn clean_numeric_string<'a>(value: impl Into<RawValue<'a>>) -> Option<f64> {
    match value.into() {
        RawValue::Number(n) if n.is_nan() => None,
        RawValue::Number(n) => Some(n),
        RawValue::Missing => None,
        RawValue::Text(text) => {
            let kept: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if kept.is_empty() {
                return None;
            }
            kept.parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}

/// Coerce text to a float, treating anything non-numeric as missing
///
/// Unlike [`clean_numeric_string`] no characters are stripped: `"1,234"`
/// is not a coordinate.
pub fn coerce_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce an order count; whole-valued floats such as `"3.0"` are accepted
pub fn coerce_count(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(count) = trimmed.parse::<i64>() {
        return Some(count);
    }
    coerce_numeric(trimmed)
        .filter(|n| n.is_finite() && n.fract() == 0.0)
        .map(|n| n as i64)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y, %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Parse a human readable or ISO timestamp
///
/// Numeric dates are read month first (`03/04/2024` is March 4) and fall
/// back to day first only when that cannot be a valid date. Month names may
/// be abbreviated or spelled out. Timezone-aware values are converted to UTC; bare dates map to midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_clean_locale_formatted_numbers() {
        assert_eq!(clean_numeric_string("1,234.50"), Some(1234.50));
        assert_eq!(clean_numeric_string("₹-12.3"), Some(-12.3));
        assert_eq!(clean_numeric_string("₹1,000"), Some(1000.0));
        assert_eq!(clean_numeric_string(" 12 345 "), Some(12345.0));
    }

    #[test]
    fn test_clean_missing_values() {
        assert_eq!(clean_numeric_string(""), None);
        assert_eq!(clean_numeric_string(None::<&str>), None);
        assert_eq!(clean_numeric_string(RawValue::Missing), None);
        assert_eq!(clean_numeric_string("N/A"), None);
        assert_eq!(clean_numeric_string(f64::NAN), None);
    }

    #[test]
    fn test_clean_passes_numbers_through() {
        assert_eq!(clean_numeric_string(42.5), Some(42.5));
        assert_eq!(clean_numeric_string(7_i64), Some(7.0));
        assert_eq!(clean_numeric_string(Some(3.5_f64)), Some(3.5));
    }

    #[test]
    fn test_clean_unparsable_remainder() {
        // Digits survive but do not form a number
        assert_eq!(clean_numeric_string("12-3"), None);
        assert_eq!(clean_numeric_string("1.2.3"), None);
        assert_eq!(clean_numeric_string("-"), None);
    }

    #[test]
    fn test_coerce_numeric_is_strict() {
        assert_eq!(coerce_numeric(" 77.5946 "), Some(77.5946));
        assert_eq!(coerce_numeric("-12.97"), Some(-12.97));
        assert_eq!(coerce_numeric("1,234"), None);
        assert_eq!(coerce_numeric("abc"), None);
        assert_eq!(coerce_numeric("NaN"), None);
        assert_eq!(coerce_numeric(""), None);
    }

    #[test]
    fn test_coerce_numeric_rejects_infinities() {
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric("-infinity"), None);
        assert_eq!(coerce_numeric("1e400"), None);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("12"), Some(12));
        assert_eq!(coerce_count("3.0"), Some(3));
        assert_eq!(coerce_count("2.5"), None);
        assert_eq!(coerce_count("many"), None);
    }

    #[test]
    fn test_parse_iso_timestamps() {
        let ts = parse_timestamp("2024-03-05 14:30:15").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 30, 15));

        let ts = parse_timestamp("2024-03-05T14:30:15.250").unwrap();
        assert_eq!(ts.minute(), 30);

        let ts = parse_timestamp("2024-03-05T14:30:15+05:30").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (9, 0));
    }

    #[test]
    fn test_parse_human_readable_timestamps() {
        let ts = parse_timestamp("25/12/2024 09:15").unwrap();
        assert_eq!((ts.day(), ts.month(), ts.hour()), (25, 12, 9));

        let ts = parse_timestamp("Mar 05, 2024 02:30 PM").unwrap();
        assert_eq!((ts.day(), ts.hour()), (5, 14));

        let ts = parse_timestamp("2024-03-05").unwrap();
        assert_eq!((ts.day(), ts.hour()), (5, 0));
    }

    #[test]
    fn test_parse_numeric_dates_month_first() {
        let ts = parse_timestamp("12/25/2024 10:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2024, 12, 25, 10));

        let ts = parse_timestamp("03/04/2024").unwrap();
        assert_eq!((ts.month(), ts.day()), (3, 4));

        let ts = parse_timestamp("03-04-2024 08:30").unwrap();
        assert_eq!((ts.month(), ts.day(), ts.minute()), (3, 4, 30));

        // No thirteenth month, so this one is day first
        let ts = parse_timestamp("13/04/2024").unwrap();
        assert_eq!((ts.month(), ts.day()), (4, 13));
    }

    #[test]
    fn test_parse_full_month_names_with_time() {
        let ts = parse_timestamp("5 March 2024 10:00").unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour()), (3, 5, 10));

        let ts = parse_timestamp("March 5, 2024 10:00 AM").unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour()), (3, 5, 10));

        let ts = parse_timestamp("March 5, 2024 10:00 PM").unwrap();
        assert_eq!(ts.hour(), 22);

        let ts = parse_timestamp("5 Mar 2024 10:00:30").unwrap();
        assert_eq!((ts.month(), ts.second()), (3, 30));
    }

    #[test]
    fn test_parse_timestamp_failures() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }
}
