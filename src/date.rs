//! Normalizes post dates for display.
//!
//! Post dates are written as `YYYY-MM-DD` in the front matter. That raw string
//! stays authoritative for ordering; this module only produces the localized
//! string shown to readers.

use chrono::NaiveDate;
use std::fmt::Write;
use tracing::warn;

/// The format post dates are written in.
pub const SOURCE_FORMAT: &str = "%Y-%m-%d";

/// The default display format, a Korean long-form date (e.g. `2024년 3월 1일`).
pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y년 %-m월 %-d일";

/// Parses a `YYYY-MM-DD` date.
pub fn parse(raw: &str) -> chrono::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, SOURCE_FORMAT)
}

/// Renders `raw` using `display_format`. If `raw` isn't a valid date, or
/// the format can't be rendered for a date, a warning is logged and `raw` is
/// returned unchanged; this never fails.
pub fn normalize(raw: &str, display_format: &str) -> String {
    let date = match parse(raw) {
        Ok(date) => date,
        Err(err) => {
            warn!(date = raw, "could not parse date ({}); using original string", err);
            return raw.to_owned();
        }
    };
    match render(date, display_format) {
        Some(formatted) => formatted,
        None => {
            warn!(
                date = raw,
                format = display_format,
                "could not format date; using original string"
            );
            raw.to_owned()
        }
    }
}

/// Reports whether `format` is a strftime string chrono can render for a
/// date. Time fields such as `%H` are rejected since posts carry no time.
pub fn is_valid_format(format: &str) -> bool {
    NaiveDate::from_ymd_opt(2024, 3, 1).map_or(false, |date| render(date, format).is_some())
}

// `DelayedFormat` reports bad or unsupported specifiers as `fmt::Error`, which
// `to_string` would turn into a panic.
fn render(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_korean_long_form() {
        assert_eq!(
            "2024년 3월 1일",
            normalize("2024-03-01", DEFAULT_DISPLAY_FORMAT)
        );
        assert_eq!(
            "2023년 12월 31일",
            normalize("2023-12-31", DEFAULT_DISPLAY_FORMAT)
        );
    }

    #[test]
    fn test_normalize_other_format() {
        assert_eq!("January 15, 2024", normalize("2024-01-15", "%B %-d, %Y"));
    }

    #[test]
    fn test_normalize_falls_back_to_raw() {
        assert_eq!("not-a-date", normalize("not-a-date", DEFAULT_DISPLAY_FORMAT));
        assert_eq!("", normalize("", DEFAULT_DISPLAY_FORMAT));
        assert_eq!(
            "2024-02-30",
            normalize("2024-02-30", DEFAULT_DISPLAY_FORMAT)
        );
        assert_eq!(
            "2024-03-01T10:00",
            normalize("2024-03-01T10:00", DEFAULT_DISPLAY_FORMAT)
        );
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format(DEFAULT_DISPLAY_FORMAT));
        assert!(is_valid_format("%Y-%m-%d"));
        assert!(!is_valid_format("%J"));
        assert!(!is_valid_format("%Y %H:%M"));
    }

    #[test]
    fn test_normalize_time_format_falls_back() {
        assert_eq!("2024-03-01", normalize("2024-03-01", "%Y %H:%M"));
    }
}
