//! Effective date formatting

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Parse an effective date as delivered by a search provider
///
/// Accepts RFC 3339 timestamps, offset-less ISO 8601 timestamps and plain
/// dates.
pub fn parse_effective_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Format an effective date as e.g. "March 5, 2024"
///
/// Empty input yields an empty string; anything unparseable is returned
/// unchanged.
pub fn format_effective_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    match parse_effective_date(raw) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => {
            tracing::warn!("Could not parse effective date '{}'", raw);
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339() {
        assert_eq!(format_effective_date("2024-03-05T10:00:00+00:00"), "March 5, 2024");
        assert_eq!(format_effective_date("2023-12-31T23:30:00Z"), "December 31, 2023");
    }

    #[test]
    fn test_without_offset() {
        assert_eq!(format_effective_date("2024-11-20T09:15:00"), "November 20, 2024");
        assert_eq!(format_effective_date("2024-11-20T09:15:00.123"), "November 20, 2024");
    }

    #[test]
    fn test_date_only() {
        assert_eq!(format_effective_date("2025-01-09"), "January 9, 2025");
    }

    #[test]
    fn test_malformed_returns_raw() {
        assert_eq!(format_effective_date("next tuesday"), "next tuesday");
        assert_eq!(format_effective_date("2024-13-45"), "2024-13-45");
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_effective_date(""), "");
    }
}
