//! Catalog timestamp parsing.
//!
//! Upstream writes discovery times with fractional seconds
//! (`2023-05-01 03:04:05.678`) and modification and release times without
//! (`2023-05-03 10:00:00`). Both shapes are accepted everywhere.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Format of the release timestamp on the first line of a catalog file.
pub const RELEASE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FRACTIONAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a catalog timestamp, returning `None` if it matches no known shape.
///
/// A bare date is read as midnight.
pub fn parse_catalog_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(value, FRACTIONAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, RELEASE_TIMESTAMP_FORMAT))
        .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Render a timestamp the way the release line stores it.
pub fn format_release_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(RELEASE_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parses_fractional_seconds() {
        let ts = parse_catalog_timestamp("2023-05-01 03:04:05.678").unwrap();
        assert_eq!(ts.second(), 5);
        assert_eq!(ts.nanosecond(), 678_000_000);
    }

    #[test]
    fn test_parses_whole_seconds_and_dates() {
        let ts = parse_catalog_timestamp(" 2023-05-03 10:00:00 ").unwrap();
        assert_eq!(format_release_timestamp(&ts), "2023-05-03 10:00:00");

        let midnight = parse_catalog_timestamp("2023-05-03").unwrap();
        assert_eq!(midnight.hour(), 0);

        assert!(parse_catalog_timestamp("2023-05-03T10:00:00.5").is_some());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_catalog_timestamp("").is_none());
        assert!(parse_catalog_timestamp("yesterday").is_none());
        assert!(parse_catalog_timestamp("2023-13-40 10:00:00").is_none());
    }
}
