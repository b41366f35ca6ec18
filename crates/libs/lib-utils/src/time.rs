//! # Time Utilities
//!
//! Utilities for time formatting and manipulation using chrono.
//!
//! Message timestamps are always server-assigned UTC instants; these helpers
//! keep the format consistent across the store and the wire.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Parse RFC3339 string to UTC DateTime.
pub fn parse_utc(moment: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(moment)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::FailToDateParse(moment.to_string()))
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToDateParse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_roundtrip() {
        let now = now_utc();
        let formatted = format_time(now);
        let parsed = parse_utc(&formatted).expect("RFC3339 output should parse back");
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_utc("yesterday around noon").is_err());
    }
}
