use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

/// Fixed-width storage format. Every stored value has the same length, so comparing the
/// text in SQL orders it chronologically.
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Years that format as exactly four digits. Outside this range `%Y` adds a sign and more
/// digits, and the text no longer sorts chronologically.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a local date-time as given by a caller.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DDTHH:MM[:SS[.fff]]` and the same with a space
/// separator. A trailing UTC offset is tolerated but dropped: the wall-clock value is kept as is.
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, DateTimeError> {
    let input = input.trim();
    let parsed = parse_any_format(input).ok_or_else(|| DateTimeError::Invalid(input.to_string()))?;
    ensure_storable(parsed)
}

/// Reject date-times whose year falls outside [`STORABLE_YEARS`].
pub fn ensure_storable(value: NaiveDateTime) -> Result<NaiveDateTime, DateTimeError> {
    if STORABLE_YEARS.contains(&value.year()) {
        Ok(value)
    } else {
        Err(DateTimeError::OutOfRange(value))
    }
}

fn parse_any_format(input: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.naive_local())
        .ok()
}

pub fn format_for_storage(value: &NaiveDateTime) -> String {
    value.format(STORAGE_FORMAT).to_string()
}

pub fn parse_from_storage(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, STORAGE_FORMAT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    Invalid(String),
    OutOfRange(NaiveDateTime),
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::Invalid(input) => write!(
                f,
                "invalid date '{input}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
            ),
            DateTimeError::OutOfRange(value) => write!(
                f,
                "date {value} is out of range: the year must be between {} and {}",
                STORABLE_YEARS.start(),
                STORABLE_YEARS.end()
            ),
        }
    }
}

impl std::error::Error for DateTimeError {}
