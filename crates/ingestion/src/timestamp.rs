//! Date and time normalization.
//!
//! Input files mix several date layouts. Each recognized layout is a
//! [`DateFormat`] variant, detected from the separator and field widths.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use crossover_core::Timestamp;
use thiserror::Error;

/// Why a date or time value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The date string matches none of the known layouts.
    #[error("unrecognized date format: {0:?}")]
    UnknownDateFormat(String),
    /// The layout matched but the fields do not name a real calendar day.
    #[error("invalid calendar date: {0:?}")]
    InvalidDate(String),
    /// The time string is not `HH:MM:SS[.fff]` or is out of range.
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),
}

/// Recognized date layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `DD-MM-YYYY`
    DayMonthYearDash,
    /// `DD/MM/YY`, century fixed to 2000.
    DayMonthShortYearSlash,
    /// `DD/MM/YYYY`
    DayMonthYearSlash,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateFormat {
    /// Detect the layout of a trimmed date string.
    pub fn detect(raw: &str) -> Option<Self> {
        let (sep, parts) = split_date(raw)?;
        let widths = [parts[0].len(), parts[1].len(), parts[2].len()];
        match (sep, widths) {
            ('-', [4, 1..=2, 1..=2]) => Some(DateFormat::Iso),
            ('-', [1..=2, 1..=2, 4]) => Some(DateFormat::DayMonthYearDash),
            ('/', [1..=2, 1..=2, 2]) => Some(DateFormat::DayMonthShortYearSlash),
            ('/', [1..=2, 1..=2, 4]) => Some(DateFormat::DayMonthYearSlash),
            _ => None,
        }
    }

    /// Extract `(year, month, day)` from a string already matched to this layout.
    fn extract(self, parts: [u32; 3]) -> (i32, u32, u32) {
        let [a, b, c] = parts;
        match self {
            DateFormat::Iso => (a as i32, b, c),
            DateFormat::DayMonthYearDash | DateFormat::DayMonthYearSlash => (c as i32, b, a),
            DateFormat::DayMonthShortYearSlash => (2000 + c as i32, b, a),
        }
    }
}

/// Split on the first separator found, requiring exactly three numeric fields.
fn split_date(raw: &str) -> Option<(char, [&str; 3])> {
    let sep = raw.chars().find(|c| *c == '-' || *c == '/')?;
    let mut iter = raw.split(sep);
    let parts = [iter.next()?, iter.next()?, iter.next()?];
    if iter.next().is_some() {
        return None;
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    Some((sep, parts))
}

/// Parse a date in any recognized layout.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TimestampError> {
    let trimmed = raw.trim();
    let format =
        DateFormat::detect(trimmed).ok_or_else(|| TimestampError::UnknownDateFormat(raw.to_string()))?;
    let (_, parts) =
        split_date(trimmed).ok_or_else(|| TimestampError::UnknownDateFormat(raw.to_string()))?;

    let mut numbers = [0u32; 3];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| TimestampError::InvalidDate(raw.to_string()))?;
    }

    let (year, month, day) = format.extract(numbers);
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| TimestampError::InvalidDate(raw.to_string()))
}

/// Parse a time of day, `HH:MM:SS` with optional fractional seconds.
pub fn parse_time(raw: &str) -> Result<NaiveTime, TimestampError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S%.f")
        .map_err(|_| TimestampError::InvalidTime(raw.to_string()))
}

/// Combine a date and optional time into a UTC instant.
///
/// Returns `Ok(None)` when the time is absent or blank: such a row is a
/// full-day aggregate and carries no instant.
pub fn normalize(date: &str, time: Option<&str>) -> Result<Option<Timestamp>, TimestampError> {
    let Some(time) = time.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Ok(Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time))))
}
