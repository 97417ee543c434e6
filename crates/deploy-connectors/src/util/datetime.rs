//! ISO 8601 / RFC 3339 timestamp parsing and formatting.
//!
//! Timestamps keep the wall-clock reading and the offset they were written
//! with, so a value stored as UTC comes back as UTC and a value without any
//! zone designator comes back without one:
//!
//! ```text
//! 2024-03-15T14:30:00Z          UTC
//! 2024-03-15T14:30:00.5+05:30   explicit offset
//! 2024-03-15T14:30:00           unspecified
//! ```

use std::fmt;

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

/// Error type for timestamp parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl DateTimeParseError {
    fn invalid(what: &str, input: &str) -> Self {
        Self {
            message: format!("Invalid {what} in timestamp: {input}"),
        }
    }
}

impl fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

/// A point in time as read from a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Wall-clock microseconds since 1970-01-01T00:00:00 in the timestamp's own zone.
    pub local_us: i64,
    /// UTC offset in minutes; `None` when the zone is unspecified.
    pub offset_min: Option<i16>,
}

impl Timestamp {
    /// Creates a UTC timestamp from microseconds since the Unix epoch.
    pub fn utc(epoch_us: i64) -> Self {
        Self {
            local_us: epoch_us,
            offset_min: Some(0),
        }
    }

    /// Creates a timestamp for the given instant as seen from `offset_min`.
    pub fn with_offset(epoch_us: i64, offset_min: i16) -> Self {
        Self {
            local_us: epoch_us + offset_min as i64 * MICROSECONDS_PER_MINUTE,
            offset_min: Some(offset_min),
        }
    }

    /// Creates a timestamp with no zone information.
    pub fn unspecified(local_us: i64) -> Self {
        Self {
            local_us,
            offset_min: None,
        }
    }

    /// Returns the UTC instant, if the zone is known.
    pub fn epoch_us(&self) -> Option<i64> {
        self.offset_min
            .map(|offset| self.local_us - offset as i64 * MICROSECONDS_PER_MINUTE)
    }

    /// Parses an ISO 8601 timestamp (`YYYY-MM-DDTHH:MM:SS[.f][Z|±HH:MM]`).
    pub fn parse(s: &str) -> Result<Timestamp, DateTimeParseError> {
        parse_timestamp(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.local_us.div_euclid(MICROSECONDS_PER_DAY);
        let time_us = self.local_us.rem_euclid(MICROSECONDS_PER_DAY);
        let (year, month, day) = days_to_date(days);

        let hours = time_us / MICROSECONDS_PER_HOUR;
        let minutes = time_us % MICROSECONDS_PER_HOUR / MICROSECONDS_PER_MINUTE;
        let seconds = time_us % MICROSECONDS_PER_MINUTE / MICROSECONDS_PER_SECOND;
        let micros = time_us % MICROSECONDS_PER_SECOND;

        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
            year,
            month,
            day,
            hours,
            minutes,
            seconds,
            format_fractional_seconds(micros)
        )?;
        if let Some(offset) = self.offset_min {
            f.write_str(&format_timezone_offset(offset))?;
        }
        Ok(())
    }
}

/// Parses a timezone offset string (Z, +HH:MM, -HH:MM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str) -> Result<i16, DateTimeParseError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    let invalid = || DateTimeParseError {
        message: format!("Invalid timezone offset: {}", offset),
    };

    if offset.len() != 6 || offset.as_bytes()[3] != b':' {
        return Err(invalid());
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return Err(invalid()),
    };

    let hours: i16 = offset[1..3].parse().map_err(|_| invalid())?;
    let minutes: i16 = offset[4..6].parse().map_err(|_| invalid())?;

    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 60 + minutes))
}

/// Formats an offset in minutes as a timezone string (Z, +HH:MM, -HH:MM).
fn format_timezone_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }

    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.abs();
    format!("{}{:02}:{:02}", sign, abs_offset / 60, abs_offset % 60)
}

/// Parses fractional seconds and returns microseconds (extra digits are truncated).
fn parse_fractional_seconds(frac: &str) -> i64 {
    let mut padded: String = frac.chars().take(6).collect();
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

/// Formats microseconds as fractional seconds string, omitting if zero.
fn format_fractional_seconds(us: i64) -> String {
    if us == 0 {
        return String::new();
    }

    let digits = format!("{:06}", us);
    format!(".{}", digits.trim_end_matches('0'))
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a given date (Howard Hinnant's algorithm).
fn date_to_days(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let m = if month <= 2 { month as i64 + 9 } else { month as i64 - 3 };

    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let doy = (153 * m + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146097 + doe - 719468
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = (if z >= 0 { z } else { z - 146096 }) / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;

    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}

fn parse_number(s: &str, what: &str, input: &str) -> Result<i64, DateTimeParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateTimeParseError::invalid(what, input));
    }
    s.parse().map_err(|_| DateTimeParseError::invalid(what, input))
}

/// Parses an ISO 8601 timestamp keeping its zone designator (or lack of one).
pub fn parse_timestamp(input: &str) -> Result<Timestamp, DateTimeParseError> {
    let bytes = input.as_bytes();
    // Minimum length is 19 (YYYY-MM-DDTHH:MM:SS)
    if !input.is_ascii()
        || bytes.len() < 19
        || bytes[4] != b'-'
        || bytes[7] != b'-'
        || (bytes[10] != b'T' && bytes[10] != b' ')
        || bytes[13] != b':'
        || bytes[16] != b':'
    {
        return Err(DateTimeParseError {
            message: format!("Invalid ISO 8601 timestamp: {}", input),
        });
    }

    let year = parse_number(&input[..4], "year", input)?;
    let month = parse_number(&input[5..7], "month", input)? as u32;
    let day = parse_number(&input[8..10], "day", input)? as u32;
    let hours = parse_number(&input[11..13], "hours", input)?;
    let minutes = parse_number(&input[14..16], "minutes", input)?;
    let seconds = parse_number(&input[17..19], "seconds", input)?;

    if !(1..=12).contains(&month) {
        return Err(DateTimeParseError::invalid("month", input));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(DateTimeParseError::invalid("day", input));
    }
    if hours > 23 {
        return Err(DateTimeParseError::invalid("hours", input));
    }
    if minutes > 59 {
        return Err(DateTimeParseError::invalid("minutes", input));
    }
    if seconds > 59 {
        return Err(DateTimeParseError::invalid("seconds", input));
    }

    let rest = &input[19..];
    let (micros, zone) = match rest.strip_prefix('.') {
        Some(frac_and_zone) => {
            let frac_end = frac_and_zone
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(frac_and_zone.len());
            if frac_end == 0 {
                return Err(DateTimeParseError::invalid("fraction", input));
            }
            (
                parse_fractional_seconds(&frac_and_zone[..frac_end]),
                &frac_and_zone[frac_end..],
            )
        }
        None => (0, rest),
    };

    let offset_min = if zone.is_empty() {
        None
    } else {
        Some(parse_timezone_offset(zone)?)
    };

    let local_us = date_to_days(year, month, day) * MICROSECONDS_PER_DAY
        + hours * MICROSECONDS_PER_HOUR
        + minutes * MICROSECONDS_PER_MINUTE
        + seconds * MICROSECONDS_PER_SECOND
        + micros;

    Ok(Timestamp {
        local_us,
        offset_min,
    })
}
