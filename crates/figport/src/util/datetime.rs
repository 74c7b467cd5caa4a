//! ISO-8601 datetime parsing and formatting.
//!
//! Converts between the textual timestamps carried in documents and the
//! `(epoch_micros, offset)` pair stored in [`crate::model::Timestamp`]:
//! - With an offset, `epoch_micros` is microseconds since 1970-01-01T00:00:00Z.
//! - Without one (a naive timestamp), `epoch_micros` counts from
//!   1970-01-01T00:00:00 in whatever wall clock the source used.

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

/// Error type for ISO-8601 parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl DateTimeParseError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

/// Parses a timezone offset string (Z, +HH:MM, -HH:MM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str) -> Result<i16, DateTimeParseError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    let invalid = || DateTimeParseError::new(format!("Invalid timezone offset: {}", offset));

    if offset.len() != 6 || !offset.is_char_boundary(1) {
        return Err(invalid());
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return Err(invalid()),
    };

    if offset.as_bytes()[3] != b':' {
        return Err(invalid());
    }

    let hours: i16 = parse_digits(&offset[1..3]).ok_or_else(invalid)?;
    let minutes: i16 = parse_digits(&offset[4..6]).ok_or_else(invalid)?;

    // Allow 24:00 as special case for ±24:00
    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 60 + minutes))
}

/// Formats an offset in minutes as +HH:MM / -HH:MM.
///
/// UTC is written as `+00:00` rather than `Z` so the text matches what the
/// exporting application printed for aware datetimes.
fn format_timezone_offset(offset_min: i16) -> String {
    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs_offset / 60, abs_offset % 60)
}

/// Parses a run of ASCII digits; rejects signs and whitespace that `str::parse` would accept.
fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses fractional seconds string and returns microseconds.
///
/// Digits past the sixth are truncated.
fn parse_fractional_seconds(frac: &str) -> Option<i64> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut padded: String = frac.chars().take(6).collect();
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.parse().ok()
}

/// Formats microseconds as fractional seconds string, omitting if zero.
fn format_fractional_seconds(us: i64) -> String {
    if us == 0 {
        return String::new();
    }

    // Convert to 6-digit string and trim trailing zeros
    let str = format!("{:06}", us);
    let trimmed = str.trim_end_matches('0');
    format!(".{}", trimmed)
}

/// Returns true if the given year is a leap year.
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a given date.
fn date_to_days(year: i32, month: u32, day: u32) -> i64 {
    // Howard Hinnant's days_from_civil
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 { month as i64 + 9 } else { month as i64 - 3 };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let doy = (153 * m + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146097 + doe - 719468
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    // Howard Hinnant's civil_from_days
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;

    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}

/// Parses an ISO-8601 datetime (`YYYY-MM-DD[T ]HH:MM[:SS[.ffffff]][offset]`).
///
/// Returns microseconds since the epoch and the offset in minutes, or `None`
/// for the offset when the text carried none. A bare `YYYY-MM-DD` is accepted
/// as midnight.
pub fn parse_datetime_iso8601(datetime_str: &str) -> Result<(i64, Option<i16>), DateTimeParseError> {
    let invalid = || DateTimeParseError::new(format!("Invalid ISO-8601 datetime: {}", datetime_str));

    if !datetime_str.is_ascii() || datetime_str.len() < 10 {
        return Err(invalid());
    }

    let bytes = datetime_str.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }

    let year: i32 = parse_digits(&datetime_str[..4]).ok_or_else(invalid)?;
    let month: u32 = parse_digits(&datetime_str[5..7])
        .ok_or_else(|| DateTimeParseError::new(format!("Invalid month in datetime: {}", datetime_str)))?;
    let day: u32 = parse_digits(&datetime_str[8..10])
        .ok_or_else(|| DateTimeParseError::new(format!("Invalid day in datetime: {}", datetime_str)))?;

    if !(1..=12).contains(&month) {
        return Err(DateTimeParseError::new(format!("Invalid month in datetime: {}", datetime_str)));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(DateTimeParseError::new(format!("Invalid day in datetime: {}", datetime_str)));
    }

    let days = date_to_days(year, month, day);

    if datetime_str.len() == 10 {
        return Ok((days * MICROSECONDS_PER_DAY, None));
    }

    // Check for T or space separator
    if bytes[10] != b'T' && bytes[10] != b' ' {
        return Err(invalid());
    }

    let time_part = &datetime_str[11..];
    if time_part.len() < 5 || time_part.as_bytes()[2] != b':' {
        return Err(invalid());
    }

    let hours: i64 = parse_digits(&time_part[..2])
        .ok_or_else(|| DateTimeParseError::new(format!("Invalid hours in datetime: {}", datetime_str)))?;
    let minutes: i64 = parse_digits(&time_part[3..5])
        .ok_or_else(|| DateTimeParseError::new(format!("Invalid minutes in datetime: {}", datetime_str)))?;

    // Seconds are optional
    let (seconds, rest) = if time_part.len() >= 8 && time_part.as_bytes()[5] == b':' {
        let seconds: i64 = parse_digits(&time_part[6..8])
            .ok_or_else(|| DateTimeParseError::new(format!("Invalid seconds in datetime: {}", datetime_str)))?;
        (seconds, &time_part[8..])
    } else {
        (0, &time_part[5..])
    };

    if hours > 23 {
        return Err(DateTimeParseError::new(format!("Invalid hours in datetime: {}", datetime_str)));
    }
    if minutes > 59 {
        return Err(DateTimeParseError::new(format!("Invalid minutes in datetime: {}", datetime_str)));
    }
    if seconds > 59 {
        return Err(DateTimeParseError::new(format!("Invalid seconds in datetime: {}", datetime_str)));
    }

    // Parse optional fractional seconds and timezone
    let (microseconds, offset_str) = if let Some(after_dot) = rest.strip_prefix('.') {
        let frac_end = after_dot
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_dot.len());
        let micros = parse_fractional_seconds(&after_dot[..frac_end]).ok_or_else(invalid)?;
        let tz = &after_dot[frac_end..];
        (micros, if tz.is_empty() { None } else { Some(tz) })
    } else if rest.is_empty() {
        (0, None)
    } else {
        (0, Some(rest))
    };

    let offset_min = offset_str.map(parse_timezone_offset).transpose()?;

    let local_micros = days * MICROSECONDS_PER_DAY
        + hours * MICROSECONDS_PER_HOUR
        + minutes * MICROSECONDS_PER_MINUTE
        + seconds * MICROSECONDS_PER_SECOND
        + microseconds;

    // local time = UTC + offset, so UTC = local - offset
    let epoch_micros = match offset_min {
        Some(offset) => local_micros - offset as i64 * MICROSECONDS_PER_MINUTE,
        None => local_micros,
    };

    Ok((epoch_micros, offset_min))
}

/// Formats microseconds since the epoch as an ISO-8601 datetime.
///
/// The offset suffix is written only when one is given; naive timestamps
/// stay naive.
pub fn format_datetime_iso8601(epoch_micros: i64, offset_min: Option<i16>) -> String {
    let local_us = epoch_micros + offset_min.unwrap_or(0) as i64 * MICROSECONDS_PER_MINUTE;

    let days = local_us.div_euclid(MICROSECONDS_PER_DAY);
    let time_micros = local_us.rem_euclid(MICROSECONDS_PER_DAY);

    let (year, month, day) = days_to_date(days);

    let hours = time_micros / MICROSECONDS_PER_HOUR;
    let remaining1 = time_micros % MICROSECONDS_PER_HOUR;
    let minutes = remaining1 / MICROSECONDS_PER_MINUTE;
    let remaining2 = remaining1 % MICROSECONDS_PER_MINUTE;
    let seconds = remaining2 / MICROSECONDS_PER_SECOND;
    let microseconds = remaining2 % MICROSECONDS_PER_SECOND;

    let frac = format_fractional_seconds(microseconds);
    let offset = offset_min.map(format_timezone_offset).unwrap_or_default();

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
        year, month, day, hours, minutes, seconds, frac, offset
    )
}
