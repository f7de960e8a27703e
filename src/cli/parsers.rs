//! Value parsers for use with clap's `value_parser` attribute.

use crate::utils::error::{NpgError, Result};
use crate::utils::validation::{validate_range, validate_readable_file};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::path::PathBuf;

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y%m%dT%H%M%S%z",
    "%Y%m%dT%H%M%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parses an ISO 8601 date or date and time.
///
/// Values without an offset are taken to be UTC; values with one are converted
/// to UTC. Offsets may be `Z`, `+hh:mm`, `+hhmm` or `+hh`. A comma may stand
/// for the decimal point, and reduced precision forms such as `2022-01` and
/// `2022-01-30T11` are accepted.
///
/// ```
/// use npg::cli::parse_iso_date;
///
/// let dt = parse_iso_date("2022-01-30T11:11:03Z").unwrap();
/// assert_eq!(dt.to_rfc3339(), "2022-01-30T11:11:03+00:00");
/// assert!(parse_iso_date("30/01/2022").is_err());
/// ```
pub fn parse_iso_date(date: &str) -> Result<DateTime<Utc>> {
    let value = normalize_iso_date(date.trim());
    let value = value.as_str();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(dt.and_utc());
        }
    }

    // Hour only, e.g. 2022-01-30T11
    if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{}:00", naive), "%Y-%m-%dT%H:%M") {
        return Ok(dt.and_utc());
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc());
        }
    }

    // Year and month, e.g. 2022-01
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN).and_utc());
    }

    Err(NpgError::InvalidArgument {
        value: date.to_string(),
        reason: format!(
            "Incorrect format {}. Please use ISO8601 UTC e.g. 2022-01-30T11:11:03Z",
            date
        ),
    })
}

/// Uses `.` as the decimal mark and widens an hour-only offset (`+01`) to `+0100`.
fn normalize_iso_date(value: &str) -> String {
    let mut normalized = value.replace(',', ".");

    if normalized.contains(|c: char| c == 'T' || c == ' ') {
        let bytes = normalized.as_bytes();
        let n = bytes.len();
        if n > 3
            && matches!(bytes[n - 3], b'+' | b'-')
            && bytes[n - 2].is_ascii_digit()
            && bytes[n - 1].is_ascii_digit()
        {
            normalized.push_str("00");
        }
    }

    normalized
}

/// Returns a parser accepting integers from `minimum` to `maximum` inclusive.
///
/// ```
/// use clap::Parser;
/// use npg::cli::integer_in_range;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[arg(long, value_parser = integer_in_range(1, 10))]
///     threads: i64,
/// }
///
/// assert_eq!(Cli::try_parse_from(["app", "--threads", "4"]).unwrap().threads, 4);
/// assert!(Cli::try_parse_from(["app", "--threads", "11"]).is_err());
/// ```
pub fn integer_in_range(
    minimum: i64,
    maximum: i64,
) -> impl Fn(&str) -> Result<i64> + Clone + Send + Sync + 'static {
    move |value: &str| {
        let val: i64 = value
            .trim()
            .parse()
            .map_err(|_| NpgError::InvalidArgument {
                value: value.to_string(),
                reason: format!("Value {} is not an integer", value),
            })?;

        validate_range(val, minimum, maximum)?;
        Ok(val)
    }
}

/// Accepts a path to a file that exists and can be opened for reading.
pub fn readable_file(value: &str) -> Result<PathBuf> {
    validate_readable_file("file", value)?;
    Ok(PathBuf::from(value))
}
