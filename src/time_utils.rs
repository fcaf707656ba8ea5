use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{HunterError, Result};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Accepts a literal `Z` suffix or a numeric offset. Timestamps without any
/// timezone information are taken to be UTC.
pub fn parse_iso_datetime(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    let offset_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(err) => err,
    };

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| HunterError::InvalidTimestamp {
            value: value.to_string(),
            source: offset_err,
        })
}

/// Elapsed seconds between two ISO-8601 timestamps (`end - start`).
#[allow(clippy::cast_precision_loss)]
pub fn duration_seconds(start: &str, end: &str) -> Result<f64> {
    let start = parse_iso_datetime(start)?;
    let end = parse_iso_datetime(end)?;
    let elapsed = end - start;

    // Microsecond resolution keeps fractional seconds without overflow concerns
    match elapsed.num_microseconds() {
        Some(micros) => Ok(micros as f64 / 1_000_000.0),
        None => Ok(elapsed.num_milliseconds() as f64 / 1_000.0),
    }
}
