use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use crate::error::{AppError, AppResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a client-supplied booking time. Offsets are converted to UTC;
/// values without an offset are taken as UTC. Sub-second precision is
/// dropped, since slots are compared at whole seconds.
pub fn parse_booking_time(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| AppError::validation("invalid date format"))?;

    parsed
        .with_nanosecond(0)
        .ok_or_else(|| AppError::validation("invalid date format"))
}
