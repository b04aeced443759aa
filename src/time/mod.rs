//! Instants and Julian dates
//!
//! Instants are `chrono::DateTime<Utc>` throughout the crate. This module
//! converts them to the Julian date scales used by the sidereal-time and
//! propagation code. UTC is used directly as an approximation of UT1; the
//! sub-second difference is invisible at radar resolution.

use chrono::{DateTime, Duration, Utc};

use crate::constants::{DAY_MS, J2000, JULIAN_CENTURY_DAYS, UNIX_EPOCH_JD};

/// Julian date of an instant.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS + UNIX_EPOCH_JD
}

/// Days elapsed since J2000.0.
pub fn days_since_j2000(instant: DateTime<Utc>) -> f64 {
    julian_date(instant) - J2000
}

/// Julian centuries elapsed since J2000.0.
pub fn centuries_since_j2000(instant: DateTime<Utc>) -> f64 {
    days_since_j2000(instant) / JULIAN_CENTURY_DAYS
}

/// Largest offset accepted by [`add_minutes`], about 30 000 years.
const MAX_OFFSET_MS: f64 = 1.0e15;

/// Offset an instant by a fractional number of minutes.
///
/// Millisecond resolution, which is all the sampling code needs. Returns
/// `None` for a non-finite offset or one that leaves the representable range.
pub fn add_minutes(instant: DateTime<Utc>, minutes: f64) -> Option<DateTime<Utc>> {
    let ms = (minutes * 60_000.0).round();
    if !ms.is_finite() || ms.abs() > MAX_OFFSET_MS {
        return None;
    }
    instant.checked_add_signed(Duration::milliseconds(ms as i64))
}
