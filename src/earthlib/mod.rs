//! Earth rotation, sidereal time, and atmospheric refraction
//!
//! Provides Greenwich Mean Sidereal Time in two formulations: the
//! third-order polynomial in centuries since J2000 (Meeus, eq. 12.4) used by
//! the equatorial → horizontal chain, and the 1982 formulation from
//! AIAA 2006-6753 that SGP4's TEME frame is defined against. Refraction
//! uses the Bennett (1982) formula.

use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

use crate::constants::{DAY_S, J2000, JULIAN_CENTURY_DAYS};
use crate::time::{centuries_since_j2000, days_since_j2000, julian_date};

/// Greenwich Mean Sidereal Time in degrees, wrapped into `[0, 360)`.
pub fn gmst_degrees(instant: DateTime<Utc>) -> f64 {
    let d = days_since_j2000(instant);
    let t = centuries_since_j2000(instant);
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    theta.rem_euclid(360.0)
}

/// Greenwich Mean Sidereal Time in hours, wrapped into `[0, 24)`.
pub fn gmst_hours(instant: DateTime<Utc>) -> f64 {
    (gmst_degrees(instant) / 15.0).rem_euclid(24.0)
}

/// Local Sidereal Time in hours for an East-positive longitude.
pub fn local_sidereal_time(instant: DateTime<Utc>, longitude_deg: f64) -> f64 {
    (gmst_hours(instant) + longitude_deg / 15.0).rem_euclid(24.0)
}

/// Greenwich Mean Sidereal Time (1982 formulation) in radians `[0, 2π)`.
///
/// This is the angle SGP4's TEME output is rotated by to reach the
/// Earth-fixed frame. The whole and fractional parts of the Julian date are
/// kept apart to preserve precision in the day fraction.
pub fn gmst1982(instant: DateTime<Utc>) -> f64 {
    let jd = julian_date(instant);
    let jd_whole = jd.floor();
    let frac = jd - jd_whole;
    let t = (jd_whole - J2000 + frac) / JULIAN_CENTURY_DAYS;

    // Seconds of time
    let g = 67_310.548_41 + (8_640_184.812_866 + (0.093_104 + (-6.2e-6) * t) * t) * t;

    (jd_whole.rem_euclid(1.0) + frac + g / DAY_S).rem_euclid(1.0) * TAU
}

/// Bennett's refraction for a geometric altitude, in degrees.
///
/// `R = cot(h + 7.31 / (h + 4.4))` arcminutes with `h` in degrees. Zero at
/// or below the geometric horizon: refraction is never applied to objects
/// that are not up.
pub fn bennett_refraction(altitude_deg: f64) -> f64 {
    if altitude_deg <= 0.0 {
        return 0.0;
    }
    let arg = (altitude_deg + 7.31 / (altitude_deg + 4.4)).to_radians();
    let arcminutes = (1.0 / arg.tan()).max(0.0);
    arcminutes / 60.0
}

/// Apply Bennett's refraction to a geometric altitude.
///
/// The result is clamped so the zenith is never overshot.
pub fn refract(altitude_deg: f64) -> f64 {
    (altitude_deg + bennett_refraction(altitude_deg)).min(90.0)
}
