//! Equatorial → horizontal coordinate conversion
//!
//! Converts a right ascension / declination pair into the azimuth and
//! elevation seen by an observer on the ground at a given instant.
//!
//! The chain is:
//! ```text
//! instant → JD → GMST → LST (+ longitude) → hour angle → (alt, az)
//! ```
//!
//! Elevation above 0° is corrected for atmospheric refraction. The
//! correction raises an object by at most ~0.6° (just above the horizon)
//! and never pushes it past the zenith, so the result stays in `[-90, 90]`.

use chrono::{DateTime, Utc};

use crate::earthlib::{local_sidereal_time, refract};

/// Minimum `|cos(el)·cos(lat)|` for which the azimuth cosine rule is evaluated
const AZIMUTH_DENOMINATOR_EPSILON: f64 = 1e-6;

/// A direction in the observer's horizontal frame, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    /// Compass bearing, clockwise from North, in `[0, 360)`
    pub azimuth: f64,
    /// Angle above the horizon in `[-90, 90]` (refracted when positive)
    pub elevation: f64,
}

impl Horizontal {
    /// Whether the direction is above the observer's horizon.
    pub fn is_visible(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Convert equatorial coordinates to horizontal coordinates.
///
/// # Arguments
/// * `ra_deg` - Right ascension in degrees
/// * `dec_deg` - Declination in degrees
/// * `lat_deg` - Observer latitude in degrees (positive north)
/// * `lng_deg` - Observer longitude in degrees (positive east)
/// * `instant` - Observation instant
///
/// The azimuth is computed from the geometric (unrefracted) elevation.
pub fn equatorial_to_horizontal(
    ra_deg: f64,
    dec_deg: f64,
    lat_deg: f64,
    lng_deg: f64,
    instant: DateTime<Utc>,
) -> Horizontal {
    let lst = local_sidereal_time(instant, lng_deg);
    let hour_angle = (lst - ra_deg / 15.0).rem_euclid(24.0);
    let ha = (hour_angle * 15.0).to_radians();

    let dec = dec_deg.to_radians();
    let lat = lat_deg.to_radians();

    let sin_el = (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).clamp(-1.0, 1.0);
    let el = sin_el.asin();

    let denominator = el.cos() * lat.cos();
    let mut azimuth = if denominator.abs() > AZIMUTH_DENOMINATOR_EPSILON {
        let cos_az = ((dec.sin() - el.sin() * lat.sin()) / denominator).clamp(-1.0, 1.0);
        cos_az.acos().to_degrees()
    } else {
        0.0
    };
    if ha.sin() > 0.0 {
        azimuth = 360.0 - azimuth;
    }

    Horizontal {
        azimuth: normalize_degrees(azimuth),
        elevation: refract(el.to_degrees()),
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 21, 0, 0).unwrap()
    }

    #[test]
    fn test_zenith_when_dec_equals_lat_on_meridian() {
        let t = instant();
        let (lat, lng) = (52.5, 13.4);
        let ra = local_sidereal_time(t, lng) * 15.0;
        let h = equatorial_to_horizontal(ra, lat, lat, lng, t);
        assert_relative_eq!(h.elevation, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_output_ranges() {
        let t = instant();
        for ra in (0..360).step_by(17) {
            for dec in (-90..=90).step_by(15) {
                for lat in [-89.9, -45.0, 0.0, 33.3, 89.9] {
                    let h = equatorial_to_horizontal(ra as f64, dec as f64, lat, -71.06, t);
                    assert!(
                        (0.0..360.0).contains(&h.azimuth),
                        "azimuth {} out of range",
                        h.azimuth
                    );
                    assert!(
                        (-90.0..=90.0).contains(&h.elevation),
                        "elevation {} out of range",
                        h.elevation
                    );
                }
            }
        }
    }

    #[test]
    fn test_object_on_meridian_south_of_zenith() {
        // Upper culmination with dec < lat: due south
        let t = instant();
        let (lat, lng) = (52.5, 13.4);
        let ra = local_sidereal_time(t, lng) * 15.0;
        let h = equatorial_to_horizontal(ra, 0.0, lat, lng, t);
        assert_relative_eq!(h.azimuth, 180.0, epsilon = 1e-4);
        // Geometric altitude 37.5° plus ~0.02° refraction
        assert!(h.elevation > 37.5 && h.elevation < 37.55);
    }

    #[test]
    fn test_east_west_quadrants() {
        let t = instant();
        let (lat, lng) = (40.0, -105.0);
        let lst_deg = local_sidereal_time(t, lng) * 15.0;
        // Six hours before transit: rising in the east
        let rising = equatorial_to_horizontal(lst_deg + 90.0, 0.0, lat, lng, t);
        assert_relative_eq!(rising.azimuth, 90.0, epsilon = 1e-6);
        // Six hours after transit: setting in the west
        let setting = equatorial_to_horizontal(lst_deg - 90.0, 0.0, lat, lng, t);
        assert_relative_eq!(setting.azimuth, 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_refraction_below_horizon() {
        let t = instant();
        let (lat, lng) = (52.5, 13.4);
        let ra = local_sidereal_time(t, lng) * 15.0 + 180.0;
        // Lower culmination of an equatorial star: geometric altitude -37.5°
        let h = equatorial_to_horizontal(ra, 0.0, lat, lng, t);
        assert_relative_eq!(h.elevation, -37.5, epsilon = 1e-6);
        assert!(!h.is_visible());
    }

    #[test]
    fn test_pole_observer_does_not_divide_by_zero() {
        let t = instant();
        let h = equatorial_to_horizontal(10.0, 20.0, 90.0, 0.0, t);
        assert!(h.azimuth.is_finite());
        assert_relative_eq!(h.elevation, 20.0, epsilon = 0.1);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(-90.0), 270.0);
        assert_relative_eq!(normalize_degrees(720.5), 0.5);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }
}
