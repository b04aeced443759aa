//! ECI ↔ Earth-fixed and geodetic transforms for SGP4 output
//!
//! SGP4 produces positions in the TEME frame, an Earth-Centered-Inertial
//! frame tied to the mean equinox. Rotating by the 1982 Greenwich Mean
//! Sidereal Time takes those positions into the Earth-Centered-Fixed frame
//! used for look angles and sub-satellite points.
//!
//! Reference: AIAA 2006-6753 (Revisiting Spacetrack Report #3)

use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix3, Vector3};

use crate::constants::{WGS84_POLAR_RADIUS_KM, WGS84_RADIUS_KM};

/// Iterations of the geodetic latitude fixed-point solve
const GEODETIC_ITERATIONS: usize = 20;

/// Sub-satellite point and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    /// Geodetic latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees, `[-180, 180]`
    pub longitude: f64,
    /// Height above the ellipsoid in km
    pub height_km: f64,
}

/// Rotation matrix about the Z axis
fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Rotate an ECI position (km) into the Earth-Centered-Fixed frame.
///
/// `gmst` is the Greenwich sidereal angle in radians.
pub fn eci_to_ecf(eci: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    rot_z(gmst) * eci
}

/// Convert an ECI position (km) into geodetic latitude, longitude and height.
pub fn eci_to_geodetic(eci: &Vector3<f64>, gmst: f64) -> Geodetic {
    let a = WGS84_RADIUS_KM;
    let f = (WGS84_RADIUS_KM - WGS84_POLAR_RADIUS_KM) / WGS84_RADIUS_KM;
    let e2 = 2.0 * f - f * f;

    let r = (eci.x * eci.x + eci.y * eci.y).sqrt();

    let mut longitude = eci.y.atan2(eci.x) - gmst;
    longitude = (longitude + PI).rem_euclid(TAU) - PI;

    let mut latitude = eci.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (eci.z + a * c * e2 * sin_lat).atan2(r);
    }

    // Guard the pole, where cos(lat) vanishes
    let height_km = if latitude.cos().abs() > 1e-9 {
        r / latitude.cos() - a * c
    } else {
        eci.z.abs() - WGS84_POLAR_RADIUS_KM
    };

    Geodetic {
        latitude: latitude.to_degrees(),
        longitude: longitude.to_degrees(),
        height_km,
    }
}
