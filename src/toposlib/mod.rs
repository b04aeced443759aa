//! Ground observers and topocentric look angles
//!
//! An [`ObserverLocation`] is the single point on Earth the whole engine
//! works relative to. It is injected by the host and replaced wholesale when
//! the user moves; nothing in this crate persists it.
//!
//! The look-angle chain is:
//! ```text
//! Geodetic (lat/lon/elev) → ECF xyz
//! satellite ECF − observer ECF → rotate into (south, east, up) → (az, el, range)
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{WGS84_POLAR_RADIUS_KM, WGS84_RADIUS_KM};

/// Squared first eccentricity of the reference ellipsoid
fn ellipsoid_e2() -> f64 {
    let f = (WGS84_RADIUS_KM - WGS84_POLAR_RADIUS_KM) / WGS84_RADIUS_KM;
    2.0 * f - f * f
}

/// Where the observer stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    /// Display label, e.g. a city name
    pub name: String,
    /// Geodetic latitude in degrees (positive north)
    pub latitude: f64,
    /// Geodetic longitude in degrees (positive east)
    pub longitude: f64,
    /// Height above the ellipsoid in meters
    #[serde(default)]
    pub elevation_m: f64,
}

/// Azimuth, elevation and slant range from an observer to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// Degrees clockwise from North in `[0, 360)`
    pub azimuth: f64,
    /// Degrees above the horizon in `[-90, 90]`
    pub elevation: f64,
    /// Slant range in km
    pub range_km: f64,
}

impl ObserverLocation {
    /// Create an observer at sea level.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        ObserverLocation {
            name: name.into(),
            latitude,
            longitude,
            elevation_m: 0.0,
        }
    }

    /// Set the height above the ellipsoid.
    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Earth-Centered-Fixed position of the observer in km.
    pub fn ecf_km(&self) -> Vector3<f64> {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        let height_km = self.elevation_m / 1000.0;
        let e2 = ellipsoid_e2();

        let sinphi = lat.sin();
        let cosphi = lat.cos();

        // Radius of curvature in the prime vertical
        let n = WGS84_RADIUS_KM / (1.0 - e2 * sinphi * sinphi).sqrt();

        Vector3::new(
            (n + height_km) * cosphi * lon.cos(),
            (n + height_km) * cosphi * lon.sin(),
            (n * (1.0 - e2) + height_km) * sinphi,
        )
    }

    /// Look angles to a target given in Earth-Centered-Fixed km.
    pub fn look_angles(&self, target_ecf_km: &Vector3<f64>) -> LookAngles {
        let range = target_ecf_km - self.ecf_km();
        let (elevation, azimuth) = self.ecf_to_horizon(&range);
        LookAngles {
            azimuth: azimuth.to_degrees(),
            elevation: elevation.to_degrees(),
            range_km: range.norm(),
        }
    }

    /// Rotate an ECF direction vector into local horizon coordinates.
    ///
    /// Returns (elevation_radians, azimuth_radians) with azimuth in `[0, 2π)`.
    pub(crate) fn ecf_to_horizon(&self, direction: &Vector3<f64>) -> (f64, f64) {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();

        // Rotation from ECF to the topocentric (south, east, up) frame
        let south = slat * clon * direction.x + slat * slon * direction.y - clat * direction.z;
        let east = -slon * direction.x + clon * direction.y;
        let up = clat * clon * direction.x + clat * slon * direction.y + slat * direction.z;

        let r_horiz = (south * south + east * east).sqrt();
        let el = up.atan2(r_horiz);

        // Azimuth measured clockwise from north (north = -south)
        let az = east.atan2(-south).rem_euclid(std::f64::consts::TAU);

        (el, az)
    }
}

impl std::fmt::Display for ObserverLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.latitude >= 0.0 { "N" } else { "S" };
        let ew = if self.longitude >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{} ({:.4}° {}, {:.4}° {})",
            self.name,
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}
