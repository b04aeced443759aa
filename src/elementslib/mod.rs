//! Static orbital parameters from mean elements
//!
//! Perigee and apogee altitudes, inclination and period, derived directly
//! from the element set rather than from propagation. These do not change
//! between frames: compute them once when an object is selected.
//!
//! # Example
//!
//! ```ignore
//! use skyradar::elementslib::orbital_parameters;
//!
//! if let Some(p) = orbital_parameters(&iss) {
//!     println!("{:.0} × {:.0} km, {:.1}°", p.perigee_km, p.apogee_km, p.inclination_deg);
//! }
//! ```

use std::f64::consts::TAU;

use crate::constants::{DAY_S, EARTH_MEAN_RADIUS_KM, GM_EARTH_KM3_S2, MINUTES_PER_DAY};
use crate::sgp4lib::TrackedObject;

/// Shape and orientation summary of an orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalParameters {
    /// Perigee altitude above the mean Earth radius, floored at 0
    pub perigee_km: f64,
    /// Apogee altitude above the mean Earth radius, floored at 0
    pub apogee_km: f64,
    /// Inclination in degrees
    pub inclination_deg: f64,
    /// Semi-major axis in km
    pub semi_major_axis_km: f64,
    /// Orbital period in minutes
    pub period_minutes: f64,
}

impl OrbitalParameters {
    /// Derive parameters from mean elements.
    ///
    /// # Arguments
    /// * `mean_motion_rev_per_day` - Mean motion in revolutions per day
    /// * `eccentricity` - Eccentricity (dimensionless)
    /// * `inclination_rad` - Inclination in radians
    ///
    /// Returns `None` for a non-positive or non-finite mean motion.
    pub fn from_mean_elements(
        mean_motion_rev_per_day: f64,
        eccentricity: f64,
        inclination_rad: f64,
    ) -> Option<Self> {
        if !(mean_motion_rev_per_day.is_finite() && mean_motion_rev_per_day > 0.0) {
            return None;
        }

        // Kepler's third law: a = (μ / n²)^(1/3), n in rad/s
        let n_rad_s = mean_motion_rev_per_day * TAU / DAY_S;
        let a = (GM_EARTH_KM3_S2 / (n_rad_s * n_rad_s)).cbrt();

        let perigee = a * (1.0 - eccentricity) - EARTH_MEAN_RADIUS_KM;
        let apogee = a * (1.0 + eccentricity) - EARTH_MEAN_RADIUS_KM;

        Some(OrbitalParameters {
            perigee_km: perigee.max(0.0),
            apogee_km: apogee.max(0.0),
            inclination_deg: inclination_rad.to_degrees(),
            semi_major_axis_km: a,
            period_minutes: MINUTES_PER_DAY / mean_motion_rev_per_day,
        })
    }
}

/// Orbital parameters of a tracked object, or `None` if its mean motion is
/// unusable.
pub fn orbital_parameters(object: &TrackedObject) -> Option<OrbitalParameters> {
    let elements = object.elements();
    OrbitalParameters::from_mean_elements(
        elements.mean_motion,
        elements.eccentricity,
        elements.inclination.to_radians(),
    )
}
