//! Azimuth/elevation → plotting-surface coordinates
//!
//! A polar (azimuthal equidistant in elevation) projection: the zenith sits
//! at the centre of the plotting circle and the horizon on its rim.
//!
//! Two conventions exist and are easy to confuse, so they are an explicit
//! enum rather than a flag:
//!
//! - [`ViewMode::Map`]: looking down, as on a ground map: North up, East
//!   right, azimuth increasing clockwise.
//! - [`ViewMode::Sky`]: looking up at the sky: North up, East **left**.
//!
//! Screen coordinates have `y` increasing downward.

use serde::{Deserialize, Serialize};

/// Which way the plotting surface is being looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Ground-track convention, East to the right
    #[default]
    Map,
    /// Sky-looking-up convention, East to the left
    Sky,
}

impl ViewMode {
    /// Screen angle in degrees (standard math orientation, `y` down) for an
    /// azimuth.
    pub fn screen_angle_deg(&self, azimuth_deg: f64) -> f64 {
        match self {
            ViewMode::Map => azimuth_deg - 90.0,
            ViewMode::Sky => 270.0 - azimuth_deg,
        }
    }

    /// Cardinal direction labels and their azimuths, in drawing order.
    ///
    /// The same labels land on different sides in the two conventions; the
    /// returned order walks the screen clockwise from the top.
    pub fn cardinal_labels(&self) -> [(&'static str, f64); 4] {
        match self {
            ViewMode::Map => [("N", 0.0), ("E", 90.0), ("S", 180.0), ("W", 270.0)],
            ViewMode::Sky => [("N", 0.0), ("W", 270.0), ("S", 180.0), ("E", 90.0)],
        }
    }

    /// The other convention.
    pub fn mirrored(&self) -> ViewMode {
        match self {
            ViewMode::Map => ViewMode::Sky,
            ViewMode::Sky => ViewMode::Map,
        }
    }
}

/// A point on the plotting surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of this point around `center`, in radians `[0, 2π)`.
    pub fn angle_around(&self, center: &ScreenPoint) -> f64 {
        (self.y - center.y)
            .atan2(self.x - center.x)
            .rem_euclid(std::f64::consts::TAU)
    }
}

/// Place a point at `distance` from the centre along an azimuth.
///
/// Used for labels outside the horizon ring, where [`project`] does not
/// apply.
pub fn polar_point(
    azimuth_deg: f64,
    distance: f64,
    cx: f64,
    cy: f64,
    mode: ViewMode,
) -> ScreenPoint {
    let angle = mode.screen_angle_deg(azimuth_deg).to_radians();
    ScreenPoint::new(cx + distance * angle.cos(), cy + distance * angle.sin())
}

/// Project a horizontal direction onto the plotting circle.
///
/// `radius · (1 − el/90)` from the centre. Only meaningful for
/// `elevation_deg` in `[0, 90]`: objects below the horizon are not drawn
/// and callers must not project them.
pub fn project(
    azimuth_deg: f64,
    elevation_deg: f64,
    cx: f64,
    cy: f64,
    radius: f64,
    mode: ViewMode,
) -> ScreenPoint {
    let r = radius * (1.0 - elevation_deg / 90.0);
    polar_point(azimuth_deg, r, cx, cy, mode)
}

/// Stable fallback azimuth for an object with no known right ascension.
///
/// A 32-bit string hash (`h = h·31 + unit` over UTF-16 code units, wrapping)
/// mapped to `[0, 360)`. The same key always lands at the same angle, so
/// such objects do not jump between refreshes.
pub fn fallback_angle(key: &str) -> f64 {
    let hash = key
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
    (hash.unsigned_abs() % 360) as f64
}
