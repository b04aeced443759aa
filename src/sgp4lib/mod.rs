//! SGP4 look angles and sampled trajectories
//!
//! This module turns two-line element sets into observer-relative
//! [`HorizonPosition`]s. Propagation itself is delegated to the `sgp4`
//! crate; everything after it (TEME → Earth-fixed, geodetic sub-point,
//! topocentric look angles) is done here.
//!
//! Propagation can fail for an individual object at an individual instant
//! (decayed orbit, diverging deep-space terms). Those failures are not
//! errors for callers: [`current_look_angle`] returns `None` and
//! [`future_path`] skips the sample.
//!
//! # Example
//!
//! ```ignore
//! use skyradar::sgp4lib::{current_look_angle, OrbitalElementSet, TrackedObject};
//! use skyradar::ObserverLocation;
//!
//! let iss = OrbitalElementSet::new("25544", "ISS (ZARYA)", "station", LINE1, LINE2);
//! let iss = TrackedObject::from_element_set(&iss)?;
//! let berlin = ObserverLocation::new("Berlin", 52.5, 13.4);
//! if let Some(pos) = current_look_angle(&iss, chrono::Utc::now(), &berlin) {
//!     println!("az {:.1}° el {:.1}° range {:.0} km", pos.azimuth, pos.elevation, pos.range_km);
//! }
//! ```

pub mod frames;
pub mod passes;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use sgp4::{Constants, Elements, MinutesSinceEpoch};
use tracing::debug;

use crate::coordlib::normalize_degrees;
use crate::earthlib::gmst1982;
use crate::time::add_minutes;
use crate::toposlib::ObserverLocation;
use crate::TrackerError;

use frames::{eci_to_ecf, eci_to_geodetic};

pub use passes::{find_passes, PassSummary};

/// Default look-ahead window for a selection path, in minutes
pub const DEFAULT_PATH_MINUTES: f64 = 90.0;

/// Default sampling step for a selection path, in minutes
pub const DEFAULT_PATH_STEP_MINUTES: f64 = 0.2;

/// Most samples a single path may hold
pub const MAX_PATH_SAMPLES: usize = 100_000;

/// Raw two-line element data plus identity, as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementSet {
    /// Catalog identifier (unique)
    pub id: String,
    /// Display name
    pub name: String,
    /// Classification tag, e.g. "station", "debris", "starlink"
    #[serde(rename = "type")]
    pub kind: String,
    /// First TLE line
    pub line1: String,
    /// Second TLE line
    pub line2: String,
}

impl OrbitalElementSet {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Self {
        OrbitalElementSet {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}

/// An observer-relative position of a tracked object at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorizonPosition {
    /// Degrees clockwise from North in `[0, 360)`
    pub azimuth: f64,
    /// Degrees above the horizon in `[-90, 90]`; `> 0` means visible
    pub elevation: f64,
    /// Slant range from the observer in km
    pub range_km: f64,
    /// Height above the ellipsoid in km
    pub height_km: f64,
    /// Sub-point geodetic latitude in degrees
    pub latitude: f64,
    /// Sub-point longitude in degrees
    pub longitude: f64,
    /// Inertial speed in km/s
    pub velocity_km_s: f64,
    /// Instant the position was computed for
    pub timestamp: Option<DateTime<Utc>>,
}

impl HorizonPosition {
    /// Whether the object is above the observer's horizon.
    pub fn is_visible(&self) -> bool {
        self.elevation > 0.0
    }
}

/// The join the render engine consumes: identity plus current position.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualObject {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub position: HorizonPosition,
}

/// An element set parsed and initialised for propagation.
///
/// Parsing happens once; every look-angle evaluation reuses the SGP4
/// constants.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Classification tag
    pub kind: String,
    /// The SGP4 propagator constants
    model: Constants,
    /// Parsed mean elements
    elements: Elements,
}

impl TrackedObject {
    /// Parse an element set and initialise the propagator.
    pub fn from_element_set(set: &OrbitalElementSet) -> Result<Self, TrackerError> {
        let elements = Elements::from_tle(
            Some(set.name.clone()),
            set.line1.trim().as_bytes(),
            set.line2.trim().as_bytes(),
        )
        .map_err(|e| TrackerError::InvalidElements {
            id: set.id.clone(),
            reason: format!("{:?}", e),
        })?;

        let model = Constants::from_elements(&elements).map_err(|e| {
            TrackerError::InvalidElements {
                id: set.id.clone(),
                reason: format!("SGP4 initialization failed: {:?}", e),
            }
        })?;

        Ok(TrackedObject {
            id: set.id.clone(),
            name: set.name.clone(),
            kind: set.kind.clone(),
            model,
            elements,
        })
    }

    /// Parsed mean elements.
    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// Minutes from the element-set epoch to `instant`.
    pub fn minutes_since_epoch(&self, instant: DateTime<Utc>) -> f64 {
        let delta = instant.naive_utc() - self.elements.datetime;
        delta.num_milliseconds() as f64 / 60_000.0
    }

    /// ECI (TEME) position in km and velocity in km/s at `instant`.
    pub fn position_and_velocity_eci_km(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<(Vector3<f64>, Vector3<f64>), TrackerError> {
        let prediction = self
            .model
            .propagate(MinutesSinceEpoch(self.minutes_since_epoch(instant)))
            .map_err(|e| TrackerError::Propagation(format!("{} at {}: {:?}", self.id, instant, e)))?;

        let pos = Vector3::new(
            prediction.position[0],
            prediction.position[1],
            prediction.position[2],
        );
        let vel = Vector3::new(
            prediction.velocity[0],
            prediction.velocity[1],
            prediction.velocity[2],
        );

        if !(pos.iter().all(|v| v.is_finite()) && vel.iter().all(|v| v.is_finite())) {
            return Err(TrackerError::Propagation(format!(
                "{} at {}: non-finite state vector",
                self.id, instant
            )));
        }

        Ok((pos, vel))
    }

    /// Observer-relative position at `instant`.
    pub fn horizon_position(
        &self,
        instant: DateTime<Utc>,
        observer: &ObserverLocation,
    ) -> Result<HorizonPosition, TrackerError> {
        let (eci, vel) = self.position_and_velocity_eci_km(instant)?;
        let gmst = gmst1982(instant);

        let geodetic = eci_to_geodetic(&eci, gmst);
        let ecf = eci_to_ecf(&eci, gmst);
        let look = observer.look_angles(&ecf);

        Ok(HorizonPosition {
            azimuth: normalize_degrees(look.azimuth),
            elevation: look.elevation,
            range_km: look.range_km,
            height_km: geodetic.height_km,
            latitude: geodetic.latitude,
            longitude: geodetic.longitude,
            velocity_km_s: vel.norm(),
            timestamp: Some(instant),
        })
    }

    /// Join identity and position for the render engine.
    pub fn visual(&self, position: HorizonPosition) -> VisualObject {
        VisualObject {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            position,
        }
    }
}

/// Current look angle of one object, or `None` if it cannot be tracked at
/// this instant.
pub fn current_look_angle(
    object: &TrackedObject,
    instant: DateTime<Utc>,
    observer: &ObserverLocation,
) -> Option<HorizonPosition> {
    match object.horizon_position(instant, observer) {
        Ok(pos) => Some(pos),
        Err(e) => {
            debug!(id = %object.id, error = %e, "object temporarily untrackable");
            None
        }
    }
}

/// An ordered, timestamped sequence of future positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitPath {
    samples: Vec<HorizonPosition>,
}

impl OrbitPath {
    pub fn new(samples: Vec<HorizonPosition>) -> Self {
        OrbitPath { samples }
    }

    pub fn samples(&self) -> &[HorizonPosition] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop samples whose timestamp is already in the past.
    pub fn prune_elapsed(&mut self, now: DateTime<Utc>) {
        self.samples
            .retain(|s| s.timestamp.map_or(true, |t| t >= now));
    }

    /// Samples still ahead of `now`, without modifying the path.
    pub fn remaining(&self, now: DateTime<Utc>) -> &[HorizonPosition] {
        let start = self
            .samples
            .iter()
            .position(|s| s.timestamp.map_or(true, |t| t >= now))
            .unwrap_or(self.samples.len());
        &self.samples[start..]
    }

    /// Split into runs of consecutive above-horizon samples.
    ///
    /// A polyline drawn per run never crosses the horizon.
    pub fn visible_segments(&self) -> Vec<&[HorizonPosition]> {
        visible_runs(&self.samples)
    }
}

/// Split a sample slice into maximal runs with elevation above zero.
pub(crate) fn visible_runs(samples: &[HorizonPosition]) -> Vec<&[HorizonPosition]> {
    samples
        .split(|s| !s.is_visible())
        .filter(|run| !run.is_empty())
        .collect()
}

/// Sample an object's future trajectory at a fixed step.
///
/// Iterates `[start, start + duration_minutes]` every `step_minutes`.
/// Steps where propagation fails are skipped, leaving a gap rather than
/// aborting the whole path. A non-positive or non-finite step or duration
/// yields an empty path, as does a request for more than
/// [`MAX_PATH_SAMPLES`] samples.
pub fn future_path(
    object: &TrackedObject,
    start: DateTime<Utc>,
    duration_minutes: f64,
    observer: &ObserverLocation,
    step_minutes: f64,
) -> OrbitPath {
    let (samples, skipped) = sample_path(start, duration_minutes, step_minutes, |t| {
        object.horizon_position(t, observer)
    });
    if skipped > 0 {
        debug!(id = %object.id, skipped, "path samples skipped after propagation failure");
    }
    OrbitPath::new(samples)
}

/// Fixed-step sampling loop behind [`future_path`].
///
/// Returns the surviving samples and the number of failed steps.
pub(crate) fn sample_path<F>(
    start: DateTime<Utc>,
    duration_minutes: f64,
    step_minutes: f64,
    mut sample: F,
) -> (Vec<HorizonPosition>, usize)
where
    F: FnMut(DateTime<Utc>) -> Result<HorizonPosition, TrackerError>,
{
    let step_ok = step_minutes > 0.0 && step_minutes.is_finite();
    let duration_ok = duration_minutes >= 0.0 && duration_minutes.is_finite();
    if !step_ok || !duration_ok {
        return (Vec::new(), 0);
    }

    // Tolerate 90 / 0.2 landing a hair under 450
    let steps = (duration_minutes / step_minutes + 1e-9).floor();
    if steps >= MAX_PATH_SAMPLES as f64 {
        debug!(duration_minutes, step_minutes, "path request exceeds sample limit");
        return (Vec::new(), 0);
    }
    let steps = steps as usize;

    let mut samples = Vec::with_capacity(steps + 1);
    let mut skipped = 0usize;
    for i in 0..=steps {
        // Offsets only grow, so once one leaves the calendar the rest do too
        let Some(t) = add_minutes(start, i as f64 * step_minutes) else {
            skipped += steps + 1 - i;
            break;
        };
        match sample(t) {
            Ok(pos) => samples.push(pos),
            Err(_) => skipped += 1,
        }
    }
    (samples, skipped)
}

/// Compute the current above-horizon set from a list of tracked objects.
///
/// The result replaces the previous list wholesale. Objects that cannot be
/// propagated or are below the horizon are omitted.
pub fn visible_objects(
    objects: &[TrackedObject],
    instant: DateTime<Utc>,
    observer: &ObserverLocation,
) -> Vec<VisualObject> {
    objects
        .iter()
        .filter_map(|o| current_look_angle(o, instant, observer).map(|p| o.visual(p)))
        .filter(|v| v.position.is_visible())
        .collect()
}

/// Parse element sets from TLE text.
///
/// Accepts both 3-line (name + two lines) and bare 2-line sets. Lines that
/// do not form a valid set are skipped. The catalog identifier comes from
/// columns 3–7 of line 1; bare 2-line sets are named after it.
pub fn parse_tle_catalog(text: &str, kind: &str) -> Result<Vec<OrbitalElementSet>, TrackerError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let mut sets = Vec::new();

    let mut i = 0;
    while i + 1 < lines.len() {
        let (name, line1, line2, consumed) = if lines[i].starts_with("1 ")
            && lines[i + 1].starts_with("2 ")
        {
            (None, lines[i], lines[i + 1], 2)
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            (Some(lines[i]), lines[i + 1], lines[i + 2], 3)
        } else {
            i += 1;
            continue;
        };

        let Some(id) = line1.get(2..7).map(str::trim).filter(|s| !s.is_empty()) else {
            i += consumed;
            continue;
        };

        let name = name
            .map(|n| n.trim_start_matches("0 ").to_string())
            .unwrap_or_else(|| id.to_string());
        sets.push(OrbitalElementSet::new(id, name, kind, line1, line2));
        i += consumed;
    }

    if sets.is_empty() {
        Err(TrackerError::Data("No valid TLE data found".into()))
    } else {
        Ok(sets)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    // ISS TLE (AIAA 2006-6753 Appendix C epoch)
    pub(crate) const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    pub(crate) const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    pub(crate) fn iss() -> TrackedObject {
        let set = OrbitalElementSet::new("25544", "ISS (ZARYA)", "station", ISS_LINE1, ISS_LINE2);
        TrackedObject::from_element_set(&set).expect("Failed to parse TLE")
    }

    pub(crate) fn iss_epoch() -> DateTime<Utc> {
        iss().elements().datetime.and_utc()
    }

    fn berlin() -> ObserverLocation {
        ObserverLocation::new("Berlin", 52.5, 13.4)
    }

    #[test]
    fn test_parse_element_set() {
        let sat = iss();
        assert_eq!(sat.id, "25544");
        assert_eq!(sat.kind, "station");
        assert_eq!(sat.elements().norad_id, 25544);
        assert_relative_eq!(sat.elements().mean_motion, 15.72, epsilon = 0.1);
    }

    #[test]
    fn test_invalid_element_set_is_error() {
        let set = OrbitalElementSet::new("1", "junk", "debris", "1 garbage", "2 garbage");
        let err = TrackedObject::from_element_set(&set).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidElements { .. }));
    }

    #[test]
    fn test_minutes_since_epoch() {
        let sat = iss();
        let t = iss_epoch() + chrono::Duration::minutes(90);
        assert_relative_eq!(sat.minutes_since_epoch(t), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_eci_state_reasonable() {
        let sat = iss();
        let (pos, vel) = sat.position_and_velocity_eci_km(iss_epoch()).unwrap();
        let r = pos.norm();
        assert!(r > 6000.0 && r < 7500.0, "Position magnitude {r} km out of range");
        let v = vel.norm();
        assert!(v > 6.0 && v < 9.0, "Velocity magnitude {v} km/s out of range");
    }

    #[test]
    fn test_current_look_angle_ranges() {
        let sat = iss();
        let pos = current_look_angle(&sat, iss_epoch(), &berlin()).expect("trackable");
        assert!((0.0..360.0).contains(&pos.azimuth));
        assert!((-90.0..=90.0).contains(&pos.elevation));
        assert!(pos.height_km > 300.0 && pos.height_km < 450.0, "height {}", pos.height_km);
        assert!(pos.range_km > pos.height_km - 1.0);
        assert_eq!(pos.timestamp, Some(iss_epoch()));
    }

    #[test]
    fn test_sample_path_skips_failed_steps() {
        let start = iss_epoch();
        let sat = iss();
        let observer = berlin();
        // Propagation "fails" for minutes 3 through 5
        let (samples, skipped) = sample_path(start, 10.0, 1.0, |t| {
            let minute = (t - start).num_minutes();
            if (3..=5).contains(&minute) {
                Err(TrackerError::Propagation("decayed".into()))
            } else {
                sat.horizon_position(t, &observer)
            }
        });
        assert_eq!(skipped, 3);
        assert_eq!(samples.len(), 8);
        let minutes: Vec<i64> = samples
            .iter()
            .filter_map(|s| s.timestamp)
            .map(|t| (t - start).num_minutes())
            .collect();
        assert_eq!(minutes, vec![0, 1, 2, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_sample_path_stops_at_calendar_end() {
        let start = DateTime::<Utc>::MAX_UTC - chrono::Duration::minutes(2);
        let (samples, skipped) = sample_path(start, 5.0, 1.0, |t| {
            Ok(HorizonPosition {
                timestamp: Some(t),
                ..HorizonPosition::default()
            })
        });
        assert_eq!(samples.len(), 3);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_future_path_sample_count_and_timestamps() {
        let sat = iss();
        let start = iss_epoch();
        let path = future_path(&sat, start, 90.0, &berlin(), 0.2);
        assert_eq!(path.len(), 451);
        let ts: Vec<_> = path.samples().iter().filter_map(|s| s.timestamp).collect();
        assert_eq!(ts.len(), path.len());
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ts[0], start);
    }

    #[test]
    fn test_future_path_rejects_bad_step() {
        let sat = iss();
        assert!(future_path(&sat, iss_epoch(), 90.0, &berlin(), 0.0).is_empty());
        assert!(future_path(&sat, iss_epoch(), 90.0, &berlin(), -1.0).is_empty());
        assert!(future_path(&sat, iss_epoch(), 90.0, &berlin(), f64::NAN).is_empty());
        assert!(future_path(&sat, iss_epoch(), 90.0, &berlin(), f64::INFINITY).is_empty());
    }

    #[test]
    fn test_future_path_rejects_unbounded_duration() {
        let sat = iss();
        let start = iss_epoch();
        assert!(future_path(&sat, start, f64::INFINITY, &berlin(), 0.2).is_empty());
        assert!(future_path(&sat, start, f64::NAN, &berlin(), 0.2).is_empty());
        assert!(future_path(&sat, start, 1.0e12, &berlin(), 0.2).is_empty());
        // One step short of the limit is still sampled
        let limit = (MAX_PATH_SAMPLES - 1) as f64;
        let (samples, _) = sample_path(start, limit - 1.0, 1.0, |t| {
            Ok(HorizonPosition {
                timestamp: Some(t),
                ..HorizonPosition::default()
            })
        });
        assert_eq!(samples.len(), MAX_PATH_SAMPLES - 1);
    }

    #[test]
    fn test_future_path_huge_step_keeps_start_sample() {
        let sat = iss();
        let path = future_path(&sat, iss_epoch(), 1.0e300, &berlin(), 1.0e299);
        assert_eq!(path.len(), 1);
        assert_eq!(path.samples()[0].timestamp, Some(iss_epoch()));
    }

    #[test]
    fn test_prune_elapsed() {
        let sat = iss();
        let start = iss_epoch();
        let mut path = future_path(&sat, start, 10.0, &berlin(), 1.0);
        assert_eq!(path.len(), 11);
        let now = start + chrono::Duration::seconds(150);
        assert_eq!(path.remaining(now).len(), 8);
        path.prune_elapsed(now);
        assert_eq!(path.len(), 8);
    }

    fn sample(elevation: f64) -> HorizonPosition {
        HorizonPosition {
            azimuth: 0.0,
            elevation,
            range_km: 1000.0,
            height_km: 400.0,
            latitude: 0.0,
            longitude: 0.0,
            velocity_km_s: 7.6,
            timestamp: None,
        }
    }

    #[test]
    fn test_visible_segments_split_at_horizon() {
        let path = OrbitPath::new(
            [-5.0, 2.0, 10.0, 3.0, -1.0, -4.0, 1.0, 5.0]
                .iter()
                .map(|&e| sample(e))
                .collect(),
        );
        let runs = path.visible_segments();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 3);
        assert_eq!(runs[1].len(), 2);
    }

    #[test]
    fn test_visible_objects_only_above_horizon() {
        let sat = iss();
        let start = iss_epoch();
        for minute in (0..180).step_by(3) {
            let t = start + chrono::Duration::minutes(minute);
            for v in visible_objects(std::slice::from_ref(&sat), t, &berlin()) {
                assert!(v.position.elevation > 0.0);
                assert_eq!(v.id, "25544");
            }
        }
    }

    #[test]
    fn test_parse_tle_catalog_three_line() {
        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n");
        let sets = parse_tle_catalog(&text, "station").unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, "25544");
        assert_eq!(sets[0].name, "ISS (ZARYA)");
        assert_eq!(sets[0].kind, "station");
    }

    #[test]
    fn test_parse_tle_catalog_two_line() {
        let text = format!("{ISS_LINE1}\n{ISS_LINE2}\n\n{ISS_LINE1}\n{ISS_LINE2}");
        let sets = parse_tle_catalog(&text, "misc").unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "25544");
    }

    #[test]
    fn test_parse_tle_catalog_empty_is_error() {
        assert!(parse_tle_catalog("nothing here\n", "misc").is_err());
    }

    #[test]
    fn test_element_set_json_uses_type_key() {
        let json = format!(
            r#"{{"id":"25544","name":"ISS","type":"station","line1":"{ISS_LINE1}","line2":"{ISS_LINE2}"}}"#
        );
        let set: OrbitalElementSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set.kind, "station");
    }
}
