//! Rise, culmination and set events from a sampled path
//!
//! Works on an already-sampled [`OrbitPath`] rather than searching the
//! propagator again, so the resolution is the path's step size. Crossing
//! times are linearly interpolated between the two samples that straddle
//! the horizon.

use chrono::{DateTime, Duration, Utc};

use super::{HorizonPosition, OrbitPath};

/// One pass of an object over the observer's horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSummary {
    /// Horizon crossing upward; `None` if the path starts mid-pass
    pub rise: Option<DateTime<Utc>>,
    /// Azimuth at rise in degrees
    pub rise_azimuth: Option<f64>,
    /// Instant of highest elevation
    pub culmination: DateTime<Utc>,
    /// Highest elevation in degrees
    pub max_elevation: f64,
    /// Azimuth at culmination in degrees
    pub culmination_azimuth: f64,
    /// Horizon crossing downward; `None` if the path ends mid-pass
    pub set: Option<DateTime<Utc>>,
    /// Azimuth at set in degrees
    pub set_azimuth: Option<f64>,
}

impl PassSummary {
    /// Duration above the horizon, when both crossings are known.
    pub fn duration(&self) -> Option<Duration> {
        match (self.rise, self.set) {
            (Some(r), Some(s)) => Some(s - r),
            _ => None,
        }
    }
}

/// Interpolate the instant elevation crosses zero between two samples.
fn crossing_time(a: &HorizonPosition, b: &HorizonPosition) -> Option<DateTime<Utc>> {
    let (ta, tb) = (a.timestamp?, b.timestamp?);
    let span = b.elevation - a.elevation;
    if span.abs() < f64::EPSILON {
        return Some(ta);
    }
    let frac = (-a.elevation / span).clamp(0.0, 1.0);
    let ms = ((tb - ta).num_milliseconds() as f64 * frac).round() as i64;
    Some(ta + Duration::milliseconds(ms))
}

/// Extract passes from a path.
///
/// Samples without timestamps are ignored. Passes come out in
/// chronological order.
pub fn find_passes(path: &OrbitPath) -> Vec<PassSummary> {
    let samples: Vec<&HorizonPosition> = path
        .samples()
        .iter()
        .filter(|s| s.timestamp.is_some())
        .collect();

    let mut passes = Vec::new();
    let mut current: Option<PassSummary> = None;
    let mut previous: Option<&HorizonPosition> = None;

    for &sample in &samples {
        let Some(t) = sample.timestamp else { continue };

        if sample.is_visible() {
            match current.as_mut() {
                Some(pass) => {
                    if sample.elevation > pass.max_elevation {
                        pass.max_elevation = sample.elevation;
                        pass.culmination = t;
                        pass.culmination_azimuth = sample.azimuth;
                    }
                }
                None => {
                    let rise = previous.and_then(|p| crossing_time(p, sample));
                    current = Some(PassSummary {
                        rise,
                        rise_azimuth: rise.map(|_| sample.azimuth),
                        culmination: t,
                        max_elevation: sample.elevation,
                        culmination_azimuth: sample.azimuth,
                        set: None,
                        set_azimuth: None,
                    });
                }
            }
        } else if let Some(mut pass) = current.take() {
            if let Some(p) = previous {
                pass.set = crossing_time(p, sample);
                pass.set_azimuth = Some(p.azimuth);
            }
            passes.push(pass);
        }

        previous = Some(sample);
    }

    if let Some(pass) = current {
        passes.push(pass);
    }

    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgp4lib::future_path;
    use crate::sgp4lib::tests::{iss, iss_epoch};
    use crate::toposlib::ObserverLocation;
    use chrono::TimeZone;

    fn sample(minute: i64, elevation: f64, azimuth: f64) -> HorizonPosition {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        HorizonPosition {
            azimuth,
            elevation,
            range_km: 1000.0,
            height_km: 400.0,
            latitude: 0.0,
            longitude: 0.0,
            velocity_km_s: 7.6,
            timestamp: Some(t0 + Duration::minutes(minute)),
        }
    }

    #[test]
    fn test_single_complete_pass() {
        let path = OrbitPath::new(vec![
            sample(0, -10.0, 300.0),
            sample(1, 10.0, 320.0),
            sample(2, 40.0, 10.0),
            sample(3, 15.0, 80.0),
            sample(4, -5.0, 100.0),
        ]);
        let passes = find_passes(&path);
        assert_eq!(passes.len(), 1);
        let p = &passes[0];
        assert_eq!(p.max_elevation, 40.0);
        assert_eq!(p.culmination_azimuth, 10.0);

        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // Crossing halfway between -10 and +10
        assert_eq!(p.rise, Some(t0 + Duration::seconds(30)));
        // 15 → -5 crosses three quarters of the way
        assert_eq!(p.set, Some(t0 + Duration::seconds(225)));
        assert_eq!(p.duration(), Some(Duration::seconds(195)));
    }

    #[test]
    fn test_pass_in_progress_has_no_rise() {
        let path = OrbitPath::new(vec![sample(0, 20.0, 0.0), sample(1, -1.0, 0.0)]);
        let passes = find_passes(&path);
        assert_eq!(passes.len(), 1);
        assert!(passes[0].rise.is_none());
        assert!(passes[0].set.is_some());
        assert!(passes[0].duration().is_none());
    }

    #[test]
    fn test_pass_unfinished_has_no_set() {
        let path = OrbitPath::new(vec![sample(0, -3.0, 0.0), sample(1, 5.0, 0.0)]);
        let passes = find_passes(&path);
        assert_eq!(passes.len(), 1);
        assert!(passes[0].set.is_none());
    }

    #[test]
    fn test_iss_passes_over_a_day_are_ordered() {
        let sat = iss();
        let observer = ObserverLocation::new("Boston", 42.3583, -71.0603);
        let path = future_path(&sat, iss_epoch(), 24.0 * 60.0, &observer, 0.5);
        let passes = find_passes(&path);
        assert!(!passes.is_empty(), "ISS should pass over Boston within a day");
        for w in passes.windows(2) {
            assert!(w[0].culmination < w[1].culmination);
        }
        for p in &passes {
            assert!(p.max_elevation > 0.0 && p.max_elevation <= 90.0);
        }
    }
}
