//! Rotating sweep and the pulses it triggers
//!
//! The sweep angle is in screen radians (the same orientation as
//! [`ScreenPoint::angle_around`](crate::projection::ScreenPoint::angle_around)),
//! so hit detection compares an object's on-screen angle against it
//! directly regardless of the view convention.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::time::Duration;

use tracing::debug;

/// Smallest absolute difference between two angles, in `[0, π]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

/// The rotating radar line.
#[derive(Debug, Clone)]
pub struct Sweep {
    rate_rad_per_ms: f64,
    angle: f64,
    revolutions: u64,
    last_tick: Option<Duration>,
}

impl Sweep {
    pub fn new(rate_rad_per_ms: f64) -> Self {
        Sweep {
            rate_rad_per_ms,
            angle: 0.0,
            revolutions: 0,
            last_tick: None,
        }
    }

    /// Current angle in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Completed revolutions since creation.
    pub fn revolutions(&self) -> u64 {
        self.revolutions
    }

    /// Unwrapped rotation since creation, in radians.
    pub fn total_rotation(&self) -> f64 {
        self.revolutions as f64 * TAU + self.angle
    }

    /// Advance to host time `now` using the true elapsed time.
    ///
    /// The first tick after creation or [`reset_clock`](Self::reset_clock)
    /// does not move the sweep.
    pub fn advance(&mut self, now: Duration) -> f64 {
        let dt_ms = match self.last_tick {
            Some(last) => now.saturating_sub(last).as_secs_f64() * 1000.0,
            None => 0.0,
        };
        self.last_tick = Some(now);

        let total = self.angle + self.rate_rad_per_ms * dt_ms;
        if total.is_finite() {
            self.revolutions += (total / TAU).floor().max(0.0) as u64;
            self.angle = total.rem_euclid(TAU);
        }
        self.angle
    }

    /// Forget the last tick, e.g. after the loop was stopped.
    pub fn reset_clock(&mut self) {
        self.last_tick = None;
    }
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    started: Duration,
}

/// Per-object pulse bookkeeping.
///
/// An object pulses when the sweep passes within the tolerance of it, at
/// most once per revolution. Pulses fade linearly over the decay window.
#[derive(Debug, Clone)]
pub struct PulseTracker {
    decay: Duration,
    pulses: HashMap<String, Pulse>,
    /// Sweep rotation at each object's last hit
    last_hit: HashMap<String, f64>,
}

impl PulseTracker {
    pub fn new(decay: Duration) -> Self {
        PulseTracker {
            decay,
            pulses: HashMap::new(),
            last_hit: HashMap::new(),
        }
    }

    /// Test an object at screen angle `object_angle` against the sweep.
    ///
    /// Returns `true` if a new pulse was recorded.
    pub fn check(
        &mut self,
        id: &str,
        object_angle: f64,
        sweep: &Sweep,
        tolerance_rad: f64,
        now: Duration,
    ) -> bool {
        if angular_difference(object_angle, sweep.angle()) >= tolerance_rad {
            return false;
        }
        let rotation = sweep.total_rotation();
        // Within the same revolution the sweep is still near its last hit
        if let Some(&at) = self.last_hit.get(id) {
            if rotation - at < PI {
                return false;
            }
        }
        self.last_hit.insert(id.to_string(), rotation);
        self.pulses.insert(id.to_string(), Pulse { started: now });
        debug!(id, "sweep pulse");
        true
    }

    /// Pulse strength in `[0, 1]`, 0 if none is active.
    pub fn intensity(&self, id: &str, now: Duration) -> f64 {
        let Some(pulse) = self.pulses.get(id) else {
            return 0.0;
        };
        let elapsed = now.saturating_sub(pulse.started).as_secs_f64();
        let window = self.decay.as_secs_f64();
        if window <= 0.0 {
            return 0.0;
        }
        (1.0 - elapsed / window).clamp(0.0, 1.0)
    }

    pub fn is_pulsing(&self, id: &str) -> bool {
        self.pulses.contains_key(id)
    }

    /// Drop fully decayed pulses and all state for objects not in `present`.
    pub fn prune(&mut self, now: Duration, present: impl Fn(&str) -> bool) {
        let decay = self.decay;
        self.pulses
            .retain(|id, p| present(id) && now.saturating_sub(p.started) < decay);
        self.last_hit.retain(|id, _| present(id));
    }

    pub fn clear(&mut self) {
        self.pulses.clear();
        self.last_hit.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RATE: f64 = TAU / 4000.0;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_relative_eq!(angular_difference(0.1, TAU - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angular_difference(PI, 0.0), PI, epsilon = 1e-12);
        assert_relative_eq!(angular_difference(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_first_tick_does_not_move() {
        let mut s = Sweep::new(RATE);
        assert_eq!(s.advance(ms(5000)), 0.0);
        assert_relative_eq!(s.advance(ms(6000)), TAU / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_stays_in_range_and_counts_revolutions() {
        let mut s = Sweep::new(RATE);
        s.advance(ms(0));
        for t in (16..20_000).step_by(16) {
            let a = s.advance(ms(t));
            assert!((0.0..TAU).contains(&a));
        }
        assert_eq!(s.revolutions(), 4);
    }

    #[test]
    fn test_true_delta_time_is_used() {
        // One long frame covers the same rotation as many short ones
        let mut a = Sweep::new(RATE);
        let mut b = Sweep::new(RATE);
        a.advance(ms(0));
        b.advance(ms(0));
        a.advance(ms(1000));
        for t in (10..=1000).step_by(10) {
            b.advance(ms(t));
        }
        assert_relative_eq!(a.angle(), b.angle(), epsilon = 1e-9);
    }

    #[test]
    fn test_pulse_once_per_revolution() {
        let tol = 1.5_f64.to_radians();
        let mut s = Sweep::new(RATE);
        let mut p = PulseTracker::new(ms(1000));
        let target = 1.0;
        let mut hits = Vec::new();
        s.advance(ms(0));
        for t in (4..12_000).step_by(4) {
            s.advance(ms(t));
            if p.check("a", target, &s, tol, ms(t)) {
                hits.push(t);
            }
        }
        assert_eq!(hits.len(), 3, "{hits:?}");
        for w in hits.windows(2) {
            assert!((w[1] - w[0]).abs_diff(4000) <= 8);
        }
    }

    #[test]
    fn test_pulse_near_zero_does_not_double_at_wrap() {
        let tol = 1.5_f64.to_radians();
        let mut s = Sweep::new(RATE);
        let mut p = PulseTracker::new(ms(1000));
        let mut hits = 0;
        s.advance(ms(0));
        for t in (4..8_100).step_by(4) {
            s.advance(ms(t));
            if p.check("a", 0.001, &s, tol, ms(t)) {
                hits += 1;
            }
        }
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_pulse_decays_linearly_and_is_pruned() {
        let mut s = Sweep::new(RATE);
        s.advance(ms(0));
        let mut p = PulseTracker::new(ms(1000));
        assert!(p.check("a", 0.0, &s, 0.1, ms(0)));
        assert_relative_eq!(p.intensity("a", ms(250)), 0.75, epsilon = 1e-12);
        p.prune(ms(999), |_| true);
        assert!(p.is_pulsing("a"));
        p.prune(ms(1000), |_| true);
        assert!(!p.is_pulsing("a"));
        assert_eq!(p.intensity("a", ms(1000)), 0.0);
    }

    #[test]
    fn test_vanished_objects_pruned() {
        let mut s = Sweep::new(RATE);
        s.advance(ms(0));
        let mut p = PulseTracker::new(ms(1000));
        p.check("a", 0.0, &s, 0.1, ms(0));
        p.prune(ms(10), |id| id != "a");
        assert!(!p.is_pulsing("a"));
        // Forgotten entirely, so it can pulse again immediately
        assert!(p.check("a", 0.0, &s, 0.1, ms(20)));
    }
}
