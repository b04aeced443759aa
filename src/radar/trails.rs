//! Fading position history behind each object

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::projection::ScreenPoint;

/// Bounded FIFO of recent screen positions of one object.
#[derive(Debug, Clone)]
pub struct TrailHistory {
    points: VecDeque<ScreenPoint>,
    capacity: usize,
}

impl TrailHistory {
    pub fn new(capacity: usize) -> Self {
        TrailHistory {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append unless the object moved no more than `min_move` since the
    /// newest point. The oldest point is evicted at capacity.
    pub fn push(&mut self, point: ScreenPoint, min_move: f64) -> bool {
        if let Some(last) = self.points.back() {
            if last.distance_to(&point) <= min_move {
                return false;
            }
        }
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
        true
    }

    /// Oldest first.
    pub fn points(&self) -> impl Iterator<Item = &ScreenPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All trails, sampled at a fixed interval.
#[derive(Debug, Clone)]
pub struct Trails {
    histories: HashMap<String, TrailHistory>,
    capacity: usize,
    min_move: f64,
    interval: Duration,
    last_sample: Option<Duration>,
}

impl Trails {
    pub fn new(capacity: usize, min_move: f64, interval: Duration) -> Self {
        Trails {
            histories: HashMap::new(),
            capacity: capacity.max(1),
            min_move,
            interval,
            last_sample: None,
        }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        self.last_sample
            .map_or(true, |last| now.saturating_sub(last) >= self.interval)
    }

    /// Record the current positions if the sampling interval has elapsed.
    ///
    /// Histories of objects missing from `positions` are evicted on every
    /// call, sampled or not. Returns whether a sample was taken.
    pub fn record<'a>(
        &mut self,
        now: Duration,
        positions: impl IntoIterator<Item = (&'a str, ScreenPoint)>,
    ) -> bool {
        let positions: Vec<(&str, ScreenPoint)> = positions.into_iter().collect();
        let seen: HashSet<&str> = positions.iter().map(|(id, _)| *id).collect();
        self.histories.retain(|id, _| seen.contains(id.as_str()));

        if !self.is_due(now) {
            return false;
        }
        self.last_sample = Some(now);

        for (id, point) in positions {
            let capacity = self.capacity;
            self.histories
                .entry(id.to_string())
                .or_insert_with(|| TrailHistory::new(capacity))
                .push(point, self.min_move);
        }
        true
    }

    pub fn get(&self, id: &str) -> Option<&TrailHistory> {
        self.histories.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrailHistory)> {
        self.histories.iter().map(|(id, h)| (id.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Forget everything, e.g. when screen coordinates change meaning.
    pub fn clear(&mut self) {
        self.histories.clear();
        self.last_sample = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> ScreenPoint {
        ScreenPoint::new(x, 0.0)
    }

    #[test]
    fn test_history_bounded_fifo() {
        let mut h = TrailHistory::new(3);
        for x in 0..5 {
            h.push(p(x as f64), 0.5);
        }
        let xs: Vec<f64> = h.points().map(|q| q.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_history_skips_small_moves() {
        let mut h = TrailHistory::new(5);
        assert!(h.push(p(0.0), 0.5));
        assert!(!h.push(p(0.3), 0.5));
        assert!(h.push(p(0.6), 0.5));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_sampling_interval() {
        let mut t = Trails::new(20, 0.5, Duration::from_millis(1000));
        assert!(t.record(Duration::ZERO, [("a", p(0.0))]));
        assert!(!t.record(Duration::from_millis(500), [("a", p(5.0))]));
        assert!(t.record(Duration::from_millis(1000), [("a", p(5.0))]));
        assert_eq!(t.get("a").map(TrailHistory::len), Some(2));
    }

    #[test]
    fn test_vanished_objects_evicted() {
        let mut t = Trails::new(20, 0.5, Duration::from_millis(1000));
        t.record(Duration::ZERO, [("a", p(0.0)), ("b", p(1.0))]);
        t.record(Duration::from_secs(1), [("b", p(2.0))]);
        assert!(t.get("a").is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_eviction_does_not_wait_for_sample() {
        let mut t = Trails::new(20, 0.5, Duration::from_millis(1000));
        t.record(Duration::ZERO, [("a", p(0.0)), ("b", p(1.0))]);
        // Between samples: "a" disappears, "b" keeps its history untouched
        assert!(!t.record(Duration::from_millis(16), [("b", p(9.0))]));
        assert!(t.get("a").is_none());
        assert_eq!(t.get("b").map(TrailHistory::len), Some(1));
        // Everything gone at once, e.g. after an observer change
        assert!(!t.record(Duration::from_millis(32), std::iter::empty()));
        assert!(t.is_empty());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut t = Trails::new(20, 0.5, Duration::from_millis(1000));
        for s in 0..50 {
            t.record(Duration::from_secs(s), [("a", p(s as f64))]);
        }
        assert_eq!(t.get("a").map(TrailHistory::len), Some(20));
    }
}
