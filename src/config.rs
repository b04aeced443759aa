//! Engine tunables
//!
//! Every field has a default, so a host may pass an empty JSON object, or a
//! partial one overriding only what it cares about:
//!
//! ```json
//! { "sweep_period_ms": 6000, "primary_id": "25544" }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::signallib::{PingPlan, DEFAULT_MAX_WAIT};
use crate::TrackerError;

/// Radar engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Time for one full sweep revolution
    pub sweep_period_ms: u64,
    /// Angular distance in degrees at which the sweep "hits" an object
    pub sweep_tolerance_deg: f64,
    /// Linear decay window of a sweep pulse
    pub pulse_decay_ms: u64,
    /// Interval between trail samples
    pub trail_interval_ms: u64,
    /// Maximum points per trail
    pub trail_capacity: usize,
    /// Minimum screen movement before a new trail point is recorded
    pub trail_min_move_px: f64,
    /// Hover/click hit radius for mouse pointers
    pub hover_tolerance_mouse_px: f64,
    /// Hover/tap hit radius for touch pointers
    pub hover_tolerance_touch_px: f64,
    /// Cadence at which the star background is re-projected
    pub background_refresh_s: u64,
    /// Object drawn with the primary glyph (e.g. the ISS, "25544")
    pub primary_id: Option<String>,
    /// Look-ahead of the selected object's path
    pub path_minutes: f64,
    /// Step between path samples
    pub path_step_minutes: f64,
    /// Cap on the real duration of a ping animation
    pub ping_max_wait_s: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            sweep_period_ms: 4000,
            sweep_tolerance_deg: 1.5,
            pulse_decay_ms: 1000,
            trail_interval_ms: 1000,
            trail_capacity: 20,
            trail_min_move_px: 0.5,
            hover_tolerance_mouse_px: 12.0,
            hover_tolerance_touch_px: 24.0,
            background_refresh_s: 30,
            primary_id: Some("25544".to_string()),
            path_minutes: crate::sgp4lib::DEFAULT_PATH_MINUTES,
            path_step_minutes: crate::sgp4lib::DEFAULT_PATH_STEP_MINUTES,
            ping_max_wait_s: 15.0,
        }
    }
}

impl RadarConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        let config: RadarConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), TrackerError> {
        let problem = if self.sweep_period_ms == 0 {
            Some("sweep_period_ms must be positive")
        } else if self.pulse_decay_ms == 0 {
            Some("pulse_decay_ms must be positive")
        } else if self.trail_interval_ms == 0 {
            Some("trail_interval_ms must be positive")
        } else if self.trail_capacity == 0 {
            Some("trail_capacity must be positive")
        } else if !(self.sweep_tolerance_deg > 0.0 && self.sweep_tolerance_deg < 180.0) {
            Some("sweep_tolerance_deg must be in (0, 180)")
        } else if !(self.hover_tolerance_mouse_px >= 0.0 && self.hover_tolerance_touch_px >= 0.0)
        {
            Some("hover tolerances must be non-negative")
        } else if !(self.path_minutes > 0.0 && self.path_step_minutes > 0.0) {
            Some("path_minutes and path_step_minutes must be positive")
        } else if !(self.ping_max_wait_s > 0.0 && self.ping_max_wait_s.is_finite()) {
            Some("ping_max_wait_s must be positive")
        } else {
            None
        };

        match problem {
            Some(reason) => {
                warn!(reason, "rejected radar configuration");
                Err(TrackerError::Data(reason.to_string()))
            }
            None => Ok(()),
        }
    }

    /// Sweep angular velocity in radians per millisecond.
    pub fn sweep_rate_rad_per_ms(&self) -> f64 {
        std::f64::consts::TAU / self.sweep_period_ms as f64
    }

    pub fn pulse_decay(&self) -> Duration {
        Duration::from_millis(self.pulse_decay_ms)
    }

    pub fn trail_interval(&self) -> Duration {
        Duration::from_millis(self.trail_interval_ms)
    }

    pub fn background_refresh(&self) -> Duration {
        Duration::from_secs(self.background_refresh_s)
    }

    /// Ping duration cap; an unusable `ping_max_wait_s` falls back to 15 s.
    pub fn ping_max_wait(&self) -> Duration {
        match Duration::try_from_secs_f64(self.ping_max_wait_s) {
            Ok(cap) if !cap.is_zero() => cap,
            _ => DEFAULT_MAX_WAIT,
        }
    }

    /// Plan a ping to a target at `distance_km` under this configuration's cap.
    pub fn ping_plan(&self, distance_km: f64) -> PingPlan {
        PingPlan::new(distance_km, self.ping_max_wait())
    }

    pub fn is_primary(&self, id: &str) -> bool {
        self.primary_id.as_deref() == Some(id)
    }
}
