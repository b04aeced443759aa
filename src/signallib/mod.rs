//! Signal light time and the "ping" animation
//!
//! [`light_time`] gives the one-way and round-trip travel time of a radio
//! signal over a distance. [`PingAnimation`] visualises a round trip as a
//! progress value in `[0, 100]`, compressed into at most a fixed real-world
//! wait so that a probe several light-hours away does not keep the user
//! waiting for hours.
//!
//! The animation is a small frame-driven state machine:
//!
//! ```text
//! Idle ──start──▶ Active ──frame (elapsed ≥ duration)──▶ Done (progress 100)
//!   ▲               │                                     │
//!   └─────stop──────┴──────────────stop───────────────────┘   (progress 0)
//! ```

use std::time::Duration;

use tracing::debug;

use crate::constants::C_KM_S;
use crate::scheduler::{FrameRequest, FrameScheduler};

/// Default cap on the real-world duration of a ping animation
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(15);

/// Signal travel time over a distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTime {
    /// Seconds for the signal to reach the target
    pub one_way_s: f64,
    /// Seconds for the signal to go there and back
    pub round_trip_s: f64,
}

/// Light time for a distance in km.
pub fn light_time(distance_km: f64) -> LightTime {
    let one_way_s = distance_km / C_KM_S;
    LightTime {
        one_way_s,
        round_trip_s: 2.0 * one_way_s,
    }
}

/// How a round trip maps onto the real-time animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingPlan {
    /// The physical light time
    pub light_time: LightTime,
    /// Real-world animation duration: the round trip, capped
    pub duration: Duration,
    /// Virtual seconds per real second (`>= 1`)
    pub compression: f64,
}

impl PingPlan {
    /// Plan a ping to a target `distance_km` away, waiting at most `max_wait`.
    pub fn new(distance_km: f64, max_wait: Duration) -> Self {
        let light_time = light_time(distance_km.max(0.0));
        let round_trip = light_time.round_trip_s;
        let real_s = round_trip.min(max_wait.as_secs_f64()).max(0.0);
        let compression = if real_s > 0.0 { round_trip / real_s } else { 1.0 };
        PingPlan {
            light_time,
            duration: Duration::from_secs_f64(real_s),
            compression,
        }
    }

    /// Virtual signal time corresponding to real elapsed time.
    pub fn virtual_elapsed_s(&self, real_elapsed: Duration) -> f64 {
        (real_elapsed.as_secs_f64() * self.compression).min(self.light_time.round_trip_s)
    }
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PingStatus {
    /// The callback was stale (cancelled or superseded) and did nothing
    Ignored,
    /// Progress advanced; another frame was requested
    Progress(f64),
    /// Progress reached 100 and the animation stopped itself
    Completed,
}

#[derive(Debug, Clone, Copy)]
enum PingState {
    Idle,
    Active {
        plan: PingPlan,
        started: Duration,
        pending: FrameRequest,
    },
}

/// Frame-driven progress animation for a signal round trip.
#[derive(Debug)]
pub struct PingAnimation {
    state: PingState,
    progress: f64,
    last_plan: Option<PingPlan>,
}

impl Default for PingAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl PingAnimation {
    pub fn new() -> Self {
        PingAnimation {
            state: PingState::Idle,
            progress: 0.0,
            last_plan: None,
        }
    }

    /// Progress in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PingState::Active { .. })
    }

    /// The plan of the running or most recent ping.
    pub fn plan(&self) -> Option<&PingPlan> {
        self.last_plan.as_ref()
    }

    /// Start a ping at host time `now`.
    ///
    /// Returns `false` and changes nothing if a ping is already running.
    pub fn start(
        &mut self,
        plan: PingPlan,
        now: Duration,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let pending = scheduler.request_frame();
        debug!(
            round_trip_s = plan.light_time.round_trip_s,
            duration_s = plan.duration.as_secs_f64(),
            "ping started"
        );
        self.progress = 0.0;
        self.last_plan = Some(plan);
        self.state = PingState::Active {
            plan,
            started: now,
            pending,
        };
        true
    }

    /// Handle a frame callback.
    ///
    /// Callbacks whose id is not the one currently pending are ignored, so a
    /// frame requested before a `stop` can never advance a later ping.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        now: Duration,
        scheduler: &mut dyn FrameScheduler,
    ) -> PingStatus {
        let PingState::Active {
            plan,
            started,
            pending,
        } = self.state
        else {
            return PingStatus::Ignored;
        };
        if request != pending {
            return PingStatus::Ignored;
        }

        let elapsed = now.saturating_sub(started);
        if elapsed >= plan.duration {
            self.progress = 100.0;
            self.state = PingState::Idle;
            debug!("ping completed");
            return PingStatus::Completed;
        }

        let fraction = elapsed.as_secs_f64() / plan.duration.as_secs_f64();
        // Monotonic even if the host clock stutters
        self.progress = self.progress.max((fraction * 100.0).clamp(0.0, 100.0));
        let pending = scheduler.request_frame();
        self.state = PingState::Active {
            plan,
            started,
            pending,
        };
        PingStatus::Progress(self.progress)
    }

    /// Stop the ping, reset progress to 0 and cancel the pending frame.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let PingState::Active { pending, .. } = self.state {
            scheduler.cancel_frame(pending);
        }
        self.state = PingState::Idle;
        self.progress = 0.0;
    }

    /// Virtual signal time elapsed, for "signal at X light-seconds" readouts.
    pub fn virtual_elapsed_s(&self, now: Duration) -> f64 {
        match self.state {
            PingState::Active { plan, started, .. } => {
                plan.virtual_elapsed_s(now.saturating_sub(started))
            }
            PingState::Idle => match (&self.last_plan, self.progress >= 100.0) {
                (Some(plan), true) => plan.light_time.round_trip_s,
                _ => 0.0,
            },
        }
    }
}
