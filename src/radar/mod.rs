//! The radar/sky render and interaction engine
//!
//! [`RadarEngine`] owns every piece of animation state: sweep angle,
//! pulses, trails, the projected star background and pointer state. It
//! reads everything else (objects, selection, observer, view mode, star
//! catalog) from its [`InputChannel`] at the top of each frame, so the host
//! can update inputs at any time without restarting the loop.
//!
//! ```text
//!            start                 stop
//!   Idle ───────────▶ Running ───────────▶ Idle
//!                      │   ▲
//!                      └───┘ on_frame: advance, project, draw, request next
//! ```
//!
//! # Example
//!
//! ```ignore
//! use skyradar::radar::{RadarEngine, RecordingSurface};
//! use skyradar::scheduler::{FrameQueue, FrameScheduler};
//!
//! let mut engine = RadarEngine::new(RadarConfig::default());
//! let inputs = engine.inputs().clone();
//! inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
//!
//! let mut frames = FrameQueue::new();
//! let mut surface = RecordingSurface::new(400.0, 400.0);
//! engine.start(&mut frames);
//! for request in frames.drain() {
//!     engine.on_frame(request, host_clock(), Utc::now(), &mut surface, &mut frames);
//! }
//! ```

pub mod draw;
pub mod inputs;
pub mod pointer;
pub mod surface;
pub mod sweep;
pub mod trails;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::RadarConfig;
use crate::projection::{ScreenPoint, ViewMode};
use crate::scheduler::{FrameRequest, FrameScheduler};
use crate::starlib::SkyBackground;

use draw::{GlyphRole, Layout, ObjectGlyph};
pub use inputs::{InputChannel, SceneInputs};
pub use pointer::{HitTarget, PointerKind, PointerResponse, PointerState};
pub use surface::{DrawCommand, RecordingSurface, Rgba, Stroke, Surface, SurfaceSize, TextAlign};
use sweep::{PulseTracker, Sweep};
use trails::Trails;

/// Status label when no observer has been supplied yet
pub const STATUS_ACQUIRING: &str = "ACQUIRING";

/// Status label when nothing is above the horizon
pub const STATUS_NO_SIGNAL: &str = "NO SIGNAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Running { pending: FrameRequest },
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Stale or unexpected request; nothing happened
    Ignored,
    /// The surface had no drawable area; the next frame was requested
    Skipped,
    /// A frame was drawn and the next one requested
    Drawn,
}

/// Frame-driven radar renderer.
#[derive(Debug)]
pub struct RadarEngine {
    config: RadarConfig,
    inputs: InputChannel,
    state: EngineState,
    sweep: Sweep,
    pulses: PulseTracker,
    trails: Trails,
    background: SkyBackground,
    pointer: PointerState,
    targets: Vec<HitTarget>,
    hovered: Option<String>,
    last_size: Option<SurfaceSize>,
    last_mode: Option<ViewMode>,
}

impl RadarEngine {
    /// Create an engine with a fresh input channel.
    pub fn new(config: RadarConfig) -> Self {
        Self::with_inputs(config, InputChannel::new())
    }

    /// Create an engine reading from an existing channel.
    ///
    /// A configuration that fails [`RadarConfig::validate`] is replaced by
    /// the defaults.
    pub fn with_inputs(config: RadarConfig, inputs: InputChannel) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(_) => RadarConfig::default(),
        };
        RadarEngine {
            sweep: Sweep::new(config.sweep_rate_rad_per_ms()),
            pulses: PulseTracker::new(config.pulse_decay()),
            trails: Trails::new(
                config.trail_capacity,
                config.trail_min_move_px,
                config.trail_interval(),
            ),
            background: SkyBackground::new(config.background_refresh()),
            config,
            inputs,
            state: EngineState::Idle,
            pointer: PointerState::default(),
            targets: Vec::new(),
            hovered: None,
            last_size: None,
            last_mode: None,
        }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// The channel the host writes scene inputs through.
    pub fn inputs(&self) -> &InputChannel {
        &self.inputs
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running { .. })
    }

    /// Begin animating. Returns `false` if already running.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.is_running() {
            return false;
        }
        self.sweep.reset_clock();
        let pending = scheduler.request_frame();
        self.state = EngineState::Running { pending };
        info!("radar engine started");
        true
    }

    /// Stop animating and cancel the pending frame.
    ///
    /// Any callback already in flight for the cancelled request is ignored.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let EngineState::Running { pending } = self.state {
            scheduler.cancel_frame(pending);
            info!("radar engine stopped");
        }
        self.state = EngineState::Idle;
        self.sweep.reset_clock();
    }

    /// Current sweep angle in screen radians.
    pub fn sweep_angle(&self) -> f64 {
        self.sweep.angle()
    }

    pub fn sweep_revolutions(&self) -> u64 {
        self.sweep.revolutions()
    }

    /// Object under the pointer as of the last frame.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Objects drawn in the last frame, in drawing order.
    pub fn targets(&self) -> &[HitTarget] {
        &self.targets
    }

    pub fn trails(&self) -> &Trails {
        &self.trails
    }

    pub fn pulse_intensity(&self, id: &str, now: Duration) -> f64 {
        self.pulses.intensity(id, now)
    }

    /// Handle one frame callback.
    ///
    /// `now` is the host's monotonic clock and drives animation; `wall` is
    /// the instant the sky is drawn for. Never panics: objects that cannot
    /// be placed are skipped for this frame.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        now: Duration,
        wall: DateTime<Utc>,
        surface: &mut dyn Surface,
        scheduler: &mut dyn FrameScheduler,
    ) -> FrameOutcome {
        let EngineState::Running { pending } = self.state else {
            return FrameOutcome::Ignored;
        };
        if request != pending {
            return FrameOutcome::Ignored;
        }

        let outcome = self.render(now, wall, surface);
        let pending = scheduler.request_frame();
        self.state = EngineState::Running { pending };
        outcome
    }

    fn render(
        &mut self,
        now: Duration,
        wall: DateTime<Utc>,
        surface: &mut dyn Surface,
    ) -> FrameOutcome {
        let size = surface.size();
        if self.last_size != Some(size) {
            if size.is_drawable() {
                surface.configure(size);
            }
            // Screen coordinates changed meaning
            self.trails.clear();
            self.last_size = Some(size);
        }
        let sweep_angle = self.sweep.advance(now);
        if !size.is_drawable() {
            return FrameOutcome::Skipped;
        }

        let layout = Layout::for_size(&size);
        let inputs = self.inputs.read();
        let mode = inputs.view_mode;
        if self.last_mode != Some(mode) {
            self.trails.clear();
            self.last_mode = Some(mode);
        }

        // Project everything above the horizon
        self.targets.clear();
        for object in inputs.objects.iter().filter(|o| o.position.is_visible()) {
            let p = layout.project(object.position.azimuth, object.position.elevation, mode);
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            self.targets.push(HitTarget {
                id: object.id.clone(),
                point: p,
            });
        }

        let tolerance = self.config.sweep_tolerance_deg.to_radians();
        for target in &self.targets {
            let angle = target.point.angle_around(&layout.center);
            self.pulses
                .check(&target.id, angle, &self.sweep, tolerance, now);
        }
        let targets = &self.targets;
        self.pulses
            .prune(now, |id| targets.iter().any(|t| t.id == id));

        self.trails.record(
            now,
            self.targets.iter().map(|t| (t.id.as_str(), t.point)),
        );

        self.hovered = self.pointer.position.and_then(|p| {
            pointer::nearest_within(&self.targets, p, self.hover_tolerance())
                .map(|t| t.id.clone())
        });

        // Layers, back to front
        surface.clear(draw::palette::BACKGROUND);

        if let (Some(catalog), Some(observer)) = (&inputs.catalog, &inputs.observer) {
            self.background.update(catalog, observer, now, wall);
            draw::draw_background(surface, &layout, mode, &self.background);
        }

        draw::draw_grid(surface, &layout);
        draw::draw_cardinals(surface, &layout, mode);

        if let Some(path) = &inputs.selected_path {
            draw::draw_path(surface, &layout, mode, path, wall);
        }

        draw::draw_trails(surface, &self.trails);

        let glyphs: Vec<ObjectGlyph<'_>> = inputs
            .objects
            .iter()
            .filter_map(|object| {
                let target = self.targets.iter().find(|t| t.id == object.id)?;
                let role = if inputs.selected_id.as_deref() == Some(object.id.as_str()) {
                    GlyphRole::Selected
                } else if self.config.is_primary(&object.id) {
                    GlyphRole::Primary
                } else {
                    GlyphRole::Ordinary
                };
                Some(ObjectGlyph {
                    name: &object.name,
                    point: target.point,
                    role,
                    hovered: self.hovered.as_deref() == Some(object.id.as_str()),
                    pulse: self.pulses.intensity(&object.id, now),
                })
            })
            .collect();
        draw::draw_objects(surface, &glyphs);

        draw::draw_sweep(surface, &layout, sweep_angle);

        if inputs.observer.is_none() {
            draw::draw_status(surface, &layout, STATUS_ACQUIRING);
        } else if self.targets.is_empty() {
            draw::draw_status(surface, &layout, STATUS_NO_SIGNAL);
        }

        FrameOutcome::Drawn
    }

    fn hover_tolerance(&self) -> f64 {
        match self.pointer.kind {
            PointerKind::Mouse => self.config.hover_tolerance_mouse_px,
            PointerKind::Touch => self.config.hover_tolerance_touch_px,
        }
    }

    /// Pointer moved to `(x, y)` in surface pixels.
    pub fn pointer_move(&mut self, x: f64, y: f64, kind: PointerKind) {
        self.pointer.moved(ScreenPoint::new(x, y), kind);
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) {
        self.pointer.left();
        self.hovered = None;
    }

    /// A touch began. The host must suppress default handling so the page
    /// does not scroll under the radar.
    pub fn touch_start(&mut self, x: f64, y: f64) -> PointerResponse {
        self.pointer.moved(ScreenPoint::new(x, y), PointerKind::Touch);
        PointerResponse {
            prevent_default: true,
        }
    }

    /// A click or tap at `(x, y)`.
    ///
    /// Selects the nearest object drawn in the last frame within the
    /// pointer's tolerance, or clears the selection if none is close
    /// enough. Returns the id passed to `on_select`.
    pub fn click(
        &mut self,
        x: f64,
        y: f64,
        kind: PointerKind,
        on_select: &mut dyn FnMut(Option<&str>),
    ) -> Option<String> {
        let point = ScreenPoint::new(x, y);
        self.pointer.moved(point, kind);
        let selected = pointer::nearest_within(&self.targets, point, self.hover_tolerance())
            .map(|t| t.id.clone());
        on_select(selected.as_deref());
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use crate::sgp4lib::{HorizonPosition, VisualObject};
    use crate::toposlib::ObserverLocation;
    use chrono::TimeZone;

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 22, 0, 0).unwrap()
    }

    fn object(id: &str, azimuth: f64, elevation: f64) -> VisualObject {
        VisualObject {
            id: id.to_string(),
            name: format!("SAT {id}"),
            kind: "satellite".to_string(),
            position: HorizonPosition {
                azimuth,
                elevation,
                range_km: 1000.0,
                height_km: 400.0,
                latitude: 0.0,
                longitude: 0.0,
                velocity_km_s: 7.6,
                timestamp: Some(wall()),
            },
        }
    }

    /// Run one frame for every pending request.
    fn pump(
        engine: &mut RadarEngine,
        q: &mut FrameQueue,
        surface: &mut RecordingSurface,
        now_ms: u64,
    ) -> Vec<FrameOutcome> {
        q.drain()
            .into_iter()
            .map(|r| engine.on_frame(r, Duration::from_millis(now_ms), wall(), surface, q))
            .collect()
    }

    fn running_engine() -> (RadarEngine, FrameQueue, RecordingSurface) {
        let mut engine = RadarEngine::new(RadarConfig::default());
        let mut q = FrameQueue::new();
        engine.start(&mut q);
        (engine, q, RecordingSurface::new(248.0, 248.0))
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (mut engine, mut q, _) = running_engine();
        assert!(!engine.start(&mut q));
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_acquiring_without_observer() {
        let (mut engine, mut q, mut surface) = running_engine();
        assert_eq!(pump(&mut engine, &mut q, &mut surface, 0), vec![FrameOutcome::Drawn]);
        assert!(surface.texts().contains(&STATUS_ACQUIRING));
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_no_signal_with_observer_but_no_objects() {
        let (mut engine, mut q, mut surface) = running_engine();
        engine
            .inputs()
            .set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        pump(&mut engine, &mut q, &mut surface, 0);
        assert!(surface.texts().contains(&STATUS_NO_SIGNAL));
    }

    #[test]
    fn test_below_horizon_objects_not_drawn() {
        let (mut engine, mut q, mut surface) = running_engine();
        let inputs = engine.inputs().clone();
        inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        inputs.set_objects(vec![object("1", 90.0, 30.0), object("2", 90.0, -5.0)]);
        pump(&mut engine, &mut q, &mut surface, 0);
        let ids: Vec<&str> = engine.targets().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_stale_request_after_stop_is_ignored() {
        let (mut engine, mut q, mut surface) = running_engine();
        let stale = q.drain();
        engine.stop(&mut q);
        let outcome = engine.on_frame(stale[0], Duration::ZERO, wall(), &mut surface, &mut q);
        assert_eq!(outcome, FrameOutcome::Ignored);
        assert!(surface.commands().is_empty());
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn test_zero_size_surface_skips_drawing() {
        let (mut engine, mut q, _) = running_engine();
        let mut surface = RecordingSurface::new(0.0, 0.0);
        assert_eq!(pump(&mut engine, &mut q, &mut surface, 0), vec![FrameOutcome::Skipped]);
        assert!(surface.commands().is_empty());
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_resize_reconfigures_and_clears_trails() {
        let (mut engine, mut q, mut surface) = running_engine();
        let inputs = engine.inputs().clone();
        inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        inputs.set_objects(vec![object("1", 90.0, 30.0)]);
        pump(&mut engine, &mut q, &mut surface, 0);
        assert!(matches!(surface.commands()[0], DrawCommand::Configure(_)));
        assert_eq!(engine.trails().len(), 1);

        surface.take();
        surface.resize(300.0, 300.0);
        pump(&mut engine, &mut q, &mut surface, 16);
        assert!(matches!(surface.commands()[0], DrawCommand::Configure(_)));
        // Cleared, then resampled immediately
        assert_eq!(engine.trails().get("1").map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_hover_uses_pointer_kind_tolerance() {
        let (mut engine, mut q, mut surface) = running_engine();
        let inputs = engine.inputs().clone();
        inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        inputs.set_objects(vec![object("1", 0.0, 90.0)]);

        // 18 px from the zenith object: outside mouse, inside touch
        engine.pointer_move(124.0 + 18.0, 124.0, PointerKind::Mouse);
        pump(&mut engine, &mut q, &mut surface, 0);
        assert_eq!(engine.hovered(), None);

        let response = engine.touch_start(124.0 + 18.0, 124.0);
        assert!(response.prevent_default);
        pump(&mut engine, &mut q, &mut surface, 16);
        assert_eq!(engine.hovered(), Some("1"));

        engine.pointer_leave();
        assert_eq!(engine.hovered(), None);
    }

    #[test]
    fn test_input_changes_do_not_restart_loop() {
        let (mut engine, mut q, mut surface) = running_engine();
        pump(&mut engine, &mut q, &mut surface, 0);
        pump(&mut engine, &mut q, &mut surface, 1000);
        let angle = engine.sweep_angle();
        engine.inputs().set_view_mode(ViewMode::Sky);
        pump(&mut engine, &mut q, &mut surface, 1016);
        assert!(engine.sweep_angle() > angle);
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_bad_object_does_not_abort_frame() {
        let (mut engine, mut q, mut surface) = running_engine();
        let inputs = engine.inputs().clone();
        inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        inputs.set_objects(vec![object("broken", f64::NAN, 30.0), object("ok", 90.0, 30.0)]);

        assert_eq!(pump(&mut engine, &mut q, &mut surface, 0), vec![FrameOutcome::Drawn]);
        let ids: Vec<&str> = engine.targets().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert!(surface.texts().iter().all(|t| *t != STATUS_NO_SIGNAL));
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn test_invalid_config_replaced_by_defaults() {
        let config = RadarConfig {
            sweep_period_ms: 0,
            ping_max_wait_s: -1.0,
            ..RadarConfig::default()
        };
        let engine = RadarEngine::new(config);
        assert_eq!(engine.config(), &RadarConfig::default());
    }

    #[test]
    fn test_trails_dropped_on_observer_change_between_samples() {
        let (mut engine, mut q, mut surface) = running_engine();
        let inputs = engine.inputs().clone();
        inputs.set_observer(Some(ObserverLocation::new("Berlin", 52.5, 13.4)));
        inputs.set_objects(vec![object("1", 90.0, 30.0)]);
        pump(&mut engine, &mut q, &mut surface, 0);
        assert_eq!(engine.trails().len(), 1);

        // Well inside the one-second sampling interval
        inputs.set_observer(Some(ObserverLocation::new("Tokyo", 35.7, 139.7)));
        pump(&mut engine, &mut q, &mut surface, 16);
        assert!(engine.trails().is_empty());
    }
}
