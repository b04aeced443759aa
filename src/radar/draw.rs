//! Layer painters
//!
//! Each function paints one layer. The engine calls them back to front:
//! star background, grid, cardinal labels, selection path, trails, objects,
//! sweep, and the status label when there is nothing to show.

use std::f64::consts::{FRAC_PI_6, TAU};

use chrono::{DateTime, Utc};

use super::surface::{Rgba, Stroke, Surface, SurfaceSize, TextAlign};
use super::trails::Trails;
use crate::projection::{polar_point, project, ScreenPoint, ViewMode};
use crate::sgp4lib::{visible_runs, OrbitPath};
use crate::starlib::{star_radius, SkyBackground};

/// Space left outside the horizon ring for cardinal labels
pub const LABEL_MARGIN: f64 = 24.0;

/// Angular width of the fading wedge behind the sweep line
pub const SWEEP_TRAIL_RAD: f64 = FRAC_PI_6;

pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(2, 12, 6);
    pub const GRID: Rgba = Rgba::rgb(0, 120, 60);
    pub const LABEL: Rgba = Rgba::rgb(120, 220, 160);
    pub const SWEEP: Rgba = Rgba::rgb(0, 255, 120);
    pub const OBJECT: Rgba = Rgba::rgb(140, 255, 180);
    pub const PRIMARY: Rgba = Rgba::rgb(255, 200, 40);
    pub const SELECTED: Rgba = Rgba::rgb(80, 200, 255);
    pub const PATH: Rgba = Rgba::rgb(80, 200, 255);
    pub const STAR: Rgba = Rgba::rgb(210, 220, 255);
    pub const CONSTELLATION: Rgba = Rgba::rgb(90, 110, 170);
    pub const STATUS: Rgba = Rgba::rgb(0, 255, 120);
}

/// Centre and radius of the plotting circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub center: ScreenPoint,
    pub radius: f64,
}

impl Layout {
    /// Largest circle that fits the surface with room for labels.
    pub fn for_size(size: &SurfaceSize) -> Self {
        Layout {
            center: ScreenPoint::new(size.width / 2.0, size.height / 2.0),
            radius: (size.width.min(size.height) / 2.0 - LABEL_MARGIN).max(0.0),
        }
    }

    pub fn project(&self, azimuth: f64, elevation: f64, mode: ViewMode) -> ScreenPoint {
        project(
            azimuth,
            elevation,
            self.center.x,
            self.center.y,
            self.radius,
            mode,
        )
    }
}

/// How an object is emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphRole {
    Ordinary,
    Primary,
    Selected,
}

/// One object as it will be painted this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGlyph<'a> {
    pub name: &'a str,
    pub point: ScreenPoint,
    pub role: GlyphRole,
    pub hovered: bool,
    /// Pulse strength in `[0, 1]`
    pub pulse: f64,
}

pub fn draw_background(
    surface: &mut dyn Surface,
    layout: &Layout,
    mode: ViewMode,
    background: &SkyBackground,
) {
    surface.push_clip_circle(layout.center, layout.radius);

    let line = Stroke::new(palette::CONSTELLATION.with_alpha(0.5), 0.8);
    for segment in background.segments().iter().filter(|s| s.is_visible()) {
        let from = layout.project(segment.from.azimuth, segment.from.elevation, mode);
        let to = layout.project(segment.to.azimuth, segment.to.elevation, mode);
        surface.line(from, to, line);
    }

    for star in background.stars().iter().filter(|s| s.position.is_visible()) {
        let p = layout.project(star.position.azimuth, star.position.elevation, mode);
        let alpha = (0.9 - star.magnitude * 0.12).clamp(0.25, 0.9);
        surface.circle(
            p,
            star_radius(star.magnitude),
            Some(palette::STAR.with_alpha(alpha)),
            None,
        );
    }

    surface.pop_clip();
}

/// Horizon ring, 30° and 60° elevation rings and the N–S / E–W axes.
pub fn draw_grid(surface: &mut dyn Surface, layout: &Layout) {
    let c = layout.center;
    let r = layout.radius;

    surface.circle(c, r, None, Some(Stroke::new(palette::GRID, 1.5)));
    for elevation in [30.0, 60.0] {
        let ring = r * (1.0 - elevation / 90.0);
        surface.circle(
            c,
            ring,
            None,
            Some(Stroke::new(palette::GRID.with_alpha(0.6), 1.0).dashed()),
        );
        surface.text(
            ScreenPoint::new(c.x + 3.0, c.y - ring - 2.0),
            &format!("{elevation:.0}°"),
            palette::GRID,
            9.0,
            TextAlign::Left,
        );
    }

    let axis = Stroke::new(palette::GRID.with_alpha(0.4), 1.0);
    surface.line(
        ScreenPoint::new(c.x, c.y - r),
        ScreenPoint::new(c.x, c.y + r),
        axis,
    );
    surface.line(
        ScreenPoint::new(c.x - r, c.y),
        ScreenPoint::new(c.x + r, c.y),
        axis,
    );
}

pub fn draw_cardinals(surface: &mut dyn Surface, layout: &Layout, mode: ViewMode) {
    let distance = layout.radius + LABEL_MARGIN / 2.0;
    for (label, azimuth) in mode.cardinal_labels() {
        let p = polar_point(azimuth, distance, layout.center.x, layout.center.y, mode);
        surface.text(p, label, palette::LABEL, 12.0, TextAlign::Center);
    }
}

/// The selected object's upcoming track, restarted at each horizon
/// crossing. Samples before `now` are not drawn.
pub fn draw_path(
    surface: &mut dyn Surface,
    layout: &Layout,
    mode: ViewMode,
    path: &OrbitPath,
    now: DateTime<Utc>,
) {
    let stroke = Stroke::new(palette::PATH.with_alpha(0.7), 1.5).dashed();
    for run in visible_runs(path.remaining(now)) {
        let points: Vec<ScreenPoint> = run
            .iter()
            .map(|s| layout.project(s.azimuth, s.elevation, mode))
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        if points.len() >= 2 {
            surface.polyline(&points, stroke);
        }
    }
}

/// Trails fade from transparent (oldest) towards the object.
pub fn draw_trails(surface: &mut dyn Surface, trails: &Trails) {
    for (_, history) in trails.iter() {
        let points: Vec<ScreenPoint> = history.points().copied().collect();
        let n = points.len();
        for (i, pair) in points.windows(2).enumerate() {
            let alpha = 0.5 * (i + 1) as f64 / n as f64;
            surface.line(
                pair[0],
                pair[1],
                Stroke::new(palette::OBJECT.with_alpha(alpha), 1.0),
            );
        }
    }
}

pub fn draw_objects(surface: &mut dyn Surface, glyphs: &[ObjectGlyph<'_>]) {
    for glyph in glyphs {
        let (color, radius) = match glyph.role {
            GlyphRole::Ordinary => (palette::OBJECT, 2.5),
            GlyphRole::Primary => (palette::PRIMARY, 4.0),
            GlyphRole::Selected => (palette::SELECTED, 4.5),
        };

        if glyph.pulse > 0.0 {
            // Halo expands as it fades
            let halo = radius + 12.0 * (1.0 - glyph.pulse);
            surface.circle(
                glyph.point,
                halo,
                None,
                Some(Stroke::new(palette::SWEEP.with_alpha(glyph.pulse), 1.5)),
            );
        }

        surface.circle(glyph.point, radius, Some(color), None);

        if glyph.role == GlyphRole::Selected {
            surface.circle(
                glyph.point,
                radius + 4.0,
                None,
                Some(Stroke::new(palette::SELECTED, 1.0)),
            );
        }

        if glyph.hovered || glyph.role != GlyphRole::Ordinary {
            surface.text(
                ScreenPoint::new(glyph.point.x + radius + 4.0, glyph.point.y - radius - 2.0),
                glyph.name,
                color,
                11.0,
                TextAlign::Left,
            );
        }
    }
}

/// Sweep line and the fading wedge trailing it.
pub fn draw_sweep(surface: &mut dyn Surface, layout: &Layout, angle: f64) {
    let c = layout.center;
    let start = (angle - SWEEP_TRAIL_RAD).rem_euclid(TAU);
    surface.conic_sector(
        c,
        layout.radius,
        start,
        angle,
        palette::SWEEP.with_alpha(0.0),
        palette::SWEEP.with_alpha(0.35),
    );
    let tip = ScreenPoint::new(
        c.x + layout.radius * angle.cos(),
        c.y + layout.radius * angle.sin(),
    );
    surface.line(c, tip, Stroke::new(palette::SWEEP, 2.0));
}

pub fn draw_status(surface: &mut dyn Surface, layout: &Layout, text: &str) {
    surface.text(
        ScreenPoint::new(layout.center.x, layout.center.y + layout.radius / 3.0),
        text,
        palette::STATUS,
        14.0,
        TextAlign::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::super::surface::{DrawCommand, RecordingSurface};
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_layout_leaves_label_margin() {
        let layout = Layout::for_size(&SurfaceSize::new(400.0, 248.0, 1.0));
        assert_relative_eq!(layout.radius, 100.0);
        assert_eq!(layout.center, ScreenPoint::new(200.0, 124.0));
        let tiny = Layout::for_size(&SurfaceSize::new(10.0, 10.0, 1.0));
        assert_eq!(tiny.radius, 0.0);
    }

    #[test]
    fn test_cardinals_swap_in_sky_mode() {
        let layout = Layout::for_size(&SurfaceSize::new(248.0, 248.0, 1.0));
        let east_x = |mode| {
            let mut s = RecordingSurface::new(248.0, 248.0);
            draw_cardinals(&mut s, &layout, mode);
            s.commands()
                .iter()
                .find_map(|c| match c {
                    DrawCommand::Text { at, text, .. } if text == "E" => Some(at.x),
                    _ => None,
                })
                .unwrap()
        };
        assert!(east_x(ViewMode::Map) > layout.center.x);
        assert!(east_x(ViewMode::Sky) < layout.center.x);
    }

    #[test]
    fn test_background_is_clipped() {
        let layout = Layout::for_size(&SurfaceSize::new(248.0, 248.0, 1.0));
        let mut s = RecordingSurface::new(248.0, 248.0);
        draw_background(&mut s, &layout, ViewMode::Sky, &SkyBackground::new(Default::default()));
        assert!(matches!(s.commands().first(), Some(DrawCommand::PushClip { .. })));
        assert_eq!(s.commands().last(), Some(&DrawCommand::PopClip));
        assert_eq!(s.clip_depth(), 0);
    }

    #[test]
    fn test_labels_only_for_emphasised_or_hovered() {
        let glyphs = [
            ObjectGlyph {
                name: "plain",
                point: ScreenPoint::new(0.0, 0.0),
                role: GlyphRole::Ordinary,
                hovered: false,
                pulse: 0.0,
            },
            ObjectGlyph {
                name: "hovered",
                point: ScreenPoint::new(10.0, 0.0),
                role: GlyphRole::Ordinary,
                hovered: true,
                pulse: 0.0,
            },
            ObjectGlyph {
                name: "ISS",
                point: ScreenPoint::new(20.0, 0.0),
                role: GlyphRole::Primary,
                hovered: false,
                pulse: 0.5,
            },
        ];
        let mut s = RecordingSurface::new(100.0, 100.0);
        draw_objects(&mut s, &glyphs);
        assert_eq!(s.texts(), vec!["hovered", "ISS"]);
    }
}
