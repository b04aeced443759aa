//! The drawing seam between the engine and the host
//!
//! A [`Surface`] is anything that can paint circles, lines and text: an HTML
//! canvas behind a wasm binding, an egui painter, an SVG writer. Coordinates
//! are in logical (CSS) pixels; the surface applies its own device pixel
//! ratio when [`Surface::configure`] is called.

use crate::projection::ScreenPoint;

/// A colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Same colour with alpha replaced, clamped to `[0, 1]`.
    pub fn with_alpha(self, a: f64) -> Self {
        Rgba {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Logical size and pixel density of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        SurfaceSize {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Whether there is anything to draw on.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.device_pixel_ratio > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Backing store size in physical pixels.
    pub fn physical(&self) -> (u32, u32) {
        let scale = self.device_pixel_ratio.max(0.0);
        (
            (self.width * scale).round().max(0.0) as u32,
            (self.height * scale).round().max(0.0) as u32,
        )
    }
}

/// Line style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn new(color: Rgba, width: f64) -> Self {
        Stroke {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// What a host paints on.
pub trait Surface {
    /// Current logical size and device pixel ratio. Queried every frame.
    fn size(&self) -> SurfaceSize;

    /// Resize the backing store after [`size`](Self::size) changed.
    fn configure(&mut self, size: SurfaceSize);

    fn clear(&mut self, color: Rgba);

    fn circle(&mut self, center: ScreenPoint, radius: f64, fill: Option<Rgba>, stroke: Option<Stroke>);

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke);

    fn polyline(&mut self, points: &[ScreenPoint], stroke: Stroke);

    fn text(&mut self, at: ScreenPoint, text: &str, color: Rgba, size_px: f64, align: TextAlign);

    /// Restrict drawing to a circle until the matching [`pop_clip`](Self::pop_clip).
    fn push_clip_circle(&mut self, center: ScreenPoint, radius: f64);

    fn pop_clip(&mut self);

    /// A pie sector whose colour fades from `from` at `start_angle` to `to`
    /// at `end_angle` (radians, screen orientation).
    fn conic_sector(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        from: Rgba,
        to: Rgba,
    );
}

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Configure(SurfaceSize),
    Clear(Rgba),
    Circle {
        center: ScreenPoint,
        radius: f64,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<ScreenPoint>,
        stroke: Stroke,
    },
    Text {
        at: ScreenPoint,
        text: String,
        color: Rgba,
        size_px: f64,
        align: TextAlign,
    },
    PushClip {
        center: ScreenPoint,
        radius: f64,
    },
    PopClip,
    ConicSector {
        center: ScreenPoint,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        from: Rgba,
        to: Rgba,
    },
}

/// A surface that records what would have been drawn.
///
/// For headless hosts and tests. Commands accumulate across frames until
/// [`take`](RecordingSurface::take) is called.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    clip_depth: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        RecordingSurface {
            size: SurfaceSize::new(width, height, 1.0),
            commands: Vec::new(),
            clip_depth: 0,
        }
    }

    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.size.device_pixel_ratio = dpr;
        self
    }

    /// Simulate the host element being resized.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size.width = width;
        self.size.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Clip regions currently open.
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// All text drawn so far.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn configure(&mut self, size: SurfaceSize) {
        self.commands.push(DrawCommand::Configure(size));
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn circle(&mut self, center: ScreenPoint, radius: f64, fill: Option<Rgba>, stroke: Option<Stroke>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn polyline(&mut self, points: &[ScreenPoint], stroke: Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn text(&mut self, at: ScreenPoint, text: &str, color: Rgba, size_px: f64, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            color,
            size_px,
            align,
        });
    }

    fn push_clip_circle(&mut self, center: ScreenPoint, radius: f64) {
        self.clip_depth += 1;
        self.commands.push(DrawCommand::PushClip { center, radius });
    }

    fn pop_clip(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }

    fn conic_sector(
        &mut self,
        center: ScreenPoint,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        from: Rgba,
        to: Rgba,
    ) {
        self.commands.push(DrawCommand::ConicSector {
            center,
            radius,
            start_angle,
            end_angle,
            from,
            to,
        });
    }
}
