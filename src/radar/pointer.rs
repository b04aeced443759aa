//! Pointer and touch hit-testing
//!
//! Handlers only record where the pointer is. The render loop resolves the
//! hover target each frame against the positions it just drew, so hover
//! never lags the animation by more than one frame.

use crate::projection::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// What the host should do with the originating input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerResponse {
    /// Suppress the host's default handling (scrolling, synthetic mouse
    /// events)
    pub prevent_default: bool,
}

/// Last known pointer position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<ScreenPoint>,
    pub kind: PointerKind,
}

impl PointerState {
    pub fn moved(&mut self, position: ScreenPoint, kind: PointerKind) {
        self.position = Some(position);
        self.kind = kind;
    }

    pub fn left(&mut self) {
        self.position = None;
    }
}

/// An object drawn this frame, as seen by hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTarget {
    pub id: String,
    pub point: ScreenPoint,
}

/// Nearest target within `tolerance` of `point`.
///
/// Ties go to the target drawn first.
pub fn nearest_within<'a>(
    targets: &'a [HitTarget],
    point: ScreenPoint,
    tolerance: f64,
) -> Option<&'a HitTarget> {
    targets
        .iter()
        .map(|t| (t, t.point.distance_to(&point)))
        .filter(|(_, d)| *d <= tolerance)
        .fold(None, |best: Option<(&HitTarget, f64)>, (t, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((t, d)),
        })
        .map(|(t, _)| t)
}
