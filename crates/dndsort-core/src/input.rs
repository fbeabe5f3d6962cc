//! Pointer input normalization for mouse, pen and touch events.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

/// Listener family a drag is bound to.
///
/// Mouse drags listen to pointer events on the window. Everything else
/// listens to touch events and suppresses native scrolling on the grabbed
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputModality {
    Mouse,
    Touch,
}

impl From<PointerKind> for InputModality {
    fn from(kind: PointerKind) -> Self {
        match kind {
            PointerKind::Mouse => InputModality::Mouse,
            PointerKind::Pen | PointerKind::Touch => InputModality::Touch,
        }
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerInput {
    /// A pointer event with a single client position.
    Pointer { position: Point, kind: PointerKind },
    /// A touch event carrying every active touch point.
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    /// Mouse pointer event at the given position.
    pub fn mouse(x: f64, y: f64) -> Self {
        Self::Pointer {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
        }
    }

    /// Single-finger touch event at the given position.
    pub fn touch(x: f64, y: f64) -> Self {
        Self::Touch {
            touches: vec![Point::new(x, y)],
        }
    }

    /// Touch event with no remaining touch points (what `touchend` reports).
    pub fn touch_lifted() -> Self {
        Self::Touch {
            touches: Vec::new(),
        }
    }

    /// Client position of the event. Touch events use their first point.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerInput::Pointer { position, .. } => Some(*position),
            PointerInput::Touch { touches } => touches.first().copied(),
        }
    }

    /// Listener family this event belongs to.
    pub fn modality(&self) -> InputModality {
        match self {
            PointerInput::Pointer { kind, .. } => (*kind).into(),
            PointerInput::Touch { .. } => InputModality::Touch,
        }
    }
}
