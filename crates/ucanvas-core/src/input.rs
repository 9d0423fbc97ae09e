//! Input events delivered by the host's gesture recognizers.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Device that produced a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Touch,
    Mouse,
    /// Pencil-style input. Not drawn with.
    Stylus,
}

/// Pointer and gesture event for unified touch/mouse handling.
///
/// Positions are in screen coordinates. Pan translations are cumulative from
/// the start of the gesture; pinch scale is cumulative from 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        kind: PointerKind,
    },
    PointerMove {
        position: Point,
    },
    PointerUp,
    PanDelta {
        translation: Vec2,
    },
    PanEnd {
        translation: Vec2,
    },
    PinchUpdate {
        scale: f64,
        focal: Point,
    },
    PinchEnd,
}

impl InputEvent {
    /// Whether this event belongs to a two-finger viewport gesture.
    pub fn is_viewport_gesture(&self) -> bool {
        matches!(
            self,
            InputEvent::PanDelta { .. }
                | InputEvent::PanEnd { .. }
                | InputEvent::PinchUpdate { .. }
                | InputEvent::PinchEnd
        )
    }
}
