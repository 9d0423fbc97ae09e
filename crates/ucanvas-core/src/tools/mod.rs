//! Drawing tool settings.

use crate::shapes::{RgbaColor, ShapeKind};
use serde::{Deserialize, Serialize};

/// Default stroke width for new primitives.
pub const DEFAULT_LINE_WIDTH: f64 = 5.0;

/// What a single-pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasMode {
    /// Drags draw the selected shape kind.
    #[default]
    Draw,
    /// Drags pan the viewport.
    Move,
}

/// Style and mode applied to the next drawing gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub shape_kind: ShapeKind,
    pub color: RgbaColor,
    pub line_width: f64,
    pub mode: CanvasMode,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            shape_kind: ShapeKind::Freeform,
            color: RgbaColor::red(),
            line_width: DEFAULT_LINE_WIDTH,
            mode: CanvasMode::Draw,
        }
    }
}

impl ToolSettings {
    /// Set the line width. Non-positive or non-finite widths are ignored.
    pub fn set_line_width(&mut self, width: f64) -> bool {
        if !(width.is_finite() && width > 0.0) {
            return false;
        }
        self.line_width = width;
        true
    }

    /// Flip between drawing and moving.
    pub fn toggle_mode(&mut self) -> CanvasMode {
        self.mode = match self.mode {
            CanvasMode::Draw => CanvasMode::Move,
            CanvasMode::Move => CanvasMode::Draw,
        };
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tools = ToolSettings::default();
        assert_eq!(tools.shape_kind, ShapeKind::Freeform);
        assert_eq!(tools.color, RgbaColor::red());
        assert!((tools.line_width - 5.0).abs() < f64::EPSILON);
        assert_eq!(tools.mode, CanvasMode::Draw);
    }

    #[test]
    fn test_rejects_bad_width() {
        let mut tools = ToolSettings::default();
        assert!(!tools.set_line_width(0.0));
        assert!(!tools.set_line_width(f64::NAN));
        assert!(tools.set_line_width(1.5));
        assert!((tools.line_width - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_mode() {
        let mut tools = ToolSettings::default();
        assert_eq!(tools.toggle_mode(), CanvasMode::Move);
        assert_eq!(tools.toggle_mode(), CanvasMode::Draw);
    }
}
