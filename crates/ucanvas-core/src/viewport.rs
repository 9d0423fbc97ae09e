//! Viewport transform between screen space and canvas space.

use crate::config::CanvasConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Pan and zoom state of the visible window onto the virtual canvas.
///
/// Screen coordinates are obtained from canvas coordinates by scaling with
/// `scale` and translating by `offset + drag_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Current zoom scale, always within `min_scale..=max_scale`.
    pub scale: f64,
    /// Committed pan translation.
    pub offset: Vec2,
    /// Translation of a pan gesture still in progress.
    pub drag_offset: Vec2,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
    /// Size of the virtual canvas, used for pan clamping.
    pub canvas_size: Size,
    /// Size of the visible area in screen units.
    pub viewport_size: Size,
    /// Cumulative scale last reported by the pinch gesture.
    last_pinch_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl Viewport {
    /// Create a viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport honouring the configured canvas size and zoom range.
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            offset: Vec2::ZERO,
            drag_offset: Vec2::ZERO,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            canvas_size: config.canvas_size,
            viewport_size: Size::new(800.0, 600.0),
            last_pinch_scale: 1.0,
        }
    }

    /// Total translation currently applied, including an unfinished drag.
    pub fn translation(&self) -> Vec2 {
        self.offset + self.drag_offset
    }

    /// Get the affine transform for rendering (canvas to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translation()) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling (screen to canvas).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.translation())
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        let t = self.translation();
        Point::new(
            (screen_point.x - t.x) / self.scale,
            (screen_point.y - t.y) / self.scale,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        let t = self.translation();
        Point::new(
            canvas_point.x * self.scale + t.x,
            canvas_point.y * self.scale + t.y,
        )
    }

    /// Line width to stroke with in canvas space so the result is `width`
    /// on screen.
    pub fn effective_line_width(&self, width: f64) -> f64 {
        width / self.scale
    }

    /// Update the visible area size.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.offset = self.clamp_offset(self.offset, size);
    }

    /// Canvas-space rectangle currently visible on screen.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_points(
            self.screen_to_canvas(Point::ZERO),
            self.screen_to_canvas(Point::new(self.viewport_size.width, self.viewport_size.height)),
        )
    }

    /// Clamp a proposed pan offset so the visible window stays on the canvas.
    ///
    /// Each axis is limited to `±(canvas - viewport / scale) / 2`. When the
    /// visible window is larger than the canvas the offset is pinned to zero.
    pub fn clamp_offset(&self, proposed: Vec2, viewport_size: Size) -> Vec2 {
        let max_x = ((self.canvas_size.width - viewport_size.width / self.scale) / 2.0).max(0.0);
        let max_y = ((self.canvas_size.height - viewport_size.height / self.scale) / 2.0).max(0.0);
        Vec2::new(
            proposed.x.clamp(-max_x, max_x),
            proposed.y.clamp(-max_y, max_y),
        )
    }

    /// Track an in-progress pan. The translation is relative to where the
    /// gesture started and is not clamped until the gesture ends.
    pub fn pan_update(&mut self, translation: Vec2) {
        self.drag_offset = translation;
    }

    /// Commit a finished pan gesture.
    pub fn pan_end(&mut self, translation: Vec2) {
        self.offset = self.clamp_offset(self.offset + translation, self.viewport_size);
        self.drag_offset = Vec2::ZERO;
    }

    /// Pan immediately by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset = self.clamp_offset(self.offset + delta, self.viewport_size);
    }

    /// Multiply the scale by `factor`, clamped to the allowed range.
    ///
    /// Returns `false` when the factor is unusable or the scale did not change.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = new_scale;
        self.offset = self.clamp_offset(self.offset, self.viewport_size);
        true
    }

    /// Zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, focal: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        let ratio = new_scale / self.scale;
        let focal = focal.to_vec2();
        let anchored = focal - (focal - self.translation()) * ratio;

        self.scale = new_scale;
        self.offset = self.clamp_offset(anchored - self.drag_offset, self.viewport_size);
        true
    }

    /// Feed the cumulative scale of an ongoing pinch gesture.
    pub fn pinch_update(&mut self, cumulative_scale: f64, focal: Point) -> bool {
        if !cumulative_scale.is_finite() || cumulative_scale <= 0.0 {
            return false;
        }
        let factor = cumulative_scale / self.last_pinch_scale;
        self.last_pinch_scale = cumulative_scale;
        self.zoom_at(focal, factor)
    }

    /// Finish a pinch gesture.
    pub fn pinch_end(&mut self) {
        self.last_pinch_scale = 1.0;
    }

    /// Reset pan and zoom.
    pub fn reset(&mut self) {
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
        self.offset = Vec2::ZERO;
        self.drag_offset = Vec2::ZERO;
        self.last_pinch_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_identity() {
        let viewport = Viewport::new();
        let screen = Point::new(100.0, 200.0);
        let canvas = viewport.screen_to_canvas(screen);
        assert!((canvas.x - screen.x).abs() < f64::EPSILON);
        assert!((canvas.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_offsets_and_scale() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        viewport.drag_offset = Vec2::new(10.0, -20.0);
        viewport.scale = 2.0;

        let canvas = viewport.screen_to_canvas(Point::new(100.0, 200.0));
        assert!((canvas.x - 20.0).abs() < f64::EPSILON);
        assert!((canvas.y - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(30.0, -20.0);
        viewport.drag_offset = Vec2::new(-7.5, 3.25);
        viewport.scale = 1.5;

        for original in [
            Point::new(123.0, 456.0),
            Point::new(-80.0, 0.5),
            Point::new(2500.0, -2500.0),
        ] {
            let screen = viewport.canvas_to_screen(original);
            let back = viewport.screen_to_canvas(screen);
            assert!((back.x - original.x).abs() < 1e-9);
            assert!((back.y - original.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_affine_matches_point_mapping() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(12.0, 34.0);
        viewport.scale = 2.5;

        let p = Point::new(7.0, -3.0);
        let via_affine = viewport.transform() * p;
        let direct = viewport.canvas_to_screen(p);
        assert!((via_affine - direct).hypot() < 1e-9);

        let back = viewport.inverse_transform() * direct;
        assert!((back - p).hypot() < 1e-9);
    }

    #[test]
    fn test_visible_rect() {
        let mut viewport = Viewport::new();
        viewport.set_viewport_size(Size::new(800.0, 600.0));
        assert_eq!(viewport.visible_rect(), Rect::new(0.0, 0.0, 800.0, 600.0));

        viewport.zoom_by(2.0);
        viewport.pan_by(Vec2::new(-100.0, 50.0));
        let visible = viewport.visible_rect();
        assert!((visible.x0 - 50.0).abs() < 1e-9);
        assert!((visible.y0 + 25.0).abs() < 1e-9);
        assert!((visible.width() - 400.0).abs() < 1e-9);
        assert!((visible.height() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.zoom_by(0.001);
        assert!((viewport.scale - 0.5).abs() < f64::EPSILON);

        viewport.zoom_by(1000.0);
        assert!((viewport.scale - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_sequence_stays_in_range() {
        let mut viewport = Viewport::new();
        for factor in [3.0, 7.0, 0.01, 1e9, 1e-9, 2.0, 0.0, -4.0, f64::NAN, f64::INFINITY, 0.7] {
            viewport.zoom_at(Point::new(400.0, 300.0), factor);
            assert!(viewport.scale >= 0.5 && viewport.scale <= 5.0);
        }
    }

    #[test]
    fn test_zoom_at_keeps_focal_point() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(40.0, 25.0);
        let focal = Point::new(300.0, 200.0);
        let before = viewport.screen_to_canvas(focal);

        assert!(viewport.zoom_at(focal, 2.0));

        let after = viewport.screen_to_canvas(focal);
        assert!((before - after).hypot() < 1e-9);
        assert!((viewport.scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pinch_uses_incremental_factor() {
        let mut viewport = Viewport::new();
        viewport.pinch_update(1.5, Point::ZERO);
        viewport.pinch_update(3.0, Point::ZERO);
        assert!((viewport.scale - 3.0).abs() < 1e-9);

        viewport.pinch_end();
        viewport.pinch_update(0.5, Point::ZERO);
        assert!((viewport.scale - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_pan_clamps_to_canvas() {
        let mut viewport = Viewport::new();
        viewport.set_viewport_size(Size::new(1000.0, 800.0));

        viewport.pan_update(Vec2::new(10_000.0, -10_000.0));
        assert_eq!(viewport.drag_offset, Vec2::new(10_000.0, -10_000.0));

        viewport.pan_end(Vec2::new(10_000.0, -10_000.0));
        assert_eq!(viewport.drag_offset, Vec2::ZERO);
        // (5000 - 1000) / 2 and (5000 - 800) / 2
        assert_eq!(viewport.offset, Vec2::new(2000.0, -2100.0));
    }

    #[test]
    fn test_pan_sequence_stays_in_bounds() {
        let mut viewport = Viewport::new();
        viewport.set_viewport_size(Size::new(1024.0, 768.0));
        let max_x = (5000.0 - 1024.0) / 2.0;
        let max_y = (5000.0 - 768.0) / 2.0;

        for delta in [
            Vec2::new(3000.0, 0.0),
            Vec2::new(-9000.0, 250.0),
            Vec2::new(40.0, -1e7),
            Vec2::new(1e9, 1e9),
            Vec2::new(-12.5, 7.5),
        ] {
            viewport.pan_update(delta);
            viewport.pan_end(delta);
            assert!(viewport.offset.x.abs() <= max_x);
            assert!(viewport.offset.y.abs() <= max_y);
        }
    }

    #[test]
    fn test_clamp_accounts_for_scale() {
        let mut viewport = Viewport::new();
        viewport.scale = 0.5;
        // Viewport covers 2000 canvas units wide at half scale.
        let clamped = viewport.clamp_offset(Vec2::new(5000.0, 0.0), Size::new(1000.0, 1000.0));
        assert!((clamped.x - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_pins_oversized_viewport() {
        let mut viewport = Viewport::new();
        viewport.canvas_size = Size::new(100.0, 100.0);
        let clamped = viewport.clamp_offset(Vec2::new(40.0, -40.0), Size::new(400.0, 400.0));
        assert_eq!(clamped, Vec2::ZERO);
    }

    #[test]
    fn test_effective_line_width() {
        let mut viewport = Viewport::new();
        viewport.scale = 4.0;
        assert!((viewport.effective_line_width(2.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut viewport = Viewport::new();
        viewport.pan_by(Vec2::new(10.0, 20.0));
        viewport.zoom_by(2.0);
        viewport.reset();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }
}
