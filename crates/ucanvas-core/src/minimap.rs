//! Scaled-down overview of the whole canvas.

use crate::config::CanvasConfig;
use crate::curve::build_polyline;
use crate::shapes::{Primitive, PrimitiveTrait};
use crate::viewport::Viewport;
use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Line width for primitives drawn on the mini-map.
pub const MINIMAP_LINE_WIDTH: f64 = 0.5;

/// Line width of the rectangle marking the visible area.
pub const VIEWPORT_LINE_WIDTH: f64 = 1.0;

/// Projects canvas content and the visible window into a fixed-size overview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiniMap {
    pub canvas_size: Size,
    pub minimap_size: Size,
}

impl MiniMap {
    pub fn new(canvas_size: Size, minimap_size: Size) -> Self {
        Self {
            canvas_size,
            minimap_size,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.canvas_size, config.minimap_size)
    }

    /// Per-axis factor from canvas units to mini-map units.
    pub fn scale_factors(&self) -> Vec2 {
        Vec2::new(
            self.minimap_size.width / self.canvas_size.width,
            self.minimap_size.height / self.canvas_size.height,
        )
    }

    fn affine(&self) -> Affine {
        let factors = self.scale_factors();
        Affine::scale_non_uniform(factors.x, factors.y)
    }

    /// Map a canvas point into the mini-map.
    pub fn project_point(&self, point: Point) -> Point {
        let factors = self.scale_factors();
        Point::new(point.x * factors.x, point.y * factors.y)
    }

    /// Copy of `primitive` with its geometry scaled into the mini-map.
    pub fn project(&self, primitive: &Primitive) -> Primitive {
        let mut projected = primitive.clone();
        projected.transform(self.affine());
        projected
    }

    /// Thin outline of `primitive` in mini-map coordinates.
    ///
    /// Strokes are drawn as straight polylines; at this size the smoothing is
    /// invisible.
    pub fn outline(&self, primitive: &Primitive) -> BezPath {
        match self.project(primitive) {
            Primitive::Stroke(stroke) => build_polyline(&stroke.points),
            Primitive::Shape(shape) => shape.to_path(),
        }
    }

    /// Rectangle marking the visible window, in mini-map coordinates.
    pub fn project_viewport(&self, viewport: &Viewport) -> Rect {
        let mini = self.minimap_size;
        let canvas = self.canvas_size;
        let view = viewport.viewport_size;

        let size = Size::new(
            (view.width / canvas.width) * mini.width / viewport.scale,
            (view.height / canvas.height) * mini.height / viewport.scale,
        );
        let shift = -viewport.offset - viewport.drag_offset;
        let center = Point::new(
            (shift.x / canvas.width) * mini.width + mini.width / 2.0,
            (shift.y / canvas.height) * mini.height + mini.height / 2.0,
        );
        Rect::from_center_size(center, size)
    }

    /// Bounds of the mini-map itself.
    pub fn bounds(&self) -> Rect {
        self.minimap_size.to_rect()
    }
}

impl Default for MiniMap {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}
