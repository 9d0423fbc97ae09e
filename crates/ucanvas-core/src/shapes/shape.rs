//! Geometric shapes defined by a drag from a start point to an end point.

use super::{PrimitiveId, PrimitiveTrait, RgbaColor, ShapeKind};
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flattening tolerance used when converting outlines to paths.
const OUTLINE_TOLERANCE: f64 = 0.1;

/// A rectangle or circle spanned by two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub(crate) id: PrimitiveId,
    /// Shape kind. Never [`ShapeKind::Freeform`] for stored shapes.
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Where the drag started.
    #[serde(rename = "startPoint")]
    pub start: Point,
    /// Where the drag currently is (or ended).
    #[serde(rename = "endPoint")]
    pub end: Point,
    pub color: RgbaColor,
    pub line_width: f64,
    /// Set once the drag ends. Never reset.
    #[serde(default = "finalized")]
    pub is_finalized: bool,
}

fn finalized() -> bool {
    true
}

impl Shape {
    /// Start a new shape at `point` (start and end coincide).
    pub fn new(kind: ShapeKind, point: Point, color: RgbaColor, line_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            start: point,
            end: point,
            color,
            line_width,
            is_finalized: false,
        }
    }

    /// Create a finalized shape from two corner points.
    pub fn from_corners(kind: ShapeKind, start: Point, end: Point, color: RgbaColor, line_width: f64) -> Self {
        Self {
            end,
            is_finalized: true,
            ..Self::new(kind, start, color, line_width)
        }
    }

    /// Move the end point. Ignored once the shape is finalized.
    pub fn set_end(&mut self, end: Point) -> bool {
        if self.is_finalized {
            return false;
        }
        self.end = end;
        true
    }

    /// Mark the shape as finished.
    pub fn finalize(&mut self) {
        self.is_finalized = true;
    }

    /// Closed outline for this shape, `None` for freeform.
    pub fn outline(&self) -> Option<BezPath> {
        build_outline(self.kind, self.start, self.end)
    }
}

/// Axis-aligned box spanned by two corners.
fn corner_rect(start: Point, end: Point) -> Rect {
    let min_x = start.x.min(end.x);
    let min_y = start.y.min(end.y);
    let width = (end.x - start.x).abs();
    let height = (end.y - start.y).abs();
    Rect::new(min_x, min_y, min_x + width, min_y + height)
}

/// Circle whose diameter is the segment `start..end`.
fn diameter_circle(start: Point, end: Point) -> Circle {
    Circle::new(start.midpoint(end), start.distance(end) / 2.0)
}

/// Build the closed outline for a shape kind spanned by `start` and `end`.
///
/// Freeform input is rejected with `None`; freehand lines go through
/// [`crate::curve::build_curve`] instead.
pub fn build_outline(kind: ShapeKind, start: Point, end: Point) -> Option<BezPath> {
    match kind {
        ShapeKind::Rectangle => Some(corner_rect(start, end).to_path(OUTLINE_TOLERANCE)),
        ShapeKind::Circle => Some(diameter_circle(start, end).to_path(OUTLINE_TOLERANCE)),
        ShapeKind::Freeform => None,
    }
}

impl PrimitiveTrait for Shape {
    fn id(&self) -> PrimitiveId {
        self.id
    }

    fn bounds(&self) -> Rect {
        match self.kind {
            ShapeKind::Circle => diameter_circle(self.start, self.end).bounding_box(),
            _ => corner_rect(self.start, self.end),
        }
    }

    fn to_path(&self) -> BezPath {
        self.outline().unwrap_or_default()
    }

    fn color(&self) -> RgbaColor {
        self.color
    }

    fn line_width(&self) -> f64 {
        self.line_width
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }
}
