//! Freehand stroke primitive.

use super::{PrimitiveId, PrimitiveTrait, RgbaColor};
use crate::curve::build_curve;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand line: the touch samples in drawing order plus its style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub(crate) id: PrimitiveId,
    /// Points in canvas coordinates, in the order they were sampled.
    pub points: Vec<Point>,
    /// Stroke color.
    pub color: RgbaColor,
    /// Line width in screen-space units.
    pub line_width: f64,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new(color: RgbaColor, line_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            color,
            line_width,
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, color: RgbaColor, line_width: f64) -> Self {
        Self {
            points,
            ..Self::new(color, line_width)
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl PrimitiveTrait for Stroke {
    fn id(&self) -> PrimitiveId {
        self.id
    }

    fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }

    fn to_path(&self) -> BezPath {
        build_curve(&self.points)
    }

    fn color(&self) -> RgbaColor {
        self.color
    }

    fn line_width(&self) -> f64 {
        self.line_width
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}
