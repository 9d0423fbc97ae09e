//! Vector primitives stored on the canvas.

mod shape;
mod stroke;

pub use shape::{Shape, build_outline};
pub use stroke::Stroke;

use kurbo::{Affine, BezPath, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA, each channel in `0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl RgbaColor {
    /// Create a color, clamping every channel into `0.0..=1.0`.
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn red() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    pub fn blue() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for RgbaColor {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.components;
        Self::new(r as f64, g as f64, b as f64, a as f64)
    }
}

impl From<RgbaColor> for Color {
    fn from(color: RgbaColor) -> Self {
        Color::new([
            color.red as f32,
            color.green as f32,
            color.blue as f32,
            color.alpha as f32,
        ])
    }
}

/// The kind of primitive a drawing gesture produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Freehand drawing, stored as a [`Stroke`].
    #[default]
    Freeform,
    Rectangle,
    Circle,
}

/// Unique identifier for primitives.
pub type PrimitiveId = Uuid;

/// Common behaviour of everything that can live on the canvas.
pub trait PrimitiveTrait {
    /// Get the unique identifier.
    fn id(&self) -> PrimitiveId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Stroke color.
    fn color(&self) -> RgbaColor;

    /// Line width in screen-space units.
    fn line_width(&self) -> f64;

    /// Apply a transform to the geometry.
    fn transform(&mut self, affine: Affine);
}

/// A stroke or a shape, in drawing order.
///
/// Serialized untagged so that documents holding only strokes keep the
/// plain `{id, points, color, lineWidth}` record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Stroke(Stroke),
    Shape(Shape),
}

impl Primitive {
    pub fn id(&self) -> PrimitiveId {
        match self {
            Primitive::Stroke(s) => s.id(),
            Primitive::Shape(s) => s.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Primitive::Stroke(s) => s.bounds(),
            Primitive::Shape(s) => s.bounds(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Primitive::Stroke(s) => s.to_path(),
            Primitive::Shape(s) => s.to_path(),
        }
    }

    pub fn color(&self) -> RgbaColor {
        match self {
            Primitive::Stroke(s) => s.color(),
            Primitive::Shape(s) => s.color(),
        }
    }

    pub fn line_width(&self) -> f64 {
        match self {
            Primitive::Stroke(s) => s.line_width(),
            Primitive::Shape(s) => s.line_width(),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            Primitive::Stroke(s) => s.transform(affine),
            Primitive::Shape(s) => s.transform(affine),
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Primitive::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Primitive::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this primitive may be committed to the store and persisted.
    ///
    /// Strokes need at least one point; shapes must be finalized and of a
    /// geometric kind. Either way the line width must be positive.
    pub fn is_committable(&self) -> bool {
        let width = self.line_width();
        if !(width.is_finite() && width > 0.0) {
            return false;
        }
        match self {
            Primitive::Stroke(s) => !s.is_empty(),
            Primitive::Shape(s) => s.is_finalized && s.kind != ShapeKind::Freeform,
        }
    }
}
