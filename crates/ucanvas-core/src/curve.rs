//! Curve smoothing for freehand input.
//!
//! Raw touch samples are jittery at the pixel level. Rather than fitting a
//! spline, each sample becomes the control point of a quadratic segment that
//! ends halfway to the next sample. The result is tangent-continuous and can
//! be rebuilt every frame while a stroke is still being drawn.

use kurbo::{BezPath, Point};

/// Midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Build a smoothed path through `points`.
///
/// - no points: empty path
/// - one point: a lone `MoveTo`, which strokes to nothing
/// - otherwise: a quadratic to each midpoint using the previous sample as the
///   control point, then a last quadratic from the final midpoint onto the
///   final sample.
pub fn build_curve(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();

    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);
    if rest.is_empty() {
        return path;
    }

    for pair in points.windows(2) {
        path.quad_to(pair[0], midpoint(pair[0], pair[1]));
    }

    let n = points.len();
    path.quad_to(points[n - 2], points[n - 1]);

    path
}

/// Straight segments through `points`, used for low-detail outlines.
pub fn build_polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();

    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);
    for point in rest {
        path.line_to(*point);
    }

    path
}
