//! Axis-aligned geometry helpers used for hit testing and position diffs.

use kurbo::{Point, Rect, Vec2};

/// Center of a bounding box.
pub fn center(rect: Rect) -> Point {
    Point::new(rect.x0 + rect.width() / 2.0, rect.y0 + rect.height() / 2.0)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Check if a point lies inside a rectangle, edges included.
///
/// `kurbo::Rect::contains` excludes the right and bottom edges, which makes a
/// pointer resting exactly on a boundary miss both neighbours.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Offset that moves `to` back onto `from`.
pub fn offset_between(from: Point, to: Point) -> Vec2 {
    Vec2::new(from.x - to.x, from.y - to.y)
}

/// Top-left corner of a bounding box.
pub fn top_left(rect: Rect) -> Point {
    Point::new(rect.x0, rect.y0)
}

/// Check if an offset is small enough to treat as no movement.
pub fn is_negligible(offset: Vec2) -> bool {
    offset.x.abs() < f64::EPSILON && offset.y.abs() < f64::EPSILON
}
