//! Exact pairwise overlap tests for every pair of shape kinds.

use crate::{
    core::{Circle, Line, Rectangle, Shape, ShapeKind},
    utils::math::{squared_distance, Vector, VectorExt},
};

/// Optional extra condition a pair must satisfy before the geometry is tested.
pub type CollisionPredicate = Option<fn(&Shape, &Shape) -> bool>;

/// Geometric overlap of two shapes, ignoring tags.
pub fn overlaps(a: &Shape, b: &Shape) -> bool {
    overlaps_kind(a.kind(), b.kind())
}

pub fn overlaps_kind(a: &ShapeKind, b: &ShapeKind) -> bool {
    match (a, b) {
        (ShapeKind::Rectangle(a), ShapeKind::Rectangle(b)) => {
            collision_rectangle_to_rectangle(a, b)
        }
        (ShapeKind::Rectangle(rect), ShapeKind::Circle(circle))
        | (ShapeKind::Circle(circle), ShapeKind::Rectangle(rect)) => {
            collision_rectangle_to_circle(rect, circle)
        }
        (ShapeKind::Circle(a), ShapeKind::Circle(b)) => collision_circle_to_circle(a, b),
        (ShapeKind::Line(a), ShapeKind::Line(b)) => intersection_line_to_line(a, b),
        (ShapeKind::Line(line), ShapeKind::Circle(circle))
        | (ShapeKind::Circle(circle), ShapeKind::Line(line)) => {
            intersection_line_to_circle(line, circle)
        }
        (ShapeKind::Line(line), ShapeKind::Rectangle(rect))
        | (ShapeKind::Rectangle(rect), ShapeKind::Line(line)) => {
            intersection_line_to_rectangle(line, rect)
        }
    }
}

/// `predicate(a, b) && overlaps(a, b)`; a missing predicate accepts every pair.
pub fn collides(a: &Shape, b: &Shape, predicate: CollisionPredicate) -> bool {
    predicate.map_or(true, |accept| accept(a, b)) && overlaps(a, b)
}

/// Separating axis test over both rectangles' local axes.
pub fn collision_rectangle_to_rectangle(a: &Rectangle, b: &Rectangle) -> bool {
    let t = b.center() - a.center();
    let a_x = a.x_axis() * a.extents().x;
    let a_y = a.y_axis() * a.extents().y;
    let b_x = b.x_axis() * b.extents().x;
    let b_y = b.y_axis() * b.extents().y;

    let separated = |axis: Vector, extent: f64, u: Vector, v: Vector| {
        t.dot(axis).abs() > extent + u.dot(axis).abs() + v.dot(axis).abs()
    };

    !(separated(a.x_axis(), a.extents().x, b_x, b_y)
        || separated(a.y_axis(), a.extents().y, b_x, b_y)
        || separated(b.x_axis(), b.extents().x, a_x, a_y)
        || separated(b.y_axis(), b.extents().y, a_x, a_y))
}

/// Clamps the circle center in the rectangle's local frame and tests the result.
pub fn collision_rectangle_to_circle(rect: &Rectangle, circle: &Circle) -> bool {
    let local_center = rect.to_local(circle.center());
    let closest = local_center.clamp(-rect.extents(), rect.extents());

    squared_distance(local_center, closest) <= circle.radius() * circle.radius()
}

pub fn collision_circle_to_circle(a: &Circle, b: &Circle) -> bool {
    let radii = a.radius() + b.radius();
    squared_distance(a.center(), b.center()) <= radii * radii
}

pub fn intersection_line_to_line(a: &Line, b: &Line) -> bool {
    if (a.contains_point(b.p()) && a.contains_point(b.q()))
        || (b.contains_point(a.p()) && b.contains_point(a.q()))
    {
        return true;
    }

    a.bounding_box().overlaps(&b.bounding_box())
        && a.touches_or_crosses(b)
        && b.touches_or_crosses(a)
}

/// Solves `|p + t·(q − p) − c|² = r²` and accepts roots with `t ∈ [0, 1]`.
pub fn intersection_line_to_circle(line: &Line, circle: &Circle) -> bool {
    if circle.contains_point(line.p()) || circle.contains_point(line.q()) {
        return true;
    }

    let d = line.direction();
    let f = line.p() - circle.center();
    let a = d.length_squared();
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - circle.radius() * circle.radius();
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);

    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Separating axis test treating the segment as a rectangle with no height.
pub fn intersection_line_to_rectangle(line: &Line, rect: &Rectangle) -> bool {
    let Ok(line_x) = line.direction().try_normalize_checked() else {
        return rect.contains_point(line.p());
    };
    let line_y = line_x.perp();
    let line_extent = line.length() * 0.5;
    let half_line = line_x * line_extent;
    let rect_x = rect.x_axis() * rect.extents().x;
    let rect_y = rect.y_axis() * rect.extents().y;
    let t = line.center() - rect.center();

    let sep_rect_x =
        t.dot(rect.x_axis()).abs() > rect.extents().x + half_line.dot(rect.x_axis()).abs();
    let sep_rect_y =
        t.dot(rect.y_axis()).abs() > rect.extents().y + half_line.dot(rect.y_axis()).abs();
    let sep_line_x = t.dot(line_x).abs()
        > line_extent + rect_x.dot(line_x).abs() + rect_y.dot(line_x).abs();
    let sep_line_y = t.dot(line_y).abs() > rect_x.dot(line_y).abs() + rect_y.dot(line_y).abs();

    !(sep_rect_x || sep_rect_y || sep_line_x || sep_line_y)
}
