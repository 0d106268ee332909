//! Contact points between shapes.
//!
//! Every pair yields at most a handful of isolated intersection points.
//! Degenerate configurations (concentric circles, parallel or collinear
//! segments) yield no points instead of NaNs.

use crate::{
    config::EPSILON,
    core::{Circle, Line, Rectangle, Shape, ShapeKind},
    utils::math::{Vector, VectorExt},
};

/// Intersection points between the outlines of `a` and `b`.
pub fn contact(a: &Shape, b: &Shape) -> Vec<Vector> {
    contact_kind(a.kind(), b.kind())
}

pub fn contact_kind(a: &ShapeKind, b: &ShapeKind) -> Vec<Vector> {
    match (a, b) {
        (ShapeKind::Rectangle(a), ShapeKind::Rectangle(b)) => contact_rectangle_to_rectangle(a, b),
        (ShapeKind::Rectangle(rect), ShapeKind::Circle(circle))
        | (ShapeKind::Circle(circle), ShapeKind::Rectangle(rect)) => {
            contact_rectangle_to_circle(rect, circle)
        }
        (ShapeKind::Circle(a), ShapeKind::Circle(b)) => contact_circle_to_circle(a, b),
        (ShapeKind::Line(a), ShapeKind::Line(b)) => contact_line_to_line(a, b),
        (ShapeKind::Line(line), ShapeKind::Circle(circle))
        | (ShapeKind::Circle(circle), ShapeKind::Line(line)) => {
            contact_line_to_circle(line, circle)
        }
        (ShapeKind::Line(line), ShapeKind::Rectangle(rect))
        | (ShapeKind::Rectangle(rect), ShapeKind::Line(line)) => {
            contact_line_to_rectangle(line, rect)
        }
    }
}

pub fn contact_line_to_circle(line: &Line, circle: &Circle) -> Vec<Vector> {
    let length = line.length();
    let Ok(direction) = line.direction().try_normalize_checked() else {
        return Vec::new();
    };

    // Unit direction, so the quadratic's leading coefficient is 1.
    let f = line.p() - circle.center();
    let b = 2.0 * f.dot(direction);
    let c = f.length_squared() - circle.radius() * circle.radius();
    let discriminant = b * b - 4.0 * c;

    let on_segment = |t: f64| t >= -EPSILON && t <= length + EPSILON;
    let mut contacts = Vec::with_capacity(2);

    if discriminant.abs() <= EPSILON {
        let t = -b * 0.5;
        if on_segment(t) {
            contacts.push(line.p() + direction * t);
        }
    } else if discriminant > 0.0 {
        let root = discriminant.sqrt();
        for t in [(-b - root) * 0.5, (-b + root) * 0.5] {
            if on_segment(t) {
                contacts.push(line.p() + direction * t);
            }
        }
    }

    contacts
}

/// Single crossing point of two segments; parallel or collinear segments yield none.
pub fn contact_line_to_line(a: &Line, b: &Line) -> Vec<Vector> {
    let r = a.direction();
    let s = b.direction();
    let rxs = r.cross(s);

    if rxs.abs() < EPSILON {
        return Vec::new();
    }

    let qp = b.p() - a.p();
    let t = qp.cross(s) / rxs;
    let u = qp.cross(r) / rxs;
    let range = -EPSILON..=1.0 + EPSILON;

    if range.contains(&t) && range.contains(&u) {
        vec![a.p() + r * t]
    } else {
        Vec::new()
    }
}

pub fn contact_line_to_rectangle(line: &Line, rect: &Rectangle) -> Vec<Vector> {
    let mut contacts = Vec::new();
    for side in rect.sides() {
        push_unique(&mut contacts, contact_line_to_line(line, &side));
    }
    contacts
}

pub fn contact_rectangle_to_circle(rect: &Rectangle, circle: &Circle) -> Vec<Vector> {
    let mut contacts = Vec::new();
    for side in rect.sides() {
        push_unique(&mut contacts, contact_line_to_circle(&side, circle));
    }
    contacts
}

pub fn contact_rectangle_to_rectangle(a: &Rectangle, b: &Rectangle) -> Vec<Vector> {
    let mut contacts = Vec::new();
    for side in a.sides() {
        for other in b.sides() {
            push_unique(&mut contacts, contact_line_to_line(&side, &other));
        }
    }
    contacts
}

/// Intersection of two circle outlines: zero, one (tangent) or two points.
pub fn contact_circle_to_circle(a: &Circle, b: &Circle) -> Vec<Vector> {
    let offset = b.center() - a.center();
    let d = offset.length();

    // Concentric circles either coincide or never meet.
    if d < EPSILON {
        return Vec::new();
    }

    if d > a.radius() + b.radius() + EPSILON || d < (a.radius() - b.radius()).abs() - EPSILON {
        return Vec::new();
    }

    let along = (d * d + a.radius() * a.radius() - b.radius() * b.radius()) / (2.0 * d);
    let h_squared = a.radius() * a.radius() - along * along;
    let unit = offset / d;
    let base = a.center() + unit * along;

    if h_squared <= EPSILON {
        return vec![base];
    }

    let h = h_squared.sqrt();
    let across = unit.perp() * h;
    vec![base + across, base - across]
}

fn push_unique(contacts: &mut Vec<Vector>, points: Vec<Vector>) {
    for point in points {
        if !contacts.iter().any(|existing| existing.approx_eq(point)) {
            contacts.push(point);
        }
    }
}
