//! Outward normals from one shape toward another, used for sliding responses.

use crate::{
    core::{Circle, Line, Rectangle, Shape, ShapeKind},
    error::{CollisionError, Result},
    utils::math::{Vector, VectorExt},
};

/// Unit direction from `a` toward the nearest feature of `b`.
pub fn normal_to(a: &Shape, b: &Shape) -> Result<Vector> {
    match a.kind() {
        ShapeKind::Circle(circle) => circle_normal_to(circle, b),
        ShapeKind::Line(line) => line_normal_to(line, b),
        ShapeKind::Rectangle(rect) => rectangle_normal_to(rect, b),
    }
}

/// Direction from the circle center to the closest point of `other`, or to
/// its center when the circle center is already inside `other`.
pub fn circle_normal_to(circle: &Circle, other: &Shape) -> Result<Vector> {
    let center = circle.center();

    (other.closest_point(center) - center)
        .try_normalize_checked()
        .or_else(|_| (other.center() - center).try_normalize_checked())
}

/// Perpendicular of the line pointing at the reference point of `other`.
pub fn line_normal_to(line: &Line, other: &Shape) -> Result<Vector> {
    let reference = match other.kind() {
        ShapeKind::Line(other) => other.center(),
        _ => other.closest_point(line.closest_point(other.center())),
    };

    match (reference - line.project_point(reference)).try_normalize_checked() {
        Ok(normal) => Ok(normal),
        Err(_) => {
            let perpendicular = line.direction().perp().try_normalize_checked()?;
            let towards = other.center() - line.center();
            if towards.dot(perpendicular) < 0.0 {
                Ok(-perpendicular)
            } else {
                Ok(perpendicular)
            }
        }
    }
}

/// Face normal of the rectangle on the side facing `other`.
pub fn rectangle_normal_to(rect: &Rectangle, other: &Shape) -> Result<Vector> {
    let mut local = rect.to_local(other.closest_point(rect.center()));
    if local.is_degenerate() {
        local = rect.to_local(other.center());
    }
    if local.is_degenerate() {
        return Err(CollisionError::DegenerateVector);
    }

    let extents = rect.extents();
    if local.x.abs() / extents.x >= local.y.abs() / extents.y {
        Ok(rect.x_axis() * local.x.signum())
    } else {
        Ok(rect.y_axis() * local.y.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    #[test]
    fn circle_to_circle_points_along_centers() {
        let a = Shape::circle(v(0.0, 0.0), 1.0).unwrap();
        let b = Shape::circle(v(5.0, 0.0), 2.0).unwrap();

        assert!(normal_to(&a, &b).unwrap().approx_eq(v(1.0, 0.0)));
        assert!(normal_to(&b, &a).unwrap().approx_eq(v(-1.0, 0.0)));
    }

    #[test]
    fn circle_to_line_is_perpendicular() {
        let circle = Shape::circle(v(2.0, 3.0), 1.0).unwrap();
        let line = Shape::line(v(0.0, 0.0), v(10.0, 0.0)).unwrap();

        assert!(normal_to(&circle, &line).unwrap().approx_eq(v(0.0, -1.0)));
        assert!(normal_to(&line, &circle).unwrap().approx_eq(v(0.0, 1.0)));
    }

    #[test]
    fn line_to_line_points_at_other_center() {
        let a = Shape::line(v(0.0, 0.0), v(4.0, 0.0)).unwrap();
        let b = Shape::line(v(1.0, -3.0), v(3.0, -3.0)).unwrap();

        assert!(normal_to(&a, &b).unwrap().approx_eq(v(0.0, -1.0)));
    }

    #[test]
    fn rectangle_face_normals() {
        let rect = Shape::rectangle(v(0.0, 0.0), 4.0, 2.0, 0.0).unwrap();
        let right = Shape::circle(v(5.0, 0.5), 1.0).unwrap();
        let above = Shape::circle(v(0.5, 4.0), 1.0).unwrap();

        assert!(normal_to(&rect, &right).unwrap().approx_eq(v(1.0, 0.0)));
        assert!(normal_to(&rect, &above).unwrap().approx_eq(v(0.0, 1.0)));
    }

    #[test]
    fn coincident_shapes_are_degenerate() {
        let a = Shape::circle(v(1.0, 1.0), 1.0).unwrap();
        let b = Shape::circle(v(1.0, 1.0), 2.0).unwrap();

        assert_eq!(normal_to(&a, &b), Err(CollisionError::DegenerateVector));
    }
}
