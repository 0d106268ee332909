use serde::{Deserialize, Serialize};

use super::{aabb::Aabb, line::Line};
use crate::{
    error::{CollisionError, Result},
    utils::math::{adjust_angle, Vector, VectorExt, RIGHT, UP},
};

/// Oriented rectangle.
///
/// The local axes are always derived from `angle`, so repeated rotations
/// never let them drift away from an orthonormal pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    center: Vector,
    extents: Vector,
    x_axis: Vector,
    y_axis: Vector,
    angle: f64,
}

impl Rectangle {
    /// Creates a rectangle of `width × height` rotated by `angle` degrees.
    pub fn new(center: Vector, width: f64, height: f64, angle: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(CollisionError::InvalidExtents { width, height });
        }

        let mut rect = Self {
            center,
            extents: Vector::new(width * 0.5, height * 0.5),
            x_axis: RIGHT,
            y_axis: UP,
            angle: 0.0,
        };
        rect.set_angle(angle);

        Ok(rect)
    }

    /// Axis-aligned rectangle covering the same area as `aabb`.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            extents: aabb.half_extents(),
            x_axis: RIGHT,
            y_axis: UP,
            angle: 0.0,
        }
    }

    pub fn center(&self) -> Vector {
        self.center
    }

    pub fn extents(&self) -> Vector {
        self.extents
    }

    pub fn width(&self) -> f64 {
        self.extents.x * 2.0
    }

    pub fn height(&self) -> f64 {
        self.extents.y * 2.0
    }

    pub fn x_axis(&self) -> Vector {
        self.x_axis
    }

    pub fn y_axis(&self) -> Vector {
        self.y_axis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_radians(&self) -> f64 {
        self.angle.to_radians()
    }

    pub fn translate(&mut self, direction: Vector) -> Vector {
        self.center += direction;
        self.center
    }

    pub fn set_position(&mut self, position: Vector) -> Vector {
        self.center = position;
        self.center
    }

    pub fn rotate(&mut self, angle: f64) -> f64 {
        self.set_angle(self.angle + angle)
    }

    pub fn rotate_radians(&mut self, angle: f64) -> f64 {
        self.rotate(angle.to_degrees()).to_radians()
    }

    pub fn set_angle(&mut self, angle: f64) -> f64 {
        self.angle = adjust_angle(angle);
        self.x_axis = RIGHT.rotate_degrees(self.angle);
        self.y_axis = UP.rotate_degrees(self.angle);
        self.angle
    }

    pub fn set_angle_radians(&mut self, angle: f64) -> f64 {
        self.set_angle(angle.to_degrees()).to_radians()
    }

    /// Upper right corner of the rectangle before rotation, carried through its axes.
    pub fn max(&self) -> Vector {
        self.center + self.x_axis * self.extents.x + self.y_axis * self.extents.y
    }

    /// Lower left corner of the rectangle before rotation, carried through its axes.
    pub fn min(&self) -> Vector {
        self.center - self.x_axis * self.extents.x - self.y_axis * self.extents.y
    }

    /// Corners in counter-clockwise order starting at [`Rectangle::min`].
    pub fn vertices(&self) -> [Vector; 4] {
        let x = self.x_axis * self.extents.x;
        let y = self.y_axis * self.extents.y;

        [
            self.center - x - y,
            self.center + x - y,
            self.center + x + y,
            self.center - x + y,
        ]
    }

    pub fn sides(&self) -> [Line; 4] {
        let [a, b, c, d] = self.vertices();

        [
            Line::from_points_unchecked(a, b),
            Line::from_points_unchecked(b, c),
            Line::from_points_unchecked(c, d),
            Line::from_points_unchecked(d, a),
        ]
    }

    /// Converts a world point into the rectangle's unrotated frame.
    pub fn to_local(&self, point: Vector) -> Vector {
        let relative = point - self.center;
        Vector::new(relative.dot(self.x_axis), relative.dot(self.y_axis))
    }

    pub fn to_world(&self, local: Vector) -> Vector {
        self.center + self.x_axis * local.x + self.y_axis * local.y
    }

    pub fn contains_point(&self, point: Vector) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.extents.x && local.y.abs() <= self.extents.y
    }

    /// Point of the rectangle closest to `point`; points inside map to themselves.
    pub fn closest_point(&self, point: Vector) -> Vector {
        let local = self.to_local(point).clamp(-self.extents, self.extents);
        self.to_world(local)
    }

    pub fn aabb(&self) -> Aabb {
        let half = self.x_axis.abs() * self.extents.x + self.y_axis.abs() * self.extents.y;
        Aabb::from_center(self.center, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rejects_non_positive_extents() {
        assert!(matches!(
            Rectangle::new(Vector::ZERO, 0.0, 1.0, 0.0),
            Err(CollisionError::InvalidExtents { .. })
        ));
        assert!(Rectangle::new(Vector::ZERO, 2.0, -1.0, 0.0).is_err());
    }

    #[test]
    fn contains_point_uses_local_frame() {
        let rect = Rectangle::new(Vector::new(3.0, 2.0), 4.0, 2.0, 45.0).unwrap();

        assert!(rect.contains_point(Vector::new(3.0, 2.0)));
        assert!(rect.contains_point(Vector::new(4.2, 3.2)));
        assert!(!rect.contains_point(Vector::new(4.5, 1.0)));
    }

    #[test]
    fn rotation_keeps_axes_orthonormal() {
        let mut rect = Rectangle::new(Vector::ZERO, 2.0, 1.0, 0.0).unwrap();
        for _ in 0..1000 {
            rect.rotate(37.0);
        }

        assert_abs_diff_eq!(rect.x_axis().length(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rect.x_axis().dot(rect.y_axis()), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rect.angle(), (37.0f64 * 1000.0).rem_euclid(360.0), epsilon = 1e-6);
    }

    #[test]
    fn aabb_of_rotated_square() {
        let rect = Rectangle::new(Vector::ZERO, 2.0, 2.0, 45.0).unwrap();
        let aabb = rect.aabb();

        assert_abs_diff_eq!(aabb.max.x, 2f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(aabb.min.y, -(2f64.sqrt()), epsilon = 1e-9);
    }

    #[test]
    fn vertices_are_counter_clockwise() {
        let rect = Rectangle::new(Vector::new(1.0, 1.0), 2.0, 4.0, 0.0).unwrap();
        let [a, b, c, d] = rect.vertices();

        assert!(a.approx_eq(Vector::new(0.0, -1.0)));
        assert!(b.approx_eq(Vector::new(2.0, -1.0)));
        assert!(c.approx_eq(Vector::new(2.0, 3.0)));
        assert!(d.approx_eq(Vector::new(0.0, 3.0)));
        assert!(rect.min().approx_eq(a) && rect.max().approx_eq(c));
    }
}
