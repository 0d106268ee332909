use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::{
    config::EPSILON,
    error::{CollisionError, Result},
    utils::math::{adjust_angle, distance, heading, Vector, VectorExt},
};

/// Side of a directed line a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

impl Orientation {
    pub fn as_i8(self) -> i8 {
        match self {
            Orientation::Clockwise => 1,
            Orientation::Collinear => 0,
            Orientation::CounterClockwise => -1,
        }
    }
}

/// Line segment from `p` to `q`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    p: Vector,
    q: Vector,
    angle: f64,
}

impl Line {
    pub fn new(p: Vector, q: Vector) -> Result<Self> {
        if !(distance(p, q) >= EPSILON) {
            return Err(CollisionError::DegenerateLine);
        }

        Ok(Self::from_points_unchecked(p, q))
    }

    /// Builds a line without the length check. Callers guarantee `p != q`.
    pub(crate) fn from_points_unchecked(p: Vector, q: Vector) -> Self {
        let angle = heading(q - p).unwrap_or(0.0);
        Self { p, q, angle }
    }

    pub fn p(&self) -> Vector {
        self.p
    }

    pub fn q(&self) -> Vector {
        self.q
    }

    /// Vector from `p` to `q`.
    pub fn direction(&self) -> Vector {
        self.q - self.p
    }

    pub fn center(&self) -> Vector {
        (self.p + self.q) * 0.5
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_radians(&self) -> f64 {
        self.angle.to_radians()
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn squared_length(&self) -> f64 {
        self.direction().length_squared()
    }

    pub fn translate(&mut self, direction: Vector) -> Vector {
        self.p += direction;
        self.q += direction;
        self.center()
    }

    pub fn set_position(&mut self, position: Vector) -> Vector {
        self.translate(position - self.center())
    }

    /// Rotates the segment around its center.
    pub fn rotate(&mut self, angle: f64) -> f64 {
        let center = self.center();
        self.p = self.p.rotate_around_degrees(angle, center);
        self.q = self.q.rotate_around_degrees(angle, center);
        self.angle = adjust_angle(self.angle + angle);
        self.angle
    }

    pub fn rotate_radians(&mut self, angle: f64) -> f64 {
        self.rotate(angle.to_degrees()).to_radians()
    }

    pub fn set_angle(&mut self, angle: f64) -> f64 {
        self.rotate(angle - self.angle)
    }

    pub fn set_angle_radians(&mut self, angle: f64) -> f64 {
        self.set_angle(angle.to_degrees()).to_radians()
    }

    /// Rotates the whole segment around `base` and returns the new center.
    pub fn rotate_around(&mut self, angle: f64, base: Vector) -> Vector {
        self.p = self.p.rotate_around_degrees(angle, base);
        self.q = self.q.rotate_around_degrees(angle, base);
        self.angle = adjust_angle(self.angle + angle);
        self.center()
    }

    pub fn rotate_around_radians(&mut self, angle: f64, base: Vector) -> Vector {
        self.rotate_around(angle.to_degrees(), base)
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.p.min(self.q), self.p.max(self.q))
    }

    pub fn aabb(&self) -> Aabb {
        self.bounding_box()
    }

    /// Whether `point` lies on the segment.
    pub fn contains_point(&self, point: Vector) -> bool {
        let cross = self.direction().cross(point - self.p);
        if cross.abs() / self.length() > EPSILON {
            return false;
        }

        let bounds = self.bounding_box();
        point.x >= bounds.min.x - EPSILON
            && point.y >= bounds.min.y - EPSILON
            && point.x <= bounds.max.x + EPSILON
            && point.y <= bounds.max.y + EPSILON
    }

    pub fn orientation(&self, point: Vector) -> Orientation {
        let value = (self.q.y - self.p.y) * (point.x - self.q.x)
            - (self.q.x - self.p.x) * (point.y - self.q.y);

        if value > 0.0 {
            Orientation::Clockwise
        } else if value < 0.0 {
            Orientation::CounterClockwise
        } else {
            Orientation::Collinear
        }
    }

    /// Projection of `point` onto the infinite line through the segment.
    pub fn project_point(&self, point: Vector) -> Vector {
        let direction = self.direction();
        let t = (point - self.p).dot(direction) / direction.length_squared();
        self.p + direction * t
    }

    /// Point of the segment closest to `point`.
    pub fn closest_point(&self, point: Vector) -> Vector {
        let direction = self.direction();
        let t = ((point - self.p).dot(direction) / direction.length_squared()).clamp(0.0, 1.0);
        self.p + direction * t
    }

    pub fn collinear_to(&self, other: &Line) -> bool {
        self.direction().collinear_to(other.direction())
    }

    /// Whether both segments lie on the same infinite line.
    pub fn same_line_with(&self, other: &Line) -> bool {
        self.project_point(other.p).approx_eq(other.p)
            && self.project_point(other.q).approx_eq(other.q)
    }

    /// Collinear segments lying on distinct lines.
    pub fn parallel_to(&self, other: &Line) -> bool {
        self.collinear_to(other) && !self.same_line_with(other)
    }

    /// Shortest distance between the two segments, zero when they intersect.
    pub fn distance_to(&self, other: &Line) -> f64 {
        if self.bounding_box().overlaps(&other.bounding_box())
            && self.touches_or_crosses(other)
            && other.touches_or_crosses(self)
        {
            return 0.0;
        }

        [
            distance(self.p, other.closest_point(self.p)),
            distance(self.q, other.closest_point(self.q)),
            distance(other.p, self.closest_point(other.p)),
            distance(other.q, self.closest_point(other.q)),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }

    pub(crate) fn is_point_right(&self, point: Vector) -> bool {
        self.direction().cross(point - self.p) < 0.0
    }

    /// Whether `other` touches this segment or straddles its line.
    pub(crate) fn touches_or_crosses(&self, other: &Line) -> bool {
        self.contains_point(other.p)
            || self.contains_point(other.q)
            || self.is_point_right(other.p) != self.is_point_right(other.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line(px: f64, py: f64, qx: f64, qy: f64) -> Line {
        Line::new(Vector::new(px, py), Vector::new(qx, qy)).unwrap()
    }

    #[test]
    fn rejects_zero_length() {
        let point = Vector::new(4.0, 4.0);
        assert_eq!(Line::new(point, point), Err(CollisionError::DegenerateLine));
    }

    #[test]
    fn rejects_non_finite_endpoints() {
        let nan = Vector::new(f64::NAN, 0.0);
        assert_eq!(Line::new(nan, Vector::new(1.0, 1.0)), Err(CollisionError::DegenerateLine));
        assert_eq!(Line::new(Vector::ZERO, nan), Err(CollisionError::DegenerateLine));
    }

    #[test]
    fn derives_angle_from_direction() {
        assert_abs_diff_eq!(line(0.0, 0.0, 1.0, 1.0).angle(), 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(line(0.0, 0.0, 0.0, -1.0).angle(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn contains_point_on_segment_only() {
        let segment = line(0.0, 0.0, 4.0, 4.0);

        assert!(segment.contains_point(Vector::new(2.0, 2.0)));
        assert!(segment.contains_point(Vector::new(4.0, 4.0)));
        assert!(!segment.contains_point(Vector::new(5.0, 5.0)));
        assert!(!segment.contains_point(Vector::new(2.0, 2.5)));
    }

    #[test]
    fn rotate_keeps_center() {
        let mut segment = line(-1.0, 0.0, 1.0, 0.0);
        segment.rotate(90.0);

        assert!(segment.p().approx_eq(Vector::new(0.0, -1.0)));
        assert!(segment.q().approx_eq(Vector::new(0.0, 1.0)));
        assert_abs_diff_eq!(segment.angle(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn rotate_around_base_point() {
        let mut segment = line(1.0, 0.0, 2.0, 0.0);
        let center = segment.rotate_around(180.0, Vector::ZERO);

        assert!(center.approx_eq(Vector::new(-1.5, 0.0)), "center = {center:?}");
        assert_abs_diff_eq!(segment.angle(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn orientation_of_points() {
        let segment = line(0.0, 0.0, 2.0, 0.0);

        assert_eq!(segment.orientation(Vector::new(1.0, 1.0)), Orientation::CounterClockwise);
        assert_eq!(segment.orientation(Vector::new(1.0, -1.0)), Orientation::Clockwise);
        assert_eq!(segment.orientation(Vector::new(3.0, 0.0)).as_i8(), 0);
    }

    #[test]
    fn collinear_same_line_and_parallel() {
        let base = line(0.0, 0.0, 2.0, 0.0);
        let same = line(3.0, 0.0, 5.0, 0.0);
        let shifted = line(0.0, 1.0, 2.0, 1.0);

        assert!(base.collinear_to(&same) && base.same_line_with(&same));
        assert!(!base.parallel_to(&same));
        assert!(base.parallel_to(&shifted));
    }

    #[test]
    fn distance_between_segments() {
        let a = line(0.0, 0.0, 2.0, 0.0);

        assert_abs_diff_eq!(a.distance_to(&line(1.0, 3.0, 1.0, 1.0)), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.distance_to(&line(5.0, 0.0, 6.0, 0.0)), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.distance_to(&line(1.0, -1.0, 1.0, 1.0)), 0.0, epsilon = 1e-9);
    }
}
