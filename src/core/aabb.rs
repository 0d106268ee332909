use serde::{Deserialize, Serialize};

use super::{circle::Circle, line::Line, rectangle::Rectangle, shape::ShapeKind};
use crate::{
    collision::narrowphase,
    utils::math::{Vector, VectorExt},
};

/// Axis-aligned bounding box used for quadtree node boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector,
    pub max: Vector,
}

impl Aabb {
    pub fn new(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vector, half_extents: Vector) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vector {
        (self.max - self.min) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Corners in counter-clockwise order starting at `min`.
    pub fn vertices(&self) -> [Vector; 4] {
        [
            self.min,
            Vector::new(self.max.x, self.min.y),
            self.max,
            Vector::new(self.min.x, self.max.y),
        ]
    }

    pub fn contains_point(&self, point: Vector) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.x <= self.max.x
            && point.y <= self.max.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Clamps `point` into the box.
    pub fn clamp(&self, point: Vector) -> Vector {
        point.clamp(self.min, self.max)
    }

    /// Splits the box around its center into `[north_east, north_west, south_east, south_west]`.
    pub fn quadrants(&self) -> [Aabb; 4] {
        let center = self.center();
        let half = self.half_extents() * 0.5;

        [
            Aabb::from_center(center + Vector::new(half.x, half.y), half),
            Aabb::from_center(center + Vector::new(-half.x, half.y), half),
            Aabb::from_center(center + Vector::new(half.x, -half.y), half),
            Aabb::from_center(center + Vector::new(-half.x, -half.y), half),
        ]
    }

    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::from_aabb(self)
    }

    /// Exact overlap test between the box and a shape's geometry.
    pub fn collides_kind(&self, kind: &ShapeKind) -> bool {
        match kind {
            ShapeKind::Rectangle(rect) => self.collides_rectangle(rect),
            ShapeKind::Circle(circle) => self.collides_circle(circle),
            ShapeKind::Line(line) => self.collides_line(line),
        }
    }

    pub fn collides_rectangle(&self, rect: &Rectangle) -> bool {
        narrowphase::collision_rectangle_to_rectangle(&self.to_rectangle(), rect)
    }

    pub fn collides_circle(&self, circle: &Circle) -> bool {
        circle.contains_point(self.clamp(circle.center()))
    }

    pub fn collides_line(&self, line: &Line) -> bool {
        if self.contains_point(line.p()) || self.contains_point(line.q()) {
            return true;
        }

        let [a, b, c, d] = self.vertices();
        [(a, b), (b, c), (c, d), (d, a)].into_iter().any(|(from, to)| {
            Line::new(from, to)
                .map(|edge| narrowphase::intersection_line_to_line(&edge, line))
                .unwrap_or(false)
        })
    }

    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).is_degenerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vector::new(-1.0, -1.0), Vector::new(1.0, 1.0))
    }

    #[test]
    fn quadrants_partition_the_box() {
        let [ne, nw, se, sw] = Aabb::new(Vector::ZERO, Vector::new(4.0, 4.0)).quadrants();

        assert_eq!(ne, Aabb::new(Vector::new(2.0, 2.0), Vector::new(4.0, 4.0)));
        assert_eq!(nw, Aabb::new(Vector::new(0.0, 2.0), Vector::new(2.0, 4.0)));
        assert_eq!(se, Aabb::new(Vector::new(2.0, 0.0), Vector::new(4.0, 2.0)));
        assert_eq!(sw, Aabb::new(Vector::ZERO, Vector::new(2.0, 2.0)));
    }

    #[test]
    fn line_crossing_the_box_without_endpoints_inside() {
        let line = Line::new(Vector::new(-3.0, 0.0), Vector::new(3.0, 0.5)).unwrap();
        assert!(unit_box().collides_line(&line));

        let outside = Line::new(Vector::new(-3.0, 2.0), Vector::new(3.0, 2.5)).unwrap();
        assert!(!unit_box().collides_line(&outside));
    }

    #[test]
    fn circle_touching_corner_region() {
        let near = Circle::new(Vector::new(1.5, 1.5), 0.8).unwrap();
        let far = Circle::new(Vector::new(1.5, 1.5), 0.6).unwrap();

        assert!(unit_box().collides_circle(&near));
        assert!(!unit_box().collides_circle(&far));
    }
}
