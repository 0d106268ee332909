use std::{any::Any, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{aabb::Aabb, circle::Circle, line::Line, rectangle::Rectangle, tag::Tag};
use crate::{error::Result, utils::math::Vector};

/// Opaque user data attached to a shape.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Closed set of geometries the engine knows how to collide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle(Circle),
    Rectangle(Rectangle),
    Line(Line),
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Circle(_) => "Circle",
            ShapeKind::Rectangle(_) => "Rectangle",
            ShapeKind::Line(_) => "Line",
        }
    }
}

/// A geometry together with its collision tag and user payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct Shape {
    kind: ShapeKind,
    #[serde(default)]
    tag: Tag,
    #[serde(skip)]
    data: Option<Payload>,
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Self::from_kind(ShapeKind::Circle(circle))
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Self::from_kind(ShapeKind::Rectangle(rect))
    }
}

impl From<Line> for Shape {
    fn from(line: Line) -> Self {
        Self::from_kind(ShapeKind::Line(line))
    }
}

impl Shape {
    pub fn from_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            tag: Tag::default(),
            data: None,
        }
    }

    pub fn circle(center: Vector, radius: f64) -> Result<Self> {
        Ok(Circle::new(center, radius)?.into())
    }

    /// Rectangle of `width × height` rotated by `angle` degrees.
    pub fn rectangle(center: Vector, width: f64, height: f64, angle: f64) -> Result<Self> {
        Ok(Rectangle::new(center, width, height, angle)?.into())
    }

    pub fn line(p: Vector, q: Vector) -> Result<Self> {
        Ok(Line::new(p, q)?.into())
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match &self.kind {
            ShapeKind::Circle(circle) => Some(circle),
            _ => None,
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match &self.kind {
            ShapeKind::Rectangle(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match &self.kind {
            ShapeKind::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn center(&self) -> Vector {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.center(),
            ShapeKind::Rectangle(rect) => rect.center(),
            ShapeKind::Line(line) => line.center(),
        }
    }

    /// Orientation in degrees; always zero for circles.
    pub fn angle(&self) -> f64 {
        match &self.kind {
            ShapeKind::Circle(_) => 0.0,
            ShapeKind::Rectangle(rect) => rect.angle(),
            ShapeKind::Line(line) => line.angle(),
        }
    }

    pub fn angle_radians(&self) -> f64 {
        self.angle().to_radians()
    }

    /// Moves the shape by `direction` and returns its new center.
    pub fn translate(&mut self, direction: Vector) -> Vector {
        match &mut self.kind {
            ShapeKind::Circle(circle) => circle.translate(direction),
            ShapeKind::Rectangle(rect) => rect.translate(direction),
            ShapeKind::Line(line) => line.translate(direction),
        }
    }

    pub fn set_position(&mut self, position: Vector) -> Vector {
        match &mut self.kind {
            ShapeKind::Circle(circle) => circle.set_position(position),
            ShapeKind::Rectangle(rect) => rect.set_position(position),
            ShapeKind::Line(line) => line.set_position(position),
        }
    }

    /// Rotates the shape around its center by `angle` degrees. No-op for circles.
    pub fn rotate(&mut self, angle: f64) -> f64 {
        match &mut self.kind {
            ShapeKind::Circle(_) => 0.0,
            ShapeKind::Rectangle(rect) => rect.rotate(angle),
            ShapeKind::Line(line) => line.rotate(angle),
        }
    }

    pub fn rotate_radians(&mut self, angle: f64) -> f64 {
        self.rotate(angle.to_degrees()).to_radians()
    }

    pub fn set_angle(&mut self, angle: f64) -> f64 {
        match &mut self.kind {
            ShapeKind::Circle(_) => 0.0,
            ShapeKind::Rectangle(rect) => rect.set_angle(angle),
            ShapeKind::Line(line) => line.set_angle(angle),
        }
    }

    pub fn set_angle_radians(&mut self, angle: f64) -> f64 {
        self.set_angle(angle.to_degrees()).to_radians()
    }

    pub fn contains_point(&self, point: Vector) -> bool {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.contains_point(point),
            ShapeKind::Rectangle(rect) => rect.contains_point(point),
            ShapeKind::Line(line) => line.contains_point(point),
        }
    }

    /// World-space axis-aligned bounds of the shape.
    pub fn aabb(&self) -> Aabb {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.aabb(),
            ShapeKind::Rectangle(rect) => rect.aabb(),
            ShapeKind::Line(line) => line.aabb(),
        }
    }

    pub fn closest_point(&self, point: Vector) -> Vector {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.closest_point(point),
            ShapeKind::Rectangle(rect) => rect.closest_point(point),
            ShapeKind::Line(line) => line.closest_point(point),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    pub fn identity(&self) -> u32 {
        self.tag.identity
    }

    pub fn set_identity(&mut self, identity: u32) {
        self.tag.identity = identity;
    }

    pub fn mask(&self) -> u32 {
        self.tag.mask
    }

    pub fn set_mask(&mut self, mask: u32) {
        self.tag.mask = mask;
    }

    /// Whether this shape is interested in colliding with `other`.
    pub fn should_collide(&self, other: &Shape) -> bool {
        self.tag.should_collide(&other.tag)
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub fn data_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<T>())
    }

    pub fn set_data(&mut self, data: Option<Payload>) {
        self.data = data;
    }

    pub fn take_data(&mut self) -> Option<Payload> {
        self.data.take()
    }
}
