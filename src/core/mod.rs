//! Core value types: shapes, tags and bounding boxes.

pub mod aabb;
pub mod circle;
pub mod line;
pub mod rectangle;
pub mod shape;
pub mod tag;

pub use aabb::Aabb;
pub use circle::Circle;
pub use line::{Line, Orientation};
pub use rectangle::Rectangle;
pub use shape::{Payload, Shape, ShapeKind};
pub use tag::Tag;
