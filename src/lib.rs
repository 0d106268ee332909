//! Quadspace – 2D collision detection for Rust.
//!
//! Circles, oriented rectangles and line segments are registered in a
//! [`Space`], which indexes them in a region quadtree and answers overlap,
//! contact, ray and sweep queries about them. The geometry in [`core`] and the
//! pairwise tests in [`collision`] can also be used on their own.

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod space;
pub mod utils;

pub use glam::DVec2;

pub use collision::{
    approximate::{approximate, lines_would_collide, swept_overlaps, Approximation},
    contact::contact,
    narrowphase::{collides, overlaps, CollisionPredicate},
    normal::normal_to,
    quadtree::{QuadTree, QuadTreeNode},
    queries::{Raycast, RaycastHit, RaycastQuery},
};
pub use config::SpaceConfig;
pub use core::{Aabb, Circle, Line, Orientation, Payload, Rectangle, Shape, ShapeKind, Tag};
pub use error::{CollisionError, Result};
pub use space::{Cell, Space, SpaceBuilder};
pub use utils::{
    allocator::{NodeId, ShapeId},
    math::{Vector, VectorExt},
};
