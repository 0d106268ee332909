//! Collision detection modules: narrow-phase, contacts, normals, filtering,
//! the quadtree broad-phase, space queries and motion approximation.

pub mod approximate;
pub mod contact;
pub mod filter;
pub mod narrowphase;
pub mod normal;
pub mod quadtree;
pub mod queries;

pub use approximate::{approximate, lines_would_collide, Approximation};
pub use contact::contact;
pub use narrowphase::{collides, overlaps, CollisionPredicate};
pub use normal::normal_to;
pub use quadtree::{IndexedShape, QuadTree, QuadTreeNode, ShapeRegistry};
pub use queries::{Raycast, RaycastHit, RaycastQuery};
