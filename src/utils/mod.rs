//! Utility helpers: math extensions on `glam`, the generational arena and logging.

pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, ArenaKey, GenerationalId, NodeId, ShapeId};
pub use math::*;
