use thiserror::Error;

use crate::utils::allocator::ShapeId;

/// Errors reported by shape construction, the quadtree and space queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("circle radius must be positive, got {0}")]
    InvalidRadius(f64),
    #[error("rectangle width and height must be positive, got {width}×{height}")]
    InvalidExtents { width: f64, height: f64 },
    #[error("line endpoints must be distinct")]
    DegenerateLine,
    #[error("invalid space bounds: {0}")]
    InvalidBounds(String),
    #[error("quadtree depth must be at least 1, got {0}")]
    InvalidSubdivision(usize),
    #[error("node capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
    #[error("shape {0:?} is not part of the space")]
    UnknownShape(ShapeId),
    #[error("shape center ({x}, {y}) lies outside the space bounds")]
    OutOfBounds { x: f64, y: f64 },
    #[error("operation on a zero-length vector")]
    DegenerateVector,
    #[error("ray direction must be non-zero")]
    ZeroDirection,
    #[error("step count must be positive")]
    InvalidStepCount,
    #[error("could not approximate the shape movement")]
    ApproximationFailed,
}

pub type Result<T> = std::result::Result<T, CollisionError>;
