//! Global configuration constants and the serializable space configuration.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Result};

/// Tolerance for every "effectively zero" comparison: degenerate vectors,
/// coincident points, point-on-segment distance and discriminant signs.
pub const EPSILON: f64 = 1e-6;

/// Sine of the largest angle at which two directions still count as collinear.
pub const COLLINEARITY_THRESHOLD: f64 = 1e-2;

/// Default maximum depth of the quadtree.
pub const DEFAULT_SUBDIVISION: usize = 6;

/// Default number of shapes a leaf holds before it splits.
pub const DEFAULT_NODE_CAPACITY: usize = 8;

/// Default number of increments used by motion approximation.
pub const DEFAULT_APPROXIMATION_STEPS: usize = 16;

/// Parameters of a [`Space`](crate::Space).
///
/// The quadtree covers a `width × height` box centered on the origin, while
/// `min`/`max` bound the positions at which shapes are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    pub subdivision: usize,
    pub node_capacity: usize,
    pub width: f64,
    pub height: f64,
    pub min: DVec2,
    pub max: DVec2,
    pub use_tags: bool,
    /// Increments used by [`Space::approximate_motion`](crate::Space::approximate_motion).
    pub approximation_steps: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            subdivision: DEFAULT_SUBDIVISION,
            node_capacity: DEFAULT_NODE_CAPACITY,
            width: 1024.0,
            height: 1024.0,
            min: DVec2::new(-512.0, -512.0),
            max: DVec2::new(512.0, 512.0),
            use_tags: false,
            approximation_steps: DEFAULT_APPROXIMATION_STEPS,
        }
    }
}

impl SpaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.subdivision < 1 {
            return Err(CollisionError::InvalidSubdivision(self.subdivision));
        }

        if self.node_capacity < 1 {
            return Err(CollisionError::InvalidCapacity(self.node_capacity));
        }

        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CollisionError::InvalidBounds(format!(
                "width and height must be positive, got {}×{}",
                self.width, self.height
            )));
        }

        if self.approximation_steps < 1 {
            return Err(CollisionError::InvalidStepCount);
        }

        if self.min.x >= self.max.x || self.min.y >= self.max.y {
            return Err(CollisionError::InvalidBounds(format!(
                "min {:?} must be strictly below max {:?}",
                self.min, self.max
            )));
        }

        Ok(())
    }
}
