use serde::{Deserialize, Serialize};

/// Identity/mask bit pair controlling which shapes are interested in each other.
///
/// `identity` describes what the shape is, `mask` what it wants to collide
/// with. The relation is directional: `a.should_collide(&b)` only looks at
/// `a.mask` and `b.identity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub identity: u32,
    pub mask: u32,
}

impl Default for Tag {
    fn default() -> Self {
        Self {
            identity: 1,
            mask: u32::MAX,
        }
    }
}

impl Tag {
    pub fn new(identity: u32, mask: u32) -> Self {
        Self { identity, mask }
    }

    pub fn should_collide(&self, other: &Tag) -> bool {
        self.mask & other.identity != 0
    }
}
