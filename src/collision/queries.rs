use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    contact::contact_kind,
    filter::tag_predicate,
    narrowphase::{collides, CollisionPredicate},
    quadtree::{QuadTree, ShapeRegistry},
};
use crate::{
    core::{Line, Shape, Tag},
    error::{CollisionError, Result},
    utils::{
        allocator::ShapeId,
        math::{squared_distance, Vector, VectorExt},
    },
};

/// Closest shape hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaycastHit {
    pub shape: ShapeId,
    pub point: Vector,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaycastQuery {
    pub origin: Vector,
    pub direction: Vector,
    /// Length of the ray; non-positive values use the diagonal of the space bounds.
    pub max_distance: f64,
    /// Identities the ray is interested in when tags are in use.
    pub mask: u32,
}

impl RaycastQuery {
    pub fn new(origin: Vector, direction: Vector) -> Self {
        Self {
            origin,
            direction,
            max_distance: 0.0,
            mask: u32::MAX,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }
}

pub struct Raycast;

impl Raycast {
    /// Walks the leaves crossed by the ray and returns the hit closest to its
    /// origin. Shapes containing the origin are never reported.
    pub fn cast(
        query: &RaycastQuery,
        tree: &QuadTree,
        registry: &ShapeRegistry,
        default_distance: f64,
        use_tags: bool,
    ) -> Result<Option<RaycastHit>> {
        let direction = query
            .direction
            .try_normalize_checked()
            .map_err(|_| CollisionError::ZeroDirection)?;
        let length = if query.max_distance > 0.0 {
            query.max_distance
        } else {
            default_distance
        };

        let ray = Line::new(query.origin, query.origin + direction * length)?;
        let probe = Shape::from(ray).with_tag(Tag::new(0, query.mask));
        let predicate = tag_predicate(use_tags);

        let mut visited = BTreeSet::new();
        let mut best: Option<(f64, RaycastHit)> = None;

        for leaf in tree.query_kind(probe.kind()) {
            let Some(node) = tree.node(leaf) else {
                continue;
            };

            for id in node.shapes() {
                if !visited.insert(*id) {
                    continue;
                }
                let Some(entry) = registry.get(*id) else {
                    continue;
                };
                let shape = &entry.shape;

                if shape.contains_point(query.origin) || !collides(&probe, shape, predicate) {
                    continue;
                }

                let point = Self::hit_point(&probe, shape);
                let squared = squared_distance(query.origin, point);

                if best.map_or(true, |(closest, _)| squared < closest) {
                    best = Some((
                        squared,
                        RaycastHit {
                            shape: *id,
                            point,
                            distance: squared.sqrt(),
                        },
                    ));
                }
            }
        }

        Ok(best.map(|(_, hit)| hit))
    }

    /// Contact point nearest to the ray origin, or the point of the ray closest
    /// to the shape center when the outlines share no isolated point.
    fn hit_point(probe: &Shape, shape: &Shape) -> Vector {
        let origin = match probe.as_line() {
            Some(ray) => ray.p(),
            None => probe.center(),
        };

        contact_kind(probe.kind(), shape.kind())
            .into_iter()
            .min_by(|a, b| squared_distance(origin, *a).total_cmp(&squared_distance(origin, *b)))
            .unwrap_or_else(|| probe.closest_point(shape.center()))
    }
}

/// Registered shapes overlapping `probe` that pass `predicate(probe, shape)`.
pub fn overlapping(
    tree: &QuadTree,
    registry: &ShapeRegistry,
    probe: &Shape,
    predicate: CollisionPredicate,
) -> BTreeSet<ShapeId> {
    tree.query_kind(probe.kind())
        .into_iter()
        .filter_map(|leaf| tree.node(leaf))
        .flat_map(|node| node.shapes().iter().copied())
        .filter(|id| {
            registry
                .get(*id)
                .map_or(false, |entry| collides(probe, &entry.shape, predicate))
        })
        .collect()
}
