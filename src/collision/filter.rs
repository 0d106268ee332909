//! Tag-based filtering of shape collections and the composed collision predicate.

use super::narrowphase::CollisionPredicate;
use crate::core::Shape;

/// Directional tag filter: `a` wants to collide with `b`.
pub fn by_tags(a: &Shape, b: &Shape) -> bool {
    a.should_collide(b)
}

/// Predicate applied by space queries, depending on whether tags are honoured.
pub fn tag_predicate(use_tags: bool) -> CollisionPredicate {
    if use_tags {
        Some(by_tags)
    } else {
        None
    }
}

/// Shapes whose identity carries every bit of `identity`.
pub fn filter_by_identity<'a, K, I>(
    shapes: I,
    identity: u32,
) -> impl Iterator<Item = (K, &'a Shape)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    shapes
        .into_iter()
        .filter(move |(_, shape)| shape.identity() & identity == identity)
}

/// Shapes whose mask carries every bit of `mask`.
pub fn filter_by_mask<'a, K, I>(shapes: I, mask: u32) -> impl Iterator<Item = (K, &'a Shape)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    shapes
        .into_iter()
        .filter(move |(_, shape)| shape.mask() & mask == mask)
}

/// Shapes `shape` wants to collide with.
pub fn filter_by_collision_right<'a, K, I>(
    shapes: I,
    shape: &'a Shape,
) -> impl Iterator<Item = (K, &'a Shape)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    shapes
        .into_iter()
        .filter(move |(_, item)| shape.should_collide(item))
}

/// Shapes that want to collide with `shape`.
pub fn filter_by_collision_left<'a, K, I>(
    shapes: I,
    shape: &'a Shape,
) -> impl Iterator<Item = (K, &'a Shape)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    shapes
        .into_iter()
        .filter(move |(_, item)| item.should_collide(shape))
}

/// Shapes interested in `shape` in either direction.
pub fn filter_by_collision<'a, K, I>(
    shapes: I,
    shape: &'a Shape,
) -> impl Iterator<Item = (K, &'a Shape)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    shapes
        .into_iter()
        .filter(move |(_, item)| item.should_collide(shape) || shape.should_collide(item))
}
