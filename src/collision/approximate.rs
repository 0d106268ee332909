//! Stepped motion approximation and the swept check for pairs of segments.
//!
//! Movement is sampled at a fixed number of increments; this is not an exact
//! time-of-impact solver, so thin shapes moving far in a single step may still
//! pass each other unless they are segments covered by [`lines_would_collide`].

use serde::{Deserialize, Serialize};

use super::narrowphase::{intersection_line_to_line, overlaps, CollisionPredicate};
use crate::{
    core::{Line, Shape},
    error::{CollisionError, Result},
    utils::math::Vector,
};

/// Furthest collision-free pose found by [`approximate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Approximation<K> {
    pub position: Vector,
    pub angle: f64,
    /// Candidate that stopped the movement, if any.
    pub blocker: Option<K>,
}

/// Whether the segment moving from `before` to `after` meets `other` on the way.
///
/// Tests the paths traced by both endpoints and the final pose against `other`,
/// then repeats the endpoint test with the motion applied in reverse to
/// `other`, so that two collinear segments cannot slip through each other
/// between samples.
pub fn lines_would_collide(before: &Line, after: &Line, other: &Line) -> bool {
    let movement = after.center() - before.center();
    let turn = after.angle() - before.angle();

    let mut reversed = *other;
    reversed.translate(-movement);
    reversed.rotate(-turn);

    let relative_paths = [(reversed.p(), other.p()), (reversed.q(), other.q())];
    if crosses_any(&relative_paths, before) {
        return true;
    }

    let paths = [(before.p(), after.p()), (before.q(), after.q())];
    crosses_any(&paths, other) || intersection_line_to_line(after, other)
}

fn crosses_any(paths: &[(Vector, Vector)], target: &Line) -> bool {
    paths.iter().any(|(from, to)| {
        Line::new(*from, *to)
            .map(|path| intersection_line_to_line(&path, target))
            .unwrap_or(false)
    })
}

/// Geometric test for a shape that moved from `before` to `after`.
///
/// Segment pairs additionally get the swept check.
pub fn swept_overlaps(before: &Shape, after: &Shape, other: &Shape) -> bool {
    if let (Some(before), Some(after), Some(target)) =
        (before.as_line(), after.as_line(), other.as_line())
    {
        if lines_would_collide(before, after, target) {
            return true;
        }
    }

    overlaps(after, other)
}

/// Advances a copy of `shape` by `movement` and `turn` degrees in `steps`
/// equal increments, stopping before the first increment that collides with
/// one of `candidates`.
///
/// `predicate` is called as `predicate(shape, candidate)`. The input shape is
/// never modified.
pub fn approximate<'a, K, I>(
    shape: &Shape,
    movement: Vector,
    turn: f64,
    candidates: I,
    steps: usize,
    predicate: CollisionPredicate,
) -> Result<Approximation<K>>
where
    K: Copy,
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    if steps == 0 {
        return Err(CollisionError::InvalidStepCount);
    }

    let candidates: Vec<(K, &Shape)> = candidates
        .into_iter()
        .filter(|(_, other)| predicate.map_or(true, |accept| accept(shape, other)))
        .collect();

    let fraction = 1.0 / steps as f64;
    let mut probe = shape.clone();
    let mut position = shape.center();
    let mut angle = shape.angle();
    let mut blocker = None;

    for _ in 0..steps {
        let previous = probe.clone();
        let next_position = position + movement * fraction;
        probe.set_position(next_position);
        probe.set_angle(angle + turn * fraction);

        blocker = candidates
            .iter()
            .find(|(_, other)| swept_overlaps(&previous, &probe, other))
            .map(|(key, _)| *key);

        if blocker.is_some() {
            break;
        }

        position = next_position;
        angle = probe.angle();
    }

    if !position.is_finite() || !angle.is_finite() {
        return Err(CollisionError::ApproximationFailed);
    }

    Ok(Approximation {
        position,
        angle,
        blocker,
    })
}
