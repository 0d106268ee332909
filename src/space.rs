use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{
        approximate::{approximate, swept_overlaps, Approximation},
        filter::{filter_by_identity, filter_by_mask, tag_predicate},
        narrowphase::{overlaps, CollisionPredicate},
        quadtree::{IndexedShape, QuadTree, ShapeRegistry},
        queries::{overlapping, Raycast, RaycastHit, RaycastQuery},
    },
    config::{SpaceConfig, DEFAULT_APPROXIMATION_STEPS},
    core::{Aabb, Circle, Rectangle, Shape},
    error::{CollisionError, Result},
    utils::{
        allocator::{NodeId, ShapeId},
        logging::ScopedTimer,
        math::{distance, Vector},
    },
};

/// A quadtree leaf and the shapes it currently holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub node: NodeId,
    pub boundary: Aabb,
    pub shapes: BTreeSet<ShapeId>,
}

/// Owns registered shapes, indexes them in a quadtree and answers collision
/// queries about them.
///
/// Shapes are handed over by [`Space::add`] and addressed by [`ShapeId`]
/// afterwards. After mutating a shape through [`Space::shape_mut`] the caller
/// must call [`Space::update`] so that the index follows the new pose.
#[derive(Debug, Clone)]
pub struct Space {
    min: Vector,
    max: Vector,
    use_tags: bool,
    approximation_steps: usize,
    registry: ShapeRegistry,
    tree: QuadTree,
}

impl Space {
    /// Creates a space whose quadtree covers a `width × height` box centered on
    /// the origin and which admits shapes centered within `[min, max]`.
    pub fn new(
        subdivision: usize,
        node_capacity: usize,
        width: f64,
        height: f64,
        min: Vector,
        max: Vector,
        use_tags: bool,
    ) -> Result<Self> {
        Self::from_config(SpaceConfig {
            subdivision,
            node_capacity,
            width,
            height,
            min,
            max,
            use_tags,
            approximation_steps: DEFAULT_APPROXIMATION_STEPS,
        })
    }

    pub fn from_config(config: SpaceConfig) -> Result<Self> {
        config.validate()?;

        let half = Vector::new(config.width * 0.5, config.height * 0.5);
        let tree = QuadTree::new(
            Aabb::from_center(Vector::ZERO, half),
            config.subdivision,
            config.node_capacity,
        )?;

        debug!(
            "space created: depth {}, capacity {}, {}×{}, bounds {:?}..{:?}, tags {}",
            config.subdivision,
            config.node_capacity,
            config.width,
            config.height,
            config.min,
            config.max,
            config.use_tags
        );

        Ok(Self {
            min: config.min,
            max: config.max,
            use_tags: config.use_tags,
            approximation_steps: config.approximation_steps,
            registry: ShapeRegistry::new(),
            tree,
        })
    }

    pub fn builder() -> SpaceBuilder {
        SpaceBuilder::default()
    }

    pub fn config(&self) -> SpaceConfig {
        let boundary = self.tree.boundary();
        SpaceConfig {
            subdivision: self.tree.max_level(),
            node_capacity: self.tree.node_capacity(),
            width: boundary.width(),
            height: boundary.height(),
            min: self.min,
            max: self.max,
            use_tags: self.use_tags,
            approximation_steps: self.approximation_steps,
        }
    }

    pub fn min(&self) -> Vector {
        self.min
    }

    pub fn max(&self) -> Vector {
        self.max
    }

    pub fn use_tags(&self) -> bool {
        self.use_tags
    }

    pub fn set_use_tags(&mut self, use_tags: bool) {
        self.use_tags = use_tags;
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.registry.contains(id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.registry.get(id).map(|entry| &entry.shape)
    }

    /// Mutable access to a registered shape. Call [`Space::update`] afterwards.
    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.registry.get_mut(id).map(|entry| &mut entry.shape)
    }

    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> + '_ {
        self.registry.iter().map(|(id, entry)| (id, &entry.shape))
    }

    /// Whether the center of `shape` lies within the space bounds.
    pub fn in_bounds(&self, shape: &Shape) -> bool {
        let center = shape.center();
        center.x >= self.min.x
            && center.y >= self.min.y
            && center.x <= self.max.x
            && center.y <= self.max.y
    }

    /// Clamps the shape center into the space bounds and returns the new center.
    ///
    /// The index is not touched; follow up with [`Space::update`].
    pub fn adjust_shape_position(&mut self, id: ShapeId) -> Result<Vector> {
        let (min, max) = (self.min, self.max);
        let shape = &mut self.entry_mut(id)?.shape;
        let clamped = shape.center().clamp(min, max);

        if clamped != shape.center() {
            shape.set_position(clamped);
        }

        Ok(shape.center())
    }

    /// Registers a shape and indexes it.
    pub fn add(&mut self, shape: Shape) -> Result<ShapeId> {
        self.check_admission(&shape)?;

        let id = self.registry.insert(IndexedShape::new(shape));
        if let Err(err) = self.tree.insert(id, &mut self.registry) {
            self.registry.remove(id);
            return Err(err);
        }

        Ok(id)
    }

    /// Registers several shapes. Nothing is added unless every shape is admissible.
    pub fn add_all<I>(&mut self, shapes: I) -> Result<Vec<ShapeId>>
    where
        I: IntoIterator<Item = Shape>,
    {
        let shapes: Vec<Shape> = shapes.into_iter().collect();
        for shape in &shapes {
            self.check_admission(shape)?;
        }

        shapes.into_iter().map(|shape| self.add(shape)).collect()
    }

    /// Removes a shape from the index and hands it back.
    pub fn remove(&mut self, id: ShapeId) -> Result<Shape> {
        self.tree.remove(id, &mut self.registry)?;
        self.registry
            .remove(id)
            .map(|entry| entry.shape)
            .ok_or(CollisionError::UnknownShape(id))
    }

    /// Removes several shapes. Nothing is removed unless every id is registered.
    pub fn remove_all<I>(&mut self, ids: I) -> Result<Vec<Shape>>
    where
        I: IntoIterator<Item = ShapeId>,
    {
        let ids: Vec<ShapeId> = ids.into_iter().collect();
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(CollisionError::UnknownShape(*missing));
        }

        ids.into_iter().map(|id| self.remove(id)).collect()
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.tree.clear(&mut self.registry);
    }

    /// Re-indexes a shape after it was moved or rotated and returns the leaves
    /// now holding it.
    pub fn update(&mut self, id: ShapeId) -> Result<Vec<Cell>> {
        let domain = self.tree.update(id, &mut self.registry)?;
        Ok(domain.into_iter().filter_map(|node| self.cell(node)).collect())
    }

    /// Collapses sparse subtrees of the index. Returns the number of merged nodes.
    pub fn rebuild(&mut self) -> usize {
        let _timer = ScopedTimer::new("space::rebuild");
        self.tree.redistribute(&mut self.registry)
    }

    /// Every leaf of the index with the shapes it holds.
    pub fn cells(&self) -> Vec<Cell> {
        self.tree
            .leaves()
            .iter()
            .filter_map(|node| self.cell(*node))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    /// Leaves of the index holding `id`, found by scanning the tree.
    pub fn search(&self, id: ShapeId) -> Result<BTreeSet<NodeId>> {
        self.entry(id)?;
        Ok(self.tree.search(id))
    }

    /// Leaves recorded as holding `id`.
    pub fn domain(&self, id: ShapeId) -> Result<&BTreeSet<NodeId>> {
        Ok(&self.entry(id)?.domain)
    }

    /// All pairs of overlapping shapes sharing a leaf.
    ///
    /// `result[a]` contains `b` when the two overlap and `a` accepts `b`
    /// under the tag filter. Shapes without partners are left out.
    pub fn colliding_shapes(&self) -> BTreeMap<ShapeId, BTreeSet<ShapeId>> {
        let mut timer = ScopedTimer::new("space::colliding_shapes");
        let leaves: Vec<NodeId> = self.tree.leaves().iter().copied().collect();

        #[cfg(feature = "parallel")]
        let hits: Vec<(ShapeId, ShapeId)> = leaves
            .par_iter()
            .flat_map_iter(|leaf| self.leaf_hits(*leaf))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let hits: Vec<(ShapeId, ShapeId)> = leaves
            .iter()
            .flat_map(|leaf| self.leaf_hits(*leaf))
            .collect();
        timer.record(hits.len());

        let mut colliding: BTreeMap<ShapeId, BTreeSet<ShapeId>> = BTreeMap::new();
        for (shape, other) in hits {
            colliding.entry(shape).or_default().insert(other);
        }

        colliding
    }

    /// Shapes that overlap `id` and want to collide with it.
    pub fn colliding_with(&self, id: ShapeId) -> Result<BTreeSet<ShapeId>> {
        let entry = self.entry(id)?;
        Ok(self.neighbours(id, &entry.domain, |item| {
            self.accepts(item, &entry.shape) && overlaps(item, &entry.shape)
        }))
    }

    /// Shapes that overlap `id` and that it wants to collide with.
    pub fn collided_by(&self, id: ShapeId) -> Result<BTreeSet<ShapeId>> {
        let entry = self.entry(id)?;
        Ok(self.neighbours(id, &entry.domain, |item| {
            self.accepts(&entry.shape, item) && overlaps(&entry.shape, item)
        }))
    }

    /// Shapes `id` would collide with after moving by `movement` and turning
    /// by `turn` degrees. The shape and the index are restored afterwards.
    pub fn would_be_collided_by(
        &mut self,
        id: ShapeId,
        movement: Vector,
        turn: f64,
    ) -> Result<BTreeSet<ShapeId>> {
        let mut timer = ScopedTimer::new("space::would_be_collided_by");
        let hits = self.speculate(id, movement, turn, |space, before, after, item| {
            space.accepts(after, item) && swept_overlaps(before, after, item)
        })?;
        timer.record(hits.len());
        Ok(hits)
    }

    /// Shapes that would collide with `id` after it moves by `movement` and
    /// turns by `turn` degrees. The shape and the index are restored afterwards.
    pub fn would_be_colliding_with(
        &mut self,
        id: ShapeId,
        movement: Vector,
        turn: f64,
    ) -> Result<BTreeSet<ShapeId>> {
        let mut timer = ScopedTimer::new("space::would_be_colliding_with");
        let hits = self.speculate(id, movement, turn, |space, before, after, item| {
            space.accepts(item, after) && swept_overlaps(before, after, item)
        })?;
        timer.record(hits.len());
        Ok(hits)
    }

    /// Casts a ray and returns the closest shape it hits.
    pub fn raycast(&self, query: &RaycastQuery) -> Result<Option<RaycastHit>> {
        let mut timer = ScopedTimer::new("space::raycast");
        let hit = Raycast::cast(
            query,
            &self.tree,
            &self.registry,
            distance(self.min, self.max),
            self.use_tags,
        )?;
        timer.record(usize::from(hit.is_some()));
        Ok(hit)
    }

    /// Every registered shape overlapping `rect`.
    pub fn boxcast(&self, rect: &Rectangle) -> BTreeSet<ShapeId> {
        overlapping(&self.tree, &self.registry, &Shape::from(*rect), self.predicate())
    }

    /// Every registered shape overlapping `circle`.
    pub fn circlecast(&self, circle: &Circle) -> BTreeSet<ShapeId> {
        overlapping(&self.tree, &self.registry, &Shape::from(*circle), self.predicate())
    }

    pub fn shapes_with_identity(&self, identity: u32) -> BTreeSet<ShapeId> {
        filter_by_identity(self.shapes(), identity)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn shapes_with_mask(&self, mask: u32) -> BTreeSet<ShapeId> {
        filter_by_mask(self.shapes(), mask).map(|(id, _)| id).collect()
    }

    /// Furthest pose along `movement`/`turn` that `id` reaches without
    /// colliding, sampled in `steps` increments against the shapes indexed in
    /// the leaves its swept bounds overlap. The stored shape is left untouched.
    pub fn approximate(
        &self,
        id: ShapeId,
        movement: Vector,
        turn: f64,
        steps: usize,
    ) -> Result<Approximation<ShapeId>> {
        let shape = &self.entry(id)?.shape;

        let mut target = shape.clone();
        target.translate(movement);
        target.rotate(turn);
        let swept = shape.aabb().union(&target.aabb());

        let candidates: BTreeSet<ShapeId> = self
            .tree
            .query_aabb(&swept)
            .into_iter()
            .filter_map(|leaf| self.tree.node(leaf))
            .flat_map(|node| node.shapes().iter().copied())
            .filter(|candidate| *candidate != id)
            .collect();

        approximate(
            shape,
            movement,
            turn,
            candidates
                .iter()
                .filter_map(|candidate| self.shape(*candidate).map(|other| (*candidate, other))),
            steps,
            self.predicate(),
        )
    }

    /// [`Space::approximate`] with the configured number of increments.
    pub fn approximate_motion(
        &self,
        id: ShapeId,
        movement: Vector,
        turn: f64,
    ) -> Result<Approximation<ShapeId>> {
        self.approximate(id, movement, turn, self.approximation_steps)
    }

    fn speculate<F>(
        &mut self,
        id: ShapeId,
        movement: Vector,
        turn: f64,
        hit: F,
    ) -> Result<BTreeSet<ShapeId>>
    where
        F: Fn(&Space, &Shape, &Shape, &Shape) -> bool,
    {
        let entry = self.entry(id)?;
        let original = entry.shape.clone();
        let previous_neighbours: BTreeSet<ShapeId> = entry
            .domain
            .iter()
            .filter_map(|node| self.tree.node(*node))
            .flat_map(|node| node.shapes().iter().copied())
            .collect();

        let mut moved = original.clone();
        moved.translate(movement);
        moved.rotate(turn);
        let clamped = moved.center().clamp(self.min, self.max);
        if clamped != moved.center() {
            moved.set_position(clamped);
        }

        self.entry_mut(id)?.shape = moved;
        let outcome = self.tree.update(id, &mut self.registry).map(|domain| {
            let mut candidates = previous_neighbours;
            for node in &domain {
                if let Some(node) = self.tree.node(*node) {
                    candidates.extend(node.shapes().iter().copied());
                }
            }
            candidates.remove(&id);

            let Some(after) = self.shape(id) else {
                return BTreeSet::new();
            };
            candidates
                .into_iter()
                .filter(|candidate| {
                    self.shape(*candidate)
                        .map_or(false, |item| hit(self, &original, after, item))
                })
                .collect()
        });

        self.entry_mut(id)?.shape = original;
        self.tree.update(id, &mut self.registry)?;

        outcome
    }

    fn leaf_hits(&self, leaf: NodeId) -> Vec<(ShapeId, ShapeId)> {
        let Some(node) = self.tree.node(leaf) else {
            return Vec::new();
        };

        let members: Vec<(ShapeId, &Shape)> = node
            .shapes()
            .iter()
            .filter_map(|id| self.shape(*id).map(|shape| (*id, shape)))
            .collect();

        let mut hits = Vec::new();
        for (index, (a_id, a)) in members.iter().enumerate() {
            for (b_id, b) in &members[index + 1..] {
                if !overlaps(a, b) {
                    continue;
                }
                if self.accepts(a, b) {
                    hits.push((*a_id, *b_id));
                }
                if self.accepts(b, a) {
                    hits.push((*b_id, *a_id));
                }
            }
        }

        hits
    }

    fn neighbours<F>(
        &self,
        id: ShapeId,
        domain: &BTreeSet<NodeId>,
        mut keep: F,
    ) -> BTreeSet<ShapeId>
    where
        F: FnMut(&Shape) -> bool,
    {
        let candidates: BTreeSet<ShapeId> = domain
            .iter()
            .filter_map(|node| self.tree.node(*node))
            .flat_map(|node| node.shapes().iter().copied())
            .filter(|candidate| *candidate != id)
            .collect();

        candidates
            .into_iter()
            .filter(|candidate| self.shape(*candidate).map_or(false, &mut keep))
            .collect()
    }

    fn predicate(&self) -> CollisionPredicate {
        tag_predicate(self.use_tags)
    }

    fn accepts(&self, from: &Shape, to: &Shape) -> bool {
        self.predicate().map_or(true, |accept| accept(from, to))
    }

    fn check_admission(&self, shape: &Shape) -> Result<()> {
        let center = shape.center();
        if self.in_bounds(shape) && self.tree.boundary().contains_point(center) {
            return Ok(());
        }

        warn!(
            "rejected {} centered at ({}, {}): outside the space bounds",
            shape.type_name(),
            center.x,
            center.y
        );
        Err(CollisionError::OutOfBounds {
            x: center.x,
            y: center.y,
        })
    }

    fn cell(&self, node: NodeId) -> Option<Cell> {
        self.tree.node(node).map(|leaf| Cell {
            node,
            boundary: *leaf.boundary(),
            shapes: leaf.shapes().clone(),
        })
    }

    fn entry(&self, id: ShapeId) -> Result<&IndexedShape> {
        self.registry.get(id).ok_or(CollisionError::UnknownShape(id))
    }

    fn entry_mut(&mut self, id: ShapeId) -> Result<&mut IndexedShape> {
        self.registry
            .get_mut(id)
            .ok_or(CollisionError::UnknownShape(id))
    }
}

/// Chained construction of a [`Space`] starting from [`SpaceConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct SpaceBuilder {
    config: SpaceConfig,
}

impl SpaceBuilder {
    pub fn subdivision(mut self, subdivision: usize) -> Self {
        self.config.subdivision = subdivision;
        self
    }

    pub fn node_capacity(mut self, node_capacity: usize) -> Self {
        self.config.node_capacity = node_capacity;
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn bounds(mut self, min: Vector, max: Vector) -> Self {
        self.config.min = min;
        self.config.max = max;
        self
    }

    pub fn use_tags(mut self, use_tags: bool) -> Self {
        self.config.use_tags = use_tags;
        self
    }

    pub fn approximation_steps(mut self, steps: usize) -> Self {
        self.config.approximation_steps = steps;
        self
    }

    pub fn build(self) -> Result<Space> {
        Space::from_config(self.config)
    }
}
