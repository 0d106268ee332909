//! Region quadtree used as the broad-phase of a [`Space`](crate::Space).
//!
//! Nodes live in a generational arena and refer to each other by [`NodeId`].
//! Leaves hold sets of [`ShapeId`]s, and every registered shape records the
//! leaves that hold it (its *domain*) in its [`IndexedShape`] entry. Both sides
//! of that relation are updated together by every operation here.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::{
    core::{Aabb, Shape, ShapeKind},
    error::{CollisionError, Result},
    utils::allocator::{Arena, NodeId, ShapeId},
};

/// A shape owned by the space together with the leaves referencing it.
#[derive(Debug, Clone)]
pub struct IndexedShape {
    pub shape: Shape,
    pub domain: BTreeSet<NodeId>,
}

impl IndexedShape {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            domain: BTreeSet::new(),
        }
    }
}

pub type ShapeRegistry = Arena<ShapeId, IndexedShape>;

/// Child slots in traversal order.
pub const NORTH_EAST: usize = 0;
pub const NORTH_WEST: usize = 1;
pub const SOUTH_EAST: usize = 2;
pub const SOUTH_WEST: usize = 3;

#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    boundary: Aabb,
    shapes: BTreeSet<ShapeId>,
    children: Option<[NodeId; 4]>,
    parent: Option<NodeId>,
    level: usize,
}

impl QuadTreeNode {
    fn new(boundary: Aabb, parent: Option<NodeId>, level: usize) -> Self {
        Self {
            boundary,
            shapes: BTreeSet::new(),
            children: None,
            parent,
            level,
        }
    }

    pub fn boundary(&self) -> &Aabb {
        &self.boundary
    }

    /// Shapes held by the node; always empty for internal nodes.
    pub fn shapes(&self) -> &BTreeSet<ShapeId> {
        &self.shapes
    }

    /// Children in north-east, north-west, south-east, south-west order.
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Arena<NodeId, QuadTreeNode>,
    root: NodeId,
    max_level: usize,
    node_capacity: usize,
    leaves: BTreeSet<NodeId>,
}

impl QuadTree {
    pub fn new(boundary: Aabb, max_level: usize, node_capacity: usize) -> Result<Self> {
        if max_level < 1 {
            return Err(CollisionError::InvalidSubdivision(max_level));
        }
        if node_capacity < 1 {
            return Err(CollisionError::InvalidCapacity(node_capacity));
        }
        if !(boundary.width() > 0.0 && boundary.height() > 0.0) {
            return Err(CollisionError::InvalidBounds(format!(
                "quadtree boundary {boundary:?} has no area"
            )));
        }

        let mut nodes = Arena::new();
        let root = nodes.insert(QuadTreeNode::new(boundary, None, 0));
        let mut tree = Self {
            nodes,
            root,
            max_level,
            node_capacity,
            leaves: BTreeSet::new(),
        };
        tree.add_leaf(root);

        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn boundary(&self) -> &Aabb {
        &self.node_ref(self.root).boundary
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    pub fn node(&self, id: NodeId) -> Option<&QuadTreeNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Live leaves, maintained incrementally by split and assemble.
    pub fn leaves(&self) -> &BTreeSet<NodeId> {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Inserts a registered shape and returns its new domain.
    pub fn insert(
        &mut self,
        id: ShapeId,
        registry: &mut ShapeRegistry,
    ) -> Result<BTreeSet<NodeId>> {
        let entry = registry.get(id).ok_or(CollisionError::UnknownShape(id))?;
        let center = entry.shape.center();
        if !self.boundary().contains_point(center) {
            return Err(CollisionError::OutOfBounds {
                x: center.x,
                y: center.y,
            });
        }

        let kind = *entry.shape.kind();
        self.descend(id, &kind, registry);

        Ok(Self::domain_of(id, registry))
    }

    /// Re-synchronises the domain of a shape after it moved or turned.
    ///
    /// Leaves no longer overlapping the shape drop it, then the tree is walked
    /// from the root to pick up newly overlapped leaves, splitting full ones.
    pub fn update(
        &mut self,
        id: ShapeId,
        registry: &mut ShapeRegistry,
    ) -> Result<BTreeSet<NodeId>> {
        let entry = registry.get(id).ok_or(CollisionError::UnknownShape(id))?;
        let kind = *entry.shape.kind();

        let stale: Vec<NodeId> = entry
            .domain
            .iter()
            .copied()
            .filter(|node| !self.node_ref(*node).boundary.collides_kind(&kind))
            .collect();

        for node in stale {
            self.node_mut(node).shapes.remove(&id);
            if let Some(entry) = registry.get_mut(id) {
                entry.domain.remove(&node);
            }
        }

        self.descend(id, &kind, registry);

        Ok(Self::domain_of(id, registry))
    }

    /// Leaves whose shape set holds `id`, found by scanning the live leaves.
    pub fn search(&self, id: ShapeId) -> BTreeSet<NodeId> {
        self.leaves
            .iter()
            .copied()
            .filter(|leaf| self.node_ref(*leaf).shapes.contains(&id))
            .collect()
    }

    /// Drops the shape from every leaf of its domain. Never merges nodes.
    pub fn remove(&mut self, id: ShapeId, registry: &mut ShapeRegistry) -> Result<()> {
        let entry = registry.get_mut(id).ok_or(CollisionError::UnknownShape(id))?;
        let domain = std::mem::take(&mut entry.domain);

        for node in domain {
            if let Some(node) = self.nodes.get_mut(node) {
                node.shapes.remove(&id);
            }
        }

        Ok(())
    }

    /// Splits a leaf into four quadrants and hands its shapes to the children
    /// they overlap.
    pub fn split(&mut self, node_id: NodeId, registry: &mut ShapeRegistry) {
        let node = self.node_ref(node_id);
        assert!(node.is_leaf(), "split of internal node {node_id:?}");

        let level = node.level + 1;
        let quadrants = node.boundary.quadrants();
        let shapes = std::mem::take(&mut self.node_mut(node_id).shapes);

        let children = quadrants.map(|boundary| {
            self.nodes
                .insert(QuadTreeNode::new(boundary, Some(node_id), level))
        });

        for shape_id in &shapes {
            let Some(entry) = registry.get_mut(*shape_id) else {
                continue;
            };
            entry.domain.remove(&node_id);

            for child in children {
                let child_node = self.node_mut(child);
                if child_node.boundary.collides_kind(entry.shape.kind()) {
                    child_node.shapes.insert(*shape_id);
                    entry.domain.insert(child);
                }
            }
        }

        self.node_mut(node_id).children = Some(children);
        self.remove_leaf(node_id);
        for child in children {
            self.add_leaf(child);
        }

        debug!(
            "split node {:?} at level {} ({} shapes)",
            node_id,
            level - 1,
            shapes.len()
        );
    }

    /// Merges the children of `node_id` back into it, assembling deeper
    /// subtrees first.
    pub fn assemble(&mut self, node_id: NodeId, registry: &mut ShapeRegistry) {
        let Some(children) = self.node_ref(node_id).children else {
            return;
        };

        let mut merged = BTreeSet::new();
        for child in children {
            if !self.node_ref(child).is_leaf() {
                self.assemble(child, registry);
            }

            self.remove_leaf(child);
            let Some(child_node) = self.nodes.remove(child) else {
                continue;
            };

            for shape_id in child_node.shapes {
                if let Some(entry) = registry.get_mut(shape_id) {
                    entry.domain.remove(&child);
                    entry.domain.insert(node_id);
                }
                merged.insert(shape_id);
            }
        }

        let node = self.node_mut(node_id);
        node.children = None;
        node.shapes = merged;
        let (level, count) = (node.level, node.shapes.len());
        self.add_leaf(node_id);

        debug!("assembled node {node_id:?} at level {level} ({count} shapes)");
    }

    /// Collapses every subtree whose four leaf children hold no more distinct
    /// shapes than a single leaf may, repeating until nothing changes.
    pub fn redistribute(&mut self, registry: &mut ShapeRegistry) -> usize {
        let mut assembled = 0;

        loop {
            let parents: BTreeSet<NodeId> = self
                .leaves
                .iter()
                .filter_map(|leaf| self.node_ref(*leaf).parent)
                .collect();

            let candidates: Vec<NodeId> = parents
                .into_iter()
                .filter(|parent| self.can_assemble(*parent))
                .collect();

            if candidates.is_empty() {
                break;
            }

            for parent in candidates {
                self.assemble(parent, registry);
                assembled += 1;
            }
        }

        if assembled > 0 {
            debug!(
                "redistribute assembled {assembled} nodes, {} leaves left",
                self.leaves.len()
            );
        }

        assembled
    }

    /// Leaves overlapping `kind`, in breadth-first north-east, north-west,
    /// south-east, south-west order.
    pub fn query_kind(&self, kind: &ShapeKind) -> Vec<NodeId> {
        self.walk(|boundary| boundary.collides_kind(kind))
    }

    /// Leaves whose boundary overlaps `area`, in breadth-first order.
    pub fn query_aabb(&self, area: &Aabb) -> Vec<NodeId> {
        self.walk(|boundary| boundary.overlaps(area))
    }

    /// Drops every node and restarts from a single empty root leaf.
    pub fn clear(&mut self, registry: &mut ShapeRegistry) {
        let boundary = *self.boundary();
        self.nodes.clear();
        self.leaves.clear();
        self.root = self.nodes.insert(QuadTreeNode::new(boundary, None, 0));
        self.add_leaf(self.root);

        for (_, entry) in registry.iter_mut() {
            entry.domain.clear();
        }
    }

    fn walk(&self, mut accept: impl FnMut(&Aabb) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([self.root]);

        while let Some(node_id) = queue.pop_front() {
            let node = self.node_ref(node_id);
            if !accept(&node.boundary) {
                continue;
            }

            match node.children {
                Some(children) => queue.extend(children),
                None => found.push(node_id),
            }
        }

        found
    }

    fn descend(&mut self, id: ShapeId, kind: &ShapeKind, registry: &mut ShapeRegistry) {
        let mut queue = VecDeque::from([self.root]);

        while let Some(node_id) = queue.pop_front() {
            let node = self.node_ref(node_id);
            if !node.boundary.collides_kind(kind) {
                continue;
            }

            if let Some(children) = node.children {
                queue.extend(children);
                continue;
            }

            if node.shapes.contains(&id) {
                continue;
            }

            if node.shapes.len() < self.node_capacity || node.level + 1 >= self.max_level {
                self.node_mut(node_id).shapes.insert(id);
                if let Some(entry) = registry.get_mut(id) {
                    entry.domain.insert(node_id);
                }
            } else {
                self.split(node_id, registry);
                queue.push_back(node_id);
            }
        }
    }

    fn can_assemble(&self, node_id: NodeId) -> bool {
        let Some(children) = self.node_ref(node_id).children else {
            return false;
        };

        let mut union = BTreeSet::new();
        for child in children {
            let child = self.node_ref(child);
            if !child.is_leaf() {
                return false;
            }
            union.extend(child.shapes.iter().copied());
        }

        union.len() <= self.node_capacity
    }

    fn domain_of(id: ShapeId, registry: &ShapeRegistry) -> BTreeSet<NodeId> {
        registry
            .get(id)
            .map(|entry| entry.domain.clone())
            .unwrap_or_default()
    }

    fn add_leaf(&mut self, node: NodeId) {
        assert!(self.leaves.insert(node), "leaf {node:?} registered twice");
    }

    fn remove_leaf(&mut self, node: NodeId) {
        assert!(self.leaves.remove(&node), "leaf {node:?} is not registered");
    }

    fn node_ref(&self, id: NodeId) -> &QuadTreeNode {
        match self.nodes.get(id) {
            Some(node) => node,
            None => panic!("dangling quadtree node {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut QuadTreeNode {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => panic!("dangling quadtree node {id:?}"),
        }
    }
}
