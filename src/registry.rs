// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};

use crate::{EmptyIndex, Node, Point, SpatialIndex};

/// Holds all network [Nodes](Node) in insertion order, keyed by their unique id.
///
/// The insertion order is significant: it decides which node wins
/// an exact tie in [SpatialIndex::nearest], and it becomes the layout of the
/// node table in the [Graph](crate::Graph) built from this registry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    slots: HashMap<i64, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes in the registry.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns all nodes as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get(&self, id: i64) -> Option<Node> {
        self.slots.get(&id).map(|&slot| self.nodes[slot])
    }

    /// Adds a [Node] to the registry. Returns `false` if the node was rejected.
    ///
    /// Nodes with non-finite coordinates are rejected. Re-inserting an existing id
    /// overwrites its position, but the node keeps its original insertion slot.
    pub fn insert(&mut self, node: Node) -> bool {
        if !node.position().is_finite() {
            log::warn!(
                "node {}: non-finite position ({}, {}), skipping",
                node.id,
                node.x,
                node.y
            );
            return false;
        }

        match self.slots.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert(self.nodes.len());
                self.nodes.push(node);
            }
            Entry::Occupied(e) => {
                let existing = &mut self.nodes[*e.get()];
                log::warn!(
                    "node {}: duplicate id, moving from ({}, {}) to ({}, {})",
                    node.id,
                    existing.x,
                    existing.y,
                    node.x,
                    node.y
                );
                *existing = node;
            }
        }
        true
    }
}

impl Extend<Node> for NodeRegistry {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl FromIterator<Node> for NodeRegistry {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut registry = Self::default();
        registry.extend(iter);
        registry
    }
}

impl SpatialIndex for NodeRegistry {
    /// Finds the closest [Node] by computing the distance to every node in the registry.
    ///
    /// This is O(n) per call; use a [KDTree](crate::KDTree) when snapping many points.
    fn nearest(&self, point: Point) -> Result<Node, EmptyIndex> {
        let mut best: Option<(f64, Node)> = None;
        for &nd in &self.nodes {
            let dist = point.distance_squared(nd.position());
            // Strict comparison - the first of equally distant nodes wins
            if best.map_or(true, |(best_dist, _)| dist < best_dist) {
                best = Some((dist, nd));
            }
        }
        best.map(|(_, nd)| nd).ok_or(EmptyIndex)
    }
}
