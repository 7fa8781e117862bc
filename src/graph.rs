// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{EmptyIndex, KDTree, Node, NodeRegistry, Point, SpatialIndex};

/// Represents a connection from a specific [Node] to the node at index `to`
/// of the [Graph] node table.
///
/// Roads are undirected, so every edge is stored twice: once at each end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub cost: f64,
}

/// Represents a road network as a table of [Nodes](Node) and weighted,
/// undirected [Edges](Edge) between them.
///
/// Nodes live in a contiguous table, in the insertion order of the [NodeRegistry]
/// the graph was built from, and are addressed by their index in that table.
/// Lookups by node id go through an additional id-to-index map.
///
/// A graph is created by a [GraphBuilder](crate::GraphBuilder) and can't be modified
/// afterwards, which makes it safe to share between any number of concurrent readers.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    indices: HashMap<i64, usize>,
    edges: Vec<Vec<Edge>>,
    edge_count: usize,
    index: KDTree,
}

impl Graph {
    /// Creates a graph with all nodes from the registry and no edges.
    pub(crate) fn without_edges(registry: &NodeRegistry) -> Result<Self, EmptyIndex> {
        let nodes = registry.as_slice().to_vec();
        let index = KDTree::from_iter(nodes.iter().cloned())?;
        let indices = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();
        let edges = vec![Vec::default(); nodes.len()];

        Ok(Self {
            nodes,
            indices,
            edges,
            edge_count: 0,
            index,
        })
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` - graphs without nodes can't be built.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of distinct undirected connections (including self-loops).
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.index_of(id).map(|idx| self.nodes[idx])
    }

    /// Returns the position of a node with the provided id in the node table.
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.indices.get(&id).cloned()
    }

    /// Retrieves the [Node] at the provided index of the node table.
    ///
    /// Panics if the index is out of bounds.
    pub(crate) fn node_at(&self, idx: usize) -> Node {
        self.nodes[idx]
    }

    /// Gets all [Edges](Edge) of the node at the provided index of the node table.
    pub fn edges_at(&self, idx: usize) -> &[Edge] {
        self.edges.get(idx).map(Vec::as_slice).unwrap_or_default()
    }

    /// Gets all [Edges](Edge) of a node with a given id.
    pub fn get_edges(&self, id: i64) -> &[Edge] {
        self.index_of(id)
            .map(|idx| self.edges_at(idx))
            .unwrap_or_default()
    }

    /// Gets the cost of an [Edge] between two nodes.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        let Some(to) = self.index_of(to_id) else {
            return f64::INFINITY;
        };

        self.get_edges(from_id)
            .iter()
            .find_map(|edge| if edge.to == to { Some(edge.cost) } else { None })
            .unwrap_or(f64::INFINITY)
    }

    /// Finds the closest [Node] to the given position, together with its
    /// index in the node table.
    pub(crate) fn find_nearest(&self, point: Point) -> (Node, usize) {
        self.index.find_nearest_slot(point)
    }

    /// Connects two nodes (given by their indices in the node table).
    ///
    /// If the nodes are already connected, only the cheaper of the two
    /// connections is kept.
    pub(crate) fn add_edge(&mut self, a: usize, b: usize, cost: f64) {
        debug_assert!(cost >= 0.0);

        let is_new = Self::set_edge_min(&mut self.edges[a], b, cost);
        if a != b {
            Self::set_edge_min(&mut self.edges[b], a, cost);
        }
        if is_new {
            self.edge_count += 1;
        }
    }

    fn set_edge_min(edges: &mut Vec<Edge>, to: usize, cost: f64) -> bool {
        if let Some(candidate) = edges.iter_mut().find(|e| e.to == to) {
            if cost < candidate.cost {
                candidate.cost = cost;
            }
            false
        } else {
            edges.push(Edge { to, cost });
            true
        }
    }
}

impl SpatialIndex for Graph {
    fn nearest(&self, point: Point) -> Result<Node, EmptyIndex> {
        self.index.nearest(point)
    }
}
