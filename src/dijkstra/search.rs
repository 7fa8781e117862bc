// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{Edge, Graph, PathError};

/// A route through the [Graph] returned by [shortest_path].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Ids of all visited nodes, from the start to the end node (both inclusive).
    pub nodes: Vec<i64>,

    /// Sum of costs of all traversed edges.
    pub cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: usize,
    cost: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap. Equal costs are popped
        // in the order they were pushed.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path(g: &Graph, came_from: &[Option<usize>], mut last: usize) -> Vec<i64> {
    let mut path = vec![g.node_at(last).id];

    while let Some(idx) = came_from[last] {
        path.push(g.node_at(idx).id);
        last = idx;
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest route between two nodes in the provided graph.
///
/// The search stops as soon as the end node is reached. Of multiple equally cheap
/// routes, the one discovered first is returned - a node's predecessor is only replaced
/// by a strictly cheaper one, and equally cheap nodes are expanded in discovery order.
/// This makes results deterministic for a given graph.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [PathError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start, which may be very time-consuming
/// on large datasets. The recommended value is [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn shortest_path(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Path, PathError> {
    let from = g
        .index_of(from_id)
        .ok_or(PathError::UnknownNode(from_id))?;
    let to = g.index_of(to_id).ok_or(PathError::UnknownNode(to_id))?;

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: Vec<Option<usize>> = vec![None; g.len()];
    let mut known_costs: Vec<f64> = vec![f64::INFINITY; g.len()];
    let mut steps: usize = 0;
    let mut seq: u64 = 0;

    queue.push(QueueItem {
        at: from,
        cost: 0.0,
        seq,
    });
    known_costs[from] = 0.0;

    while let Some(item) = queue.pop() {
        if item.at == to {
            return Ok(Path {
                nodes: reconstruct_path(g, &came_from, to),
                cost: item.cost,
            });
        }

        // Stale queue entry - the node was reached more cheaply in the meantime
        if item.cost > known_costs[item.at] {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(PathError::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor,
            cost: edge_cost,
        } in g.edges_at(item.at)
        {
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost < known_costs[neighbor] {
                seq += 1;
                came_from[neighbor] = Some(item.at);
                known_costs[neighbor] = neighbor_cost;
                queue.push(QueueItem {
                    at: neighbor,
                    cost: neighbor_cost,
                    seq,
                });
            }
        }
    }

    Err(PathError::NoPathFound {
        from: from_id,
        to: to_id,
    })
}
