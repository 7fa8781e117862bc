// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Node, Point};

/// Returned when a nearest-node lookup is attempted on a structure without any nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("spatial index is empty")]
pub struct EmptyIndex;

/// Structures able to snap an arbitrary [Point] to the closest [Node].
///
/// All implementations must return the node minimizing the euclidean distance
/// (as computed by [Point::distance_squared]) to the query point, breaking exact ties
/// in favor of the node inserted first. This makes implementations interchangeable:
/// given the same nodes (in the same order) they return the same node for every
/// finite query point. Results for points with NaN or infinite coordinates are unspecified.
pub trait SpatialIndex {
    fn nearest(&self, point: Point) -> Result<Node, EmptyIndex>;
}
