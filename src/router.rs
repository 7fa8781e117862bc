// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::{
    shortest_path, EmptyIndex, Facility, FacilitySet, Graph, PathError, Point, SpatialIndex,
    DEFAULT_STEP_LIMIT,
};

/// Additional controls for answering route queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Max number of node expansions per query, see [shortest_path].
    pub step_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Failures reported by [Router::route].
///
/// Every variant is a distinct, user-visible condition; none of them
/// leave the [Router] in an unusable state.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid query point: ({x}, {y})")]
    InvalidPoint { x: f64, y: f64 },

    #[error("no nodes to snap the query point to")]
    EmptyIndex,

    #[error("unknown node: {0}")]
    UnknownNode(i64),

    #[error("no path from {from} to {to}")]
    NoPathFound { from: i64, to: i64 },

    #[error("step limit exceeded")]
    StepLimitExceeded,
}

impl From<EmptyIndex> for RouteError {
    fn from(_: EmptyIndex) -> Self {
        Self::EmptyIndex
    }
}

impl From<PathError> for RouteError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::UnknownNode(id) => Self::UnknownNode(id),
            PathError::NoPathFound { from, to } => Self::NoPathFound { from, to },
            PathError::StepLimitExceeded => Self::StepLimitExceeded,
        }
    }
}

/// Answer to a successful [Router::route] query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Ids of visited nodes, starting at the facility.
    pub nodes: Vec<i64>,

    /// `[x, y]` positions of visited nodes, in the same order as [PathResult::nodes].
    pub path: Vec<[f64; 2]>,

    /// Total length of the route.
    pub cost: f64,
}

/// Answers routing queries between facilities and arbitrary points.
///
/// The router owns an immutable [Graph] and the [FacilitySet]; all queries take `&self`,
/// so a single router can be shared (e.g. through an [Arc](std::sync::Arc))
/// between any number of threads.
#[derive(Debug, Clone)]
pub struct Router {
    graph: Graph,
    facilities: FacilitySet,
    options: Options,
}

impl Router {
    pub fn new(graph: Graph, facilities: FacilitySet, options: Options) -> Self {
        Self {
            graph,
            facilities,
            options,
        }
    }

    /// Returns the underlying road network.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns all known facilities, exactly as they were loaded.
    pub fn facilities(&self) -> &[Facility] {
        self.facilities.records()
    }

    /// Returns the GeoJSON document the facilities were loaded from, if any.
    pub fn facilities_geojson(&self) -> Option<&geojson::GeoJson> {
        self.facilities.document()
    }

    /// Finds the shortest route from the node of the given facility
    /// to the node closest to `point`.
    ///
    /// Points with a NaN or infinite coordinate are rejected with [RouteError::InvalidPoint].
    pub fn route(&self, point: Point, facility_id: i64) -> Result<PathResult, RouteError> {
        if !point.is_finite() {
            return Err(RouteError::InvalidPoint {
                x: point.x,
                y: point.y,
            });
        }

        let target = self.graph.nearest(point)?;
        log::debug!(
            "({}, {}) snapped to node {}",
            point.x,
            point.y,
            target.id
        );

        let path = shortest_path(
            &self.graph,
            facility_id,
            target.id,
            self.options.step_limit,
        )?;

        let mut coordinates: Vec<[f64; 2]> = Vec::with_capacity(path.nodes.len());
        for &id in &path.nodes {
            let node = self
                .graph
                .get_node(id)
                .ok_or(RouteError::UnknownNode(id))?;
            coordinates.push(node.position().into());
        }

        Ok(PathResult {
            nodes: path.nodes,
            path: coordinates,
            cost: path.cost,
        })
    }
}
