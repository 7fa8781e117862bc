// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest paths from facilities (hospitals, fire stations, ...) to arbitrary points
//! over a road network.
//!
//! The network is assembled from two independent layers: a table of junction
//! [Nodes](Node) and a set of road centerline [Polylines](Polyline). Those layers
//! rarely share exact vertices, so every road endpoint is snapped to the closest node.
//! Routes are found with Dijkstra's algorithm, starting at the facility node and ending
//! at the node closest to the requested point.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let graph = facility_router::io::load_graph(
//!     Path::new("data/nodes"),
//!     Path::new("data/roads.geojson"),
//!     &facility_router::BuildOptions::default(),
//! )
//! .expect("failed to load the road network");
//!
//! let router = facility_router::Router::new(
//!     graph,
//!     facility_router::FacilitySet::default(),
//!     facility_router::RouterOptions::default(),
//! );
//!
//! let route = router
//!     .route(facility_router::Point::new(74.3436, 31.5497), 42)
//!     .expect("failed to find route");
//!
//! println!("Route: {:?}", route.path);
//! ```

mod builder;
mod dijkstra;
mod facility;
mod geometry;
mod graph;
pub mod io;
mod kd;
mod registry;
mod router;
mod spatial;

pub use builder::{
    build_graph, BuildError, BuildReport, GraphBuilder, MalformedSegment,
    Options as BuildOptions,
};
pub use dijkstra::{shortest_path, Path, PathError, DEFAULT_STEP_LIMIT};
pub use facility::{Facility, FacilitySet};
pub use geometry::{Point, Polyline};
pub use graph::{Edge, Graph};
pub use kd::KDTree;
pub use registry::NodeRegistry;
pub use router::{Options as RouterOptions, PathResult, RouteError, Router};
pub use spatial::{EmptyIndex, SpatialIndex};

/// Represents a junction of the road network.
///
/// Ids must be unique within a [NodeRegistry]; coordinates share
/// a single planar reference frame with all road geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub const fn new(id: i64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
