// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{EmptyIndex, Graph, NodeRegistry, Point, Polyline};

/// Additional controls for assembling a [Graph] out of road segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Road endpoints snapped to a node further away than this distance
    /// are reported with a warning (they're still connected).
    /// Ignored if zero, negative or not finite.
    pub snap_tolerance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.0,
        }
    }
}

/// Errors which prevent a [Graph] from being built.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no nodes to build the graph from: {0}")]
    EmptyIndex(#[from] EmptyIndex),

    #[error("{0}")]
    Load(#[from] crate::io::Error),
}

/// Describes why a road segment was left out of a [Graph].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MalformedSegment {
    #[error("segment has {0} point(s), expected at least 2")]
    TooFewPoints(usize),

    #[error("segment has a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// Summary of a [Graph] construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of segments turned into edges.
    pub segments: usize,

    /// Number of segments skipped as [MalformedSegment].
    pub malformed: usize,

    /// Number of segments with both endpoints snapped to the same node.
    pub self_loops: usize,

    /// Number of endpoints snapped further than [Options::snap_tolerance].
    pub far_snaps: usize,
}

/// Helper object used for converting road segments into [Graph] edges.
///
/// The spatial index is built once (when the builder is created) and reused
/// for snapping all segment endpoints.
pub struct GraphBuilder<'a> {
    g: Graph,
    options: &'a Options,
    report: BuildReport,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new builder over all nodes from the registry.
    pub fn new(registry: &NodeRegistry, options: &'a Options) -> Result<Self, EmptyIndex> {
        Ok(Self {
            g: Graph::without_edges(registry)?,
            options,
            report: BuildReport::default(),
        })
    }

    /// Add all segments from the provided iterator. Malformed segments are skipped.
    pub fn add_segments<'s, I: IntoIterator<Item = &'s Polyline>>(&mut self, segments: I) {
        for (i, segment) in segments.into_iter().enumerate() {
            if let Err(e) = self.add_segment(segment) {
                log::warn!("segment {i}: {e}, skipping");
            }
        }
    }

    /// Connects the nodes closest to both ends of the segment with an edge
    /// weighted by the segment's length.
    pub fn add_segment(&mut self, segment: &Polyline) -> Result<(), MalformedSegment> {
        let (start, end) = match Self::check_segment(segment) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                self.report.malformed += 1;
                return Err(e);
            }
        };

        let a = self.snap(start);
        let b = self.snap(end);
        if a == b {
            self.report.self_loops += 1;
        }

        self.g.add_edge(a, b, segment.length());
        self.report.segments += 1;
        Ok(())
    }

    fn check_segment(segment: &Polyline) -> Result<(Point, Point), MalformedSegment> {
        let endpoints = segment
            .endpoints()
            .ok_or(MalformedSegment::TooFewPoints(segment.points().len()))?;

        if segment.points().iter().all(Point::is_finite) {
            Ok(endpoints)
        } else {
            Err(MalformedSegment::NonFiniteCoordinate)
        }
    }

    /// Returns the index of the node closest to the point.
    fn snap(&mut self, point: Point) -> usize {
        let (node, idx) = self.g.find_nearest(point);

        let tolerance = self.options.snap_tolerance;
        if tolerance.is_finite() && tolerance > 0.0 {
            let distance = point.distance(node.position());
            if distance > tolerance {
                log::warn!(
                    "({}, {}) snapped to node {} which is {} away (tolerance {})",
                    point.x,
                    point.y,
                    node.id,
                    distance,
                    tolerance,
                );
                self.report.far_snaps += 1;
            }
        }

        idx
    }

    /// Finishes building, returning the [Graph] and a summary of the process.
    pub fn finish(self) -> (Graph, BuildReport) {
        let r = self.report;
        log::info!(
            "built graph with {} nodes and {} edges from {} segments \
            ({} malformed, {} self-loops, {} far snaps)",
            self.g.len(),
            self.g.edge_count(),
            r.segments,
            r.malformed,
            r.self_loops,
            r.far_snaps,
        );
        (self.g, r)
    }
}

/// Builds an immutable road network [Graph] out of junction nodes and road segments.
///
/// Both ends of every segment are snapped to the nearest node from the registry,
/// and the nodes are connected with an edge costing the length of the segment.
/// Segments with less than two points (or with non-finite coordinates) are skipped
/// with a warning. Fails only if the registry is empty.
pub fn build_graph<'s, I: IntoIterator<Item = &'s Polyline>>(
    registry: &NodeRegistry,
    segments: I,
    options: &Options,
) -> Result<Graph, BuildError> {
    let mut b = GraphBuilder::new(registry, options)?;
    b.add_segments(segments);
    Ok(b.finish().0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, SpatialIndex};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn line(points: &[(f64, f64)]) -> Polyline {
        points.iter().cloned().map(Point::from).collect()
    }

    fn registry(nodes: &[(i64, f64, f64)]) -> NodeRegistry {
        nodes
            .iter()
            .map(|&(id, x, y)| Node::new(id, x, y))
            .collect()
    }

    #[test]
    fn build() {
        //  3
        //  │
        //  │
        //  1──────2
        let nodes = registry(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 0.0, 10.0)]);
        let segments = [
            line(&[(0.1, -0.1), (5.0, 1.0), (9.9, 0.2)]),
            line(&[(0.0, 0.2), (0.0, 9.8)]),
        ];

        let g = build_graph(&nodes, &segments, &Options::default()).unwrap();

        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_almost_eq!(g.get_edge(1, 2), segments[0].length());
        assert_almost_eq!(g.get_edge(3, 1), 9.6);
        assert!(g.get_edge(2, 3).is_infinite());
    }

    #[test]
    fn segments_sharing_an_endpoint_join_at_one_node() {
        let nodes = registry(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 20.0, 0.0)]);
        let segments = [
            line(&[(0.0, 0.0), (10.0, 0.0)]),
            // Starts slightly off node 2 - within snapping tolerance
            line(&[(10.0001, -0.0002), (20.0, 0.0)]),
        ];

        let options = Options {
            snap_tolerance: 0.01,
        };
        let mut b = GraphBuilder::new(&nodes, &options).unwrap();
        b.add_segments(&segments);
        let (g, report) = b.finish();

        assert_eq!(report.far_snaps, 0);
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 2);

        // Node 2 is the single join: connected to both 1 and 3
        let joined: Vec<i64> = g
            .get_edges(2)
            .iter()
            .map(|e| g.node_at(e.to).id)
            .collect();
        assert_eq!(joined, vec![1, 3]);

        let join = Point::new(10.0, 0.0);
        let near_join = g
            .iter()
            .filter(|n| n.position().distance(join) < 0.01)
            .count();
        assert_eq!(near_join, 1);
    }

    #[test]
    fn reconnects_through_snapping() {
        // Roads drawn with endpoints off the junction layer still form
        // a connected network: 1-2-3-4 in a row
        let nodes = registry(&[
            (1, 0.0, 0.0),
            (2, 100.0, 0.0),
            (3, 200.0, 0.0),
            (4, 300.0, 0.0),
        ]);
        let segments = [
            line(&[(1.0, 1.0), (99.0, -1.0)]),
            line(&[(101.5, 0.5), (198.0, 2.0)]),
            line(&[(201.0, -2.0), (250.0, 0.0), (299.0, 0.5)]),
        ];

        let options = Options {
            snap_tolerance: 1.0,
        };
        let mut b = GraphBuilder::new(&nodes, &options).unwrap();
        b.add_segments(&segments);
        let (g, report) = b.finish();

        assert_eq!(report.segments, 3);
        assert_eq!(report.far_snaps, 6);
        assert!(g.get_edge(1, 2).is_finite());
        assert!(g.get_edge(2, 3).is_finite());
        assert!(g.get_edge(3, 4).is_finite());
        assert!(g.get_edge(1, 3).is_infinite());
        assert!(g.get_edge(2, 4).is_infinite());

        let path = crate::shortest_path(&g, 1, 4, crate::DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(path.nodes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn endpoints_snap_like_the_linear_scan() {
        let nodes = registry(&[(1, 0.0, 0.0), (2, 10.0, 10.0), (3, 10.0, -1.0)]);
        let segments = [line(&[(5.0, 5.0), (10.0, 1.0)])];

        let g = build_graph(&nodes, &segments, &Options::default()).unwrap();

        // (5, 5) is equidistant to 1 and 2; 1 was inserted first
        assert_eq!(nodes.nearest(Point::new(5.0, 5.0)).unwrap().id, 1);
        assert!(g.get_edge(1, 3).is_finite());
        assert!(g.get_edge(2, 3).is_infinite());
    }

    #[test]
    fn malformed_segments_are_skipped() {
        let nodes = registry(&[(1, 0.0, 0.0), (2, 10.0, 0.0)]);
        let segments = [
            line(&[]),
            line(&[(3.0, 3.0)]),
            line(&[(0.0, 0.0), (f64::NAN, 1.0), (10.0, 0.0)]),
            line(&[(0.0, 0.0), (10.0, 0.0)]),
        ];

        let options = Options::default();
        let mut b = GraphBuilder::new(&nodes, &options).unwrap();
        assert_eq!(
            b.add_segment(&segments[0]),
            Err(MalformedSegment::TooFewPoints(0))
        );
        assert_eq!(
            b.add_segment(&segments[1]),
            Err(MalformedSegment::TooFewPoints(1))
        );
        assert_eq!(
            b.add_segment(&segments[2]),
            Err(MalformedSegment::NonFiniteCoordinate)
        );
        assert_eq!(b.add_segment(&segments[3]), Ok(()));
        let (g, report) = b.finish();

        assert_eq!(report.malformed, 3);
        assert_eq!(report.segments, 1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.get_edge(1, 2), 10.0);
    }

    #[test]
    fn self_loops_and_parallel_segments() {
        let nodes = registry(&[(1, 0.0, 0.0), (2, 10.0, 0.0)]);
        let segments = [
            // Loop around node 1
            line(&[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            // Two roads between 1 and 2, the second one shorter
            line(&[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]),
            line(&[(0.0, 0.0), (10.0, 0.0)]),
        ];

        let options = Options::default();
        let mut b = GraphBuilder::new(&nodes, &options).unwrap();
        b.add_segments(&segments);
        let (g, report) = b.finish();

        assert_eq!(report.self_loops, 1);
        assert_eq!(report.segments, 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.get_edge(1, 2), 10.0);
        assert!(g.get_edge(1, 1).is_finite());
    }

    #[test]
    fn empty_registry() {
        let segments = [line(&[(0.0, 0.0), (1.0, 1.0)])];
        assert!(matches!(
            build_graph(&NodeRegistry::new(), &segments, &Options::default()),
            Err(BuildError::EmptyIndex(EmptyIndex))
        ));
    }
}
