// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{EmptyIndex, Node, Point, SpatialIndex};

/// A [Node] stored in the tree, together with its position in the input sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    node: Node,
    slot: usize,
}

impl Entry {
    /// Checks whether this entry at `dist` beats `other` at `other_dist`.
    /// Exact ties are resolved in favor of the earlier slot.
    #[inline]
    fn beats(&self, dist: f64, other: &Entry, other_dist: f64) -> bool {
        dist < other_dist || (dist == other_dist && self.slot < other.slot)
    }
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which speeds up snapping points to the closest [Node].
/// [NodeRegistry](crate::NodeRegistry) answers the same queries with a linear scan,
/// which is fine for a handful of lookups, but building a graph snaps two endpoints
/// per road segment. A k-d tree trades memory for CPU time here.
///
/// The tree returns exactly the same nodes as the linear scan, including the
/// first-inserted rule for equidistant nodes: candidates are ranked by
/// `(squared distance, input position)`, and a branch is only skipped when the
/// splitting axis is strictly further away than the current best candidate.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Entry,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, point: Point) -> Node {
        self.find_nearest_slot(point).0
    }

    /// Finds the closest [Node] to the given position, also returning
    /// its position in the sequence the tree was built from.
    pub(crate) fn find_nearest_slot(&self, point: Point) -> (Node, usize) {
        let (best, _) = self.find_nearest_impl(point, false);
        (best.node, best.slot)
    }

    fn find_nearest_impl(&self, point: Point, y_divides: bool) -> (Entry, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = point.distance_squared(best.node.position());

        // Select which branch to recurse into first
        let first_left = if y_divides {
            point.y < self.pivot.node.y
        } else {
            point.x < self.pivot.node.x
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_impl(point, !y_divides);
            if alt.beats(alt_dist, &best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer (or an equally close, but earlier) node is possible in the second
            // branch if and only if the splitting axis is not further than the current best.
            let to_axis = if y_divides {
                point.y - self.pivot.node.y
            } else {
                point.x - self.pivot.node.x
            };

            if to_axis * to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_impl(point, !y_divides);
                if alt.beats(alt_dist, &best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    ///
    /// The iteration order defines the tie-breaking order: of two equidistant nodes,
    /// the one yielded first is preferred.
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Result<Self, EmptyIndex> {
        let mut entries = nodes
            .into_iter()
            .enumerate()
            .map(|(slot, node)| Entry { node, slot })
            .collect::<Vec<_>>();
        Self::build_impl(entries.as_mut_slice(), false).ok_or(EmptyIndex)
    }

    fn build_impl(entries: &mut [Entry], y_divides: bool) -> Option<Self> {
        match entries.len() {
            0 => None,
            1 => Some(Self {
                pivot: entries[0],
                left: None,
                right: None,
            }),
            _ => {
                if y_divides {
                    entries.sort_by(|a, b| a.node.y.total_cmp(&b.node.y));
                } else {
                    entries.sort_by(|a, b| a.node.x.total_cmp(&b.node.x));
                }
                let median = entries.len() / 2;
                let pivot = entries[median];
                let (left, right_and_pivot) = entries.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: box_option(Self::build_impl(left, !y_divides)),
                    right: box_option(Self::build_impl(right, !y_divides)),
                })
            }
        }
    }
}

impl SpatialIndex for KDTree {
    fn nearest(&self, point: Point) -> Result<Node, EmptyIndex> {
        Ok(self.find_nearest_node(point))
    }
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(Box::new)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::NodeRegistry;

    #[test]
    fn kd_tree() {
        let tree = KDTree::from_iter([
            Node::new(1, 0.01, 0.01),
            Node::new(2, 0.05, 0.01),
            Node::new(3, 0.09, 0.03),
            Node::new(4, 0.03, 0.04),
            Node::new(5, 0.07, 0.04),
            Node::new(6, 0.03, 0.07),
            Node::new(7, 0.01, 0.07),
            Node::new(8, 0.05, 0.08),
            Node::new(9, 0.09, 0.08),
        ])
        .expect("k-d tree from non-empty input must not be empty");

        assert_eq!(tree.find_nearest_node(Point::new(0.02, 0.02)).id, 1);
        assert_eq!(tree.find_nearest_node(Point::new(0.03, 0.05)).id, 4);
        assert_eq!(tree.find_nearest_node(Point::new(0.08, 0.05)).id, 5);
        assert_eq!(tree.find_nearest_node(Point::new(0.06, 0.09)).id, 8);
    }

    #[test]
    fn kd_tree_empty() {
        assert!(matches!(
            KDTree::from_iter(std::iter::empty()),
            Err(EmptyIndex)
        ));
    }

    #[test]
    fn kd_tree_tie_goes_to_first_inserted() {
        let tree = KDTree::from_iter([Node::new(1, 0.0, 0.0), Node::new(2, 10.0, 10.0)]).unwrap();
        assert_eq!(tree.find_nearest_node(Point::new(5.0, 5.0)).id, 1);

        let tree = KDTree::from_iter([Node::new(2, 10.0, 10.0), Node::new(1, 0.0, 0.0)]).unwrap();
        assert_eq!(tree.find_nearest_node(Point::new(5.0, 5.0)).id, 2);

        // Four corners of a square, queried at its center - all equidistant
        let tree = KDTree::from_iter([
            Node::new(10, 2.0, 2.0),
            Node::new(11, 0.0, 2.0),
            Node::new(12, 2.0, 0.0),
            Node::new(13, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(tree.find_nearest_node(Point::new(1.0, 1.0)).id, 10);
    }

    #[test]
    fn kd_tree_matches_linear_scan() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);

        for round in 0..20 {
            let count = rng.gen_range(1..200);
            let registry: NodeRegistry = (0..count)
                .map(|i| {
                    // Snap to a coarse grid in some rounds to provoke exact ties
                    let (x, y) = if round % 2 == 0 {
                        (rng.gen_range(0..20) as f64, rng.gen_range(0..20) as f64)
                    } else {
                        (rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0))
                    };
                    Node::new(i + 1, x, y)
                })
                .collect();
            let tree = KDTree::from_iter(registry.iter().cloned()).unwrap();

            for _ in 0..200 {
                let p = if round % 2 == 0 {
                    Point::new(
                        rng.gen_range(-2..22) as f64 * 0.5,
                        rng.gen_range(-2..22) as f64 * 0.5,
                    )
                } else {
                    Point::new(rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0))
                };

                let expected = registry.nearest(p).unwrap();
                let got = tree.find_nearest_node(p);
                assert_eq!(got.id, expected.id, "query {:?}", p);

                let got_dist = p.distance(got.position());
                assert!(registry.iter().all(|n| got_dist <= p.distance(n.position())));
            }
        }
    }
}
