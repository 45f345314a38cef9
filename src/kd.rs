// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{distance_to_meridian, earth_distance, Graph, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large datasets, trading memory
/// usage for CPU time compared to [Graph::find_nearest_node].
///
/// Levels of the tree alternate between splitting on latitude and longitude.
/// Branches are only skipped when the great-circle distance to the splitting parallel
/// or meridian exceeds the best candidate found so far, so the result is always identical
/// to [Graph::find_nearest_node] (including ties, which prefer the smallest node id).
/// Networks spanning more than 90° of longitude fall back to visiting more branches.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        self.find_nearest_node_impl(lat, lon, false).0
    }

    fn find_nearest_node_impl(&self, lat: f64, lon: f64, lon_divides: bool) -> (Node, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = earth_distance(lat, lon, best.lat, best.lon);

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < best.lon
        } else {
            lat < best.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
            if is_closer(alt, alt_dist, best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer (or equally close) node is possible in the second branch if and only if
            // the splitting axis is not further away than the current best candidate.
            let dist_to_axis = if lon_divides {
                distance_to_meridian(lat, lon, self.pivot.lon)
            } else {
                earth_distance(lat, lon, self.pivot.lat, lon)
            };

            if dist_to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
                if is_closer(alt, alt_dist, best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        return (best, best_dist);
    }

    /// Builds a k-d tree over all [Nodes](Node) of a [Graph].
    /// Returns `None` if the graph is empty.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        Self::from_iter(g.iter().copied())
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], lon_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    nodes.sort_by(|a, b| a.lon.total_cmp(&b.lon).then(a.id.cmp(&b.id)));
                } else {
                    nodes.sort_by(|a, b| a.lat.total_cmp(&b.lat).then(a.id.cmp(&b.id)));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: box_option(Self::build_impl(left, !lon_divides)),
                    right: box_option(Self::build_impl(right, !lon_divides)),
                })
            }
        }
    }
}

/// Compares two candidates by distance, breaking ties by the smaller node id.
#[inline]
fn is_closer(candidate: Node, candidate_dist: f64, best: Node, best_dist: f64) -> bool {
    candidate_dist < best_dist || (candidate_dist == best_dist && candidate.id < best.id)
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(|thing| Box::new(thing))
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn grid() -> Vec<Node> {
        [
            (1, 0.01, 0.01),
            (2, 0.01, 0.05),
            (3, 0.03, 0.09),
            (4, 0.04, 0.03),
            (5, 0.04, 0.07),
            (6, 0.07, 0.03),
            (7, 0.07, 0.01),
            (8, 0.08, 0.05),
            (9, 0.08, 0.09),
        ]
        .into_iter()
        .map(|(id, lat, lon)| Node { id, lat, lon })
        .collect()
    }

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut grid()).expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.find_nearest_node(0.02, 0.02).id, 1);
        assert_eq!(tree.find_nearest_node(0.05, 0.03).id, 4);
        assert_eq!(tree.find_nearest_node(0.05, 0.08).id, 5);
        assert_eq!(tree.find_nearest_node(0.09, 0.06).id, 8);
    }

    #[test]
    fn kd_tree_empty() {
        assert!(KDTree::build(&mut []).is_none());
        assert!(KDTree::from_graph(&Graph::new()).is_none());
    }

    #[test]
    fn kd_tree_ties_prefer_smallest_id() {
        let tree = KDTree::from_iter([
            Node { id: 9, lat: 0.0, lon: 0.001 },
            Node { id: 4, lat: 0.0, lon: -0.001 },
            Node { id: 6, lat: 0.001, lon: 0.0 },
            Node { id: 2, lat: 0.5, lon: 0.5 },
        ])
        .unwrap();

        assert_eq!(tree.find_nearest_node(0.0, 0.0).id, 4);
    }

    #[test]
    fn kd_tree_agrees_with_linear_scan() {
        let mut g = Graph::new();
        // Reproducible scatter of nodes around a campus
        let mut rng = SmallRng::seed_from_u64(0x2545_f491_4f6c_dd1d);
        for id in 1..=300 {
            let lat = 21.0 + rng.gen_range(0..10_000) as f64 * 1e-6;
            let lon = 105.84 + rng.gen_range(0..10_000) as f64 * 1e-6;
            g.set_node(Node { id, lat, lon });
        }

        let tree = KDTree::from_graph(&g).unwrap();
        for i in 0..50 {
            let lat = 20.999 + i as f64 * 0.00025;
            let lon = 105.8395 + ((i * 37) % 50) as f64 * 0.00025;
            let expected = g.find_nearest_node(lat, lon).unwrap();
            assert_eq!(tree.find_nearest_node(lat, lon).id, expected.id);
        }
    }
}
