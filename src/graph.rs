// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Represents a road network as a set of [Nodes](Node)
/// and directed [Edges](Edge) between them.
///
/// Nodes are kept ordered by their id, which makes every iteration
/// (and thus every search over the graph) deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no nodes in the graph.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the total number of edges in the graph, counting parallel edges separately.
    pub fn edge_count(&self) -> usize {
        self.0.values().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter().map(|(_, (node, _))| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Retrieves a [Node] which must exist in the graph.
    ///
    /// # Panics
    ///
    /// Panics if there is no node with the provided id. Referring to unknown
    /// nodes is a logic error of the caller.
    pub fn node(&self, id: i64) -> Node {
        match self.get_node(id) {
            Some(node) => node,
            None => panic!("node {} does not exist in the graph", id),
        }
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved. Moving an existing node
    /// does not recompute the costs of its edges.
    pub fn set_node(&mut self, node: Node) {
        assert_ne!(node.id, 0);

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Deletes a [Node] with a given `id`.
    ///
    /// While all outgoing edges are removed, incoming edges are preserved
    /// (as this would require a walk over all nodes in the graph). Callers
    /// should only delete nodes without incoming edges.
    pub fn delete_node(&mut self, id: i64) {
        self.0.remove(&id);
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs - see [KDTree](crate::KDTree).
    /// If multiple nodes are equally close, the one with the smallest id is returned.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.0
            .values()
            .map(|&(nd, _)| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id,
    /// in the order they were added.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the cost of the cheapest [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.get_edges(from_id)
            .iter()
            .filter(|edge| edge.to == to_id)
            .map(|edge| edge.cost)
            .fold(f64::INFINITY, f64::min)
    }

    /// Adds an [Edge] from a node with a given id. Parallel edges
    /// (with the same `from_id` and `edge.to`) are kept side by side.
    ///
    /// If `edge.cost` is not a finite positive number, it is replaced by the
    /// crow-flies distance between the two nodes.
    ///
    /// Returns `false` (and doesn't add the edge) if either endpoint does not exist.
    pub fn add_edge(&mut self, from_id: i64, mut edge: Edge) -> bool {
        assert_ne!(from_id, 0);
        assert_ne!(edge.to, 0);

        let (from, to) = match (self.get_node(from_id), self.get_node(edge.to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        if !(edge.cost.is_finite() && edge.cost > 0.0) {
            edge.cost = earth_distance(from.lat, from.lon, to.lat, to.lon);
        }

        match self.0.get_mut(&from_id) {
            Some((_, edges)) => {
                edges.push(edge);
                true
            }
            None => false,
        }
    }
}
