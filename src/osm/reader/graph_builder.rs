// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::directions::{EdgeInfo, MetadataTable};
use crate::osm::profile::street_name;
use crate::{earth_distance, Edge, Graph, Node};

use super::{model, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [Graph] and its [MetadataTable].
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    metadata: &'a mut MetadataTable,
    options: &'a Options<'a>,
    unused_nodes: HashSet<i64>,
    ignore_bbox: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new graph builder, adding features to the provided [Graph] and [MetadataTable].
    pub(super) fn new(
        g: &'a mut Graph,
        metadata: &'a mut MetadataTable,
        options: &'a Options<'a>,
    ) -> Self {
        let all_zero = options.bbox.iter().all(|&x| x == 0.0);
        let any_invalid = options.bbox.iter().any(|x| !x.is_finite());
        if any_invalid {
            log::warn!("ignoring invalid bounding box {:?}", options.bbox);
        }

        Self {
            g,
            metadata,
            options,
            unused_nodes: HashSet::default(),
            ignore_bbox: all_zero || any_invalid,
        }
    }

    /// Add all features from the provided iterator.
    pub(super) fn add_features<E, I: Iterator<Item = Result<model::Feature, E>>>(
        &mut self,
        features: I,
    ) -> Result<(), E> {
        for f in features {
            self.add_feature(f?);
        }
        self.cleanup();
        Ok(())
    }

    fn cleanup(&mut self) {
        log::debug!("removing {} nodes outside of routable ways", self.unused_nodes.len());
        self.unused_nodes
            .iter()
            .for_each(|&id| self.g.delete_node(id));
    }

    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: Node) {
        if self.is_in_bbox(n.lat, n.lon) {
            self.g.set_node(n);
            self.unused_nodes.insert(n.id);
        }
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) {
        if !self.options.profile.is_routable(&w.tags) {
            return;
        }

        let runs = self.get_way_runs(&w);
        if runs.is_empty() {
            return;
        }

        let (forward, backward) = self.options.profile.way_direction(&w.tags);
        if !forward && !backward {
            return;
        }

        let name = street_name(&w.tags).to_string();
        for run in &runs {
            self.create_edges(run, &name, forward, backward);
            run.iter().for_each(|node_id| {
                self.unused_nodes.remove(node_id);
            });
        }
    }

    /// Splits the nodes of a way into runs of consecutive known nodes,
    /// dropping runs too short to form an edge. Unknown nodes (outside of the
    /// bounding box or missing from the file) break the way apart.
    fn get_way_runs(&self, w: &model::Way) -> Vec<Vec<i64>> {
        let runs: Vec<Vec<i64>> = w
            .nodes
            .split(|&node_id| self.g.get_node(node_id).is_none())
            .filter(|run| run.len() >= 2)
            .map(|run| run.to_vec())
            .collect();

        if runs.is_empty() {
            log::debug!("skipping way {}: fewer than 2 consecutive known nodes", w.id);
        }
        runs
    }

    fn create_edges(&mut self, nodes: &[i64], name: &str, forward: bool, backward: bool) {
        debug_assert!(nodes.len() >= 2);
        debug_assert!(forward || backward);

        for pair in nodes.windows(2) {
            let (left, right) = match (self.g.get_node(pair[0]), self.g.get_node(pair[1])) {
                (Some(left), Some(right)) => (left, right),
                _ => continue,
            };

            if left.id == right.id {
                continue;
            }

            let length = earth_distance(left.lat, left.lon, right.lat, right.lon);

            if forward {
                self.add_edge(left.id, right.id, length, name);
            }
            if backward {
                self.add_edge(right.id, left.id, length, name);
            }
        }
    }

    fn add_edge(&mut self, from_id: i64, to_id: i64, length: f64, name: &str) {
        if self.g.add_edge(from_id, Edge { to: to_id, cost: length }) {
            self.metadata
                .insert(from_id, to_id, EdgeInfo::new(name, length));
        }
    }
}
