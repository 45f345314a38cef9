// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Turn-by-turn narration of [Routes](crate::Route).
//!
//! Every hop of a route is resolved to a street name and a length through an
//! [EdgeMetadata] lookup. Consecutive hops along the same street which don't bend
//! too much are merged into a single segment, and the change of bearing between
//! segments is classified into a [Maneuver].

use std::collections::HashMap;

use crate::{bearing_delta, earth_distance, initial_bearing, Graph, Route};

/// Name used for hops without a known street name.
pub const LOCAL_PATH_LABEL: &str = "local path";

/// Descriptive data about a connection between two nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeInfo {
    /// Name of the street. May be empty.
    pub name: String,

    /// Length of the connection in meters. Non-finite or non-positive
    /// values mean that the length is unknown.
    pub length_m: f64,
}

impl EdgeInfo {
    pub fn new<S: Into<String>>(name: S, length_m: f64) -> Self {
        Self {
            name: name.into(),
            length_m,
        }
    }

    fn known_length(&self) -> Option<f64> {
        if self.length_m.is_finite() && self.length_m > 0.0 {
            Some(self.length_m)
        } else {
            None
        }
    }
}

/// Source of [EdgeInfo] for ordered pairs of nodes.
///
/// If multiple (parallel) edges connect the same two nodes,
/// implementations must return the one with the smallest length.
pub trait EdgeMetadata {
    fn edge_info(&self, from_id: i64, to_id: i64) -> Option<EdgeInfo>;
}

impl<F: Fn(i64, i64) -> Option<EdgeInfo>> EdgeMetadata for F {
    fn edge_info(&self, from_id: i64, to_id: i64) -> Option<EdgeInfo> {
        self(from_id, to_id)
    }
}

/// [EdgeMetadata] which knows nothing; all hops become
/// [LOCAL_PATH_LABEL] with crow-flies lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl EdgeMetadata for NoMetadata {
    fn edge_info(&self, _: i64, _: i64) -> Option<EdgeInfo> {
        None
    }
}

/// In-memory [EdgeMetadata] keyed by ordered node pairs.
/// Only the shortest of multiple parallel edges is retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable(HashMap<(i64, i64), EdgeInfo>);

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records information about an edge. If there already is information about
    /// an edge between the same nodes, the one with the smaller length is kept
    /// (edges with unknown length lose against edges with a known length).
    pub fn insert(&mut self, from_id: i64, to_id: i64, info: EdgeInfo) {
        let new_len = info.known_length().unwrap_or(f64::INFINITY);
        self.0
            .entry((from_id, to_id))
            .and_modify(|existing| {
                if new_len < existing.known_length().unwrap_or(f64::INFINITY) {
                    *existing = info.clone();
                }
            })
            .or_insert(info);
    }

    pub fn get(&self, from_id: i64, to_id: i64) -> Option<&EdgeInfo> {
        self.0.get(&(from_id, to_id))
    }
}

impl EdgeMetadata for MetadataTable {
    fn edge_info(&self, from_id: i64, to_id: i64) -> Option<EdgeInfo> {
        self.get(from_id, to_id).cloned()
    }
}

/// Angle thresholds (in degrees) controlling segment merging and turn classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionOptions {
    /// Consecutive hops along the same street are merged while their bearings
    /// differ by less than this angle.
    pub merge_threshold: f64,

    /// Bearing changes smaller than this are narrated as going straight.
    pub straight_threshold: f64,

    /// Bearing changes smaller than this (but not straight) are slight turns.
    pub slight_threshold: f64,

    /// Bearing changes of at least this angle are U-turns; smaller ones are regular turns.
    pub u_turn_threshold: f64,
}

impl Default for DirectionOptions {
    fn default() -> Self {
        Self {
            merge_threshold: 20.0,
            straight_threshold: 15.0,
            slight_threshold: 45.0,
            u_turn_threshold: 135.0,
        }
    }
}

/// Kind of a single [Step].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maneuver {
    Depart,
    Follow,
    Straight,
    SlightLeft,
    SlightRight,
    Left,
    Right,
    UTurn,
    Arrive,
}

/// A single narrated instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Position of the step in the narration, starting from 1.
    pub ordinal: usize,
    pub maneuver: Maneuver,
    pub text: String,
    /// Distance covered by this step in meters; zero for [Maneuver::Depart] and [Maneuver::Arrive].
    pub distance_m: f64,
}

/// A stretch of a route along a single street.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub(crate) name: String,
    pub(crate) distance_m: f64,
    /// Bearing of the last hop of the segment.
    pub(crate) bearing: f64,
}

/// Narrates a [Route] as a list of turn-by-turn [Steps](Step):
/// a departure from `origin_label`, one step per street segment
/// and an arrival at `dest_label`.
///
/// Routes with fewer than two nodes produce no steps. Missing metadata never
/// causes a failure: unnamed hops become [LOCAL_PATH_LABEL] and unknown lengths
/// are replaced by crow-flies distances.
///
/// # Panics
///
/// Panics if the route refers to nodes which are not in the graph.
pub fn describe_route<M: EdgeMetadata + ?Sized>(
    route: &Route,
    g: &Graph,
    metadata: &M,
    origin_label: &str,
    dest_label: &str,
    options: &DirectionOptions,
) -> Vec<Step> {
    if route.nodes.len() < 2 {
        return vec![];
    }

    let hops = collect_hops(&route.nodes, g, metadata);
    let segments = merge_hops(hops, options);
    narrate(&segments, origin_label, dest_label, options)
}

fn collect_hops<M: EdgeMetadata + ?Sized>(path: &[i64], g: &Graph, metadata: &M) -> Vec<Segment> {
    let mut hops: Vec<Segment> = Vec::with_capacity(path.len().saturating_sub(1));

    // Leading hops between coincident nodes, waiting for a hop with a bearing
    let mut pending: Option<Segment> = None;

    for pair in path.windows(2) {
        let from = g.node(pair[0]);
        let to = g.node(pair[1]);
        let info = metadata.edge_info(from.id, to.id);

        let name = info
            .as_ref()
            .map(|i| i.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(LOCAL_PATH_LABEL)
            .to_string();

        let distance_m = info
            .as_ref()
            .and_then(EdgeInfo::known_length)
            .unwrap_or_else(|| earth_distance(from.lat, from.lon, to.lat, to.lon));

        // Coincident nodes have no bearing between them; such hops
        // only extend the neighboring segment.
        if from.lat == to.lat && from.lon == to.lon {
            if let Some(last) = hops.last_mut() {
                last.distance_m += distance_m;
            } else if let Some(p) = &mut pending {
                p.distance_m += distance_m;
            } else {
                pending = Some(Segment {
                    name,
                    distance_m,
                    bearing: 0.0,
                });
            }
            continue;
        }

        let mut hop = Segment {
            name,
            distance_m,
            bearing: initial_bearing(from.lat, from.lon, to.lat, to.lon),
        };
        if let Some(p) = pending.take() {
            hop.distance_m += p.distance_m;
        }
        hops.push(hop);
    }

    hops.extend(pending);
    hops
}

pub(crate) fn merge_hops(hops: Vec<Segment>, options: &DirectionOptions) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::with_capacity(hops.len());

    for hop in hops {
        if let Some(last) = segments.last_mut() {
            if last.name == hop.name
                && bearing_delta(last.bearing, hop.bearing).abs() < options.merge_threshold
            {
                last.distance_m += hop.distance_m;
                last.bearing = hop.bearing;
                continue;
            }
        }
        segments.push(hop);
    }

    segments
}

/// Classifies a signed bearing change (positive = clockwise) into a [Maneuver].
pub fn classify_turn(delta: f64, options: &DirectionOptions) -> Maneuver {
    let magnitude = delta.abs();
    let right = delta > 0.0;

    if magnitude < options.straight_threshold {
        Maneuver::Straight
    } else if magnitude < options.slight_threshold {
        if right {
            Maneuver::SlightRight
        } else {
            Maneuver::SlightLeft
        }
    } else if magnitude < options.u_turn_threshold {
        if right {
            Maneuver::Right
        } else {
            Maneuver::Left
        }
    } else {
        Maneuver::UTurn
    }
}

fn narrate(
    segments: &[Segment],
    origin_label: &str,
    dest_label: &str,
    options: &DirectionOptions,
) -> Vec<Step> {
    if segments.is_empty() {
        return vec![];
    }

    let mut steps = Vec::with_capacity(segments.len() + 2);
    let mut push = |maneuver: Maneuver, text: String, distance_m: f64| {
        let ordinal = steps.len() + 1;
        steps.push(Step {
            ordinal,
            maneuver,
            text,
            distance_m,
        });
    };

    push(
        Maneuver::Depart,
        format!("Start at {}", label_or(origin_label, "the starting point")),
        0.0,
    );

    let mut previous: Option<&Segment> = None;
    for segment in segments {
        let maneuver = match previous {
            None => Maneuver::Follow,
            Some(prev) => classify_turn(bearing_delta(prev.bearing, segment.bearing), options),
        };

        let name = &segment.name;
        let text = match maneuver {
            Maneuver::Follow => format!("Follow {}", name),
            Maneuver::Straight => format!("Continue straight onto {}", name),
            Maneuver::SlightLeft => format!("Slight left onto {}", name),
            Maneuver::SlightRight => format!("Slight right onto {}", name),
            Maneuver::Left => format!("Turn left onto {}", name),
            Maneuver::Right => format!("Turn right onto {}", name),
            Maneuver::UTurn => format!("Make a U-turn onto {}", name),
            Maneuver::Depart | Maneuver::Arrive => unreachable!("segments are never markers"),
        };

        push(maneuver, text, segment.distance_m);
        previous = Some(segment);
    }

    push(
        Maneuver::Arrive,
        format!("Arrive at {}", label_or(dest_label, "the destination")),
        0.0,
    );

    steps
}

fn label_or<'a>(label: &'a str, fallback: &'a str) -> &'a str {
    let label = label.trim();
    if label.is_empty() {
        fallback
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    fn hop(name: &str, distance_m: f64, bearing: f64) -> Segment {
        Segment {
            name: name.to_string(),
            distance_m,
            bearing,
        }
    }

    #[test]
    fn merge_small_bend() {
        let merged = merge_hops(
            vec![hop("Giải Phóng", 100.0, 0.0), hop("Giải Phóng", 50.0, 5.0)],
            &DirectionOptions::default(),
        );
        assert_eq!(merged, vec![hop("Giải Phóng", 150.0, 5.0)]);
    }

    #[test]
    fn merge_threshold_boundary() {
        let options = DirectionOptions::default();

        let merged = merge_hops(vec![hop("A", 10.0, 0.0), hop("A", 10.0, 19.9)], &options);
        assert_eq!(merged.len(), 1);

        let split = merge_hops(vec![hop("A", 10.0, 0.0), hop("A", 10.0, 20.1)], &options);
        assert_eq!(split.len(), 2);

        let split = merge_hops(vec![hop("A", 10.0, 0.0), hop("A", 10.0, 30.0)], &options);
        assert_eq!(split.len(), 2);

        // Bends are measured across north
        let merged = merge_hops(vec![hop("A", 10.0, 355.0), hop("A", 10.0, 10.0)], &options);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_compares_with_previous_hop() {
        // A gentle curve: every hop bends by 15°, which is merged,
        // even though the overall direction changes by 45°.
        let merged = merge_hops(
            vec![
                hop("A", 10.0, 0.0),
                hop("A", 10.0, 15.0),
                hop("A", 10.0, 30.0),
                hop("A", 10.0, 45.0),
            ],
            &DirectionOptions::default(),
        );
        assert_eq!(merged, vec![hop("A", 40.0, 45.0)]);
    }

    #[test]
    fn different_names_never_merge() {
        let merged = merge_hops(
            vec![hop("A", 10.0, 0.0), hop("B", 10.0, 0.0), hop("A", 10.0, 0.0)],
            &DirectionOptions::default(),
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn turn_classification_boundaries() {
        let o = DirectionOptions::default();
        assert_eq!(classify_turn(0.0, &o), Maneuver::Straight);
        assert_eq!(classify_turn(14.9, &o), Maneuver::Straight);
        assert_eq!(classify_turn(-14.9, &o), Maneuver::Straight);
        assert_eq!(classify_turn(15.1, &o), Maneuver::SlightRight);
        assert_eq!(classify_turn(-15.1, &o), Maneuver::SlightLeft);
        assert_eq!(classify_turn(44.9, &o), Maneuver::SlightRight);
        assert_eq!(classify_turn(45.1, &o), Maneuver::Right);
        assert_eq!(classify_turn(-45.1, &o), Maneuver::Left);
        assert_eq!(classify_turn(134.9, &o), Maneuver::Right);
        assert_eq!(classify_turn(-134.9, &o), Maneuver::Left);
        assert_eq!(classify_turn(135.1, &o), Maneuver::UTurn);
        assert_eq!(classify_turn(-135.1, &o), Maneuver::UTurn);
        assert_eq!(classify_turn(180.0, &o), Maneuver::UTurn);
    }

    #[test]
    fn custom_thresholds() {
        let o = DirectionOptions {
            straight_threshold: 5.0,
            ..DirectionOptions::default()
        };
        assert_eq!(classify_turn(10.0, &o), Maneuver::SlightRight);
    }

    /// 1 → 2 → 3 heads north along "Giải Phóng", then 3 → 4 → 5 heads east along "Đại Cồ Việt".
    fn l_shaped() -> (Graph, MetadataTable, Route) {
        let mut g = Graph::new();
        for &(id, lat, lon) in &[
            (1, 21.000, 105.840),
            (2, 21.001, 105.840),
            (3, 21.002, 105.840),
            (4, 21.002, 105.841),
            (5, 21.002, 105.842),
        ] {
            g.set_node(Node { id, lat, lon });
        }
        for &(from, to) in &[(1, 2), (2, 3), (3, 4), (4, 5)] {
            g.add_edge(from, Edge { to, cost: 0.0 });
        }

        let mut metadata = MetadataTable::new();
        metadata.insert(1, 2, EdgeInfo::new("Giải Phóng", 111.0));
        metadata.insert(2, 3, EdgeInfo::new("Giải Phóng", 112.0));
        metadata.insert(3, 4, EdgeInfo::new("Đại Cồ Việt", 104.0));
        metadata.insert(4, 5, EdgeInfo::new("Đại Cồ Việt", 103.0));

        (g, metadata, Route::new(vec![1, 2, 3, 4, 5], 430.0))
    }

    #[test]
    fn describe_l_shaped_route() {
        let (g, metadata, route) = l_shaped();
        let steps = describe_route(
            &route,
            &g,
            &metadata,
            "Thư viện",
            "Cổng Đại Cồ Việt",
            &DirectionOptions::default(),
        );

        let summary: Vec<_> = steps
            .iter()
            .map(|s| (s.ordinal, s.maneuver, s.text.as_str(), s.distance_m))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, Maneuver::Depart, "Start at Thư viện", 0.0),
                (2, Maneuver::Follow, "Follow Giải Phóng", 223.0),
                (3, Maneuver::Right, "Turn right onto Đại Cồ Việt", 207.0),
                (4, Maneuver::Arrive, "Arrive at Cổng Đại Cồ Việt", 0.0),
            ]
        );
    }

    #[test]
    fn missing_metadata_degrades_gracefully() {
        let (g, _, route) = l_shaped();
        let steps = describe_route(&route, &g, &NoMetadata, "", "", &DirectionOptions::default());

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].text, "Start at the starting point");
        assert_eq!(steps[1].text, "Follow local path");
        assert_eq!(steps[2].text, "Turn right onto local path");
        assert_eq!(steps[3].text, "Arrive at the destination");

        let expected = earth_distance(21.0, 105.84, 21.001, 105.84)
            + earth_distance(21.001, 105.84, 21.002, 105.84);
        assert!((steps[1].distance_m - expected).abs() < 1e-6);
    }

    #[test]
    fn closure_metadata_and_blank_names() {
        let (g, _, route) = l_shaped();
        let lookup = |from: i64, _to: i64| {
            if from <= 2 {
                Some(EdgeInfo::new("  ", 100.0))
            } else {
                Some(EdgeInfo::new("Đại Cồ Việt", f64::NAN))
            }
        };
        let steps = describe_route(&route, &g, &lookup, "A", "B", &DirectionOptions::default());

        assert_eq!(steps[1].text, "Follow local path");
        assert_eq!(steps[1].distance_m, 200.0);
        assert_eq!(steps[2].text, "Turn right onto Đại Cồ Việt");
        assert!(steps[2].distance_m > 200.0 && steps[2].distance_m < 210.0);
    }

    #[test]
    fn u_turn_and_straight_narration() {
        let mut g = Graph::new();
        for &(id, lat, lon) in &[(1, 0.0, 0.0), (2, 0.001, 0.0), (3, 0.002, 0.0), (4, 0.0015, 0.0)] {
            g.set_node(Node { id, lat, lon });
        }
        let lookup = |from: i64, to: i64| match (from, to) {
            (1, 2) => Some(EdgeInfo::new("A", 0.0)),
            (2, 3) => Some(EdgeInfo::new("B", 0.0)),
            _ => Some(EdgeInfo::new("C", 0.0)),
        };
        let route = Route::new(vec![1, 2, 3, 4], 0.0);
        let steps = describe_route(&route, &g, &lookup, "S", "T", &DirectionOptions::default());

        let maneuvers: Vec<_> = steps.iter().map(|s| s.maneuver).collect();
        assert_eq!(
            maneuvers,
            vec![
                Maneuver::Depart,
                Maneuver::Follow,
                Maneuver::Straight,
                Maneuver::UTurn,
                Maneuver::Arrive,
            ]
        );
        assert_eq!(steps[2].text, "Continue straight onto B");
        assert_eq!(steps[3].text, "Make a U-turn onto C");
    }

    #[test]
    fn short_routes_have_no_steps() {
        let (g, metadata, _) = l_shaped();
        let o = DirectionOptions::default();
        assert!(describe_route(&Route::new(vec![1], 0.0), &g, &metadata, "A", "B", &o).is_empty());
        assert!(describe_route(&Route::not_found(), &g, &metadata, "A", "B", &o).is_empty());
    }

    #[test]
    fn table_keeps_shortest_parallel_edge() {
        let mut t = MetadataTable::new();
        t.insert(1, 2, EdgeInfo::new("Long way", 300.0));
        t.insert(1, 2, EdgeInfo::new("Short way", 120.0));
        t.insert(1, 2, EdgeInfo::new("Unknown way", 0.0));
        t.insert(1, 2, EdgeInfo::new("Middle way", 200.0));

        assert_eq!(t.len(), 1);
        assert_eq!(t.edge_info(1, 2), Some(EdgeInfo::new("Short way", 120.0)));
        assert_eq!(t.edge_info(2, 1), None);
    }

    /// 1 → 2 = 3 → 4 heads east along "A", with nodes 2 and 3 at the same position.
    fn straight_with_coincident_nodes() -> Graph {
        let mut g = Graph::new();
        for &(id, lat, lon) in &[
            (1, 21.0, 105.840),
            (2, 21.0, 105.841),
            (3, 21.0, 105.841),
            (4, 21.0, 105.842),
        ] {
            g.set_node(Node { id, lat, lon });
        }
        g
    }

    #[test]
    fn coincident_nodes_do_not_turn() {
        let g = straight_with_coincident_nodes();
        let street_a = |_: i64, _: i64| Some(EdgeInfo::new("A", 0.0));
        let o = DirectionOptions::default();
        let expected = earth_distance(21.0, 105.840, 21.0, 105.842);

        let steps = describe_route(&Route::new(vec![1, 2, 3, 4], 0.0), &g, &street_a, "", "", &o);
        let maneuvers: Vec<Maneuver> = steps.iter().map(|s| s.maneuver).collect();
        assert_eq!(maneuvers, vec![Maneuver::Depart, Maneuver::Follow, Maneuver::Arrive]);
        assert_eq!(steps[1].text, "Follow A");
        assert!((steps[1].distance_m - expected).abs() < 1e-6);

        // Coincident nodes at the start of the route
        let steps = describe_route(&Route::new(vec![2, 3, 4], 0.0), &g, &street_a, "", "", &o);
        assert_eq!(steps.len(), 3);
        assert!((steps[1].distance_m - expected / 2.0).abs() < 0.01);

        // Nothing but coincident nodes
        let steps = describe_route(&Route::new(vec![2, 3], 0.0), &g, &street_a, "", "", &o);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].text, "Follow A");
        assert_eq!(steps[1].distance_m, 0.0);
    }
}
