// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! A* routing and turn-by-turn directions over small [OpenStreetMap](https://www.openstreetmap.org/)
//! networks.
//!
//! A road network is held as a weighted directed [Graph] with costs in meters.
//! Arbitrary positions are snapped to the closest [Node] with a [Locate] implementation
//! (a linear scan over the [Graph], or a [KDTree] for larger networks), the shortest path
//! between them is found with [A*](crate::search), and the resulting [Route] can be narrated
//! as a list of [directions](crate::directions::describe_route).
//!
//! # Example
//!
//! ```no_run
//! let options = streetwise::osm::Options {
//!     profile: &streetwise::osm::FOOT_PROFILE,
//!     file_format: streetwise::osm::FileFormat::Xml,
//!     bbox: [0.0; 4],
//! };
//! let network = streetwise::osm::load_file(&options, "path/to/campus.osm")
//!     .expect("failed to load campus.osm");
//!
//! let route = streetwise::find_route(
//!     &network.graph,
//!     &network.graph,
//!     (21.0037, 105.8454),
//!     (21.0055, 105.8490),
//!     streetwise::DEFAULT_STEP_LIMIT,
//! )
//! .expect("failed to find route");
//!
//! let steps = streetwise::directions::describe_route(
//!     &route,
//!     &network.graph,
//!     &network.metadata,
//!     "Library",
//!     "Main gate",
//!     &streetwise::directions::DirectionOptions::default(),
//! );
//! for step in steps {
//!     println!("{}. {} ({:.0} m)", step.ordinal, step.text, step.distance_m);
//! }
//! ```

mod astar;
pub mod directions;
mod distance;
mod graph;
mod kd;
pub mod osm;
mod route;

pub use astar::{find_route, search, AStarError, DEFAULT_STEP_LIMIT};
pub use distance::{
    bearing_delta, distance_to_meridian, earth_distance, initial_bearing, normalize_bearing,
    EARTH_RADIUS,
};
pub use graph::Graph;
pub use kd::KDTree;
pub use route::{parse_lat_lon, Route, TravelMode};

/// Represents an element of the [Graph]: a point of the road network.
///
/// Nodes with `id == 0` are disallowed, as zero is used to signify absence of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// `cost` is the length of the connection in meters, and must be finite and not negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub cost: f64,
}

/// Resolves arbitrary positions to the closest [Node] of a network.
///
/// Implementations must agree on the result: the node with the smallest [earth_distance]
/// to the position, with ties broken in favor of the smallest node id.
pub trait Locate {
    /// Finds the closest [Node] to the given position,
    /// or returns `None` if there are no nodes to choose from.
    fn locate(&self, lat: f64, lon: f64) -> Option<Node>;
}

impl Locate for Graph {
    fn locate(&self, lat: f64, lon: f64) -> Option<Node> {
        self.find_nearest_node(lat, lon)
    }
}

impl Locate for KDTree {
    fn locate(&self, lat: f64, lon: f64) -> Option<Node> {
        Some(self.find_nearest_node(lat, lon))
    }
}
