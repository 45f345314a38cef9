// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Graph;

/// Result of a route search: an ordered sequence of node ids from the start
/// to the end (both inclusive), and the total cost of the route in meters.
///
/// A route which was not found has no nodes and an infinite cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<i64>,
    pub cost: f64,
}

impl Route {
    pub fn new(nodes: Vec<i64>, cost: f64) -> Self {
        Self { nodes, cost }
    }

    /// Creates an empty route, signifying that the end is unreachable from the start.
    pub fn not_found() -> Self {
        Self {
            nodes: Vec::default(),
            cost: f64::INFINITY,
        }
    }

    /// Returns `true` if this route connects the start and end nodes.
    pub fn is_found(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Returns the `(lat, lon)` positions of all nodes on the route, suitable for drawing a polyline.
    ///
    /// # Panics
    ///
    /// Panics if the route refers to nodes which are not in the graph.
    pub fn coordinates(&self, g: &Graph) -> Vec<(f64, f64)> {
        self.nodes
            .iter()
            .map(|&id| {
                let nd = g.node(id);
                (nd.lat, nd.lon)
            })
            .collect()
    }

    /// Returns how many times longer the route is than the straight-line distance
    /// between its endpoints. Returns `None` for routes which were not found,
    /// or if the straight-line distance is zero.
    pub fn detour_ratio(&self, straight_line_m: f64) -> Option<f64> {
        if self.is_found() && straight_line_m > 0.0 {
            Some(self.cost / straight_line_m)
        } else {
            None
        }
    }
}

/// Means of transport used for estimating travel times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Walk,
    Bicycle,
    Motorbike,
}

impl TravelMode {
    /// Average speed used for travel time estimates, in kilometers per hour.
    pub fn speed_kmh(self) -> f64 {
        match self {
            Self::Walk => 4.5,
            Self::Bicycle => 12.0,
            Self::Motorbike => 25.0,
        }
    }

    /// Estimates the time needed to cover `distance_m` meters, in minutes.
    pub fn estimate_minutes(self, distance_m: f64) -> f64 {
        (distance_m / 1000.0) / self.speed_kmh() * 60.0
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Walk => write!(f, "walk"),
            Self::Bicycle => write!(f, "bicycle"),
            Self::Motorbike => write!(f, "motorbike"),
        }
    }
}

/// Parses a position written as two decimal numbers (latitude first),
/// separated by a comma and/or whitespace, e.g. `"21.0037, 105.8454"` or `"21.0037 105.8454"`.
///
/// Returns `None` if the text is not such a pair, or if the numbers are out of range.
pub fn parse_lat_lon(s: &str) -> Option<(f64, f64)> {
    let mut parts = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let lat: f64 = parts.next()?.parse().ok()?;
    let lon: f64 = parts.next()?.parse().ok()?;

    if parts.next().is_some() || s.matches(',').count() > 1 {
        return None;
    }

    if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0 {
        Some((lat, lon))
    } else {
        None
    }
}
