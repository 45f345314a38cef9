// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{earth_distance, AStarError, Edge, Graph, Locate, Route};

#[derive(Debug, Clone, Copy)]
struct FlatQueueItem {
    at: i64,
    parent: i64,
    cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for FlatQueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl PartialOrd for FlatQueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for FlatQueueItem {}

impl Ord for FlatQueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and, among equal scores, earlier insertions)
        // are considered better ("higher"), and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_flat_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    return path;
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// The great-circle distance to the end node is used as the heuristic, so edge costs
/// are expected to be not smaller than the crow-flies distance between their nodes.
///
/// Returns an empty [Route] (with infinite cost) if there is no route between the two nodes,
/// and a single-node [Route] with zero cost if both nodes are the same.
/// Among multiple equally short routes, the one discovered first is returned,
/// which makes the result fully deterministic for a given graph.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [AStarError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT); `usize::MAX` disables the limit.
pub fn search(g: &Graph, from_id: i64, to_id: i64, step_limit: usize) -> Result<Route, AStarError> {
    let to_node = g
        .get_node(to_id)
        .ok_or(AStarError::InvalidReference(to_id))?;

    let from_node = g
        .get_node(from_id)
        .ok_or(AStarError::InvalidReference(from_id))?;

    if from_id == to_id {
        return Ok(Route::new(vec![from_id], 0.0));
    }

    let mut queue: BinaryHeap<FlatQueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut closed: HashSet<i64> = HashSet::default();
    let mut steps: usize = 0;
    let mut seq: u64 = 0;

    queue.push(FlatQueueItem {
        at: from_id,
        parent: 0,
        cost: 0.0,
        score: earth_distance(from_node.lat, from_node.lon, to_node.lat, to_node.lon),
        seq,
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        // The queue may hold multiple items for the same node - only the cheapest one counts.
        if closed.contains(&item.at)
            || item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY)
        {
            continue;
        }

        closed.insert(item.at);
        if item.parent != 0 {
            came_from.insert(item.at, item.parent);
        }

        if item.at == to_id {
            log::debug!(
                "route {} → {} found: {:.1} m after {} steps",
                from_id,
                to_id,
                item.cost,
                steps
            );
            return Ok(Route::new(reconstruct_flat_path(&came_from, to_id), item.cost));
        }

        steps += 1;
        if steps > step_limit {
            return Err(AStarError::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.get_edges(item.at)
        {
            if closed.contains(&neighbor_id) {
                continue;
            }

            // Check if the referred node exists
            if let Some(neighbor) = g.get_node(neighbor_id) {
                // Check if this is the cheapest way to the neighbor
                let neighbor_cost = item.cost + edge_cost;
                if neighbor_cost
                    >= known_costs
                        .get(&neighbor_id)
                        .cloned()
                        .unwrap_or(f64::INFINITY)
                {
                    continue;
                }

                // Push the new item into the queue
                known_costs.insert(neighbor_id, neighbor_cost);
                seq += 1;
                queue.push(FlatQueueItem {
                    at: neighbor_id,
                    parent: item.at,
                    cost: neighbor_cost,
                    score: neighbor_cost
                        + earth_distance(neighbor.lat, neighbor.lon, to_node.lat, to_node.lon),
                    seq,
                });
            }
        }
    }

    log::debug!("no route {} → {} after {} steps", from_id, to_id, steps);
    return Ok(Route::not_found());
}

/// Finds the shortest [Route] between two arbitrary positions, given as `(lat, lon)` pairs.
///
/// Both positions are first snapped to their closest nodes with the provided [Locate]
/// implementation (usually the [Graph] itself or a [KDTree](crate::KDTree) built from it),
/// then [search] is run between them.
pub fn find_route<L: Locate + ?Sized>(
    g: &Graph,
    locator: &L,
    start: (f64, f64),
    goal: (f64, f64),
    step_limit: usize,
) -> Result<Route, AStarError> {
    let start_node = locator
        .locate(start.0, start.1)
        .ok_or(AStarError::EmptyGraph)?;
    let goal_node = locator
        .locate(goal.0, goal.1)
        .ok_or(AStarError::EmptyGraph)?;

    log::debug!(
        "snapped ({}, {}) to node {} and ({}, {}) to node {}",
        start.0,
        start.1,
        start_node.id,
        goal.0,
        goal.1,
        goal_node.id
    );

    search(g, start_node.id, goal_node.id, step_limit)
}
