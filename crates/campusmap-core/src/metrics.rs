//! # Campus Metrics
//!
//! Read-only summary numbers for status displays.

use crate::graph::CampusGraph;
use crate::{BuildingId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate figures describing one graph version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampusMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub space_count: usize,
    pub building_count: usize,
    pub floor_count: usize,
    /// Nodes with no incident edge.
    pub isolated_nodes: usize,
    /// Connected components, treating every edge as undirected.
    pub components: usize,
    /// Sum of edge distances.
    pub total_edge_length: f64,
    /// Floors per known building.
    pub floors_per_building: BTreeMap<BuildingId, usize>,
}

impl CampusMetrics {
    /// Compute metrics from a graph.
    #[must_use]
    pub fn from_graph(graph: &CampusGraph) -> Self {
        let isolated_nodes = graph.degrees().values().filter(|d| **d == 0).count();
        let total_edge_length = graph.edges.values().map(|e| e.distance).sum();
        let floors_per_building = graph
            .buildings
            .keys()
            .map(|id| (id.clone(), graph.floors_of(id).len()))
            .collect();

        Self {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            space_count: graph.spaces.len(),
            building_count: graph.buildings.len(),
            floor_count: graph.floors.len(),
            isolated_nodes,
            components: count_components(graph),
            total_edge_length,
            floors_per_building,
        }
    }
}

/// Components over existing nodes; edges with a missing endpoint are ignored.
fn count_components(graph: &CampusGraph) -> usize {
    let mut adjacency: BTreeMap<&NodeId, Vec<&NodeId>> = BTreeMap::new();
    for edge in graph.edges.values() {
        if graph.nodes.contains_key(&edge.source) && graph.nodes.contains_key(&edge.target) {
            adjacency.entry(&edge.source).or_default().push(&edge.target);
            adjacency.entry(&edge.target).or_default().push(&edge.source);
        }
    }

    let mut seen: BTreeSet<&NodeId> = BTreeSet::new();
    let mut components = 0;
    for start in graph.nodes.keys() {
        if !seen.insert(start) {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for &next in adjacency.get(node).into_iter().flatten() {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
    }
    components
}
