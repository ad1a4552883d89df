//! # Campus Graph
//!
//! The aggregate root of the model. Five ordered mappings from id to entity;
//! entities refer to each other by id only.
//!
//! All data structures use `BTreeMap` so that iteration, validation output
//! and saved documents come out in the same order on every run.

use crate::{
    Building, BuildingId, Edge, EdgeId, EntityKind, Floor, FloorId, Node, NodeId, Space, SpaceId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One version of the campus graph.
///
/// Values are never mutated once handed out by the manager: every
/// mutation clones the graph and returns the modified copy. The maps are
/// public so that readers can iterate freely; writers should go through
/// [`crate::GraphManager`] so that preconditions and autocomplete apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampusGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: BTreeMap<EdgeId, Edge>,
    pub spaces: BTreeMap<SpaceId, Space>,
    pub buildings: BTreeMap<BuildingId, Building>,
    pub floors: BTreeMap<FloorId, Floor>,
}

impl CampusGraph {
    /// Create the empty graph: all five mappings empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the graph holds no entity of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.edges.is_empty()
            && self.spaces.is_empty()
            && self.buildings.is_empty()
            && self.floors.is_empty()
    }

    /// Number of entities of the given kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Node => self.nodes.len(),
            EntityKind::Edge => self.edges.len(),
            EntityKind::Space => self.spaces.len(),
            EntityKind::Building => self.buildings.len(),
            EntityKind::Floor => self.floors.len(),
        }
    }

    /// Whether an entity of `kind` with this id exists.
    #[must_use]
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Node => self.nodes.contains_key(&NodeId::from(id)),
            EntityKind::Edge => self.edges.contains_key(&EdgeId::from(id)),
            EntityKind::Space => self.spaces.contains_key(&SpaceId::from(id)),
            EntityKind::Building => self.buildings.contains_key(&BuildingId::from(id)),
            EntityKind::Floor => self.floors.contains_key(&FloorId::from(id)),
        }
    }

    /// Edges with `node` as source or target, in edge-id order.
    pub fn incident_edges<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |edge| edge.touches(node))
    }

    /// Number of incident edges per node. Nodes without edges map to 0.
    ///
    /// Edges whose endpoints are missing still count for the endpoint that
    /// exists; a self-loop counts once.
    #[must_use]
    pub fn degrees(&self) -> BTreeMap<&NodeId, usize> {
        let mut degrees: BTreeMap<&NodeId, usize> = self.nodes.keys().map(|id| (id, 0)).collect();
        for edge in self.edges.values() {
            if let Some(d) = degrees.get_mut(&edge.source) {
                *d = d.saturating_add(1);
            }
            if edge.target != edge.source {
                if let Some(d) = degrees.get_mut(&edge.target) {
                    *d = d.saturating_add(1);
                }
            }
        }
        degrees
    }

    /// Floors of a building ordered by level.
    #[must_use]
    pub fn floors_of(&self, building: &BuildingId) -> Vec<&Floor> {
        let mut floors: Vec<&Floor> = self
            .floors
            .values()
            .filter(|f| &f.building_id == building)
            .collect();
        floors.sort_by_key(|f| f.level);
        floors
    }

    /// Nodes placed on the given floor.
    pub fn nodes_on<'a>(&'a self, floor: &'a FloorId) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |n| n.floor_id.as_ref() == Some(floor))
    }

    /// Euclidean distance between two nodes, `None` if either is missing.
    #[must_use]
    pub fn node_distance(&self, a: &NodeId, b: &NodeId) -> Option<f64> {
        let a = self.nodes.get(a)?;
        let b = self.nodes.get(b)?;
        Some(a.position.distance_to(b.position))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeDraft, FloorDraft, GraphManager, NodeDraft};

    fn line_graph() -> CampusGraph {
        let g = CampusGraph::new();
        let g = GraphManager::add_node(&g, NodeDraft::with_id("a").at(0.0, 0.0)).expect("a");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("b").at(3.0, 4.0)).expect("b");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("c").at(6.0, 8.0)).expect("c");
        let g = GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("ab")).expect("ab");
        GraphManager::add_edge(&g, EdgeDraft::new("b", "c").with_id("bc")).expect("bc")
    }

    #[test]
    fn empty_graph_has_nothing() {
        let g = CampusGraph::new();
        assert!(g.is_empty());
        for kind in [
            EntityKind::Node,
            EntityKind::Edge,
            EntityKind::Space,
            EntityKind::Building,
            EntityKind::Floor,
        ] {
            assert_eq!(g.count(kind), 0);
        }
    }

    #[test]
    fn degrees_count_incident_edges() {
        let g = line_graph();
        let degrees = g.degrees();
        assert_eq!(degrees[&NodeId::new("a")], 1);
        assert_eq!(degrees[&NodeId::new("b")], 2);
        assert_eq!(degrees[&NodeId::new("c")], 1);
    }

    #[test]
    fn incident_edges_in_id_order() {
        let g = line_graph();
        let b = NodeId::new("b");
        let ids: Vec<&str> = g.incident_edges(&b).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ab", "bc"]);
    }

    #[test]
    fn contains_by_kind() {
        let g = line_graph();
        assert!(g.contains(EntityKind::Node, "a"));
        assert!(g.contains(EntityKind::Edge, "ab"));
        assert!(!g.contains(EntityKind::Edge, "a"));
    }

    #[test]
    fn floors_sorted_by_level() {
        let g = CampusGraph::new();
        let g = GraphManager::add_building(
            &g,
            crate::BuildingDraft {
                id: Some("main".into()),
                ..Default::default()
            },
        )
        .expect("building");
        let mut upper = FloorDraft::new("main", 2);
        upper.id = Some("f2".into());
        let mut basement = FloorDraft::new("main", -1);
        basement.id = Some("b1".into());
        let g = GraphManager::add_floor(&g, upper).expect("f2");
        let g = GraphManager::add_floor(&g, basement).expect("b1");

        let levels: Vec<i32> = g
            .floors_of(&BuildingId::new("main"))
            .iter()
            .map(|f| f.level)
            .collect();
        assert_eq!(levels, vec![-1, 2]);
    }

    #[test]
    fn node_distance_between_positions() {
        let g = line_graph();
        let d = g
            .node_distance(&NodeId::new("a"), &NodeId::new("c"))
            .expect("both exist");
        assert!((d - 10.0).abs() < 1e-12);
        assert_eq!(g.node_distance(&NodeId::new("a"), &NodeId::new("zz")), None);
    }
}
