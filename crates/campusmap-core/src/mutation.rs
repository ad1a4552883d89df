//! # Graph Manager
//!
//! CRUD over the campus graph. Every operation:
//! - takes the current version by reference and never mutates it
//! - checks its local preconditions and returns a typed `CampusError` on failure
//! - runs the autocomplete pipeline on whatever it creates
//! - returns the next version on success
//!
//! Integrity failures share their codes with the validation rules they
//! prevent (`EI-1`, `EI-2`, `SI-3`).

use crate::autocomplete;
use crate::geometry::polygon_self_intersects;
use crate::graph::CampusGraph;
use crate::{
    BuildingDraft, BuildingId, BuildingPatch, CampusError, Edge, EdgeDraft, EdgeId, EdgePatch,
    EntityKind, FloorDraft, FloorId, FloorPatch, NodeDraft, NodeId, NodePatch, Point, SpaceDraft,
    SpaceId, SpacePatch,
};

/// The GraphManager groups all graph mutations.
///
/// It holds no state; the caller owns the current version and threads it
/// through successive calls.
pub struct GraphManager;

impl GraphManager {
    // =========================================================================
    // NODES
    // =========================================================================

    /// Add a node. Drafts without an id receive a generated one.
    pub fn add_node(graph: &CampusGraph, draft: NodeDraft) -> Result<CampusGraph, CampusError> {
        let id = draft.id.clone().unwrap_or_else(NodeId::generate);
        if graph.nodes.contains_key(&id) {
            return Err(CampusError::DuplicateId(id.to_string()));
        }

        let node = autocomplete::complete_node(graph, draft, id);
        let mut next = graph.clone();
        next.nodes.insert(node.id.clone(), node);
        Ok(next)
    }

    /// Apply a patch to an existing node.
    ///
    /// Incident edges keep their stored distance; moving a node does not
    /// rewrite edges that may carry an explicit length.
    pub fn update_node(
        graph: &CampusGraph,
        id: &NodeId,
        patch: NodePatch,
    ) -> Result<CampusGraph, CampusError> {
        let mut next = graph.clone();
        let node = next
            .nodes
            .get_mut(id)
            .ok_or_else(|| CampusError::not_found(EntityKind::Node, id))?;
        patch.apply(node);
        Ok(next)
    }

    /// Remove a node and every edge incident to it.
    pub fn delete_node(graph: &CampusGraph, id: &NodeId) -> Result<CampusGraph, CampusError> {
        if !graph.nodes.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Node, id));
        }

        let mut next = graph.clone();
        next.nodes.remove(id);
        next.edges.retain(|_, edge| !edge.touches(id));
        Ok(next)
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Add an edge between two existing, distinct nodes.
    pub fn add_edge(graph: &CampusGraph, draft: EdgeDraft) -> Result<CampusGraph, CampusError> {
        let id = draft.id.clone().unwrap_or_else(EdgeId::generate);
        check_endpoints(graph, &id, &draft.source, &draft.target)?;
        if graph.edges.contains_key(&id) {
            return Err(CampusError::DuplicateId(id.to_string()));
        }

        let edge = autocomplete::complete_edge(graph, draft, id);
        let mut next = graph.clone();
        next.edges.insert(edge.id.clone(), edge);
        Ok(next)
    }

    /// Apply a patch to an existing edge.
    ///
    /// A patch that moves an endpoint is re-checked like a new edge, and the
    /// distance is re-derived unless the patch supplies one.
    pub fn update_edge(
        graph: &CampusGraph,
        id: &EdgeId,
        patch: EdgePatch,
    ) -> Result<CampusGraph, CampusError> {
        let current = graph
            .edges
            .get(id)
            .ok_or_else(|| CampusError::not_found(EntityKind::Edge, id))?;

        let moves = patch.moves_endpoint();
        let explicit_distance = patch.distance.is_some();
        let mut edge: Edge = current.clone();
        patch.apply(&mut edge);

        if moves {
            check_endpoints(graph, id, &edge.source, &edge.target)?;
            if !explicit_distance {
                edge.distance = autocomplete::derived_distance(graph, &edge.source, &edge.target);
            }
        }

        let mut next = graph.clone();
        next.edges.insert(id.clone(), edge);
        Ok(next)
    }

    /// Remove an edge.
    pub fn delete_edge(graph: &CampusGraph, id: &EdgeId) -> Result<CampusGraph, CampusError> {
        if !graph.edges.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Edge, id));
        }
        let mut next = graph.clone();
        next.edges.remove(id);
        Ok(next)
    }

    // =========================================================================
    // SPACES
    // =========================================================================

    /// Add a space. Polygons with four or more vertices must be simple.
    pub fn add_space(graph: &CampusGraph, draft: SpaceDraft) -> Result<CampusGraph, CampusError> {
        let id = draft.id.clone().unwrap_or_else(SpaceId::generate);
        if let Some(polygon) = &draft.polygon {
            check_polygon(&id, polygon)?;
        }
        if graph.spaces.contains_key(&id) {
            return Err(CampusError::DuplicateId(id.to_string()));
        }

        let space = autocomplete::complete_space(draft, id);
        let mut next = graph.clone();
        next.spaces.insert(space.id.clone(), space);
        Ok(next)
    }

    /// Apply a patch to an existing space. A replacement polygon must be simple.
    pub fn update_space(
        graph: &CampusGraph,
        id: &SpaceId,
        patch: SpacePatch,
    ) -> Result<CampusGraph, CampusError> {
        if !graph.spaces.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Space, id));
        }
        if let Some(polygon) = &patch.polygon {
            check_polygon(id, polygon)?;
        }

        let mut next = graph.clone();
        if let Some(space) = next.spaces.get_mut(id) {
            patch.apply(space);
        }
        Ok(next)
    }

    /// Remove a space. Nodes anchored to it keep their position.
    pub fn delete_space(graph: &CampusGraph, id: &SpaceId) -> Result<CampusGraph, CampusError> {
        if !graph.spaces.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Space, id));
        }
        let mut next = graph.clone();
        next.spaces.remove(id);
        Ok(next)
    }

    // =========================================================================
    // BUILDINGS
    // =========================================================================

    /// Add a building.
    pub fn add_building(
        graph: &CampusGraph,
        draft: BuildingDraft,
    ) -> Result<CampusGraph, CampusError> {
        let id = draft.id.clone().unwrap_or_else(BuildingId::generate);
        if graph.buildings.contains_key(&id) {
            return Err(CampusError::DuplicateId(id.to_string()));
        }

        let building = autocomplete::complete_building(draft, id);
        let mut next = graph.clone();
        next.buildings.insert(building.id.clone(), building);
        Ok(next)
    }

    /// Apply a patch to an existing building.
    pub fn update_building(
        graph: &CampusGraph,
        id: &BuildingId,
        patch: BuildingPatch,
    ) -> Result<CampusGraph, CampusError> {
        let mut next = graph.clone();
        let building = next
            .buildings
            .get_mut(id)
            .ok_or_else(|| CampusError::not_found(EntityKind::Building, id))?;
        patch.apply(building);
        Ok(next)
    }

    /// Remove a building. Its floors are left for validation to report (`FI-1`).
    pub fn delete_building(
        graph: &CampusGraph,
        id: &BuildingId,
    ) -> Result<CampusGraph, CampusError> {
        if !graph.buildings.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Building, id));
        }
        let mut next = graph.clone();
        next.buildings.remove(id);
        Ok(next)
    }

    // =========================================================================
    // FLOORS
    // =========================================================================

    /// Add a floor to an existing building.
    pub fn add_floor(graph: &CampusGraph, draft: FloorDraft) -> Result<CampusGraph, CampusError> {
        let id = draft.id.clone().unwrap_or_else(FloorId::generate);
        if !graph.buildings.contains_key(&draft.building_id) {
            return Err(CampusError::not_found(
                EntityKind::Building,
                &draft.building_id,
            ));
        }
        if graph.floors.contains_key(&id) {
            return Err(CampusError::DuplicateId(id.to_string()));
        }

        let floor = autocomplete::complete_floor(draft, id);
        let mut next = graph.clone();
        next.floors.insert(floor.id.clone(), floor);
        Ok(next)
    }

    /// Apply a patch to an existing floor. A new building reference must exist.
    pub fn update_floor(
        graph: &CampusGraph,
        id: &FloorId,
        patch: FloorPatch,
    ) -> Result<CampusGraph, CampusError> {
        if !graph.floors.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Floor, id));
        }
        if let Some(building) = &patch.building_id {
            if !graph.buildings.contains_key(building) {
                return Err(CampusError::not_found(EntityKind::Building, building));
            }
        }

        let mut next = graph.clone();
        if let Some(floor) = next.floors.get_mut(id) {
            patch.apply(floor);
        }
        Ok(next)
    }

    /// Remove a floor. Entities placed on it are left for validation to report.
    pub fn delete_floor(graph: &CampusGraph, id: &FloorId) -> Result<CampusGraph, CampusError> {
        if !graph.floors.contains_key(id) {
            return Err(CampusError::not_found(EntityKind::Floor, id));
        }
        let mut next = graph.clone();
        next.floors.remove(id);
        Ok(next)
    }
}

/// Both endpoints exist (`EI-1`) and differ (`EI-2`).
fn check_endpoints(
    graph: &CampusGraph,
    edge: &EdgeId,
    source: &NodeId,
    target: &NodeId,
) -> Result<(), CampusError> {
    for endpoint in [source, target] {
        if !graph.nodes.contains_key(endpoint) {
            return Err(CampusError::MissingEndpoint {
                edge: edge.to_string(),
                node: endpoint.to_string(),
            });
        }
    }
    if source == target {
        return Err(CampusError::SelfLoop(edge.to_string()));
    }
    Ok(())
}

/// Polygon is simple (`SI-3`).
fn check_polygon(space: &SpaceId, polygon: &[Point]) -> Result<(), CampusError> {
    if polygon_self_intersects(polygon) {
        return Err(CampusError::SelfIntersectingPolygon(space.to_string()));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
