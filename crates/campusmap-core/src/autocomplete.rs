//! # Autocomplete Pipeline
//!
//! Pure functions that turn a draft into a committed entity by filling
//! defaults and derived fields. The same functions run when an entity is
//! created through the manager and when a document is loaded, which is
//! what keeps "omitted on disk" and "omitted at creation" equivalent.
//!
//! | Entity   | Default / derivation                                           |
//! |----------|----------------------------------------------------------------|
//! | Node     | type `other`; position from the anchored space's centroid, else `(0,0)` |
//! | Edge     | distance = Euclidean length between endpoints; flags false; bidirectional |
//! | Space    | type `other`; empty polygon, name and tags                     |
//! | Building | name = id                                                      |
//! | Floor    | level 0; name `"Level <n>"`                                    |

use crate::graph::CampusGraph;
use crate::{
    Building, BuildingDraft, BuildingId, Edge, EdgeDraft, EdgeId, Floor, FloorDraft, FloorId,
    Node, NodeDraft, NodeId, Point, Space, SpaceDraft, SpaceId,
};

/// Complete a node draft.
///
/// `graph` is consulted only to resolve the centroid of the space the node
/// is anchored to.
#[must_use]
pub fn complete_node(graph: &CampusGraph, draft: NodeDraft, id: NodeId) -> Node {
    let position = draft
        .position
        .or_else(|| anchored_position(graph, draft.space_id.as_ref()))
        .unwrap_or(Point::ORIGIN);

    Node {
        id,
        floor_id: draft.floor_id,
        position,
        node_type: draft.node_type.unwrap_or_default(),
        label: draft.label,
        vertical_links: draft.vertical_links,
        space_id: draft.space_id,
    }
}

fn anchored_position(graph: &CampusGraph, space: Option<&SpaceId>) -> Option<Point> {
    graph.spaces.get(space?)?.centroid()
}

/// Complete an edge draft.
///
/// The distance is derived only when the draft does not supply one; an
/// endpoint that does not exist contributes a length of zero.
#[must_use]
pub fn complete_edge(graph: &CampusGraph, draft: EdgeDraft, id: EdgeId) -> Edge {
    let distance = draft
        .distance
        .unwrap_or_else(|| derived_distance(graph, &draft.source, &draft.target));

    Edge {
        id,
        source: draft.source,
        target: draft.target,
        distance,
        width: draft.width,
        has_steps: draft.has_steps.unwrap_or(false),
        is_outdoor: draft.is_outdoor.unwrap_or(false),
        is_vertical: draft.is_vertical.unwrap_or(false),
        direction: draft.direction.unwrap_or_default(),
        estimated_time: draft.estimated_time,
        constraints: draft.constraints.unwrap_or_default(),
    }
}

/// Euclidean length between two nodes, 0 when either is missing.
#[must_use]
pub fn derived_distance(graph: &CampusGraph, source: &NodeId, target: &NodeId) -> f64 {
    graph.node_distance(source, target).unwrap_or(0.0)
}

/// Complete a space draft.
#[must_use]
pub fn complete_space(draft: SpaceDraft, id: SpaceId) -> Space {
    Space {
        id,
        floor_id: draft.floor_id,
        polygon: draft.polygon.unwrap_or_default(),
        name: draft.name.unwrap_or_default(),
        space_type: draft.space_type.unwrap_or_default(),
        manager: draft.manager,
        capacity: draft.capacity,
        tags: draft.tags.unwrap_or_default(),
        notes: draft.notes,
    }
}

/// Complete a building draft.
#[must_use]
pub fn complete_building(draft: BuildingDraft, id: BuildingId) -> Building {
    let name = draft.name.unwrap_or_else(|| id.to_string());
    Building {
        id,
        name,
        code: draft.code,
    }
}

/// Complete a floor draft.
#[must_use]
pub fn complete_floor(draft: FloorDraft, id: FloorId) -> Floor {
    let level = draft.level.unwrap_or(0);
    Floor {
        id,
        building_id: draft.building_id,
        level,
        name: draft.name.unwrap_or_else(|| format!("Level {}", level)),
    }
}
