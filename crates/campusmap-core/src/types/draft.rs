//! Partial entity inputs.
//!
//! Drafts describe an entity before the autocomplete pipeline has filled in
//! its defaults; they are also the on-disk record shape of the document
//! format, so any field a producer omitted gets the same default on load
//! as on creation. Patches carry the fields an update replaces.

use super::{
    Building, BuildingId, Direction, Edge, EdgeConstraints, EdgeId, Floor, FloorId, Node, NodeId,
    NodeType, Point, Space, SpaceId, SpaceType, VerticalLinks,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// DRAFTS
// =============================================================================

/// A node before autocomplete.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<FloorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_links: Option<VerticalLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<SpaceId>,
}

impl NodeDraft {
    /// Draft with an explicit id and nothing else.
    #[must_use]
    pub fn with_id(id: impl Into<NodeId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    #[must_use]
    pub fn of_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    #[must_use]
    pub fn on_floor(mut self, floor: impl Into<FloorId>) -> Self {
        self.floor_id = Some(floor.into());
        self
    }
}

impl From<&Node> for NodeDraft {
    fn from(node: &Node) -> Self {
        Self {
            id: Some(node.id.clone()),
            floor_id: node.floor_id.clone(),
            position: Some(node.position),
            node_type: Some(node.node_type),
            label: node.label.clone(),
            vertical_links: node.vertical_links.clone(),
            space_id: node.space_id.clone(),
        }
    }
}

/// An edge before autocomplete. Endpoints are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_steps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_outdoor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vertical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<EdgeConstraints>,
}

impl EdgeDraft {
    /// Draft connecting `source` to `target` with every other field defaulted.
    #[must_use]
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            distance: None,
            width: None,
            has_steps: None,
            is_outdoor: None,
            is_vertical: None,
            direction: None,
            estimated_time: None,
            constraints: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<&Edge> for EdgeDraft {
    fn from(edge: &Edge) -> Self {
        Self {
            id: Some(edge.id.clone()),
            source: edge.source.clone(),
            target: edge.target.clone(),
            distance: Some(edge.distance),
            width: edge.width,
            has_steps: Some(edge.has_steps),
            is_outdoor: Some(edge.is_outdoor),
            is_vertical: Some(edge.is_vertical),
            direction: Some(edge.direction),
            estimated_time: edge.estimated_time,
            constraints: Some(edge.constraints.clone()),
        }
    }
}

/// A space before autocomplete.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpaceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<FloorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_type: Option<SpaceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SpaceDraft {
    /// Draft with an explicit id and polygon.
    #[must_use]
    pub fn with_polygon(id: impl Into<SpaceId>, polygon: Vec<Point>) -> Self {
        Self {
            id: Some(id.into()),
            polygon: Some(polygon),
            ..Self::default()
        }
    }
}

impl From<&Space> for SpaceDraft {
    fn from(space: &Space) -> Self {
        Self {
            id: Some(space.id.clone()),
            floor_id: space.floor_id.clone(),
            polygon: Some(space.polygon.clone()),
            name: Some(space.name.clone()),
            space_type: Some(space.space_type),
            manager: space.manager.clone(),
            capacity: space.capacity,
            tags: Some(space.tags.clone()),
            notes: space.notes.clone(),
        }
    }
}

/// A building before autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BuildingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&Building> for BuildingDraft {
    fn from(building: &Building) -> Self {
        Self {
            id: Some(building.id.clone()),
            name: Some(building.name.clone()),
            code: building.code.clone(),
        }
    }
}

/// A floor before autocomplete. The building reference is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FloorId>,
    pub building_id: BuildingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FloorDraft {
    #[must_use]
    pub fn new(building_id: impl Into<BuildingId>, level: i32) -> Self {
        Self {
            id: None,
            building_id: building_id.into(),
            level: Some(level),
            name: None,
        }
    }
}

impl From<&Floor> for FloorDraft {
    fn from(floor: &Floor) -> Self {
        Self {
            id: Some(floor.id.clone()),
            building_id: floor.building_id.clone(),
            level: Some(floor.level),
            name: Some(floor.name.clone()),
        }
    }
}

// =============================================================================
// PATCHES
// =============================================================================
//
// A patch field left out keeps the current value. Optional entity fields
// are doubly wrapped: `Some(None)` (JSON `null`) clears them.

/// Present-but-null deserializes to `Some(None)`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fields replaced by `update_node`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePatch {
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<Option<FloorId>>,
    pub position: Option<Point>,
    pub node_type: Option<NodeType>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub label: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub vertical_links: Option<Option<VerticalLinks>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub space_id: Option<Option<SpaceId>>,
}

impl NodePatch {
    pub(crate) fn apply(self, node: &mut Node) {
        if let Some(floor_id) = self.floor_id {
            node.floor_id = floor_id;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(links) = self.vertical_links {
            node.vertical_links = links;
        }
        if let Some(space_id) = self.space_id {
            node.space_id = space_id;
        }
    }
}

/// Fields replaced by `update_edge`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePatch {
    pub source: Option<NodeId>,
    pub target: Option<NodeId>,
    pub distance: Option<f64>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub width: Option<Option<f64>>,
    pub has_steps: Option<bool>,
    pub is_outdoor: Option<bool>,
    pub is_vertical: Option<bool>,
    pub direction: Option<Direction>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<Option<f64>>,
    pub constraints: Option<EdgeConstraints>,
}

impl EdgePatch {
    /// True when the patch moves either endpoint.
    #[must_use]
    pub fn moves_endpoint(&self) -> bool {
        self.source.is_some() || self.target.is_some()
    }

    pub(crate) fn apply(self, edge: &mut Edge) {
        if let Some(source) = self.source {
            edge.source = source;
        }
        if let Some(target) = self.target {
            edge.target = target;
        }
        if let Some(distance) = self.distance {
            edge.distance = distance;
        }
        if let Some(width) = self.width {
            edge.width = width;
        }
        if let Some(has_steps) = self.has_steps {
            edge.has_steps = has_steps;
        }
        if let Some(is_outdoor) = self.is_outdoor {
            edge.is_outdoor = is_outdoor;
        }
        if let Some(is_vertical) = self.is_vertical {
            edge.is_vertical = is_vertical;
        }
        if let Some(direction) = self.direction {
            edge.direction = direction;
        }
        if let Some(time) = self.estimated_time {
            edge.estimated_time = time;
        }
        if let Some(constraints) = self.constraints {
            edge.constraints = constraints;
        }
    }
}

/// Fields replaced by `update_space`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacePatch {
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<Option<FloorId>>,
    pub polygon: Option<Vec<Point>>,
    pub name: Option<String>,
    pub space_type: Option<SpaceType>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub manager: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Option<u32>>,
    pub tags: Option<BTreeSet<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl SpacePatch {
    pub(crate) fn apply(self, space: &mut Space) {
        if let Some(floor_id) = self.floor_id {
            space.floor_id = floor_id;
        }
        if let Some(polygon) = self.polygon {
            space.polygon = polygon;
        }
        if let Some(name) = self.name {
            space.name = name;
        }
        if let Some(space_type) = self.space_type {
            space.space_type = space_type;
        }
        if let Some(manager) = self.manager {
            space.manager = manager;
        }
        if let Some(capacity) = self.capacity {
            space.capacity = capacity;
        }
        if let Some(tags) = self.tags {
            space.tags = tags;
        }
        if let Some(notes) = self.notes {
            space.notes = notes;
        }
    }
}

/// Fields replaced by `update_building`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub code: Option<Option<String>>,
}

impl BuildingPatch {
    pub(crate) fn apply(self, building: &mut Building) {
        if let Some(name) = self.name {
            building.name = name;
        }
        if let Some(code) = self.code {
            building.code = code;
        }
    }
}

/// Fields replaced by `update_floor`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorPatch {
    pub building_id: Option<BuildingId>,
    pub level: Option<i32>,
    pub name: Option<String>,
}

impl FloorPatch {
    pub(crate) fn apply(self, floor: &mut Floor) {
        if let Some(building_id) = self.building_id {
            floor.building_id = building_id;
        }
        if let Some(level) = self.level {
            floor.level = level;
        }
        if let Some(name) = self.name {
            floor.name = name;
        }
    }
}
