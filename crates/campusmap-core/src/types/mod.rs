//! # Core Type Definitions
//!
//! This module contains the entity types of the campus graph:
//! - Kind-tagged string identifiers (`NodeId`, `EdgeId`, `SpaceId`, `BuildingId`, `FloorId`)
//! - Geometry primitive (`Point`)
//! - Committed entities (`Node`, `Edge`, `Space`, `Building`, `Floor`)
//! - Partial inputs (`draft` submodule): drafts for creation, patches for updates
//! - Error types (`CampusError`)
//!
//! Entities reference each other only by identifier. Collections use
//! `BTreeSet` so that serialized output is stable across runs.

mod draft;

pub use draft::{
    BuildingDraft, BuildingPatch, EdgeDraft, EdgePatch, FloorDraft, FloorPatch, NodeDraft,
    NodePatch, SpaceDraft, SpacePatch,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// The five entity kinds owned by a `CampusGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Edge,
    Space,
    Building,
    Floor,
}

impl EntityKind {
    /// Prefix used when generating identifiers of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Space => "space",
            EntityKind::Building => "building",
            EntityKind::Floor => "floor",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing identifier string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, process-unique identifier of this kind.
            #[must_use]
            pub fn generate() -> Self {
                Self(crate::ids::generate_id($kind))
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Identifier of a traversal node.
    NodeId => EntityKind::Node
}

string_id! {
    /// Identifier of a traversal edge.
    EdgeId => EntityKind::Edge
}

string_id! {
    /// Identifier of a bounded area.
    SpaceId => EntityKind::Space
}

string_id! {
    /// Identifier of a building.
    BuildingId => EntityKind::Building
}

string_id! {
    /// Identifier of a floor.
    FloorId => EntityKind::Floor
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in floor-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The floor origin `(0, 0)`.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Semantic type of a traversal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Room,
    CorridorJunction,
    Staircase,
    Elevator,
    Entrance,
    OutdoorPoint,
    #[default]
    Other,
}

/// Links from a node to its counterparts on the floors above and below.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerticalLinks {
    #[serde(default)]
    pub above: Option<NodeId>,
    #[serde(default)]
    pub below: Option<NodeId>,
}

impl VerticalLinks {
    /// True when neither direction is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.above.is_none() && self.below.is_none()
    }
}

/// A point-like traversal location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub floor_id: Option<FloorId>,
    pub position: Point,
    pub node_type: NodeType,
    pub label: Option<String>,
    pub vertical_links: Option<VerticalLinks>,
    /// The space this node stands for, if any.
    pub space_id: Option<SpaceId>,
}

impl Node {
    /// True when the node has at least one vertical link.
    #[must_use]
    pub fn has_vertical_link(&self) -> bool {
        self.vertical_links.as_ref().is_some_and(|l| !l.is_empty())
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// Which way an edge may be walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Bidirectional,
    /// Source to target only.
    Forward,
    /// Target to source only.
    Backward,
}

impl Direction {
    /// Whether travel from source to target is allowed.
    #[must_use]
    pub const fn allows_forward(self) -> bool {
        matches!(self, Direction::Bidirectional | Direction::Forward)
    }

    /// Whether travel from target to source is allowed.
    #[must_use]
    pub const fn allows_backward(self) -> bool {
        matches!(self, Direction::Bidirectional | Direction::Backward)
    }
}

/// Physical limits of a passage. `None` means unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Traversal restrictions carried by an edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeConstraints {
    /// Largest width/height/weight the passage admits.
    #[serde(default)]
    pub max: Limits,
    /// Capability tags a traveller must hold (e.g. `"staff_key"`).
    #[serde(default)]
    pub requires: BTreeSet<String>,
    /// Directed `(from, to)` pairs that may not be walked.
    #[serde(default)]
    pub blocked: BTreeSet<(NodeId, NodeId)>,
}

impl EdgeConstraints {
    /// True when the constraints restrict nothing.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.max == Limits::default() && self.requires.is_empty() && self.blocked.is_empty()
    }
}

/// A traversal connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub distance: f64,
    pub width: Option<f64>,
    pub has_steps: bool,
    pub is_outdoor: bool,
    pub is_vertical: bool,
    pub direction: Direction,
    /// Walking time in seconds; derived from distance when absent.
    pub estimated_time: Option<f64>,
    pub constraints: EdgeConstraints,
}

impl Edge {
    /// True when `node` is either endpoint.
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// The endpoints ordered so that `(a, b)` and `(b, a)` compare equal.
    #[must_use]
    pub fn unordered_pair(&self) -> (&NodeId, &NodeId) {
        if self.source <= self.target {
            (&self.source, &self.target)
        } else {
            (&self.target, &self.source)
        }
    }

    /// Effective width limit: the declared maximum, else the physical width.
    #[must_use]
    pub fn max_width(&self) -> Option<f64> {
        self.constraints.max.width.or(self.width)
    }
}

// =============================================================================
// SPACE
// =============================================================================

/// Semantic type of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    Classroom,
    Lab,
    Office,
    Corridor,
    Stairwell,
    Restroom,
    Storage,
    Common,
    Outdoor,
    #[default]
    Other,
}

/// A bounded area on a floor. The polygon is implicitly closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub floor_id: Option<FloorId>,
    pub polygon: Vec<Point>,
    pub name: String,
    pub space_type: SpaceType,
    pub manager: Option<String>,
    pub capacity: Option<u32>,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
}

impl Space {
    /// Area centroid of the polygon, if it has any vertices.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        crate::geometry::centroid(&self.polygon)
    }
}

// =============================================================================
// BUILDING & FLOOR
// =============================================================================

/// A campus building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    /// Short code shown on signage (e.g. `"ENG"`).
    pub code: Option<String>,
}

/// A floor of a building. Level 0 is ground, negative levels are basements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub building_id: BuildingId,
    pub level: i32,
    pub name: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in campusmap.
///
/// Manager errors are local-precondition failures: the caller recovers by
/// correcting the input. Validation findings are never reported through
/// this type; see `validation::ValidationReport`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CampusError {
    /// An entity with this id already exists.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// The referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// An edge endpoint is not a node of the graph.
    #[error("Edge {edge} references missing node {node}")]
    MissingEndpoint { edge: String, node: String },

    /// An edge connects a node to itself.
    #[error("Edge {0} connects a node to itself")]
    SelfLoop(String),

    /// A space polygon crosses itself.
    #[error("Space {0} has a self-intersecting polygon")]
    SelfIntersectingPolygon(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A document or snapshot could not be decoded.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration file is unreadable or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CampusError {
    /// Stable machine-checkable code.
    ///
    /// Integrity failures share their code with the matching validation rule.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            CampusError::DuplicateId(_) => "DuplicateId",
            CampusError::NotFound { .. } => "NotFound",
            CampusError::MissingEndpoint { .. } => "EI-1",
            CampusError::SelfLoop(_) => "EI-2",
            CampusError::SelfIntersectingPolygon(_) => "SI-3",
            CampusError::SerializationError(_) => "SerializationError",
            CampusError::DeserializationError(_) => "DeserializationError",
            CampusError::IoError(_) => "IoError",
            CampusError::ConfigError(_) => "ConfigError",
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        CampusError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
