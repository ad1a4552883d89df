//! # campusmap-core
//!
//! The campus spatial graph engine.
//!
//! This crate holds the normalized model of a multi-building, multi-floor
//! campus (buildings, floors, spaces, traversal nodes and edges) and the
//! pure operations over it:
//! - `mutation`: the Graph Manager, CRUD that returns new graph versions
//! - `autocomplete`: defaults and derived fields for new entities
//! - `validation`: the rule table and full-graph integrity report
//! - `routing`: constraint-filtered shortest paths
//! - `snap`: cursor resolution against nearby geometry
//! - `formats`: JSON documents and binary snapshots
//!
//! ## Architectural Constraints
//!
//! - Every operation is synchronous and side-effect-free
//! - A graph value is never mutated after the manager hands it out
//! - No I/O, no logging, no async: the app layer owns all of those
//! - All maps are `BTreeMap`, so output order is stable run to run

// =============================================================================
// MODULES
// =============================================================================

pub mod autocomplete;
pub mod formats;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod metrics;
pub mod mutation;
pub mod primitives;
pub mod routing;
pub mod snap;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Building, BuildingDraft, BuildingId, BuildingPatch, CampusError, Direction, Edge,
    EdgeConstraints, EdgeDraft, EdgeId, EdgePatch, EntityKind, Floor, FloorDraft, FloorId,
    FloorPatch, Limits, Node, NodeDraft, NodeId, NodePatch, NodeType, Point, Space, SpaceDraft,
    SpaceId, SpacePatch, SpaceType, VerticalLinks,
};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use graph::CampusGraph;
pub use metrics::CampusMetrics;
pub use mutation::GraphManager;
pub use routing::{Optimize, Route, RouteRequest, UserConstraints, find_route, is_traversable};
pub use snap::{
    GuideLine, SnapConfig, SnapContext, SnapKind, SnapResult, SnapSegment, SnapTarget,
    SnapVertex, find_snap,
};
pub use validation::{Issue, RULES, Severity, Summary, ValidationReport, is_valid, validate};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{CampusDocument, Format, decode, encode, graph_from_bytes, graph_to_bytes};
