//! # Snap Engine
//!
//! Resolves a raw cursor position against nearby geometry. Candidates are
//! tried in a fixed priority order and the first that qualifies wins,
//! regardless of how close a later candidate might be:
//!
//! 1. `Vertex`: a node position or polygon corner
//! 2. `Edge`: the nearest point on a polygon side
//! 3. `Orthogonal`: axis-aligned with the previous point
//! 4. `Grid`: nearest grid intersection
//! 5. `Free`: the cursor itself
//!
//! The engine never touches the graph; [`SnapContext::from_graph`] copies
//! out the geometry it needs.

use crate::geometry::{closest_point_on_segment, polygon_segments};
use crate::graph::CampusGraph;
use crate::primitives::{
    DEFAULT_EDGE_THRESHOLD, DEFAULT_GRID_SIZE, DEFAULT_ORTHOGONAL_THRESHOLD,
    DEFAULT_VERTEX_THRESHOLD,
};
use crate::{FloorId, NodeId, Point, SpaceId};
use serde::{Deserialize, Serialize};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Snap radii and grid settings, in floor units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub vertex_threshold: f64,
    pub edge_threshold: f64,
    pub orthogonal_threshold: f64,
    pub grid_enabled: bool,
    pub grid_size: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            vertex_threshold: DEFAULT_VERTEX_THRESHOLD,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            orthogonal_threshold: DEFAULT_ORTHOGONAL_THRESHOLD,
            grid_enabled: false,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Which candidate produced the snapped position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapKind {
    Vertex,
    Edge,
    Orthogonal,
    Grid,
    Free,
}

/// The geometry a snap attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapTarget {
    Node { node_id: NodeId },
    /// Corner `index` of a space polygon.
    SpaceVertex { space_id: SpaceId, index: usize },
    /// Side `index` of a space polygon (from vertex `index` to the next).
    SpaceEdge { space_id: SpaceId, index: usize },
}

/// Visual hint from the previous point to an orthogonal snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub from: Point,
    pub to: Point,
}

/// Outcome of [`find_snap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    pub kind: SnapKind,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<SnapTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_line: Option<GuideLine>,
}

impl SnapResult {
    fn at(kind: SnapKind, position: Point) -> Self {
        Self {
            kind,
            position,
            target: None,
            guide_line: None,
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// A snappable point.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapVertex {
    pub position: Point,
    pub target: SnapTarget,
}

/// A snappable segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapSegment {
    pub start: Point,
    pub end: Point,
    pub target: SnapTarget,
}

/// Geometry near the cursor, plus the previously placed point if any.
///
/// Candidates are scanned in insertion order; on equal distance the
/// earlier one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapContext {
    pub vertices: Vec<SnapVertex>,
    pub segments: Vec<SnapSegment>,
    pub previous: Option<Point>,
}

impl SnapContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect node positions, polygon corners and polygon sides from a graph.
    ///
    /// With `floor`, only entities placed on that floor are collected.
    /// Nodes come before polygon corners.
    #[must_use]
    pub fn from_graph(graph: &CampusGraph, floor: Option<&FloorId>) -> Self {
        let on_floor = |entity_floor: Option<&FloorId>| floor.is_none() || entity_floor == floor;
        let mut ctx = Self::new();

        for node in graph.nodes.values() {
            if on_floor(node.floor_id.as_ref()) {
                ctx.vertices.push(SnapVertex {
                    position: node.position,
                    target: SnapTarget::Node {
                        node_id: node.id.clone(),
                    },
                });
            }
        }

        for space in graph.spaces.values() {
            if !on_floor(space.floor_id.as_ref()) {
                continue;
            }
            for (index, corner) in space.polygon.iter().enumerate() {
                ctx.vertices.push(SnapVertex {
                    position: *corner,
                    target: SnapTarget::SpaceVertex {
                        space_id: space.id.clone(),
                        index,
                    },
                });
            }
            for (index, start, end) in polygon_segments(&space.polygon) {
                ctx.segments.push(SnapSegment {
                    start,
                    end,
                    target: SnapTarget::SpaceEdge {
                        space_id: space.id.clone(),
                        index,
                    },
                });
            }
        }

        ctx
    }

    /// Set the previously placed point, enabling orthogonal snapping.
    #[must_use]
    pub fn with_previous(mut self, previous: Point) -> Self {
        self.previous = Some(previous);
        self
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve `cursor` to the highest-priority qualifying snap.
#[must_use]
pub fn find_snap(cursor: Point, context: &SnapContext, config: &SnapConfig) -> SnapResult {
    if let Some(hit) = nearest_vertex(cursor, context, config.vertex_threshold) {
        return hit;
    }
    if let Some(hit) = nearest_edge(cursor, context, config.edge_threshold) {
        return hit;
    }
    if let Some(prev) = context.previous {
        if let Some(hit) = orthogonal(cursor, prev, config.orthogonal_threshold) {
            return hit;
        }
    }
    if config.grid_enabled && config.grid_size > 0.0 {
        let size = config.grid_size;
        let snapped = Point::new(
            (cursor.x / size).round() * size,
            (cursor.y / size).round() * size,
        );
        return SnapResult::at(SnapKind::Grid, snapped);
    }
    SnapResult::at(SnapKind::Free, cursor)
}

fn nearest_vertex(cursor: Point, context: &SnapContext, threshold: f64) -> Option<SnapResult> {
    let mut best: Option<(f64, &SnapVertex)> = None;
    for vertex in &context.vertices {
        let d = cursor.distance_to(vertex.position);
        if d <= threshold && best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, vertex));
        }
    }
    best.map(|(_, v)| SnapResult {
        kind: SnapKind::Vertex,
        position: v.position,
        target: Some(v.target.clone()),
        guide_line: None,
    })
}

fn nearest_edge(cursor: Point, context: &SnapContext, threshold: f64) -> Option<SnapResult> {
    let mut best: Option<(f64, Point, &SnapSegment)> = None;
    for segment in &context.segments {
        let p = closest_point_on_segment(cursor, segment.start, segment.end);
        let d = cursor.distance_to(p);
        if d <= threshold && best.is_none_or(|(bd, _, _)| d < bd) {
            best = Some((d, p, segment));
        }
    }
    best.map(|(_, p, s)| SnapResult {
        kind: SnapKind::Edge,
        position: p,
        target: Some(s.target.clone()),
        guide_line: None,
    })
}

fn orthogonal(cursor: Point, prev: Point, threshold: f64) -> Option<SnapResult> {
    let dx = (cursor.x - prev.x).abs();
    let dy = (cursor.y - prev.y).abs();

    let snapped = if dy < dx && dy <= threshold {
        Point::new(cursor.x, prev.y)
    } else if dx < dy && dx <= threshold {
        Point::new(prev.x, cursor.y)
    } else {
        return None;
    };

    Some(SnapResult {
        kind: SnapKind::Orthogonal,
        position: snapped,
        target: None,
        guide_line: Some(GuideLine {
            from: prev,
            to: snapped,
        }),
    })
}

// =============================================================================
// TESTS
// =============================================================================
