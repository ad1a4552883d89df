//! # Route Finder
//!
//! Constraint-filtered shortest paths. Each call builds the traversable
//! arc list for the request, then runs Dijkstra with a binary heap.
//!
//! An arc `a → b` over an edge is traversable only when:
//! - the edge's direction allows `a → b`
//! - each clearance the user needs fits the edge's effective maximum
//! - every tag the edge requires has been granted
//! - `(a, b)` is blocked neither by the edge nor by the request
//! - the user's step and outdoor preferences admit the edge

use crate::graph::CampusGraph;
use crate::primitives::DEFAULT_WALKING_SPEED;
use crate::{Edge, EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

// =============================================================================
// REQUEST & RESULT
// =============================================================================

/// What a route minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimize {
    #[default]
    Distance,
    Time,
}

/// Requirements of the traveller.
///
/// `width`, `height` and `weight` are clearances the traveller needs. An
/// edge admits them when its declared maximum is at least as large, so a
/// door with a maximum width of 0.8 is skipped for a traveller who needs
/// 1.0, and an edge with no declared maximum admits any requirement. The
/// effective maximum width is `constraints.max.width`, falling back to the
/// edge's physical `width`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConstraints {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    /// Capability tags the traveller holds.
    pub granted: BTreeSet<String>,
    /// Directed `(from, to)` pairs the traveller refuses to walk.
    pub blocked: BTreeSet<(NodeId, NodeId)>,
    pub avoid_steps: bool,
    pub avoid_outdoor: bool,
}

/// A shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: NodeId,
    pub end: NodeId,
    #[serde(default)]
    pub constraints: UserConstraints,
    #[serde(default)]
    pub optimize: Optimize,
    /// Speed used when an edge carries no estimated time.
    #[serde(default)]
    pub walking_speed: Option<f64>,
}

impl RouteRequest {
    /// Unconstrained shortest-distance request.
    #[must_use]
    pub fn new(start: impl Into<NodeId>, end: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            constraints: UserConstraints::default(),
            optimize: Optimize::Distance,
            walking_speed: None,
        }
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: UserConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn optimize(mut self, optimize: Optimize) -> Self {
        self.optimize = optimize;
        self
    }

    fn speed(&self) -> f64 {
        self.walking_speed
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_WALKING_SPEED)
    }
}

/// A found route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Visited nodes, start to end.
    pub nodes: Vec<NodeId>,
    /// Traversed edges; one fewer than `nodes`.
    pub edges: Vec<EdgeId>,
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
    /// Sum of the optimized weight.
    pub cost: f64,
}

// =============================================================================
// TRAVERSABILITY
// =============================================================================

fn fits(limit: Option<f64>, needed: Option<f64>) -> bool {
    match (limit, needed) {
        (Some(limit), Some(needed)) => limit >= needed,
        _ => true,
    }
}

/// Whether `edge` may be walked from `from` to `to` under `constraints`.
#[must_use]
pub fn is_traversable(
    edge: &Edge,
    from: &NodeId,
    to: &NodeId,
    constraints: &UserConstraints,
) -> bool {
    let direction_ok = if &edge.source == from && &edge.target == to {
        edge.direction.allows_forward()
    } else if &edge.target == from && &edge.source == to {
        edge.direction.allows_backward()
    } else {
        false
    };
    if !direction_ok {
        return false;
    }

    let max = &edge.constraints.max;
    if !(fits(edge.max_width(), constraints.width)
        && fits(max.height, constraints.height)
        && fits(max.weight, constraints.weight))
    {
        return false;
    }

    if !edge.constraints.requires.is_subset(&constraints.granted) {
        return false;
    }

    let blocked = |set: &BTreeSet<(NodeId, NodeId)>| set.iter().any(|(a, b)| a == from && b == to);
    if blocked(&edge.constraints.blocked) || blocked(&constraints.blocked) {
        return false;
    }

    !(constraints.avoid_steps && edge.has_steps) && !(constraints.avoid_outdoor && edge.is_outdoor)
}

/// Walking time of an edge in seconds.
#[must_use]
pub fn edge_time(edge: &Edge, walking_speed: f64) -> f64 {
    edge.estimated_time
        .unwrap_or(edge.distance / walking_speed)
        .max(0.0)
}

// =============================================================================
// DIJKSTRA
// =============================================================================

/// Heap entry ordered so that `BinaryHeap` pops the cheapest, then the
/// earliest pushed.
struct Frontier<'a> {
    cost: f64,
    seq: u64,
    node: &'a NodeId,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Hop<'a> {
    edge: &'a Edge,
    to: &'a NodeId,
    weight: f64,
}

/// Find the cheapest route for `request`.
///
/// Returns `None` when either endpoint is unknown or no traversable path
/// connects them.
#[must_use]
pub fn find_route(graph: &CampusGraph, request: &RouteRequest) -> Option<Route> {
    let (start, _) = graph.nodes.get_key_value(&request.start)?;
    let (end, _) = graph.nodes.get_key_value(&request.end)?;

    if start == end {
        return Some(Route {
            nodes: vec![start.clone()],
            edges: Vec::new(),
            total_distance: 0.0,
            total_time: 0.0,
            cost: 0.0,
        });
    }

    let speed = request.speed();
    let arcs = traversable_arcs(graph, request, speed);

    let mut best: BTreeMap<&NodeId, f64> = BTreeMap::new();
    let mut came_from: BTreeMap<&NodeId, (&NodeId, &Edge)> = BTreeMap::new();
    let mut settled: BTreeSet<&NodeId> = BTreeSet::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    best.insert(start, 0.0);
    heap.push(Frontier {
        cost: 0.0,
        seq,
        node: start,
    });

    while let Some(Frontier { cost, node, .. }) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == end {
            break;
        }

        for arc in arcs.get(node).into_iter().flatten() {
            if settled.contains(arc.to) {
                continue;
            }
            let next = cost + arc.weight;
            let improves = best.get(arc.to).is_none_or(|known| next < *known);
            if improves {
                best.insert(arc.to, next);
                came_from.insert(arc.to, (node, arc.edge));
                seq += 1;
                heap.push(Frontier {
                    cost: next,
                    seq,
                    node: arc.to,
                });
            }
        }
    }

    if !settled.contains(end) {
        return None;
    }

    let mut nodes = vec![end.clone()];
    let mut edges = Vec::new();
    let mut total_distance = 0.0;
    let mut total_time = 0.0;
    let mut cursor = end;
    while let Some((prev, edge)) = came_from.get(cursor) {
        edges.push(edge.id.clone());
        nodes.push((*prev).clone());
        total_distance += edge.distance;
        total_time += edge_time(edge, speed);
        cursor = *prev;
    }
    nodes.reverse();
    edges.reverse();

    Some(Route {
        nodes,
        edges,
        total_distance,
        total_time,
        cost: best.get(end).copied().unwrap_or(0.0),
    })
}

fn traversable_arcs<'a>(
    graph: &'a CampusGraph,
    request: &RouteRequest,
    speed: f64,
) -> BTreeMap<&'a NodeId, Vec<Hop<'a>>> {
    let mut arcs: BTreeMap<&NodeId, Vec<Hop<'a>>> = BTreeMap::new();
    for edge in graph.edges.values() {
        if edge.source == edge.target
            || !graph.nodes.contains_key(&edge.source)
            || !graph.nodes.contains_key(&edge.target)
        {
            continue;
        }
        let weight = match request.optimize {
            Optimize::Distance => edge.distance.max(0.0),
            Optimize::Time => edge_time(edge, speed),
        };
        for (from, to) in [(&edge.source, &edge.target), (&edge.target, &edge.source)] {
            if is_traversable(edge, from, to, &request.constraints) {
                arcs.entry(from).or_default().push(Hop { edge, to, weight });
            }
        }
    }
    arcs
}

// =============================================================================
// TESTS
// =============================================================================
