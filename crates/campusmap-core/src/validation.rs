//! # Validation Engine
//!
//! Global consistency checks over a whole graph. Unlike the manager's
//! local preconditions, validation findings are report data: a graph with
//! errors is still a graph, and the caller decides what to do with it.
//!
//! Rules live in a single table ([`RULES`]). Each rule is a pure function
//! from the graph to its findings; `validate` runs the table top to bottom
//! and re-scans everything on every call.

use crate::geometry::polygon_self_intersects;
use crate::graph::CampusGraph;
use crate::{BuildingId, EdgeId, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// REPORT TYPES
// =============================================================================

/// How serious an issue is. Errors order before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable rule id, e.g. `"NI-1"`.
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    /// Ids of the entities involved.
    pub target_ids: Vec<String>,
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

/// Result of a full validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff no issue has error severity.
    pub is_valid: bool,
    /// Errors first, then warnings.
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

impl ValidationReport {
    /// Issues raised by one rule.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.rule == rule)
    }
}

// =============================================================================
// RULE TABLE
// =============================================================================

struct Finding {
    message: String,
    target_ids: Vec<String>,
}

impl Finding {
    fn new(message: String, target_ids: Vec<String>) -> Self {
        Self {
            message,
            target_ids,
        }
    }
}

/// One validation rule.
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    check: fn(&CampusGraph) -> Vec<Finding>,
}

impl Rule {
    fn apply(&self, graph: &CampusGraph) -> impl Iterator<Item = Issue> + '_ {
        (self.check)(graph).into_iter().map(move |f| Issue {
            rule: self.id.to_string(),
            severity: self.severity,
            message: f.message,
            target_ids: f.target_ids,
        })
    }
}

/// All rules, in reporting order.
pub const RULES: &[Rule] = &[
    Rule {
        id: "NI-1",
        severity: Severity::Error,
        description: "Node has no incident edges",
        check: check_isolated_nodes,
    },
    Rule {
        id: "NI-2",
        severity: Severity::Warning,
        description: "Connected staircase has no vertical link",
        check: check_unlinked_staircases,
    },
    Rule {
        id: "NI-3",
        severity: Severity::Error,
        description: "Node references an unknown floor",
        check: check_node_floors,
    },
    Rule {
        id: "EI-1",
        severity: Severity::Error,
        description: "Edge references a missing node",
        check: check_missing_endpoints,
    },
    Rule {
        id: "EI-2",
        severity: Severity::Error,
        description: "Edge connects a node to itself",
        check: check_self_loops,
    },
    Rule {
        id: "EI-3",
        severity: Severity::Warning,
        description: "Several edges connect the same pair of nodes",
        check: check_duplicate_pairs,
    },
    Rule {
        id: "EI-4",
        severity: Severity::Warning,
        description: "Non-vertical edge joins nodes on different floors",
        check: check_cross_floor_edges,
    },
    Rule {
        id: "SI-1",
        severity: Severity::Warning,
        description: "Space polygon has fewer than three vertices",
        check: check_degenerate_polygons,
    },
    Rule {
        id: "SI-2",
        severity: Severity::Error,
        description: "Space references an unknown floor",
        check: check_space_floors,
    },
    Rule {
        id: "SI-3",
        severity: Severity::Error,
        description: "Space polygon intersects itself",
        check: check_self_intersecting_polygons,
    },
    Rule {
        id: "FI-1",
        severity: Severity::Error,
        description: "Floor references an unknown building",
        check: check_floor_buildings,
    },
    Rule {
        id: "FI-2",
        severity: Severity::Warning,
        description: "Two floors of one building share a level",
        check: check_duplicate_levels,
    },
];

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Run every rule against the graph.
#[must_use]
pub fn validate(graph: &CampusGraph) -> ValidationReport {
    let mut issues: Vec<Issue> = RULES.iter().flat_map(|rule| rule.apply(graph)).collect();
    // Stable: keeps table order within a severity.
    issues.sort_by_key(|i| i.severity);

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let summary = Summary {
        errors,
        warnings: issues.len() - errors,
    };

    ValidationReport {
        is_valid: errors == 0,
        issues,
        summary,
    }
}

/// Shorthand for `validate(graph).is_valid`.
#[must_use]
pub fn is_valid(graph: &CampusGraph) -> bool {
    validate(graph).is_valid
}

// =============================================================================
// NODE RULES
// =============================================================================

fn check_isolated_nodes(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .degrees()
        .into_iter()
        .filter(|(_, degree)| *degree == 0)
        .map(|(id, _)| Finding::new(format!("Node {id} is isolated"), vec![id.to_string()]))
        .collect()
}

fn check_unlinked_staircases(graph: &CampusGraph) -> Vec<Finding> {
    let degrees = graph.degrees();
    graph
        .nodes
        .values()
        .filter(|n| n.node_type == NodeType::Staircase && !n.has_vertical_link())
        .filter(|n| degrees.get(&n.id).copied().unwrap_or(0) > 0)
        .map(|n| {
            Finding::new(
                format!("Staircase {} has no vertical link", n.id),
                vec![n.id.to_string()],
            )
        })
        .collect()
}

fn check_node_floors(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .nodes
        .values()
        .filter_map(|n| {
            let floor = n.floor_id.as_ref()?;
            (!graph.floors.contains_key(floor)).then(|| {
                Finding::new(
                    format!("Node {} is on unknown floor {floor}", n.id),
                    vec![n.id.to_string(), floor.to_string()],
                )
            })
        })
        .collect()
}

// =============================================================================
// EDGE RULES
// =============================================================================

fn check_missing_endpoints(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .edges
        .values()
        .filter_map(|e| {
            let mut missing: Vec<&NodeId> = [&e.source, &e.target]
                .into_iter()
                .filter(|n| !graph.nodes.contains_key(*n))
                .collect();
            missing.dedup();
            if missing.is_empty() {
                return None;
            }
            let names: Vec<String> = missing.iter().map(|n| n.to_string()).collect();
            let mut targets = vec![e.id.to_string()];
            targets.extend(names.iter().cloned());
            Some(Finding::new(
                format!("Edge {} references missing node(s) {}", e.id, names.join(", ")),
                targets,
            ))
        })
        .collect()
}

fn check_self_loops(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .edges
        .values()
        .filter(|e| e.source == e.target)
        .map(|e| {
            Finding::new(
                format!("Edge {} connects {} to itself", e.id, e.source),
                vec![e.id.to_string()],
            )
        })
        .collect()
}

fn check_duplicate_pairs(graph: &CampusGraph) -> Vec<Finding> {
    let mut pairs: BTreeMap<(&NodeId, &NodeId), Vec<&EdgeId>> = BTreeMap::new();
    for edge in graph.edges.values() {
        pairs.entry(edge.unordered_pair()).or_default().push(&edge.id);
    }

    pairs
        .into_iter()
        .filter(|(_, edges)| edges.len() > 1)
        .map(|((a, b), edges)| {
            Finding::new(
                format!("{} edges connect {a} and {b}", edges.len()),
                edges.iter().map(|e| e.to_string()).collect(),
            )
        })
        .collect()
}

fn check_cross_floor_edges(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .edges
        .values()
        .filter(|e| !e.is_vertical)
        .filter_map(|e| {
            let from = graph.nodes.get(&e.source)?.floor_id.as_ref()?;
            let to = graph.nodes.get(&e.target)?.floor_id.as_ref()?;
            (from != to).then(|| {
                Finding::new(
                    format!("Edge {} joins floors {from} and {to} but is not vertical", e.id),
                    vec![e.id.to_string()],
                )
            })
        })
        .collect()
}

// =============================================================================
// SPACE RULES
// =============================================================================

fn check_degenerate_polygons(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .spaces
        .values()
        .filter(|s| matches!(s.polygon.len(), 1 | 2))
        .map(|s| {
            Finding::new(
                format!("Space {} has only {} vertices", s.id, s.polygon.len()),
                vec![s.id.to_string()],
            )
        })
        .collect()
}

fn check_space_floors(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .spaces
        .values()
        .filter_map(|s| {
            let floor = s.floor_id.as_ref()?;
            (!graph.floors.contains_key(floor)).then(|| {
                Finding::new(
                    format!("Space {} is on unknown floor {floor}", s.id),
                    vec![s.id.to_string(), floor.to_string()],
                )
            })
        })
        .collect()
}

fn check_self_intersecting_polygons(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .spaces
        .values()
        .filter(|s| polygon_self_intersects(&s.polygon))
        .map(|s| {
            Finding::new(
                format!("Space {} has a self-intersecting polygon", s.id),
                vec![s.id.to_string()],
            )
        })
        .collect()
}

// =============================================================================
// FLOOR RULES
// =============================================================================

fn check_floor_buildings(graph: &CampusGraph) -> Vec<Finding> {
    graph
        .floors
        .values()
        .filter(|f| !graph.buildings.contains_key(&f.building_id))
        .map(|f| {
            Finding::new(
                format!("Floor {} belongs to unknown building {}", f.id, f.building_id),
                vec![f.id.to_string(), f.building_id.to_string()],
            )
        })
        .collect()
}

fn check_duplicate_levels(graph: &CampusGraph) -> Vec<Finding> {
    let mut levels: BTreeMap<(&BuildingId, i32), Vec<String>> = BTreeMap::new();
    for floor in graph.floors.values() {
        levels
            .entry((&floor.building_id, floor.level))
            .or_default()
            .push(floor.id.to_string());
    }

    levels
        .into_iter()
        .filter(|(_, floors)| floors.len() > 1)
        .map(|((building, level), floors)| {
            Finding::new(
                format!("Building {building} has {} floors at level {level}", floors.len()),
                floors,
            )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::{complete_edge, complete_space};
    use crate::{
        BuildingDraft, EdgeDraft, FloorDraft, GraphManager, NodeDraft, Point, SpaceDraft, SpaceId,
        VerticalLinks,
    };

    fn connected_pair() -> CampusGraph {
        let g = CampusGraph::new();
        let g = GraphManager::add_node(&g, NodeDraft::with_id("a").at(0.0, 0.0)).expect("a");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("b").at(1.0, 0.0)).expect("b");
        GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("ab")).expect("ab")
    }

    /// Insert an edge directly, bypassing the manager's preconditions.
    fn force_edge(g: &mut CampusGraph, id: &str, source: &str, target: &str) {
        let edge = complete_edge(g, EdgeDraft::new(source, target), EdgeId::new(id));
        g.edges.insert(edge.id.clone(), edge);
    }

    fn rules_of(report: &ValidationReport) -> Vec<&str> {
        report.issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn empty_graph_is_valid() {
        let report = validate(&CampusGraph::new());
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.summary, Summary::default());
    }

    #[test]
    fn connected_pair_is_valid() {
        assert!(is_valid(&connected_pair()));
    }

    #[test]
    fn single_isolated_node_is_one_ni1() {
        let g = GraphManager::add_node(&CampusGraph::new(), NodeDraft::with_id("lonely"))
            .expect("add");
        let report = validate(&g);
        assert!(!report.is_valid);
        assert_eq!(rules_of(&report), vec!["NI-1"]);
        assert_eq!(report.issues[0].target_ids, vec!["lonely".to_string()]);
        assert_eq!(report.summary.errors, 1);
    }

    #[test]
    fn duplicate_pair_is_one_ei3() {
        let g = connected_pair();
        let g = GraphManager::add_edge(&g, EdgeDraft::new("b", "a").with_id("ba")).expect("ba");
        let g = GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("ab2")).expect("ab2");

        let report = validate(&g);
        assert!(report.is_valid);
        let ei3: Vec<&Issue> = report.by_rule("EI-3").collect();
        assert_eq!(ei3.len(), 1);
        assert_eq!(ei3[0].target_ids, vec!["ab", "ab2", "ba"]);
        assert_eq!(ei3[0].severity, Severity::Warning);
    }

    #[test]
    fn forced_bad_edges_are_reported() {
        let mut g = connected_pair();
        force_edge(&mut g, "dangling", "a", "ghost");
        force_edge(&mut g, "loop", "b", "b");

        let report = validate(&g);
        assert_eq!(report.by_rule("EI-1").count(), 1);
        assert_eq!(report.by_rule("EI-2").count(), 1);
        let ei1 = report.by_rule("EI-1").next().expect("EI-1");
        assert_eq!(ei1.target_ids, vec!["dangling", "ghost"]);
    }

    #[test]
    fn bowtie_space_is_si3_and_square_is_not() {
        let mut g = connected_pair();
        let bowtie = complete_space(
            SpaceDraft::with_polygon(
                "bowtie",
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(2.0, 2.0),
                    Point::new(2.0, 0.0),
                    Point::new(0.0, 2.0),
                ],
            ),
            SpaceId::new("bowtie"),
        );
        g.spaces.insert(bowtie.id.clone(), bowtie);
        let g = GraphManager::add_space(
            &g,
            SpaceDraft::with_polygon(
                "square",
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(2.0, 0.0),
                    Point::new(2.0, 2.0),
                    Point::new(0.0, 2.0),
                ],
            ),
        )
        .expect("square");

        let report = validate(&g);
        let si3: Vec<&Issue> = report.by_rule("SI-3").collect();
        assert_eq!(si3.len(), 1);
        assert_eq!(si3[0].target_ids, vec!["bowtie"]);
    }

    #[test]
    fn unlinked_staircase_warns() {
        let g = CampusGraph::new();
        let g = GraphManager::add_node(
            &g,
            NodeDraft::with_id("stairs").of_type(NodeType::Staircase),
        )
        .expect("stairs");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("hall").at(3.0, 0.0)).expect("hall");
        let g = GraphManager::add_edge(&g, EdgeDraft::new("stairs", "hall")).expect("edge");

        let report = validate(&g);
        assert!(report.is_valid);
        assert_eq!(rules_of(&report), vec!["NI-2"]);

        let linked = crate::NodePatch {
            vertical_links: Some(Some(VerticalLinks {
                above: Some(NodeId::new("stairs-2")),
                below: None,
            })),
            ..Default::default()
        };
        let g = GraphManager::update_node(&g, &NodeId::new("stairs"), linked).expect("link");
        assert!(validate(&g).issues.is_empty());
    }

    #[test]
    fn floor_references_are_checked() {
        let g = GraphManager::add_building(
            &CampusGraph::new(),
            BuildingDraft {
                id: Some("main".into()),
                ..Default::default()
            },
        )
        .expect("building");
        let mut f1 = FloorDraft::new("main", 1);
        f1.id = Some("f1".into());
        let mut f1b = FloorDraft::new("main", 1);
        f1b.id = Some("f1b".into());
        let g = GraphManager::add_floor(&g, f1).expect("f1");
        let mut g = GraphManager::add_floor(&g, f1b).expect("f1b");

        let mut orphan = crate::autocomplete::complete_floor(
            FloorDraft::new("gone", 0),
            crate::FloorId::new("orphan"),
        );
        orphan.name = "Orphan".to_string();
        g.floors.insert(orphan.id.clone(), orphan);

        let g = GraphManager::add_node(&g, NodeDraft::with_id("x").on_floor("nowhere"))
            .expect("node");

        let report = validate(&g);
        assert_eq!(report.by_rule("FI-1").count(), 1);
        assert_eq!(report.by_rule("FI-2").count(), 1);
        assert_eq!(report.by_rule("NI-3").count(), 1);
    }

    #[test]
    fn cross_floor_edge_warns_unless_vertical() {
        let g = GraphManager::add_building(
            &CampusGraph::new(),
            BuildingDraft {
                id: Some("main".into()),
                ..Default::default()
            },
        )
        .expect("building");
        let mut g = g;
        for (id, level) in [("f0", 0), ("f1", 1)] {
            let mut draft = FloorDraft::new("main", level);
            draft.id = Some(id.into());
            g = GraphManager::add_floor(&g, draft).expect("floor");
        }
        let g = GraphManager::add_node(&g, NodeDraft::with_id("low").on_floor("f0")).expect("low");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("up").on_floor("f1")).expect("up");
        let g = GraphManager::add_edge(&g, EdgeDraft::new("low", "up").with_id("e")).expect("e");
        assert_eq!(validate(&g).by_rule("EI-4").count(), 1);

        let vertical = crate::EdgePatch {
            is_vertical: Some(true),
            ..Default::default()
        };
        let g = GraphManager::update_edge(&g, &EdgeId::new("e"), vertical).expect("vertical");
        assert_eq!(validate(&g).by_rule("EI-4").count(), 0);
    }

    #[test]
    fn degenerate_polygon_warns() {
        let g = GraphManager::add_space(
            &CampusGraph::new(),
            SpaceDraft::with_polygon("line", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
        )
        .expect("line");
        assert_eq!(rules_of(&validate(&g)), vec!["SI-1"]);
    }

    #[test]
    fn errors_come_before_warnings() {
        let g = connected_pair();
        let g = GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("dup")).expect("dup");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("z")).expect("z");

        let report = validate(&g);
        assert_eq!(rules_of(&report), vec!["NI-1", "EI-3"]);
        assert_eq!(report.summary, Summary { errors: 1, warnings: 1 });
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), RULES.len());
    }
}
