//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use campusmap::api::{
    ErrorResponse, HealthResponse, MutationResponse, RouteResponse, SnapRequest, StatusResponse,
};
use campusmap_core::{
    CampusError, CampusGraph, CampusMetrics, EntityKind, GraphManager, NodeDraft, validate,
};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_flattens_metrics() {
    let graph = GraphManager::add_node(&CampusGraph::new(), NodeDraft::with_id("a")).unwrap();
    let status = StatusResponse::new(CampusMetrics::from_graph(&graph), &validate(&graph));

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["node_count"], 1);
    assert_eq!(value["isolated_nodes"], 1);
    assert_eq!(value["is_valid"], false);
    assert_eq!(value["summary"]["errors"], 1);
}

// =============================================================================
// MUTATION & ROUTE RESPONSE TESTS
// =============================================================================

#[test]
fn test_mutation_response_carries_summary() {
    let response = MutationResponse::new("edge_1", &validate(&CampusGraph::new()));
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["id"], "edge_1");
    assert_eq!(value["is_valid"], true);
    assert_eq!(value["summary"]["warnings"], 0);
}

#[test]
fn test_route_response_without_route() {
    let response = RouteResponse::from(None);
    assert!(!response.found);

    let json = serde_json::to_string(&response).unwrap();
    assert_eq!(json, r#"{"found":false}"#);
}

// =============================================================================
// SNAP REQUEST TESTS
// =============================================================================

#[test]
fn test_snap_request_minimal() {
    let request: SnapRequest = serde_json::from_str(r#"{"x":1.5,"y":-2}"#).unwrap();
    assert!((request.x - 1.5).abs() < f64::EPSILON);
    assert!(request.floor_id.is_none());
    assert!(request.previous.is_none());
    assert!(request.config.is_none());
}

#[test]
fn test_snap_request_partial_config() {
    let request: SnapRequest =
        serde_json::from_str(r#"{"x":0,"y":0,"config":{"grid_enabled":true}}"#).unwrap();
    let config = request.config.unwrap();
    assert!(config.grid_enabled);
    assert!(config.grid_size > 0.0);
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_from_campus_error() {
    let err = CampusError::NotFound {
        kind: EntityKind::Floor,
        id: "f9".to_string(),
    };
    let body = ErrorResponse::from(&err);
    assert_eq!(body.code, "NotFound");
    assert!(body.message.contains("f9"));
}

#[test]
fn test_error_response_uses_rule_codes() {
    let err = CampusError::SelfIntersectingPolygon("hall".to_string());
    assert_eq!(ErrorResponse::from(&err).code, "SI-3");
}
