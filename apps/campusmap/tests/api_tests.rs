//! Integration tests for the campusmap HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use campusmap::api::{
    AppState, ErrorResponse, HashResponse, HealthResponse, MutationResponse, RouteResponse,
    StatusResponse, create_router,
};
use campusmap::store::DocumentStore;
use campusmap_core::{
    BuildingDraft, CampusDocument, CampusGraph, EdgeDraft, EdgeId, FloorDraft, Format,
    GraphManager, NodeDraft, NodeId, SnapKind, SnapResult, ValidationReport,
};
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a test server over an empty graph.
fn create_test_server() -> TestServer {
    TestServer::new(create_router(AppState::new(CampusGraph::new()))).unwrap()
}

/// One building with one floor and a three-node corridor:
/// `a` (0,0) - `b` (10,0) - `c` (10,10), where `b`-`c` is a 0.8 door.
fn corridor() -> CampusGraph {
    let g = GraphManager::add_building(
        &CampusGraph::new(),
        BuildingDraft {
            id: Some("eng".into()),
            name: Some("Engineering".to_string()),
            code: None,
        },
    )
    .unwrap();
    let mut floor = FloorDraft::new("eng", 0);
    floor.id = Some("eng-0".into());
    let mut g = GraphManager::add_floor(&g, floor).unwrap();

    for (id, x, y) in [("a", 0.0, 0.0), ("b", 10.0, 0.0), ("c", 10.0, 10.0)] {
        g = GraphManager::add_node(&g, NodeDraft::with_id(id).at(x, y).on_floor("eng-0")).unwrap();
    }
    let g = GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("ab")).unwrap();
    let mut door = EdgeDraft::new("b", "c").with_id("bc");
    door.width = Some(0.8);
    GraphManager::add_edge(&g, door).unwrap()
}

fn create_populated_test_server() -> TestServer {
    TestServer::new(create_router(AppState::new(corridor()))).unwrap()
}

// =============================================================================
// HEALTH & STATUS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_empty_graph() {
    let server = create_test_server();

    let response = server.get("/status").await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.metrics.node_count, 0);
    assert_eq!(status.metrics.edge_count, 0);
    assert!(status.is_valid);
}

#[tokio::test]
async fn test_status_populated_graph() {
    let server = create_populated_test_server();

    let status: StatusResponse = server.get("/status").await.json();

    assert_eq!(status.metrics.node_count, 3);
    assert_eq!(status.metrics.edge_count, 2);
    assert_eq!(status.metrics.building_count, 1);
    assert_eq!(status.metrics.components, 1);
    assert!(status.is_valid);
}

// =============================================================================
// NODE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_add_node_generates_id() {
    let server = create_test_server();

    let response = server
        .post("/nodes")
        .json(&json!({ "position": { "x": 1.0, "y": 2.0 } }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: MutationResponse = response.json();
    assert!(created.id.starts_with("node_"));
    // A lone node is isolated.
    assert!(!created.is_valid);
    assert_eq!(created.summary.errors, 1);
}

#[tokio::test]
async fn test_add_node_duplicate_conflicts() {
    let server = create_populated_test_server();

    let response = server.post("/nodes").json(&json!({ "id": "a" })).await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "DuplicateId");
}

#[tokio::test]
async fn test_update_node_moves_it() {
    let server = create_populated_test_server();

    server
        .patch("/nodes/a")
        .json(&json!({ "position": { "x": -5.0, "y": 0.0 }, "label": "Gate" }))
        .await
        .assert_status_ok();

    let document: CampusDocument = server.get("/graph").await.json();
    let a = &document.nodes[&NodeId::new("a")];
    assert_eq!(a.label.as_deref(), Some("Gate"));
    assert_eq!(a.position.map(|p| p.x), Some(-5.0));
}

#[tokio::test]
async fn test_update_null_clears_optional_field() {
    let server = create_populated_test_server();

    server
        .patch("/edges/bc")
        .json(&json!({ "width": null }))
        .await
        .assert_status_ok();
    server
        .patch("/nodes/a")
        .json(&json!({ "floor_id": null }))
        .await
        .assert_status_ok();

    let document: CampusDocument = server.get("/graph").await.json();
    assert_eq!(document.edges[&EdgeId::new("bc")].width, None);
    assert_eq!(document.nodes[&NodeId::new("a")].floor_id, None);
    // Fields left out of a patch are kept.
    assert!(document.nodes[&NodeId::new("b")].floor_id.is_some());
}

#[tokio::test]
async fn test_update_missing_node_not_found() {
    let server = create_populated_test_server();

    let response = server.patch("/nodes/ghost").json(&json!({})).await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "NotFound");
}

#[tokio::test]
async fn test_delete_node_cascades() {
    let server = create_populated_test_server();

    server.delete("/nodes/b").await.assert_status_ok();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.metrics.node_count, 2);
    assert_eq!(status.metrics.edge_count, 0);
    assert_eq!(status.metrics.isolated_nodes, 2);
}

// =============================================================================
// EDGE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_add_edge_missing_endpoint() {
    let server = create_populated_test_server();

    let response = server
        .post("/edges")
        .json(&json!({ "source": "a", "target": "nowhere" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "EI-1");
}

#[tokio::test]
async fn test_add_edge_self_loop() {
    let server = create_populated_test_server();

    let response = server
        .post("/edges")
        .json(&json!({ "source": "a", "target": "a" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "EI-2");
}

#[tokio::test]
async fn test_parallel_edge_is_warning() {
    let server = create_populated_test_server();

    let response = server
        .post("/edges")
        .json(&json!({ "id": "ba", "source": "b", "target": "a" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: MutationResponse = response.json();
    assert_eq!(created.id, "ba");
    assert!(created.is_valid);
    assert_eq!(created.summary.warnings, 1);
}

// =============================================================================
// SPACE, BUILDING & FLOOR ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_add_space_rejects_bowtie() {
    let server = create_populated_test_server();

    let response = server
        .post("/spaces")
        .json(&json!({
            "floor_id": "eng-0",
            "polygon": [
                { "x": 0.0, "y": 0.0 },
                { "x": 4.0, "y": 4.0 },
                { "x": 4.0, "y": 0.0 },
                { "x": 0.0, "y": 4.0 }
            ]
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "SI-3");
}

#[tokio::test]
async fn test_add_floor_needs_building() {
    let server = create_populated_test_server();

    let response = server
        .post("/floors")
        .json(&json!({ "building_id": "nope", "level": 1 }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_building_leaves_floor_issue() {
    let server = create_populated_test_server();

    let response = server.delete("/buildings/eng").await;

    response.assert_status_ok();
    let deleted: MutationResponse = response.json();
    assert!(!deleted.is_valid);

    let report: ValidationReport = server.get("/validate").await.json();
    assert_eq!(report.by_rule("FI-1").count(), 1);
}

// =============================================================================
// DOCUMENT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_graph_roundtrip_through_put() {
    let source = create_populated_test_server();
    let document = source.get("/graph").await.text();

    let target = create_test_server();
    let response = target.put("/graph").text(document).await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.metrics.node_count, 3);
    assert_eq!(status.metrics.edge_count, 2);

    let hash_a: HashResponse = source.get("/hash").await.json();
    let hash_b: HashResponse = target.get("/hash").await.json();
    assert_eq!(hash_a.hash, hash_b.hash);
    assert_eq!(hash_a.algorithm, "blake3");
}

#[tokio::test]
async fn test_put_malformed_document() {
    let server = create_populated_test_server();

    let response = server.put("/graph").text("{ \"nodes\": ").await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "DeserializationError");

    // The served graph is unchanged.
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.metrics.node_count, 3);
}

#[tokio::test]
async fn test_put_mismatched_record_id() {
    let server = create_test_server();

    let response = server
        .put("/graph")
        .text(r#"{ "nodes": { "a": { "id": "b" } } }"#)
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// ROUTE & SNAP ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_route_found() {
    let server = create_populated_test_server();

    let response = server
        .post("/route")
        .json(&json!({ "start": "a", "end": "c" }))
        .await;

    response.assert_status_ok();
    let body: RouteResponse = response.json();
    assert!(body.found);
    let route = body.route.unwrap();
    assert_eq!(route.edges.len(), 2);
    assert!((route.total_distance - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_route_blocked_by_clearance() {
    let server = create_populated_test_server();

    let response = server
        .post("/route")
        .json(&json!({ "start": "a", "end": "c", "constraints": { "width": 1.0 } }))
        .await;

    response.assert_status_ok();
    let body: RouteResponse = response.json();
    assert!(!body.found);
    assert!(body.route.is_none());
}

#[tokio::test]
async fn test_snap_to_node() {
    let server = create_populated_test_server();

    let response = server
        .post("/snap")
        .json(&json!({ "x": 9.0, "y": 1.0, "floor_id": "eng-0" }))
        .await;

    response.assert_status_ok();
    let result: SnapResult = response.json();
    assert_eq!(result.kind, SnapKind::Vertex);
    assert_eq!((result.position.x, result.position.y), (10.0, 0.0));
}

#[tokio::test]
async fn test_snap_free_far_from_geometry() {
    let server = create_populated_test_server();

    let result: SnapResult = server
        .post("/snap")
        .json(&json!({ "x": 500.0, "y": 500.0 }))
        .await
        .json();

    assert_eq!(result.kind, SnapKind::Free);
}

// =============================================================================
// PERSISTENCE TESTS
// =============================================================================

#[tokio::test]
async fn test_mutations_persist_to_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus.json");
    let state = AppState::new(corridor()).with_store(DocumentStore::new(&path, Format::Json));
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .post("/nodes")
        .json(&json!({ "id": "d", "position": { "x": 20.0, "y": 0.0 } }))
        .await
        .assert_status(StatusCode::CREATED);

    let (_, saved) = DocumentStore::open(&path).unwrap();
    assert_eq!(saved.nodes.len(), 4);
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    // /health is GET only
    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = create_test_server();

    let response = server
        .post("/nodes")
        .text("not valid json")
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}
