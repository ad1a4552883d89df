//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Mutations take the write lock, run the manager, persist the new version
//! when a document store is attached, and only then swap it in. A failed
//! write leaves the served graph untouched.

use super::{
    AppState,
    types::{
        ErrorResponse, HashResponse, HealthResponse, MutationResponse, RouteResponse,
        SnapRequest, StatusResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campusmap_core::{
    BuildingDraft, BuildingId, BuildingPatch, CampusDocument, CampusError, CampusGraph,
    CampusMetrics, EdgeDraft, EdgeId, EdgePatch, FloorDraft, FloorId, FloorPatch, GraphManager,
    NodeDraft, NodeId, NodePatch, Point, RouteRequest, SnapContext, SpaceDraft, SpaceId,
    SpacePatch, find_route, find_snap,
    formats::{self, snapshot_hash},
    validate,
};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// A core error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CampusError);

impl From<CampusError> for ApiError {
    fn from(err: CampusError) -> Self {
        Self(err)
    }
}

/// HTTP status for a core error.
#[must_use]
pub fn status_for(err: &CampusError) -> StatusCode {
    match err {
        CampusError::NotFound { .. } => StatusCode::NOT_FOUND,
        CampusError::DuplicateId(_) => StatusCode::CONFLICT,
        CampusError::MissingEndpoint { .. }
        | CampusError::SelfLoop(_)
        | CampusError::SelfIntersectingPolygon(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CampusError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        CampusError::SerializationError(_)
        | CampusError::IoError(_)
        | CampusError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Apply `op` to the current graph and install the result.
async fn commit<F>(
    state: &AppState,
    status: StatusCode,
    id: String,
    op: F,
) -> ApiResult<(StatusCode, Json<MutationResponse>)>
where
    F: FnOnce(&CampusGraph) -> Result<CampusGraph, CampusError>,
{
    let mut graph = state.graph.write().await;
    let next = op(&*graph)?;
    let report = validate(&next);

    if let Some(store) = &state.store {
        store.persist(&next).await?;
    }
    *graph = next;

    tracing::debug!(
        "Committed {}: {} errors, {} warnings",
        id,
        report.summary.errors,
        report.summary.warnings
    );
    Ok((status, Json(MutationResponse::new(id, &report))))
}

// =============================================================================
// HEALTH & STATUS HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Get graph status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.read().await;
    let response = StatusResponse::new(CampusMetrics::from_graph(&graph), &validate(&graph));
    (StatusCode::OK, Json(response))
}

/// Full validation report for the current graph.
pub async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.read().await;
    Json(validate(&graph))
}

/// BLAKE3 hash of the current graph's snapshot.
pub async fn hash_handler(State(state): State<AppState>) -> ApiResult<Json<HashResponse>> {
    let graph = state.graph.read().await;
    let hash = snapshot_hash(&graph)?;
    Ok(Json(HashResponse::blake3(hash)))
}

// =============================================================================
// DOCUMENT HANDLERS
// =============================================================================

/// Current graph as a campus document.
pub async fn get_graph_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.read().await;
    Json(CampusDocument::from_graph(&graph))
}

/// Replace the whole graph with an uploaded document.
pub async fn replace_graph_handler(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<StatusResponse>> {
    let next = formats::load(&body)?;
    let report = validate(&next);
    let metrics = CampusMetrics::from_graph(&next);

    let mut graph = state.graph.write().await;
    if let Some(store) = &state.store {
        store.persist(&next).await?;
    }
    *graph = next;

    tracing::info!(
        "Graph replaced: {} nodes, {} edges, {} errors",
        metrics.node_count,
        metrics.edge_count,
        report.summary.errors
    );
    Ok(Json(StatusResponse::new(metrics, &report)))
}

// =============================================================================
// QUERY HANDLERS
// =============================================================================

/// Constrained shortest path between two nodes.
pub async fn route_handler(
    State(state): State<AppState>,
    Json(mut request): Json<RouteRequest>,
) -> impl IntoResponse {
    if request.walking_speed.is_none() {
        request.walking_speed = Some(state.config.routing.walking_speed);
    }
    let graph = state.graph.read().await;
    Json(RouteResponse::from(find_route(&graph, &request)))
}

/// Resolve a cursor position against nearby geometry.
pub async fn snap_handler(
    State(state): State<AppState>,
    Json(request): Json<SnapRequest>,
) -> impl IntoResponse {
    let graph = state.graph.read().await;
    let mut context = SnapContext::from_graph(&graph, request.floor_id.as_ref());
    if let Some(previous) = request.previous {
        context = context.with_previous(previous);
    }
    let config = request.config.unwrap_or(state.config.snap);
    Json(find_snap(Point::new(request.x, request.y), &context, &config))
}

// =============================================================================
// NODE HANDLERS
// =============================================================================

pub async fn add_node_handler(
    State(state): State<AppState>,
    Json(mut draft): Json<NodeDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = draft.id.get_or_insert_with(NodeId::generate).to_string();
    commit(&state, StatusCode::CREATED, id, |g| GraphManager::add_node(g, draft)).await
}

pub async fn update_node_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<NodePatch>,
) -> ApiResult<impl IntoResponse> {
    let node = NodeId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::update_node(g, &node, patch)).await
}

/// Delete a node together with its incident edges.
pub async fn delete_node_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let node = NodeId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::delete_node(g, &node)).await
}

// =============================================================================
// EDGE HANDLERS
// =============================================================================

pub async fn add_edge_handler(
    State(state): State<AppState>,
    Json(mut draft): Json<EdgeDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = draft.id.get_or_insert_with(EdgeId::generate).to_string();
    commit(&state, StatusCode::CREATED, id, |g| GraphManager::add_edge(g, draft)).await
}

pub async fn update_edge_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EdgePatch>,
) -> ApiResult<impl IntoResponse> {
    let edge = EdgeId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::update_edge(g, &edge, patch)).await
}

pub async fn delete_edge_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let edge = EdgeId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::delete_edge(g, &edge)).await
}

// =============================================================================
// SPACE HANDLERS
// =============================================================================

pub async fn add_space_handler(
    State(state): State<AppState>,
    Json(mut draft): Json<SpaceDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = draft.id.get_or_insert_with(SpaceId::generate).to_string();
    commit(&state, StatusCode::CREATED, id, |g| GraphManager::add_space(g, draft)).await
}

pub async fn update_space_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SpacePatch>,
) -> ApiResult<impl IntoResponse> {
    let space = SpaceId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::update_space(g, &space, patch)).await
}

pub async fn delete_space_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let space = SpaceId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::delete_space(g, &space)).await
}

// =============================================================================
// BUILDING HANDLERS
// =============================================================================

pub async fn add_building_handler(
    State(state): State<AppState>,
    Json(mut draft): Json<BuildingDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = draft.id.get_or_insert_with(BuildingId::generate).to_string();
    commit(&state, StatusCode::CREATED, id, |g| GraphManager::add_building(g, draft)).await
}

pub async fn update_building_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<BuildingPatch>,
) -> ApiResult<impl IntoResponse> {
    let building = BuildingId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| {
        GraphManager::update_building(g, &building, patch)
    })
    .await
}

/// Delete a building. Its floors stay behind as FI-1 issues.
pub async fn delete_building_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let building = BuildingId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::delete_building(g, &building)).await
}

// =============================================================================
// FLOOR HANDLERS
// =============================================================================

pub async fn add_floor_handler(
    State(state): State<AppState>,
    Json(mut draft): Json<FloorDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = draft.id.get_or_insert_with(FloorId::generate).to_string();
    commit(&state, StatusCode::CREATED, id, |g| GraphManager::add_floor(g, draft)).await
}

pub async fn update_floor_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<FloorPatch>,
) -> ApiResult<impl IntoResponse> {
    let floor = FloorId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::update_floor(g, &floor, patch)).await
}

pub async fn delete_floor_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let floor = FloorId::new(id.as_str());
    commit(&state, StatusCode::OK, id, |g| GraphManager::delete_floor(g, &floor)).await
}
