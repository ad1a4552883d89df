//! # campusmap HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Counts, connectivity and validation summary
//! - `GET /graph` - Current graph as a campus document
//! - `PUT /graph` - Replace the graph with a campus document
//! - `GET /validate` - Full validation report
//! - `GET /hash` - BLAKE3 hash of the graph snapshot
//! - `POST /route` - Constrained shortest path
//! - `POST /snap` - Cursor snapping
//! - `POST /{kind}`, `PATCH /{kind}/{id}`, `DELETE /{kind}/{id}` for
//!   `nodes`, `edges`, `spaces`, `buildings` and `floors`
//!
//! ## Configuration
//!
//! CORS origins and the body limit come from the `[server]` section of the
//! configuration (see [`crate::config`]). `CAMPUSMAP_CORS_ORIGINS` overrides
//! the file; without either, only localhost origins are allowed.

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `campusmap::api::*`)
pub use handlers::{ApiError, status_for};
pub use types::{
    ErrorResponse, HashResponse, HealthResponse, MutationResponse, RouteResponse, SnapRequest,
    StatusResponse,
};

use crate::config::Config;
use crate::store::DocumentStore;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use campusmap_core::{CampusError, CampusGraph};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the campus graph.
#[derive(Clone)]
pub struct AppState {
    /// The current graph version.
    pub graph: Arc<RwLock<CampusGraph>>,
    pub config: Arc<Config>,
    /// Where accepted mutations are written, if anywhere.
    pub store: Option<Arc<DocumentStore>>,
}

impl AppState {
    /// Create new app state with a graph and default settings.
    #[must_use]
    pub fn new(graph: CampusGraph) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
            config: Arc::new(Config::default()),
            store: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Arc::new(config);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: DocumentStore) -> Self {
        self.store = Some(Arc::new(store));
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins (development only)
/// - empty: localhost only
/// - otherwise: exactly the listed origins
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    match origins {
        [] => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
        [wildcard] if wildcard == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        _ => {
            let allowed_origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", origin);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.body_limit;

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/graph",
            get(handlers::get_graph_handler).put(handlers::replace_graph_handler),
        )
        .route("/validate", get(handlers::validate_handler))
        .route("/hash", get(handlers::hash_handler))
        .route("/route", post(handlers::route_handler))
        .route("/snap", post(handlers::snap_handler))
        .route("/nodes", post(handlers::add_node_handler))
        .route(
            "/nodes/{id}",
            patch(handlers::update_node_handler).delete(handlers::delete_node_handler),
        )
        .route("/edges", post(handlers::add_edge_handler))
        .route(
            "/edges/{id}",
            patch(handlers::update_edge_handler).delete(handlers::delete_edge_handler),
        )
        .route("/spaces", post(handlers::add_space_handler))
        .route(
            "/spaces/{id}",
            patch(handlers::update_space_handler).delete(handlers::delete_space_handler),
        )
        .route("/buildings", post(handlers::add_building_handler))
        .route(
            "/buildings/{id}",
            patch(handlers::update_building_handler).delete(handlers::delete_building_handler),
        )
        .route("/floors", post(handlers::add_floor_handler))
        .route(
            "/floors/{id}",
            patch(handlers::update_floor_handler).delete(handlers::delete_floor_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), CampusError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CampusError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("campusmap HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CampusError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
