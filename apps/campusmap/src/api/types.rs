//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Entity bodies
//! reuse the core draft and patch types directly.

use campusmap_core::{
    CampusError, CampusMetrics, FloorId, Point, Route, SnapConfig, Summary, ValidationReport,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Graph status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub metrics: CampusMetrics,
    pub is_valid: bool,
    pub summary: Summary,
}

impl StatusResponse {
    #[must_use]
    pub fn new(metrics: CampusMetrics, report: &ValidationReport) -> Self {
        Self {
            metrics,
            is_valid: report.is_valid,
            summary: report.summary,
        }
    }
}

// =============================================================================
// MUTATION RESPONSE
// =============================================================================

/// Result of a successful create, update or delete.
///
/// Carries the validation state of the new graph version so editors can
/// refresh their issue list without a second request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub id: String,
    pub is_valid: bool,
    pub summary: Summary,
}

impl MutationResponse {
    #[must_use]
    pub fn new(id: impl Into<String>, report: &ValidationReport) -> Self {
        Self {
            id: id.into(),
            is_valid: report.is_valid,
            summary: report.summary,
        }
    }
}

// =============================================================================
// ROUTE RESPONSE
// =============================================================================

/// Route query response. A missing route is a normal answer, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

impl From<Option<Route>> for RouteResponse {
    fn from(route: Option<Route>) -> Self {
        Self {
            found: route.is_some(),
            route,
        }
    }
}

// =============================================================================
// SNAP REQUEST
// =============================================================================

/// Snap query: a cursor, optionally restricted to one floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapRequest {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub floor_id: Option<FloorId>,
    /// Last placed point, for orthogonal snapping.
    #[serde(default)]
    pub previous: Option<Point>,
    /// Replaces the server's snap settings for this request.
    #[serde(default)]
    pub config: Option<SnapConfig>,
}

// =============================================================================
// HASH RESPONSE
// =============================================================================

/// BLAKE3 digest of the current graph's binary snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub hash: String,
    pub algorithm: String,
}

impl HashResponse {
    #[must_use]
    pub fn blake3(hash: String) -> Self {
        Self {
            hash,
            algorithm: "blake3".to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&CampusError> for ErrorResponse {
    fn from(err: &CampusError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
