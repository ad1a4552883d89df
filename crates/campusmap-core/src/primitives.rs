//! # Primitives
//!
//! Compiled-in defaults and format constants for campusmap.
//!
//! Snap thresholds are in floor units (the unit of `Point` coordinates);
//! times are in seconds and speeds in floor units per second.

/// Vertex snap radius.
pub const DEFAULT_VERTEX_THRESHOLD: f64 = 8.0;

/// Edge snap radius. Smaller than the vertex radius so that corners win.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 6.0;

/// Maximum off-axis deviation for an orthogonal snap.
pub const DEFAULT_ORTHOGONAL_THRESHOLD: f64 = 5.0;

/// Grid pitch used when grid snapping is enabled without an explicit size.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Average walking speed used to derive edge times (1.4 m/s).
pub const DEFAULT_WALKING_SPEED: f64 = 1.4;

/// Tolerance for orientation tests in segment intersection.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

// =============================================================================
// FORMATS
// =============================================================================

/// Magic bytes for the binary snapshot header.
///
/// - File Header = Magic Bytes ("CMAP") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"CMAP";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// Current text document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Largest document or snapshot accepted for decoding (64 MB).
///
/// Checked before any parsing so that a corrupt length cannot force a
/// huge allocation.
pub const MAX_DOCUMENT_SIZE: usize = 64 * 1024 * 1024;
