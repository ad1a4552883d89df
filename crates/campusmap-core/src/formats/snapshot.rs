//! # Binary Snapshot
//!
//! Compact, exact serialization of a committed graph.
//!
//! Format: Header (5 bytes) + postcard-serialized `CampusGraph`.
//! - 4 bytes: Magic ("CMAP")
//! - 1 byte: Version
//!
//! Unlike the text document, a snapshot stores every derived field and is
//! decoded as-is; autocomplete does not run on load. Size and header are
//! checked before the payload is touched.

use crate::graph::CampusGraph;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_DOCUMENT_SIZE};
use crate::CampusError;

/// Header length in bytes.
pub const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The snapshot header precedes all graph data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Check magic bytes and version.
    pub fn validate(&self) -> Result<(), CampusError> {
        if &self.magic != MAGIC_BYTES {
            return Err(CampusError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(CampusError::DeserializationError(format!(
                "Unsupported snapshot version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [m0, m1, m2, m3] = self.magic;
        [m0, m1, m2, m3, self.version]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CampusError> {
        match bytes {
            [m0, m1, m2, m3, version, ..] => Ok(Self {
                magic: [*m0, *m1, *m2, *m3],
                version: *version,
            }),
            _ => Err(CampusError::DeserializationError(format!(
                "Snapshot too short: minimum {HEADER_SIZE} bytes required"
            ))),
        }
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `bytes` start with the snapshot magic.
#[must_use]
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC_BYTES)
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Serialize a graph to header + payload.
pub fn graph_to_bytes(graph: &CampusGraph) -> Result<Vec<u8>, CampusError> {
    let payload =
        postcard::to_stdvec(graph).map_err(|e| CampusError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&SnapshotHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize a graph from header + payload.
///
/// Map keys must match the ids stored in their records.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<CampusGraph, CampusError> {
    if bytes.len() > MAX_DOCUMENT_SIZE {
        return Err(CampusError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    let graph: CampusGraph = postcard::from_bytes(payload).map_err(|e| {
        CampusError::DeserializationError(format!("Failed to decode snapshot payload: {e}"))
    })?;

    super::check_keys(&graph)?;
    Ok(graph)
}

/// BLAKE3 hex digest of the graph's snapshot bytes.
///
/// Equal graphs always hash equal, since maps serialize in key order.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_hash(graph: &CampusGraph) -> Result<String, CampusError> {
    let bytes = graph_to_bytes(graph)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeDraft, GraphManager, NodeDraft, NodeId};

    fn sample() -> CampusGraph {
        let g = CampusGraph::new();
        let g = GraphManager::add_node(&g, NodeDraft::with_id("a").at(0.0, 0.0)).expect("a");
        let g = GraphManager::add_node(&g, NodeDraft::with_id("b").at(3.0, 4.0)).expect("b");
        GraphManager::add_edge(&g, EdgeDraft::new("a", "b").with_id("ab")).expect("ab")
    }

    #[test]
    fn header_roundtrip() {
        let bytes = SnapshotHeader::new().to_bytes();
        let restored = SnapshotHeader::from_bytes(&bytes).expect("parse header");
        assert_eq!(restored, SnapshotHeader::new());
        assert_eq!(&bytes[..4], b"CMAP");
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let graph = sample();
        let first = graph_to_bytes(&graph).expect("encode");
        let restored = graph_from_bytes(&first).expect("decode");
        assert_eq!(restored, graph);

        let second = graph_to_bytes(&restored).expect("re-encode");
        assert_eq!(first, second, "save -> load -> save must produce identical bytes");
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");
        let err = graph_from_bytes(&bytes).expect_err("bad magic");
        assert_eq!(err.code(), "DeserializationError");
        assert!(!is_snapshot(&bytes));
    }

    #[test]
    fn short_and_truncated_input_rejected() {
        assert!(graph_from_bytes(b"CMA").is_err());

        let bytes = graph_to_bytes(&sample()).expect("encode");
        assert!(graph_from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = graph_to_bytes(&sample()).expect("encode");
        bytes[4] = FORMAT_VERSION + 1;
        assert!(graph_from_bytes(&bytes).is_err());
    }

    #[test]
    fn mismatched_key_rejected() {
        let mut graph = sample();
        if let Some(mut node) = graph.nodes.remove(&NodeId::new("a")) {
            node.id = NodeId::new("other");
            graph.nodes.insert(NodeId::new("a"), node);
        }
        let bytes = graph_to_bytes(&graph).expect("encode");
        assert!(graph_from_bytes(&bytes).is_err());
    }

    #[cfg(feature = "crypto-hash")]
    #[test]
    fn hash_is_deterministic_hex() {
        let h1 = snapshot_hash(&sample()).expect("hash");
        let h2 = snapshot_hash(&sample()).expect("hash");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);

        let other = GraphManager::add_node(&sample(), NodeDraft::with_id("c")).expect("c");
        assert_ne!(h1, snapshot_hash(&other).expect("hash"));
    }
}
