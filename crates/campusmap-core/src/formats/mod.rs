//! # Formats
//!
//! Pure encode/decode between a `CampusGraph` and bytes. File I/O lives in
//! the app layer.
//!
//! - `document`: pretty JSON, lenient records, autocomplete on load
//! - `snapshot`: binary header + postcard payload, exact

pub mod document;
pub mod snapshot;

use crate::CampusError;
use crate::graph::CampusGraph;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use document::{CampusDocument, load, save};
#[cfg(feature = "crypto-hash")]
pub use snapshot::snapshot_hash;
pub use snapshot::{SnapshotHeader, graph_from_bytes, graph_to_bytes, is_snapshot};

/// Persisted representations of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Json,
    Binary,
}

impl Format {
    /// Format of already-encoded bytes, by magic.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if is_snapshot(bytes) {
            Format::Binary
        } else {
            Format::Json
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Binary => f.write_str("binary"),
        }
    }
}

/// Encode a graph in the requested format.
pub fn encode(graph: &CampusGraph, format: Format) -> Result<Vec<u8>, CampusError> {
    match format {
        Format::Json => save(graph).map(String::into_bytes),
        Format::Binary => graph_to_bytes(graph),
    }
}

/// Decode a document or snapshot, whichever `bytes` holds.
pub fn decode(bytes: &[u8]) -> Result<CampusGraph, CampusError> {
    match Format::detect(bytes) {
        Format::Binary => graph_from_bytes(bytes),
        Format::Json => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| CampusError::DeserializationError(e.to_string()))?;
            load(text)
        }
    }
}

/// Every record is stored under its own id.
pub(crate) fn check_keys(graph: &CampusGraph) -> Result<(), CampusError> {
    let mismatch = graph
        .nodes
        .iter()
        .find(|(k, v)| *k != &v.id)
        .map(|(k, _)| k.to_string())
        .or_else(|| {
            graph
                .edges
                .iter()
                .find(|(k, v)| *k != &v.id)
                .map(|(k, _)| k.to_string())
        })
        .or_else(|| {
            graph
                .spaces
                .iter()
                .find(|(k, v)| *k != &v.id)
                .map(|(k, _)| k.to_string())
        })
        .or_else(|| {
            graph
                .buildings
                .iter()
                .find(|(k, v)| *k != &v.id)
                .map(|(k, _)| k.to_string())
        })
        .or_else(|| {
            graph
                .floors
                .iter()
                .find(|(k, v)| *k != &v.id)
                .map(|(k, _)| k.to_string())
        });

    match mismatch {
        Some(key) => Err(CampusError::DeserializationError(format!(
            "Record under key {key} carries a different id"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphManager, NodeDraft};

    #[test]
    fn decode_detects_both_formats() {
        let graph =
            GraphManager::add_node(&CampusGraph::new(), NodeDraft::with_id("n").at(1.0, 2.0))
                .expect("node");

        for format in [Format::Json, Format::Binary] {
            let bytes = encode(&graph, format).expect("encode");
            assert_eq!(Format::detect(&bytes), format);
            assert_eq!(decode(&bytes).expect("decode"), graph);
        }
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = decode(&[0xff, 0xfe, 0x00]).expect_err("not utf-8");
        assert_eq!(err.code(), "DeserializationError");
    }
}
