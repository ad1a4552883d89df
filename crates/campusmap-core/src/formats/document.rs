//! # Text Document
//!
//! The human-editable JSON form of a campus graph.
//!
//! Records use the draft shapes, so any derived or defaulted field may be
//! omitted. Loading re-runs autocomplete on every record, which gives an
//! omitted field exactly the value creation would have assigned. Records
//! are completed buildings → floors → spaces → nodes → edges so that node
//! anchoring sees its space and edge distances see their endpoints.

use crate::autocomplete;
use crate::graph::CampusGraph;
use crate::primitives::{DOCUMENT_VERSION, MAX_DOCUMENT_SIZE};
use crate::{
    BuildingDraft, BuildingId, CampusError, EdgeDraft, EdgeId, FloorDraft, FloorId, NodeDraft,
    NodeId, SpaceDraft, SpaceId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

fn current_version() -> u32 {
    DOCUMENT_VERSION
}

/// On-disk document: a format version and the five entity mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub buildings: BTreeMap<BuildingId, BuildingDraft>,
    #[serde(default)]
    pub floors: BTreeMap<FloorId, FloorDraft>,
    #[serde(default)]
    pub spaces: BTreeMap<SpaceId, SpaceDraft>,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeDraft>,
    #[serde(default)]
    pub edges: BTreeMap<EdgeId, EdgeDraft>,
}

impl CampusDocument {
    /// Document with every field of every entity written explicitly.
    #[must_use]
    pub fn from_graph(graph: &CampusGraph) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            buildings: graph
                .buildings
                .iter()
                .map(|(id, b)| (id.clone(), BuildingDraft::from(b)))
                .collect(),
            floors: graph
                .floors
                .iter()
                .map(|(id, f)| (id.clone(), FloorDraft::from(f)))
                .collect(),
            spaces: graph
                .spaces
                .iter()
                .map(|(id, s)| (id.clone(), SpaceDraft::from(s)))
                .collect(),
            nodes: graph
                .nodes
                .iter()
                .map(|(id, n)| (id.clone(), NodeDraft::from(n)))
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|(id, e)| (id.clone(), EdgeDraft::from(e)))
                .collect(),
        }
    }

    /// Complete every record into a graph.
    ///
    /// No integrity checks run here: a loaded graph may be invalid, and
    /// validation reports why.
    pub fn into_graph(self) -> Result<CampusGraph, CampusError> {
        if self.version > DOCUMENT_VERSION {
            return Err(CampusError::DeserializationError(format!(
                "Unsupported document version: {} (newest known {})",
                self.version, DOCUMENT_VERSION
            )));
        }

        let mut graph = CampusGraph::new();

        for (id, draft) in self.buildings {
            record_id(&id, draft.id.as_ref())?;
            graph
                .buildings
                .insert(id.clone(), autocomplete::complete_building(draft, id));
        }
        for (id, draft) in self.floors {
            record_id(&id, draft.id.as_ref())?;
            graph
                .floors
                .insert(id.clone(), autocomplete::complete_floor(draft, id));
        }
        for (id, draft) in self.spaces {
            record_id(&id, draft.id.as_ref())?;
            graph
                .spaces
                .insert(id.clone(), autocomplete::complete_space(draft, id));
        }
        for (id, draft) in self.nodes {
            record_id(&id, draft.id.as_ref())?;
            let node = autocomplete::complete_node(&graph, draft, id.clone());
            graph.nodes.insert(id, node);
        }
        for (id, draft) in self.edges {
            record_id(&id, draft.id.as_ref())?;
            let edge = autocomplete::complete_edge(&graph, draft, id.clone());
            graph.edges.insert(id, edge);
        }

        Ok(graph)
    }
}

/// A record may omit its id; if present it must equal the map key.
fn record_id<I: PartialEq + Display>(key: &I, inner: Option<&I>) -> Result<(), CampusError> {
    match inner {
        Some(inner) if inner != key => Err(CampusError::DeserializationError(format!(
            "Record under key {key} carries id {inner}"
        ))),
        _ => Ok(()),
    }
}

/// Serialize a graph to a pretty-printed JSON document.
pub fn save(graph: &CampusGraph) -> Result<String, CampusError> {
    serde_json::to_string_pretty(&CampusDocument::from_graph(graph))
        .map_err(|e| CampusError::SerializationError(e.to_string()))
}

/// Parse a JSON document and complete it into a graph.
pub fn load(text: &str) -> Result<CampusGraph, CampusError> {
    if text.len() > MAX_DOCUMENT_SIZE {
        return Err(CampusError::DeserializationError(format!(
            "Document size {} bytes exceeds maximum allowed {} bytes",
            text.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let document: CampusDocument = serde_json::from_str(text)
        .map_err(|e| CampusError::DeserializationError(e.to_string()))?;
    document.into_graph()
}

// =============================================================================
// TESTS
// =============================================================================
