//! # Document Store
//!
//! File-backed persistence of the campus graph. The store remembers the
//! format it found on disk and writes back in the same one.

use campusmap_core::primitives::MAX_DOCUMENT_SIZE;
use campusmap_core::{CampusError, CampusGraph, Format, decode, encode};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A campus document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    path: PathBuf,
    format: Format,
}

impl DocumentStore {
    /// Store at `path` writing `format`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Open `path`, returning the store and its graph.
    ///
    /// A missing file yields an empty graph and a JSON store.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, CampusGraph), CampusError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!("No document at {}, starting empty", path.display());
            return Ok((Self::new(path, Format::Json), CampusGraph::new()));
        }

        let bytes = read_limited(&path)?;
        let format = Format::detect(&bytes);
        let graph = decode(&bytes)?;
        tracing::debug!(
            "Loaded {} document from {}: {} nodes, {} edges",
            format,
            path.display(),
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok((Self::new(path, format), graph))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Write `graph` synchronously.
    pub fn save(&self, graph: &CampusGraph) -> Result<(), CampusError> {
        write_atomic(&self.path, &encode(graph, self.format)?)
    }

    /// Write `graph` from async code.
    pub async fn persist(&self, graph: &CampusGraph) -> Result<(), CampusError> {
        let bytes = encode(graph, self.format)?;
        let staging = staging_path(&self.path);

        if let Err(e) = stage_async(&staging, &self.path, &bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(write_error(&self.path, &e));
        }
        Ok(())
    }
}

/// Sibling file a document is staged in before it replaces the original.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_error(path: &Path, e: &std::io::Error) -> CampusError {
    CampusError::IoError(format!("Write '{}': {}", path.display(), e))
}

/// Write `bytes` to a staging file, sync it and rename it over `path`.
///
/// A crash mid-write leaves the previous contents of `path` intact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CampusError> {
    let staging = staging_path(path);

    if let Err(e) = stage(&staging, path, bytes) {
        let _ = std::fs::remove_file(&staging);
        return Err(write_error(path, &e));
    }
    Ok(())
}

fn stage(staging: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(staging)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(staging, path)
}

async fn stage_async(staging: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(staging).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(staging, path).await
}

/// Read a file, refusing anything larger than a document may be.
pub fn read_limited(path: &Path) -> Result<Vec<u8>, CampusError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CampusError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > MAX_DOCUMENT_SIZE as u64 {
        return Err(CampusError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    std::fs::read(path)
        .map_err(|e| CampusError::IoError(format!("Read '{}': {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusmap_core::{GraphManager, NodeDraft};

    fn one_node() -> CampusGraph {
        GraphManager::add_node(&CampusGraph::new(), NodeDraft::with_id("gate").at(1.0, 2.0))
            .expect("node")
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, graph) = DocumentStore::open(dir.path().join("campus.json")).expect("open");
        assert!(graph.is_empty());
        assert_eq!(store.format(), Format::Json);
    }

    #[test]
    fn keeps_binary_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("campus.cmap");
        DocumentStore::new(&path, Format::Binary)
            .save(&one_node())
            .expect("save");

        let (store, graph) = DocumentStore::open(&path).expect("open");
        assert_eq!(store.format(), Format::Binary);
        assert_eq!(graph, one_node());
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("campus.json");
        std::fs::write(&path, b"{ not json").expect("write");

        let err = DocumentStore::open(&path).expect_err("garbage");
        assert_eq!(err.code(), "DeserializationError");
    }

    #[test]
    fn save_replaces_without_leaving_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("campus.json");
        std::fs::write(&path, "stale").expect("seed");

        DocumentStore::new(&path, Format::Json)
            .save(&one_node())
            .expect("save");

        let (_, graph) = DocumentStore::open(&path).expect("open");
        assert_eq!(graph, one_node());
        assert!(!staging_path(&path).exists());
        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("campus.json");
        DocumentStore::new(&path, Format::Json)
            .save(&one_node())
            .expect("save");

        // A directory squatting on the staging name makes the write fail.
        std::fs::create_dir(staging_path(&path)).expect("block staging");
        let err = DocumentStore::new(&path, Format::Json)
            .save(&CampusGraph::new())
            .expect_err("blocked");
        assert_eq!(err.code(), "IoError");

        let (_, graph) = DocumentStore::open(&path).expect("open");
        assert_eq!(graph, one_node());
    }

    #[test]
    fn staging_path_is_a_sibling() {
        let path = Path::new("/data/campus.json");
        assert_eq!(staging_path(path), Path::new("/data/campus.json.tmp"));
    }

    #[tokio::test]
    async fn persist_writes_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("campus.json");
        let store = DocumentStore::new(&path, Format::Json);
        store.persist(&one_node()).await.expect("persist");

        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"gate\""));
        assert!(!staging_path(&path).exists());
    }
}
