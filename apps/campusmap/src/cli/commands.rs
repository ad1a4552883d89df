//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::config::Config;
use crate::store::{DocumentStore, read_limited, write_atomic};
use campusmap_core::{
    CampusError, CampusGraph, CampusMetrics, FloorId, Format, Point, RouteRequest, Severity,
    SnapConfig, SnapContext, decode, encode, find_route, find_snap, formats::snapshot_hash,
    validate,
};
use std::path::{Path, PathBuf};

/// Validate file path for security.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &Path) -> Result<PathBuf, CampusError> {
    let canonical = path.canonicalize().map_err(|e| {
        CampusError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CampusError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate output path for security.
///
/// For output files, we validate the parent directory exists.
fn validate_output_path(path: &Path) -> Result<PathBuf, CampusError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CampusError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CampusError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CampusError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Print a JSON value the way every `--json-mode` command does.
fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Load the graph behind `doc`; a missing document is an empty graph.
pub fn load_graph(doc: &Path) -> Result<CampusGraph, CampusError> {
    DocumentStore::open(doc).map(|(_, graph)| graph)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    doc: &Path,
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), CampusError> {
    let (store, graph) = DocumentStore::open(doc)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    println!("campusmap server starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", addr);
    println!("  Document: {} ({})", store.path().display(), store.format());
    println!("  Nodes:    {}", graph.nodes.len());
    println!("  Edges:    {}", graph.edges.len());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(graph).with_config(config).with_store(store);
    api::run_server(&addr, state).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph counts and validation summary.
pub fn cmd_status(doc: &Path, json_mode: bool) -> Result<(), CampusError> {
    let graph = load_graph(doc)?;
    let metrics = CampusMetrics::from_graph(&graph);
    let report = validate(&graph);

    if json_mode {
        print_json(&serde_json::json!({
            "document": doc.to_string_lossy(),
            "metrics": metrics,
            "is_valid": report.is_valid,
            "errors": report.summary.errors,
            "warnings": report.summary.warnings,
        }));
        return Ok(());
    }

    println!("Campus Graph Status");
    println!("===================");
    println!("Document:   {}", doc.display());
    println!();
    println!("Buildings:  {}", metrics.building_count);
    println!("Floors:     {}", metrics.floor_count);
    println!("Spaces:     {}", metrics.space_count);
    println!("Nodes:      {}", metrics.node_count);
    println!("Edges:      {}", metrics.edge_count);
    println!("Components: {}", metrics.components);
    println!("Isolated:   {}", metrics.isolated_nodes);
    println!("Length:     {:.2}", metrics.total_edge_length);
    println!();
    println!(
        "Validation: {} ({} errors, {} warnings)",
        if report.is_valid { "valid" } else { "INVALID" },
        report.summary.errors,
        report.summary.warnings
    );

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Print every validation issue.
pub fn cmd_validate(doc: &Path, json_mode: bool) -> Result<(), CampusError> {
    let graph = load_graph(doc)?;
    let report = validate(&graph);

    if !report.is_valid {
        tracing::warn!(
            "{} has {} validation errors",
            doc.display(),
            report.summary.errors
        );
    }

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    if report.issues.is_empty() {
        println!("No issues found");
        return Ok(());
    }

    for issue in &report.issues {
        let severity = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("[{:<7}] {:<4} {}", severity, issue.rule, issue.message);
        if !issue.target_ids.is_empty() {
            println!("          -> {}", issue.target_ids.join(", "));
        }
    }
    println!();
    println!(
        "{} errors, {} warnings",
        report.summary.errors, report.summary.warnings
    );

    Ok(())
}

// =============================================================================
// ROUTE COMMAND
// =============================================================================

/// Find and print a route.
pub fn cmd_route(doc: &Path, json_mode: bool, request: &RouteRequest) -> Result<(), CampusError> {
    let graph = load_graph(doc)?;
    let route = find_route(&graph, request);

    if json_mode {
        print_json(&serde_json::json!({
            "found": route.is_some(),
            "route": route,
        }));
        return Ok(());
    }

    match route {
        Some(route) => {
            println!("Route {} -> {}:", request.start, request.end);
            let path: Vec<&str> = route.nodes.iter().map(|n| n.as_str()).collect();
            println!("  Nodes:    {}", path.join(" -> "));
            println!("  Edges:    {}", route.edges.len());
            println!("  Distance: {:.2}", route.total_distance);
            println!("  Time:     {:.1} s", route.total_time);
        }
        None => println!(
            "No route from {} to {} under the given constraints",
            request.start, request.end
        ),
    }

    Ok(())
}

// =============================================================================
// SNAP COMMAND
// =============================================================================

/// Snap a cursor and print the result.
pub fn cmd_snap(
    doc: &Path,
    json_mode: bool,
    cursor: (f64, f64),
    floor: Option<String>,
    previous: Option<(f64, f64)>,
    config: &SnapConfig,
) -> Result<(), CampusError> {
    let graph = load_graph(doc)?;
    let floor = floor.map(FloorId::from);
    let mut context = SnapContext::from_graph(&graph, floor.as_ref());
    if let Some((x, y)) = previous {
        context = context.with_previous(Point::new(x, y));
    }

    let result = find_snap(Point::new(cursor.0, cursor.1), &context, config);

    if json_mode {
        print_json(&result);
        return Ok(());
    }

    println!(
        "Snapped ({}, {}) -> ({}, {}) [{:?}]",
        cursor.0, cursor.1, result.position.x, result.position.y, result.kind
    );
    if let Some(target) = &result.target {
        println!("  Target: {:?}", target);
    }

    Ok(())
}

// =============================================================================
// CONVERT COMMAND
// =============================================================================

/// Re-encode the document into `output`.
pub fn cmd_convert(doc: &Path, output: &Path, format: Format) -> Result<(), CampusError> {
    let input = validate_file_path(doc)?;
    let graph = decode(&read_limited(&input)?)?;

    let validated_output = validate_output_path(output)?;
    let data = encode(&graph, format)?;
    write_atomic(&validated_output, &data)?;

    println!(
        "Wrote {} bytes ({}) to {}",
        data.len(),
        format,
        validated_output.display()
    );

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty JSON document.
pub fn cmd_init(doc: &Path, force: bool) -> Result<(), CampusError> {
    if doc.exists() && !force {
        return Err(CampusError::IoError(
            "Document already exists. Use --force to overwrite.".to_string(),
        ));
    }

    DocumentStore::new(doc, Format::Json).save(&CampusGraph::new())?;
    println!("Initialized empty campus document at {}", doc.display());

    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the BLAKE3 hash of the graph snapshot.
pub fn cmd_hash(doc: &Path, json_mode: bool) -> Result<(), CampusError> {
    let graph = load_graph(doc)?;
    let hash = snapshot_hash(&graph)?;

    if json_mode {
        print_json(&serde_json::json!({
            "hash": hash,
            "algorithm": "blake3",
            "nodes": graph.nodes.len(),
            "edges": graph.edges.len(),
        }));
        return Ok(());
    }

    println!("BLAKE3: {}", hash);
    Ok(())
}
