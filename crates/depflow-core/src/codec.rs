//! JSON graph files.
//!
//! ```json
//! {
//!   "directed": true,
//!   "n": 3,
//!   "source": 0,
//!   "weight_model": "edge",
//!   "edges": [{ "u": 0, "v": 1, "w": 2.0 }, { "u": 1, "v": 2, "w": 1.5 }],
//!   "nodes": [{ "id": 0, "name": "fetch", "task_type": "io", "duration": 2.0, "priority": 1 }]
//! }
//! ```
//!
//! `source` is optional; `-1` means no source. `weight_model` defaults to
//! `"edge"`. `nodes` is optional and may list any subset of vertices.
//!
//! Edges are written in insertion order, so loading a saved file rebuilds
//! identical adjacency lists. For undirected graphs only the inserted edges
//! are written, never their mirrors.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ErrorCode;
use crate::graph::model::{DEFAULT_WEIGHT_MODEL, Graph, Vertex};

/// Serialized form of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub u: i64,
    pub v: i64,
    pub w: f64,
}

/// Serialized form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub directed: bool,
    pub n: usize,
    #[serde(default = "no_source")]
    pub source: i64,
    #[serde(default = "default_weight_model")]
    pub weight_model: String,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Vertex>,
}

const fn no_source() -> i64 {
    -1
}

fn default_weight_model() -> String {
    DEFAULT_WEIGHT_MODEL.to_string()
}

/// Largest `n` a graph file may declare.
pub const MAX_VERTICES: usize = 1 << 24;

fn invalid(detail: impl std::fmt::Display) -> anyhow::Error {
    let code = ErrorCode::InvalidGraphFile;
    anyhow!("{} {}: {detail}", code.code(), code.message())
}

fn vertex_index(raw: i64, n: usize) -> Option<usize> {
    usize::try_from(raw).ok().filter(|&v| v < n)
}

impl GraphDocument {
    /// Snapshot `graph` into its file form.
    ///
    /// # Errors
    ///
    /// Fails only if a vertex index does not fit in an `i64`.
    pub fn from_graph(graph: &Graph) -> Result<Self> {
        let edges = graph
            .inserted_edges()
            .iter()
            .map(|e| {
                Ok(EdgeRecord {
                    u: i64::try_from(e.from)?,
                    v: i64::try_from(e.to)?,
                    w: e.weight,
                })
            })
            .collect::<Result<Vec<_>>>()
            .context("vertex index does not fit in a JSON integer")?;

        let source = match graph.source() {
            Some(s) => i64::try_from(s).context("source does not fit in a JSON integer")?,
            None => no_source(),
        };

        let nodes = graph
            .vertices()
            .iter()
            .filter(|v| **v != Vertex::new(v.id))
            .cloned()
            .collect();

        Ok(Self {
            directed: graph.is_directed(),
            n: graph.vertex_count(),
            source,
            weight_model: graph.weight_model().to_string(),
            edges,
            nodes,
        })
    }

    /// Build the graph this document describes.
    ///
    /// # Errors
    ///
    /// Returns an invalid-graph-file error naming the first edge, source or
    /// node entry that refers to a vertex outside `[0, n)`, or when `n`
    /// exceeds [`MAX_VERTICES`].
    pub fn into_graph(self) -> Result<Graph> {
        let n = self.n;
        if n > MAX_VERTICES {
            return Err(invalid(format!(
                "n = {n} exceeds the limit of {MAX_VERTICES} vertices"
            )));
        }
        let mut graph = Graph::new(n, self.directed);
        graph.set_weight_model(self.weight_model);

        for (i, edge) in self.edges.iter().enumerate() {
            let (Some(u), Some(v)) = (vertex_index(edge.u, n), vertex_index(edge.v, n)) else {
                return Err(invalid(format!(
                    "edge #{i} ({} -> {}) has an endpoint outside [0, {n})",
                    edge.u, edge.v
                )));
            };
            graph
                .add_edge(u, v, edge.w)
                .map_err(|e| invalid(format!("edge #{i}: {e}")))?;
        }

        if self.source != no_source() {
            let Some(source) = vertex_index(self.source, n) else {
                return Err(invalid(format!(
                    "source {} is outside [0, {n})",
                    self.source
                )));
            };
            graph
                .set_source(Some(source))
                .map_err(|e| invalid(format!("source: {e}")))?;
        }

        for vertex in self.nodes {
            let id = vertex.id;
            graph
                .set_vertex(vertex)
                .map_err(|e| invalid(format!("node {id}: {e}")))?;
        }

        Ok(graph)
    }
}

/// Parse a graph from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not a graph document or refers to
/// vertices outside `[0, n)`.
pub fn parse_graph(json: &str) -> Result<Graph> {
    let doc: GraphDocument = serde_json::from_str(json).map_err(invalid)?;
    doc.into_graph()
}

/// Load a graph file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
#[instrument]
pub fn load_graph(path: &Path) -> Result<Graph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file {}", path.display()))?;
    let graph =
        parse_graph(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(
        n = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Render `graph` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn graph_to_json(graph: &Graph) -> Result<String> {
    let doc = GraphDocument::from_graph(graph)?;
    serde_json::to_string_pretty(&doc).context("Failed to serialize graph")
}

/// Write `graph` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
#[instrument(skip(graph))]
pub fn save_graph(path: &Path, graph: &Graph) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = graph_to_json(graph)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(edges = graph.inserted_edges().len(), "graph saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::Edge;

    const SAMPLE: &str = r#"{
        "directed": true,
        "n": 4,
        "source": 0,
        "weight_model": "edge",
        "edges": [
            {"u": 0, "v": 2, "w": 3},
            {"u": 0, "v": 1, "w": 5},
            {"u": 2, "v": 3, "w": -1.5}
        ]
    }"#;

    #[test]
    fn parses_sample_document() {
        let g = parse_graph(SAMPLE).expect("valid document");
        assert_eq!(g.vertex_count(), 4);
        assert!(g.is_directed());
        assert_eq!(g.source(), Some(0));
        assert_eq!(g.weight_model(), "edge");
        assert_eq!(
            g.edges_of(0),
            &[Edge::new(0, 2, 3.0), Edge::new(0, 1, 5.0)],
            "file order is adjacency order"
        );
        assert_eq!(g.edges_of(2), &[Edge::new(2, 3, -1.5)]);
    }

    #[test]
    fn optional_fields_default() {
        let g = parse_graph(r#"{"directed": true, "n": 2, "edges": []}"#).expect("valid");
        assert_eq!(g.source(), None);
        assert_eq!(g.weight_model(), DEFAULT_WEIGHT_MODEL);

        let g = parse_graph(r#"{"directed": true, "n": 2, "source": -1, "edges": []}"#)
            .expect("valid");
        assert_eq!(g.source(), None);
    }

    #[test]
    fn out_of_range_edge_is_invalid_file() {
        let err = parse_graph(r#"{"directed": true, "n": 2, "edges": [{"u": 0, "v": 2, "w": 1}]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("E3001"), "{err}");
        assert!(err.contains("edge #0 (0 -> 2)"), "{err}");

        let err = parse_graph(r#"{"directed": true, "n": 2, "edges": [{"u": -3, "v": 1, "w": 1}]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("-3 -> 1"), "{err}");
    }

    #[test]
    fn bad_source_and_bad_json_are_rejected() {
        assert!(parse_graph(r#"{"directed": true, "n": 2, "source": 2, "edges": []}"#).is_err());
        assert!(parse_graph(r#"{"directed": true, "n": 2, "source": -2, "edges": []}"#).is_err());
        let err = parse_graph("{ not json").unwrap_err().to_string();
        assert!(err.starts_with("E3001"), "{err}");
        assert!(parse_graph(r#"{"n": 2, "edges": []}"#).is_err(), "directed is required");
    }

    #[test]
    fn oversized_vertex_count_is_invalid_file() {
        for n in [u64::MAX, 1_000_000_000_000, MAX_VERTICES as u64 + 1] {
            let json = format!(r#"{{"directed": true, "n": {n}, "edges": []}}"#);
            let err = parse_graph(&json).unwrap_err().to_string();
            assert!(err.starts_with("E3001"), "n = {n}: {err}");
            assert!(err.contains("exceeds the limit"));
        }

        let g = parse_graph(r#"{"directed": true, "n": 1000, "edges": []}"#).expect("small n");
        assert_eq!(g.vertex_count(), 1000);
    }

    #[test]
    fn node_metadata_loads() {
        let g = parse_graph(
            r#"{"directed": true, "n": 2, "edges": [],
                "nodes": [{"id": 1, "name": "build", "task_type": "cpu", "duration": 4.5, "priority": 3}]}"#,
        )
        .expect("valid");
        let v = g.vertex(1).expect("vertex 1");
        assert_eq!(v.name, "build");
        assert_eq!(v.task_type, "cpu");
        assert_eq!(g.vertex(0).expect("vertex 0").name, "Task_0");
    }

    #[test]
    fn undirected_graphs_write_inserted_edges_only() {
        let mut g = Graph::new(3, false);
        g.add_edge(0, 1, 1.0).expect("edge");
        g.add_edge(1, 2, 2.0).expect("edge");

        let doc = GraphDocument::from_graph(&g).expect("doc");
        assert_eq!(doc.edges.len(), 2);
        assert!(!doc.directed);
        assert_eq!(doc.source, -1);
        assert!(doc.nodes.is_empty(), "default metadata is not written");

        let back = doc.into_graph().expect("graph");
        assert_eq!(back.edge_count(), g.edge_count());
        assert_eq!(back.edges_of(1), g.edges_of(1));
    }

    #[test]
    fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/deeper/graph.json");

        let mut g = parse_graph(SAMPLE).expect("valid");
        g.set_vertex(Vertex::with_task(3, "ship", "io", 2.0, 5))
            .expect("vertex");
        save_graph(&path, &g).expect("save");

        let back = load_graph(&path).expect("load");
        assert_eq!(back.content_hash(), g.content_hash());
        assert_eq!(back.source(), Some(0));
        assert_eq!(back.vertex(3), g.vertex(3));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_graph(Path::new("/definitely/not/here.json"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("/definitely/not/here.json"), "{err}");
    }
}
