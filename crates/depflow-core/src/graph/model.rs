//! Adjacency-list graph model shared by every analysis.
//!
//! # Edge Order
//!
//! Outgoing edges are stored per vertex in insertion order. Traversal
//! tie-breaking (component ids, topological order, predecessor choice on
//! equal distances) depends on that order, so it is never re-sorted.
//!
//! # Directed vs Undirected
//!
//! In directed mode an edge `u → v` lands only in `u`'s forward list (and in
//! `v`'s reverse list). Undirected mode also mirrors it as `v → u` into `v`'s
//! forward list and `u`'s reverse list.
//!
//! The graph is built once with a fixed vertex count and then only grows by
//! edge insertion. Analyses borrow it immutably, so a finished graph can be
//! shared across threads without locking.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, check_index};

/// Weight model label used when none is supplied.
pub const DEFAULT_WEIGHT_MODEL: &str = "edge";

// ---------------------------------------------------------------------------
// Edge / Vertex
// ---------------------------------------------------------------------------

/// A weighted directed edge. Weights may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

impl Edge {
    #[must_use]
    pub const fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// The same edge pointing the other way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            weight: self.weight,
        }
    }
}

/// Descriptive task metadata attached to a vertex.
///
/// Carried through for reporting; no algorithm reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: usize,
    pub name: String,
    pub task_type: String,
    pub duration: f64,
    pub priority: u32,
}

impl Vertex {
    /// Default metadata for vertex `id`: `Task_<id>`, type `general`.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            name: format!("Task_{id}"),
            task_type: "general".to_string(),
            duration: 1.0,
            priority: 1,
        }
    }

    #[must_use]
    pub fn with_task(
        id: usize,
        name: impl Into<String>,
        task_type: impl Into<String>,
        duration: f64,
        priority: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            task_type: task_type.into(),
            duration,
            priority,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A graph over the dense vertex range `[0, n)`.
#[derive(Debug, Clone)]
pub struct Graph {
    n: usize,
    directed: bool,
    adj: Vec<Vec<Edge>>,
    reverse_adj: Vec<Vec<Edge>>,
    /// Every `add_edge` call, in call order (mirrors excluded).
    inserted: Vec<Edge>,
    weight_model: String,
    source: Option<usize>,
    vertices: Vec<Vertex>,
}

impl Graph {
    /// Create a graph with `n` vertices and no edges.
    #[must_use]
    pub fn new(n: usize, directed: bool) -> Self {
        Self {
            n,
            directed,
            adj: vec![Vec::new(); n],
            reverse_adj: vec![Vec::new(); n],
            inserted: Vec::new(),
            weight_model: DEFAULT_WEIGHT_MODEL.to_string(),
            source: None,
            vertices: (0..n).map(Vertex::new).collect(),
        }
    }

    /// Shorthand for a directed graph built from `(u, v, w)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::OutOfRange`] if any endpoint is `>= n`.
    pub fn directed_from_edges(
        n: usize,
        edges: &[(usize, usize, f64)],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(n, true);
        for &(u, v, w) in edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Append the edge `u → v` with weight `w`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::OutOfRange`] if `u` or `v` is `>= n`. The graph
    /// is left untouched in that case.
    pub fn add_edge(&mut self, u: usize, v: usize, w: f64) -> Result<(), GraphError> {
        check_index(u, self.n)?;
        check_index(v, self.n)?;

        let edge = Edge::new(u, v, w);
        self.adj[u].push(edge);
        self.reverse_adj[v].push(edge.reversed());

        if !self.directed {
            self.adj[v].push(edge.reversed());
            self.reverse_adj[u].push(edge);
        }

        self.inserted.push(edge);
        Ok(())
    }

    /// Outgoing edges of `u`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `u >= n`.
    #[must_use]
    pub fn edges_of(&self, u: usize) -> &[Edge] {
        &self.adj[u]
    }

    /// Incoming edges of `v`, stored flipped (`from == v`, `to` = origin).
    ///
    /// # Panics
    ///
    /// Panics if `v >= n`.
    #[must_use]
    pub fn reverse_edges_of(&self, v: usize) -> &[Edge] {
        &self.reverse_adj[v]
    }

    /// Every inserted edge in call order, without undirected mirrors.
    #[must_use]
    pub fn inserted_edges(&self) -> &[Edge] {
        &self.inserted
    }

    /// Iterate all adjacency entries vertex by vertex (mirrors included).
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adj.iter().flatten()
    }

    /// Sum of all adjacency list sizes.
    ///
    /// An undirected edge is counted twice (once per direction).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.n
    }

    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn out_degree(&self, u: usize) -> usize {
        self.adj.get(u).map_or(0, Vec::len)
    }

    /// In-degree of every vertex, counted from the forward lists.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0_usize; self.n];
        for edge in self.all_edges() {
            in_degree[edge.to] += 1;
        }
        in_degree
    }

    #[must_use]
    pub fn weight_model(&self) -> &str {
        &self.weight_model
    }

    pub fn set_weight_model(&mut self, model: impl Into<String>) {
        self.weight_model = model.into();
    }

    #[must_use]
    pub const fn source(&self) -> Option<usize> {
        self.source
    }

    /// Designate (or clear) the source vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::OutOfRange`] if `source` is `>= n`.
    pub fn set_source(&mut self, source: Option<usize>) -> Result<(), GraphError> {
        if let Some(s) = source {
            check_index(s, self.n)?;
        }
        self.source = source;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Vertex metadata
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn vertex(&self, id: usize) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Replace the metadata for `vertex.id`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::OutOfRange`] if `vertex.id` is `>= n`.
    pub fn set_vertex(&mut self, vertex: Vertex) -> Result<(), GraphError> {
        let id = check_index(vertex.id, self.n)?;
        self.vertices[id] = vertex;
        Ok(())
    }

    /// Number of vertices per task type, keyed alphabetically.
    #[must_use]
    pub fn task_type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for vertex in &self.vertices {
            *counts.entry(vertex.task_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Mean task duration, or 0.0 for an empty graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_duration(&self) -> f64 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        let total: f64 = self.vertices.iter().map(|v| v.duration).sum();
        total / self.vertices.len() as f64
    }

    // -----------------------------------------------------------------------
    // Derived copies
    // -----------------------------------------------------------------------

    /// Copy of this graph with every edge weight negated.
    ///
    /// Edges are replayed in insertion order, so adjacency order (and with it
    /// every tie-break) matches the original.
    #[must_use]
    pub fn negated(&self) -> Self {
        let mut negated = Self {
            n: self.n,
            directed: self.directed,
            adj: vec![Vec::new(); self.n],
            reverse_adj: vec![Vec::new(); self.n],
            inserted: Vec::with_capacity(self.inserted.len()),
            weight_model: self.weight_model.clone(),
            source: self.source,
            vertices: self.vertices.clone(),
        };
        for edge in &self.inserted {
            // Endpoints were validated on the way into `self`.
            let _ = negated.add_edge(edge.from, edge.to, -edge.weight);
        }
        negated
    }

    /// BLAKE3 fingerprint of the vertex count, mode and edge list.
    ///
    /// Edge order is part of the fingerprint because it drives tie-breaking.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.n as u64).to_le_bytes());
        hasher.update(&[u8::from(self.directed)]);
        for edge in &self.inserted {
            hasher.update(&(edge.from as u64).to_le_bytes());
            hasher.update(&(edge.to as u64).to_le_bytes());
            hasher.update(&edge.weight.to_bits().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
