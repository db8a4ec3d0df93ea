//! Single-source shortest and critical (longest) paths on DAGs.
//!
//! # Shortest Path
//!
//! Vertices are relaxed in topological order, so any real edge weight is
//! allowed, negative ones included. Correctness rests on acyclicity, not on
//! non-negative weights; a cyclic input fails with
//! [`GraphError::CycleDetected`] before any relaxation happens.
//!
//! A relaxation only replaces a distance when strictly smaller, so on ties
//! the predecessor found first (earliest in topological order, then edge
//! insertion order) is kept.
//!
//! # Critical Path
//!
//! The longest path is the shortest path on a copy of the graph with every
//! weight negated. Negative weights are harmless here because a DAG has no
//! cycles, negative or otherwise. Finite distances are negated back; the
//! reconstructed path is used as is.
//!
//! # Unreachable Targets
//!
//! Not an error: the distance stays `f64::INFINITY` and the path is empty.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument};

use crate::counters::Counters;
use crate::error::{GraphError, check_index};
use crate::graph::model::Graph;
use crate::graph::topo::topological_order;

/// Distances, predecessors and (optionally) one reconstructed path.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub source: usize,
    pub target: Option<usize>,
    /// Distance from `source`; `f64::INFINITY` when unreachable.
    pub distances: Vec<f64>,
    /// Predecessor on the best path; `None` for the source and unreachable
    /// vertices.
    pub predecessors: Vec<Option<usize>>,
    /// `source ..= target`, or empty when no target was requested or the
    /// target is unreachable.
    pub path: Vec<usize>,
    pub counters: Counters,
}

impl PathResult {
    /// Distance to `v`, or `None` if `v` is not a vertex.
    #[must_use]
    pub fn distance_to(&self, v: usize) -> Option<f64> {
        self.distances.get(v).copied()
    }

    #[must_use]
    pub fn is_reachable(&self, v: usize) -> bool {
        self.distance_to(v).is_some_and(f64::is_finite)
    }

    /// Distance to the requested target, if one was requested and reached.
    #[must_use]
    pub fn target_distance(&self) -> Option<f64> {
        self.target
            .and_then(|t| self.distance_to(t))
            .filter(|d| d.is_finite())
    }

    /// `(vertex, distance)` for every reachable vertex, ascending by vertex.
    #[must_use]
    pub fn reachable(&self) -> Vec<(usize, f64)> {
        self.distances
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .collect()
    }
}

/// Shortest distances from `source` over the DAG `graph`.
///
/// With `target = Some(t)` the path `source → … → t` is reconstructed too;
/// with `None` only the distance and predecessor arrays are filled.
///
/// # Errors
///
/// - [`GraphError::OutOfRange`] if `source` or `target` is not a vertex.
/// - [`GraphError::CycleDetected`] if `graph` has a cycle.
#[instrument(skip(graph), fields(n = graph.vertex_count()))]
pub fn shortest_path(
    graph: &Graph,
    source: usize,
    target: Option<usize>,
) -> Result<PathResult, GraphError> {
    let n = graph.vertex_count();
    check_index(source, n)?;
    if let Some(t) = target {
        check_index(t, n)?;
    }

    let topo = topological_order(graph)?;
    let mut counters = topo.counters;

    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors: Vec<Option<usize>> = vec![None; n];
    distances[source] = 0.0;

    for &u in &topo.order {
        counters.visit();
        let du = distances[u];
        if !du.is_finite() {
            continue;
        }
        for edge in graph.edges_of(u) {
            counters.relax();
            let candidate = du + edge.weight;
            if candidate < distances[edge.to] {
                distances[edge.to] = candidate;
                predecessors[edge.to] = Some(u);
            }
        }
    }

    let path = target
        .filter(|&t| distances[t].is_finite())
        .map(|t| reconstruct_path(&predecessors, source, t))
        .unwrap_or_default();

    debug!(
        source,
        reachable = distances.iter().filter(|d| d.is_finite()).count(),
        path_len = path.len(),
        "shortest path sweep complete"
    );

    Ok(PathResult {
        source,
        target,
        distances,
        predecessors,
        path,
        counters,
    })
}

/// Longest distances from `source` over the DAG `graph`.
///
/// Same contract as [`shortest_path`], with "best" meaning largest total
/// weight.
///
/// # Errors
///
/// - [`GraphError::OutOfRange`] if `source` or `target` is not a vertex.
/// - [`GraphError::CycleDetected`] if `graph` has a cycle.
#[instrument(skip(graph), fields(n = graph.vertex_count()))]
pub fn critical_path(
    graph: &Graph,
    source: usize,
    target: Option<usize>,
) -> Result<PathResult, GraphError> {
    let negated = graph.negated();
    let mut result = shortest_path(&negated, source, target)?;
    for d in result.distances.iter_mut().filter(|d| d.is_finite()) {
        // `0.0 - x` keeps the source at +0.0 instead of -0.0.
        *d = 0.0 - *d;
    }
    Ok(result)
}

/// Walk predecessor links back from `target`.
///
/// Returns an empty path unless the walk lands exactly on `source`.
fn reconstruct_path(predecessors: &[Option<usize>], source: usize, target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;

    while current != source {
        match predecessors[current] {
            Some(prev) if path.len() <= predecessors.len() => {
                path.push(prev);
                current = prev;
            }
            _ => return Vec::new(),
        }
    }

    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
