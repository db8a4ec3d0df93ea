//! Summary statistics for components and graphs.
//!
//! # Statistics Provided
//!
//! [`ComponentStats`] summarises a component partition:
//!
//! - **total**: number of components.
//! - **trivial**: components with exactly one vertex.
//! - **cyclic**: components with more than one vertex.
//! - **largest_size** / **average_size**: size extremes over components.
//!
//! [`GraphStats`] summarises an original graph together with its
//! condensation:
//!
//! - **density**: `edge_count / (node_count * (node_count - 1))`; 0.0 for
//!   graphs with fewer than two vertices.
//! - **isolated_node_count**: vertices with no in- or out-edges.
//! - **max_in_degree** / **max_out_degree** over the original graph.
//! - **condensation_edge_count**: edges left after collapsing components.

use std::fmt;

use serde::Serialize;

use crate::graph::condense::Condensation;
use crate::graph::model::Graph;
use crate::graph::scc::Components;

// ---------------------------------------------------------------------------
// ComponentStats
// ---------------------------------------------------------------------------

/// Size statistics over a component partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStats {
    pub total: usize,
    pub trivial: usize,
    pub cyclic: usize,
    pub largest_size: usize,
    /// Mean component size; 0.0 when there are no components.
    pub average_size: f64,
}

impl ComponentStats {
    #[must_use]
    pub fn from_components(components: &Components) -> Self {
        let total = components.count();
        let vertices: usize = components.all().iter().map(Vec::len).sum();

        Self {
            total,
            trivial: components.trivial_ids().len(),
            cyclic: components.cyclic_ids().len(),
            largest_size: components.largest_size(),
            average_size: compute_ratio(vertices, total),
        }
    }
}

impl fmt::Display for ComponentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Component statistics:")?;
        writeln!(f, "  Total components: {}", self.total)?;
        writeln!(f, "  Trivial components (size=1): {}", self.trivial)?;
        writeln!(f, "  Cyclic components (size>1): {}", self.cyclic)?;
        writeln!(f, "  Largest component size: {}", self.largest_size)?;
        write!(f, "  Average component size: {:.2}", self.average_size)
    }
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a graph and its condensation.
///
/// All counts refer to the original graph unless otherwise noted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    /// Adjacency entries; undirected edges count once per direction.
    pub edge_count: usize,
    pub density: f64,
    pub component_count: usize,
    pub cyclic_component_count: usize,
    pub isolated_node_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Edges in the condensation DAG.
    pub condensation_edge_count: usize,
}

impl GraphStats {
    /// Compute statistics for `graph` using its `condensation`.
    #[must_use]
    pub fn compute(graph: &Graph, condensation: &Condensation) -> Self {
        let node_count = graph.vertex_count();
        let edge_count = graph.edge_count();
        let in_degree = graph.in_degrees();

        let isolated_node_count = (0..node_count)
            .filter(|&v| in_degree[v] == 0 && graph.out_degree(v) == 0)
            .count();

        let max_in_degree = in_degree.iter().copied().max().unwrap_or(0);
        let max_out_degree = (0..node_count)
            .map(|v| graph.out_degree(v))
            .max()
            .unwrap_or(0);

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            component_count: condensation.components().count(),
            cyclic_component_count: condensation.components().cyclic_ids().len(),
            isolated_node_count,
            max_in_degree,
            max_out_degree,
            condensation_edge_count: condensation.dag().edge_count(),
        }
    }

    /// Return `true` if the graph has no edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }

    /// Return `true` if at least one component has more than one vertex.
    #[must_use]
    pub const fn has_cycles(&self) -> bool {
        self.cyclic_component_count > 0
    }
}

// ---------------------------------------------------------------------------
// Internal helpers (cast precision suppressed at function scope)
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

#[allow(clippy::cast_precision_loss)]
fn compute_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0_f64;
    }
    numerator as f64 / denominator as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_for(n: usize, edges: &[(usize, usize, f64)]) -> GraphStats {
        let g = Graph::directed_from_edges(n, edges).expect("graph");
        let c = Condensation::from_graph(&g);
        GraphStats::compute(&g, &c)
    }

    #[test]
    fn empty_graph_stats() {
        let s = stats_for(0, &[]);
        assert_eq!(s.node_count, 0);
        assert!(s.density.abs() < f64::EPSILON);
        assert!(s.is_flat());
        assert!(!s.has_cycles());
    }

    #[test]
    fn density_of_complete_pair() {
        let s = stats_for(2, &[(0, 1, 1.0), (1, 0, 1.0)]);
        assert!((s.density - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.component_count, 1);
        assert_eq!(s.cyclic_component_count, 1);
        assert_eq!(s.condensation_edge_count, 0);
    }

    #[test]
    fn degrees_and_isolated() {
        // 0 → 2, 1 → 2, 3 isolated.
        let s = stats_for(4, &[(0, 2, 1.0), (1, 2, 1.0)]);
        assert_eq!(s.isolated_node_count, 1);
        assert_eq!(s.max_in_degree, 2);
        assert_eq!(s.max_out_degree, 1);
        assert_eq!(s.condensation_edge_count, 2);
    }

    #[test]
    fn component_stats_sizes() {
        // {0,1,2} cycle plus singletons 3 and 4.
        let g = Graph::directed_from_edges(
            5,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 3, 1.0)],
        )
        .expect("graph");
        let stats = Condensation::from_graph(&g).stats();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.trivial, 2);
        assert_eq!(stats.cyclic, 1);
        assert_eq!(stats.largest_size, 3);
        assert!((stats.average_size - 5.0 / 3.0).abs() < 1e-12);
        assert!(stats.to_string().contains("Average component size: 1.67"));
    }

    #[test]
    fn component_stats_empty() {
        let stats = Condensation::from_graph(&Graph::new(0, true)).stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.largest_size, 0);
        assert!(stats.average_size.abs() < f64::EPSILON);
    }
}
