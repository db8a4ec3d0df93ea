//! SCC condensation: collapse every component into one node of a DAG.
//!
//! # Edge Weights
//!
//! For each ordered pair of distinct components `(A, B)` joined by at least
//! one original edge, the condensation has exactly one edge `A → B`. Its
//! weight is the **minimum** weight over *all* original edges that leave a
//! member of `A` and land in a member of `B` (the cheapest crossing), not the
//! weight of whichever edge happened to be seen first.
//!
//! Condensation edges are inserted in the order their pair is first met
//! while scanning vertices `0..n` and their edges in insertion order.
//! Intra-component edges, self-loops included, never produce an edge, so the
//! result is a simple DAG.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, instrument};

use crate::counters::Counters;
use crate::graph::model::Graph;
use crate::graph::scc::{Components, find_components};
use crate::graph::stats::ComponentStats;

/// Weight model label carried by condensation graphs.
pub const CONDENSATION_WEIGHT_MODEL: &str = "component";

/// A condensation DAG plus the component partition it was built from.
#[derive(Debug, Clone)]
pub struct Condensation {
    dag: Graph,
    components: Components,
    counters: Counters,
}

impl Condensation {
    /// Build the condensation of `graph` for an already computed partition.
    ///
    /// `components` must come from [`find_components`] on the same graph.
    #[must_use]
    #[instrument(skip(graph, components), fields(components = components.count()))]
    pub fn build(graph: &Graph, components: Components) -> Self {
        debug_assert_eq!(
            components.membership().len(),
            graph.vertex_count(),
            "components were computed for a different graph"
        );
        let mut counters = Counters::new();
        let membership = components.membership();

        // First-seen order of component pairs, and the cheapest crossing.
        let mut order: Vec<(usize, usize)> = Vec::new();
        let mut cheapest: HashMap<(usize, usize), f64> = HashMap::new();

        for u in 0..graph.vertex_count() {
            counters.visit();
            let cu = membership[u];
            for edge in graph.edges_of(u) {
                counters.relax();
                let cv = membership[edge.to];
                if cu == cv {
                    continue;
                }
                cheapest
                    .entry((cu, cv))
                    .and_modify(|w| *w = w.min(edge.weight))
                    .or_insert_with(|| {
                        order.push((cu, cv));
                        edge.weight
                    });
            }
        }

        let mut dag = Graph::new(components.count(), true);
        dag.set_weight_model(CONDENSATION_WEIGHT_MODEL);
        for (cu, cv) in order {
            // Both ids are < components.count() by construction.
            let _ = dag.add_edge(cu, cv, cheapest[&(cu, cv)]);
        }
        if let Some(source) = graph.source() {
            let _ = dag.set_source(components.component_of(source));
        }

        debug!(
            nodes = dag.vertex_count(),
            edges = dag.edge_count(),
            "condensation built"
        );

        Self {
            dag,
            components,
            counters,
        }
    }

    /// Find components and build the condensation in one step.
    ///
    /// The returned counters cover both the component search and the
    /// condensation scan.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let scc = find_components(graph);
        let mut condensation = Self::build(graph, scc.components);
        condensation.counters += scc.counters;
        condensation
    }

    /// The condensation DAG; vertex `i` is component `i`.
    #[must_use]
    pub const fn dag(&self) -> &Graph {
        &self.dag
    }

    #[must_use]
    pub const fn components(&self) -> &Components {
        &self.components
    }

    #[must_use]
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Component id of original vertex `v`.
    #[must_use]
    pub fn component_of(&self, v: usize) -> Option<usize> {
        self.components.component_of(v)
    }

    #[must_use]
    pub fn component_size(&self, id: usize) -> usize {
        self.components.size(id)
    }

    #[must_use]
    pub fn is_trivial(&self, id: usize) -> bool {
        self.components.is_trivial(id)
    }

    #[must_use]
    pub fn is_cyclic(&self, id: usize) -> bool {
        self.components.is_cyclic(id)
    }

    /// Components with no incoming condensation edge, ascending.
    #[must_use]
    pub fn source_components(&self) -> Vec<usize> {
        self.dag
            .in_degrees()
            .into_iter()
            .enumerate()
            .filter_map(|(id, d)| (d == 0).then_some(id))
            .collect()
    }

    /// Components with no outgoing condensation edge, ascending.
    #[must_use]
    pub fn sink_components(&self) -> Vec<usize> {
        (0..self.dag.vertex_count())
            .filter(|&id| self.dag.edges_of(id).is_empty())
            .collect()
    }

    /// Successor components of every component.
    #[must_use]
    pub fn connectivity(&self) -> BTreeMap<usize, Vec<usize>> {
        (0..self.dag.vertex_count())
            .map(|id| (id, self.dag.edges_of(id).iter().map(|e| e.to).collect()))
            .collect()
    }

    /// The subgraph induced by component `id`, re-indexed locally.
    ///
    /// Local vertex `i` is `members(id)[i]`. Only edges with both endpoints
    /// inside the component are kept. `graph` must be the graph this
    /// condensation was built from.
    #[must_use]
    pub fn component_subgraph(&self, graph: &Graph, id: usize) -> Option<Graph> {
        self.components
            .members(id)
            .map(|members| induced_subgraph(graph, members))
    }

    /// Aggregate size statistics over the components.
    #[must_use]
    pub fn stats(&self) -> ComponentStats {
        ComponentStats::from_components(&self.components)
    }
}

impl fmt::Display for Condensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Condensation graph (DAG):")?;
        writeln!(f, "Components: {}", self.components.count())?;
        for (id, members) in self.components.all().iter().enumerate() {
            write!(f, "Component {id}: {members:?} (size: {})", members.len())?;
            let successors = self.dag.edges_of(id);
            if !successors.is_empty() {
                write!(f, " ->")?;
                for edge in successors {
                    write!(f, " {}", edge.to)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Induced subgraph over `members`, with vertex `members[i]` renumbered `i`.
///
/// Edge order follows `members` order, then each member's insertion order.
#[must_use]
pub fn induced_subgraph(graph: &Graph, members: &[usize]) -> Graph {
    let local: HashMap<usize, usize> = members
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();

    let mut sub = Graph::new(members.len(), true);
    sub.set_weight_model(graph.weight_model());
    for &u in members {
        for edge in graph.edges_of(u) {
            if let Some(&lv) = local.get(&edge.to) {
                let _ = sub.add_edge(local[&u], lv, edge.weight);
            }
        }
    }
    sub
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::Edge;

    #[test]
    fn chain_condenses_to_itself() {
        let g = Graph::directed_from_edges(3, &[(0, 1, 2.0), (1, 2, 3.0)]).expect("graph");
        let c = Condensation::from_graph(&g);

        assert_eq!(c.dag().vertex_count(), 3);
        assert_eq!(c.dag().edge_count(), 2);
        assert_eq!(c.dag().weight_model(), CONDENSATION_WEIGHT_MODEL);
    }

    #[test]
    fn crossing_weight_is_minimum_of_all_crossings() {
        // {0,1} is a cycle; both members reach 2, the later edge is cheaper.
        let g = Graph::directed_from_edges(
            3,
            &[(0, 1, 1.0), (1, 0, 1.0), (0, 2, 9.0), (1, 2, 4.0), (0, 2, 6.0)],
        )
        .expect("graph");
        let c = Condensation::from_graph(&g);

        let from = c.component_of(0).expect("0");
        let to = c.component_of(2).expect("2");
        assert_eq!(c.dag().edge_count(), 1, "parallel crossings merge");
        assert_eq!(c.dag().edges_of(from), &[Edge::new(from, to, 4.0)]);
    }

    #[test]
    fn build_accepts_components_of_the_same_graph() {
        let g = Graph::directed_from_edges(3, &[(0, 1, 1.0), (1, 0, 1.0), (1, 2, 2.0)])
            .expect("graph");
        let c = Condensation::build(&g, find_components(&g).components);
        assert_eq!(c.dag().vertex_count(), 2);
        assert_eq!(c.dag().edge_count(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "components were computed for a different graph")]
    fn build_rejects_components_of_another_graph() {
        let small = Graph::directed_from_edges(2, &[(0, 1, 1.0)]).expect("graph");
        let large = Graph::directed_from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]).expect("graph");
        let _ = Condensation::build(&large, find_components(&small).components);
    }

    #[test]
    fn self_loops_and_internal_edges_are_dropped() {
        let g = Graph::directed_from_edges(2, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0)])
            .expect("graph");
        let c = Condensation::from_graph(&g);
        assert_eq!(c.dag().vertex_count(), 1);
        assert_eq!(c.dag().edge_count(), 0);
    }

    #[test]
    fn sources_and_sinks() {
        // 0 → 1 → 2, 3 isolated.
        let g = Graph::directed_from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0)]).expect("graph");
        let c = Condensation::from_graph(&g);

        let comp = |v| c.component_of(v).expect("vertex");
        let sources = c.source_components();
        let sinks = c.sink_components();
        assert!(sources.contains(&comp(0)) && sources.contains(&comp(3)));
        assert!(!sources.contains(&comp(1)));
        assert!(sinks.contains(&comp(2)) && sinks.contains(&comp(3)));
        assert!(!sinks.contains(&comp(0)));
    }

    #[test]
    fn component_subgraph_keeps_internal_edges_only() {
        let g = Graph::directed_from_edges(
            4,
            &[(0, 1, 1.0), (1, 2, 2.0), (2, 0, 3.0), (2, 3, 4.0)],
        )
        .expect("graph");
        let c = Condensation::from_graph(&g);
        let id = c.component_of(0).expect("0");
        let sub = c.component_subgraph(&g, id).expect("component exists");

        assert_eq!(sub.vertex_count(), 3);
        assert_eq!(sub.edge_count(), 3, "edge into 3 excluded");
        assert!(c.component_subgraph(&g, 99).is_none());
    }

    #[test]
    fn source_is_mapped_to_its_component() {
        let mut g = Graph::directed_from_edges(3, &[(0, 1, 1.0), (1, 0, 1.0), (1, 2, 1.0)])
            .expect("graph");
        g.set_source(Some(1)).expect("source");
        let c = Condensation::from_graph(&g);
        assert_eq!(c.dag().source(), c.component_of(1));
    }

    #[test]
    fn connectivity_and_display() {
        let g = Graph::directed_from_edges(2, &[(0, 1, 1.0)]).expect("graph");
        let c = Condensation::from_graph(&g);
        let (c0, c1) = (c.component_of(0).expect("0"), c.component_of(1).expect("1"));

        assert_eq!(c.connectivity()[&c0], vec![c1]);
        assert!(c.connectivity()[&c1].is_empty());

        let text = c.to_string();
        assert!(text.contains("Components: 2"));
        assert!(text.contains(&format!("-> {c1}")));
    }

    #[test]
    fn counters_include_component_search() {
        let g = Graph::directed_from_edges(2, &[(0, 1, 1.0)]).expect("graph");
        let c = Condensation::from_graph(&g);
        // Tarjan: 2 visits, 1 edge. Scan: 2 vertices, 1 edge.
        assert_eq!(c.counters().visits, 4);
        assert_eq!(c.counters().edge_relaxations, 2);
    }
}
