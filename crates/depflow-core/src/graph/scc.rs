//! Strongly connected components via an iterative Tarjan traversal.
//!
//! # Algorithm
//!
//! Each vertex gets a discovery index and a low-link when first visited.
//! Edges to vertices still on the traversal stack pull the low-link down to
//! that vertex's discovery index; edges to vertices already assigned to a
//! component are ignored; tree edges propagate the child's low-link back to
//! the parent once the child is finished. A vertex whose low-link equals its
//! own index closes a component: the stack is popped down to it and every
//! popped vertex gets the next component id.
//!
//! The recursion is replaced by an explicit stack of `(vertex, next edge)`
//! frames so depth is bounded only by heap size.
//!
//! # Determinism
//!
//! Roots are tried in order `0..n` and edges in insertion order. Component
//! ids are therefore assigned in the order components close, which is a
//! reverse topological order of the condensation. Members of a component are
//! listed in stack-pop order.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use tracing::{debug, instrument};

use crate::counters::Counters;
use crate::graph::model::Graph;

const UNVISITED: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// A partition of the vertex set into strongly connected components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    members: Vec<Vec<usize>>,
    component_of: Vec<usize>,
}

impl Components {
    /// Number of components.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members of component `id`, in discovery (stack-pop) order.
    #[must_use]
    pub fn members(&self, id: usize) -> Option<&[usize]> {
        self.members.get(id).map(Vec::as_slice)
    }

    /// All components, indexed by component id.
    #[must_use]
    pub fn all(&self) -> &[Vec<usize>] {
        &self.members
    }

    /// Component id of vertex `v`.
    #[must_use]
    pub fn component_of(&self, v: usize) -> Option<usize> {
        self.component_of.get(v).copied()
    }

    /// The full vertex → component id map.
    #[must_use]
    pub fn membership(&self) -> &[usize] {
        &self.component_of
    }

    /// Size of component `id` (0 if `id` is unknown).
    #[must_use]
    pub fn size(&self, id: usize) -> usize {
        self.members.get(id).map_or(0, Vec::len)
    }

    /// `true` for a single-vertex component (self-loop or not).
    #[must_use]
    pub fn is_trivial(&self, id: usize) -> bool {
        self.size(id) == 1
    }

    /// `true` for a component with more than one vertex.
    #[must_use]
    pub fn is_cyclic(&self, id: usize) -> bool {
        self.size(id) > 1
    }

    /// Ids of all cyclic components, ascending.
    #[must_use]
    pub fn cyclic_ids(&self) -> Vec<usize> {
        (0..self.count()).filter(|&id| self.is_cyclic(id)).collect()
    }

    /// Ids of all trivial components, ascending.
    #[must_use]
    pub fn trivial_ids(&self) -> Vec<usize> {
        (0..self.count()).filter(|&id| self.is_trivial(id)).collect()
    }

    /// Size of the largest component (0 when there are none).
    #[must_use]
    pub fn largest_size(&self) -> usize {
        self.members.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Output of [`find_components`].
#[derive(Debug, Clone)]
pub struct SccResult {
    pub components: Components,
    pub counters: Counters,
}

// ---------------------------------------------------------------------------
// Tarjan
// ---------------------------------------------------------------------------

struct Tarjan<'g> {
    graph: &'g Graph,
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: FixedBitSet,
    stack: Vec<usize>,
    frames: Vec<(usize, usize)>,
    next_index: usize,
    members: Vec<Vec<usize>>,
    component_of: Vec<usize>,
    counters: Counters,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g Graph) -> Self {
        let n = graph.vertex_count();
        Self {
            graph,
            index: vec![UNVISITED; n],
            lowlink: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::new(),
            frames: Vec::new(),
            next_index: 0,
            members: Vec::new(),
            component_of: vec![UNVISITED; n],
            counters: Counters::new(),
        }
    }

    fn discover(&mut self, v: usize) {
        self.counters.visit();
        self.index[v] = self.next_index;
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
        self.frames.push((v, 0));
    }

    fn run_from(&mut self, root: usize) {
        self.discover(root);

        while let Some(&(v, pos)) = self.frames.last() {
            if let Some(edge) = self.graph.edges_of(v).get(pos) {
                let top = self.frames.len() - 1;
                self.frames[top].1 += 1;
                self.counters.relax();

                let w = edge.to;
                if self.index[w] == UNVISITED {
                    self.discover(w);
                } else if self.on_stack.contains(w) {
                    self.lowlink[v] = self.lowlink[v].min(self.index[w]);
                }
                continue;
            }

            // All edges of `v` handled.
            self.frames.pop();
            if let Some(&(parent, _)) = self.frames.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
            }
            if self.lowlink[v] == self.index[v] {
                self.close_component(v);
            }
        }
    }

    fn close_component(&mut self, root: usize) {
        let id = self.members.len();
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.set(w, false);
            self.component_of[w] = id;
            component.push(w);
            if w == root {
                break;
            }
        }
        self.members.push(component);
    }
}

/// Partition `graph` into strongly connected components.
///
/// Runs in `O(V + E)` with no recursion. An empty graph yields zero
/// components; a graph without edges yields one singleton per vertex.
#[must_use]
#[instrument(skip(graph), fields(n = graph.vertex_count()))]
pub fn find_components(graph: &Graph) -> SccResult {
    let mut tarjan = Tarjan::new(graph);

    for root in 0..graph.vertex_count() {
        if tarjan.index[root] == UNVISITED {
            tarjan.run_from(root);
        }
    }

    let components = Components {
        members: tarjan.members,
        component_of: tarjan.component_of,
    };

    debug!(
        components = components.count(),
        cyclic = components.cyclic_ids().len(),
        visits = tarjan.counters.visits,
        "strongly connected components found"
    );

    SccResult {
        components,
        counters: tarjan.counters,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Graph {
        let weighted: Vec<_> = edges.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Graph::directed_from_edges(n, &weighted).expect("graph")
    }

    #[test]
    fn empty_graph_has_no_components() {
        let result = find_components(&Graph::new(0, true));
        assert!(result.components.is_empty());
        assert_eq!(result.counters, Counters::default());
    }

    #[test]
    fn disconnected_graph_is_all_singletons() {
        let result = find_components(&Graph::new(4, true));
        let c = &result.components;
        assert_eq!(c.count(), 4);
        for v in 0..4 {
            assert_eq!(c.component_of(v), Some(v), "closed in vertex order");
            assert!(c.is_trivial(v));
        }
    }

    #[test]
    fn simple_cycle_collapses() {
        let c = find_components(&graph(3, &[(0, 1), (1, 2), (2, 0)])).components;
        assert_eq!(c.count(), 1);
        assert!(c.is_cyclic(0));
        assert_eq!(c.members(0), Some(&[2, 1, 0][..]), "stack-pop order");
    }

    #[test]
    fn self_loop_is_trivial() {
        let c = find_components(&graph(2, &[(0, 0), (0, 1)])).components;
        assert_eq!(c.count(), 2);
        let id = c.component_of(0).expect("vertex 0");
        assert!(c.is_trivial(id));
        assert!(c.cyclic_ids().is_empty());
    }

    #[test]
    fn ids_follow_closing_order() {
        // 0 → 1 → 2 with {1,2} not cyclic: 2 closes first, then 1, then 0.
        let c = find_components(&graph(3, &[(0, 1), (1, 2)])).components;
        assert_eq!(c.membership(), &[2, 1, 0]);
    }

    #[test]
    fn cross_edge_to_finished_component_is_ignored() {
        // 0 → 1, 1 → 0, 2 → 1. Vertex 2 is visited after {0,1} closed.
        let c = find_components(&graph(3, &[(0, 1), (1, 0), (2, 1)])).components;
        assert_eq!(c.count(), 2);
        assert_eq!(c.component_of(0), c.component_of(1));
        assert_ne!(c.component_of(2), c.component_of(0));
        assert_eq!(c.largest_size(), 2);
    }

    #[test]
    fn counters_track_visits_and_edges() {
        let result = find_components(&graph(3, &[(0, 1), (1, 2), (2, 0), (0, 2)]));
        assert_eq!(result.counters.visits, 3);
        assert_eq!(result.counters.edge_relaxations, 4);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let mut g = Graph::new(n, true);
        for v in 0..n - 1 {
            g.add_edge(v, v + 1, 1.0).expect("edge");
        }
        g.add_edge(n - 1, 0, 1.0).expect("closing edge");

        let c = find_components(&g).components;
        assert_eq!(c.count(), 1);
        assert_eq!(c.size(0), n);
    }
}
