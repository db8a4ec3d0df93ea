//! Topological ordering (Kahn's algorithm) and order utilities.
//!
//! # Algorithm
//!
//! 1. Count the in-degree of every vertex.
//! 2. Seed a FIFO frontier with all zero in-degree vertices, ascending.
//! 3. Pop a vertex, append it to the order, and decrement the in-degree of
//!    each successor (in edge insertion order); successors that reach zero
//!    join the back of the frontier.
//!
//! If the frontier drains before every vertex is ordered, the remaining
//! vertices sit on or behind a cycle and the call fails with
//! [`GraphError::CycleDetected`] reporting how far it got. A partial order
//! is never returned as success.
//!
//! # Expanding component orders
//!
//! [`expand_components`] turns an order over condensation nodes into an
//! order over original vertices. A cyclic component has no internal order,
//! so its members are emitted contiguously in the order the component
//! search listed them. That choice is deterministic but otherwise arbitrary.

#![allow(clippy::module_name_repetitions)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use tracing::{debug, instrument};

use crate::counters::Counters;
use crate::error::{GraphError, check_index};
use crate::graph::model::Graph;
use crate::graph::scc::Components;

/// A complete topological order plus the work it took.
#[derive(Debug, Clone)]
pub struct TopoOrder {
    pub order: Vec<usize>,
    pub counters: Counters,
}

/// Compute a topological order of `graph` with a FIFO frontier.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` has a cycle.
#[instrument(skip(graph), fields(n = graph.vertex_count()))]
pub fn topological_order(graph: &Graph) -> Result<TopoOrder, GraphError> {
    let n = graph.vertex_count();
    let mut counters = Counters::new();
    let mut in_degree = in_degrees_counted(graph, &mut counters);

    let mut frontier: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(u) = frontier.pop_front() {
        counters.frontier();
        order.push(u);
        for edge in graph.edges_of(u) {
            counters.relax();
            in_degree[edge.to] -= 1;
            if in_degree[edge.to] == 0 {
                frontier.push_back(edge.to);
            }
        }
    }

    finish(order, n, counters)
}

/// Kahn's algorithm with a priority frontier keyed by out-degree.
///
/// With `prefer_high` the ready vertex with the most outgoing edges goes
/// first, otherwise the one with the fewest. Ties go to the lower index.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` has a cycle.
#[instrument(skip(graph), fields(n = graph.vertex_count()))]
pub fn topological_order_by_degree(
    graph: &Graph,
    prefer_high: bool,
) -> Result<TopoOrder, GraphError> {
    let n = graph.vertex_count();
    let mut counters = Counters::new();
    let mut in_degree = in_degrees_counted(graph, &mut counters);

    let rank = |v: usize| {
        let degree = graph.out_degree(v);
        if prefer_high { usize::MAX - degree } else { degree }
    };

    let mut frontier: BinaryHeap<Reverse<(usize, usize)>> = (0..n)
        .filter(|&v| in_degree[v] == 0)
        .map(|v| Reverse((rank(v), v)))
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse((_, u))) = frontier.pop() {
        counters.frontier();
        order.push(u);
        for edge in graph.edges_of(u) {
            counters.relax();
            in_degree[edge.to] -= 1;
            if in_degree[edge.to] == 0 {
                frontier.push(Reverse((rank(edge.to), edge.to)));
            }
        }
    }

    finish(order, n, counters)
}

fn in_degrees_counted(graph: &Graph, counters: &mut Counters) -> Vec<usize> {
    let mut in_degree = vec![0_usize; graph.vertex_count()];
    for edge in graph.all_edges() {
        counters.relax();
        in_degree[edge.to] += 1;
    }
    in_degree
}

fn finish(order: Vec<usize>, total: usize, counters: Counters) -> Result<TopoOrder, GraphError> {
    if order.len() < total {
        debug!(ordered = order.len(), total, "cycle detected during ordering");
        return Err(GraphError::CycleDetected {
            ordered: order.len(),
            total,
        });
    }
    debug!(
        ordered = order.len(),
        relaxations = counters.edge_relaxations,
        "topological order complete"
    );
    Ok(TopoOrder { order, counters })
}

/// `true` iff `graph` has a topological order covering every vertex.
#[must_use]
pub fn is_dag(graph: &Graph) -> bool {
    topological_order(graph).is_ok()
}

/// Check that `order` is a topological order of `graph`.
///
/// The order must list every vertex exactly once, and for every edge
/// `u → v` the position of `u` must precede the position of `v` (so a
/// self-loop always fails).
///
/// # Errors
///
/// Returns [`GraphError::OutOfRange`] for the first entry that is not a
/// vertex of `graph`.
pub fn is_valid_topological_order(graph: &Graph, order: &[usize]) -> Result<bool, GraphError> {
    let n = graph.vertex_count();
    for &v in order {
        check_index(v, n)?;
    }
    if order.len() != n {
        return Ok(false);
    }

    let mut position = vec![usize::MAX; n];
    for (i, &v) in order.iter().enumerate() {
        if position[v] != usize::MAX {
            return Ok(false);
        }
        position[v] = i;
    }

    Ok(graph.all_edges().all(|e| position[e.from] < position[e.to]))
}

/// Expand an order over component ids into an order over vertices.
///
/// # Errors
///
/// Returns [`GraphError::OutOfRange`] if a component id is not in
/// `components`.
pub fn expand_components(
    component_order: &[usize],
    components: &Components,
) -> Result<Vec<usize>, GraphError> {
    let mut vertices = Vec::with_capacity(components.membership().len());
    for &id in component_order {
        let members = components.members(id).ok_or(GraphError::OutOfRange {
            index: id,
            len: components.count(),
        })?;
        vertices.extend_from_slice(members);
    }
    Ok(vertices)
}

/// Level of every vertex: the number of edges on the longest path ending
/// there. Sources are level 0.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` has a cycle.
pub fn vertex_levels(graph: &Graph) -> Result<Vec<usize>, GraphError> {
    let topo = topological_order(graph)?;
    let mut levels = vec![0_usize; graph.vertex_count()];
    for &u in &topo.order {
        for edge in graph.edges_of(u) {
            levels[edge.to] = levels[edge.to].max(levels[u] + 1);
        }
    }
    Ok(levels)
}

/// Vertices with in-degree zero, ascending.
#[must_use]
pub fn source_vertices(graph: &Graph) -> Vec<usize> {
    graph
        .in_degrees()
        .into_iter()
        .enumerate()
        .filter_map(|(v, d)| (d == 0).then_some(v))
        .collect()
}

/// Vertices with out-degree zero, ascending.
#[must_use]
pub fn sink_vertices(graph: &Graph) -> Vec<usize> {
    (0..graph.vertex_count())
        .filter(|&v| graph.out_degree(v) == 0)
        .collect()
}

/// Enumerate topological orders, at most `limit` of them.
///
/// Orders come out in lexicographic order. Exponential in general; only
/// compiled with the `enumerate` feature. A cyclic graph yields none.
#[cfg(feature = "enumerate")]
#[must_use]
pub fn all_topological_orders(graph: &Graph, limit: usize) -> Vec<Vec<usize>> {
    fn extend(
        graph: &Graph,
        in_degree: &mut [usize],
        placed: &mut [bool],
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
        limit: usize,
    ) {
        if out.len() >= limit {
            return;
        }
        if current.len() == graph.vertex_count() {
            out.push(current.clone());
            return;
        }
        for v in 0..graph.vertex_count() {
            if placed[v] || in_degree[v] != 0 {
                continue;
            }
            placed[v] = true;
            current.push(v);
            for edge in graph.edges_of(v) {
                in_degree[edge.to] -= 1;
            }

            extend(graph, in_degree, placed, current, out, limit);

            for edge in graph.edges_of(v) {
                in_degree[edge.to] += 1;
            }
            current.pop();
            placed[v] = false;
        }
    }

    let mut in_degree = graph.in_degrees();
    let mut placed = vec![false; graph.vertex_count()];
    let mut out = Vec::new();
    extend(
        graph,
        &mut in_degree,
        &mut placed,
        &mut Vec::new(),
        &mut out,
        limit,
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::scc::find_components;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Graph {
        let weighted: Vec<_> = edges.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Graph::directed_from_edges(n, &weighted).expect("graph")
    }

    #[test]
    fn empty_graph_orders_trivially() {
        let topo = topological_order(&Graph::new(0, true)).expect("empty is a DAG");
        assert!(topo.order.is_empty());
    }

    #[test]
    fn fifo_frontier_breaks_ties_by_index_then_discovery() {
        // 0 → 3, 1 → 2, 2 and 3 both unlocked; 3 is enqueued first.
        let g = graph(4, &[(0, 3), (1, 2)]);
        let topo = topological_order(&g).expect("DAG");
        assert_eq!(topo.order, vec![0, 1, 3, 2]);
    }

    #[test]
    fn diamond_order_is_valid() {
        let g = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let topo = topological_order(&g).expect("DAG");
        assert_eq!(topo.order, vec![0, 1, 2, 3]);
        assert_eq!(is_valid_topological_order(&g, &topo.order), Ok(true));
    }

    #[test]
    fn cycle_reports_progress() {
        // 0 → 1 → 2 → 1: only 0 can be ordered.
        let g = graph(3, &[(0, 1), (1, 2), (2, 1)]);
        let err = topological_order(&g).unwrap_err();
        assert_eq!(
            err,
            GraphError::CycleDetected {
                ordered: 1,
                total: 3
            }
        );
        assert!(!is_dag(&g));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(1, &[(0, 0)]);
        assert!(!is_dag(&g));
        assert_eq!(is_valid_topological_order(&g, &[0]), Ok(false));
    }

    #[test]
    fn counters_follow_kahn_work() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        let topo = topological_order(&g).expect("DAG");
        assert_eq!(topo.counters.frontier_ops, 3);
        // Two edges counted for in-degrees, two more when popped.
        assert_eq!(topo.counters.edge_relaxations, 4);
    }

    #[test]
    fn validation_is_strict() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        assert_eq!(is_valid_topological_order(&g, &[0, 1, 2]), Ok(true));
        assert_eq!(is_valid_topological_order(&g, &[1, 0, 2]), Ok(false));
        assert_eq!(is_valid_topological_order(&g, &[0, 1]), Ok(false), "too short");
        assert_eq!(
            is_valid_topological_order(&g, &[0, 0, 2]),
            Ok(false),
            "duplicate"
        );
        assert_eq!(
            is_valid_topological_order(&g, &[0, 1, 5]),
            Err(GraphError::OutOfRange { index: 5, len: 3 })
        );
    }

    #[test]
    fn expand_components_keeps_member_order() {
        // {1,2,3} cycle fed by 0.
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 1)]);
        let comps = find_components(&g).components;
        let cyclic = comps.component_of(1).expect("1");
        let lone = comps.component_of(0).expect("0");

        let tasks = expand_components(&[lone, cyclic], &comps).expect("valid ids");
        assert_eq!(tasks[0], 0);
        assert_eq!(&tasks[1..], comps.members(cyclic).expect("members"));

        assert_eq!(
            expand_components(&[7], &comps),
            Err(GraphError::OutOfRange { index: 7, len: 2 })
        );
    }

    #[test]
    fn degree_priority_orders() {
        // 0 has one successor, 1 has two; both are sources.
        let g = graph(4, &[(0, 3), (1, 2), (1, 3)]);

        let high = topological_order_by_degree(&g, true).expect("DAG");
        assert_eq!(high.order, vec![1, 0, 2, 3]);
        assert_eq!(is_valid_topological_order(&g, &high.order), Ok(true));

        let low = topological_order_by_degree(&g, false).expect("DAG");
        assert_eq!(low.order, vec![0, 1, 2, 3]);
        assert_eq!(is_valid_topological_order(&g, &low.order), Ok(true));

        let cyclic = graph(2, &[(0, 1), (1, 0)]);
        assert!(topological_order_by_degree(&cyclic, true).is_err());
    }

    #[test]
    fn levels_sources_and_sinks() {
        let g = graph(4, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(vertex_levels(&g).expect("DAG"), vec![0, 1, 2, 0]);
        assert_eq!(source_vertices(&g), vec![0, 3]);
        assert_eq!(sink_vertices(&g), vec![2, 3]);
        assert!(vertex_levels(&graph(2, &[(0, 1), (1, 0)])).is_err());
    }

    #[cfg(feature = "enumerate")]
    #[test]
    fn enumerates_all_orders_up_to_limit() {
        let g = graph(3, &[(0, 2)]);
        let all = all_topological_orders(&g, 100);
        assert_eq!(
            all,
            vec![vec![0, 1, 2], vec![0, 2, 1], vec![1, 0, 2]]
        );
        assert_eq!(all_topological_orders(&g, 2).len(), 2);
        assert!(all_topological_orders(&graph(2, &[(0, 1), (1, 0)]), 10).is_empty());
    }
}
