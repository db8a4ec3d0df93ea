//! Seeded generation of test datasets.
//!
//! Every generator draws from one [`StdRng`], so a fixed seed reproduces the
//! same sequence of graphs as long as they are requested in the same order.
//! Weights are integers in `1..=10`, stored as `f64`. Every generated graph
//! is directed, uses the default weight model, and has vertex 0 as source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::graph::model::{Graph, Vertex};

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

const TASK_TYPES: [&str; 4] = ["street_cleaning", "repair", "maintenance", "analytics"];

/// Small graphs, 6–10 vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallVariant {
    /// Two disjoint triangles plus sparse noise.
    SimpleCyclic,
    /// Forward edges only, each vertex reaching up to three ahead.
    PureDag,
    /// One triangle feeding a forward chain, plus noise.
    Mixed,
}

/// Medium graphs, 10–20 vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumVariant {
    /// Several ring components chained together.
    MultipleSccs,
    /// About `1.5 n` random edges.
    SparseMixed,
    /// Every ordered pair with probability 0.3.
    DenseMixed,
}

/// Large graphs, 20–50 vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LargeVariant {
    /// Forward edges, one to three per vertex, short reach.
    SparseDag,
    /// Forward edges to the next nine vertices with probability 0.7.
    DenseDag,
    /// One ring over every vertex plus random triangles.
    ComplexCycles,
}

impl SmallVariant {
    pub const ALL: [Self; 3] = [Self::SimpleCyclic, Self::PureDag, Self::Mixed];
}

impl MediumVariant {
    pub const ALL: [Self; 3] = [Self::MultipleSccs, Self::SparseMixed, Self::DenseMixed];
}

impl LargeVariant {
    pub const ALL: [Self; 3] = [Self::SparseDag, Self::DenseDag, Self::ComplexCycles];
}

/// Deterministic random graph generator.
#[derive(Debug, Clone)]
pub struct DataGenerator {
    rng: StdRng,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DataGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // -----------------------------------------------------------------------
    // Families
    // -----------------------------------------------------------------------

    pub fn small(&mut self, variant: SmallVariant) -> Graph {
        let n = self.rng.gen_range(6..=10);
        let mut graph = Graph::new(n, true);
        match variant {
            SmallVariant::SimpleCyclic => {
                if n >= 3 {
                    self.ring(&mut graph, 0, 2);
                }
                if n >= 6 {
                    self.ring(&mut graph, 3, 5);
                }
                self.noise(&mut graph, 0.2);
            }
            SmallVariant::PureDag => self.forward(&mut graph, 4, 0.6),
            SmallVariant::Mixed => {
                self.ring(&mut graph, 0, 2);
                for u in 3..n {
                    for v in (u + 1)..(u + 3).min(n) {
                        if self.rng.gen_bool(0.7) {
                            self.connect(&mut graph, u, v);
                        }
                    }
                }
                self.noise(&mut graph, 0.15);
            }
        }
        finish(graph)
    }

    pub fn medium(&mut self, variant: MediumVariant) -> Graph {
        let n = self.rng.gen_range(10..=20);
        let mut graph = Graph::new(n, true);
        match variant {
            MediumVariant::MultipleSccs => {
                // n >= 10, so three rings of three always fit.
                self.ring(&mut graph, 0, 2);
                self.ring(&mut graph, 3, 5);
                self.ring(&mut graph, 6, 8);
                self.connect(&mut graph, 2, 3);
                self.connect(&mut graph, 5, 6);
                for v in 10..n {
                    if self.rng.gen_bool(0.5) {
                        self.connect(&mut graph, v - 1, v);
                    }
                }
                self.noise(&mut graph, 0.1);
            }
            MediumVariant::SparseMixed => {
                for _ in 0..(n * 3).div_ceil(2) {
                    let u = self.rng.gen_range(0..n);
                    let v = self.rng.gen_range(0..n);
                    if u != v {
                        self.connect(&mut graph, u, v);
                    }
                }
            }
            MediumVariant::DenseMixed => self.noise(&mut graph, 0.3),
        }
        finish(graph)
    }

    pub fn large(&mut self, variant: LargeVariant) -> Graph {
        let n = self.rng.gen_range(20..=50);
        let mut graph = Graph::new(n, true);
        match variant {
            LargeVariant::SparseDag => {
                for u in 0..n {
                    let fan_out = self.rng.gen_range(1..=3);
                    for _ in 0..fan_out {
                        let v = u + self.rng.gen_range(1..=5);
                        if v < n {
                            self.connect(&mut graph, u, v);
                        }
                    }
                }
            }
            LargeVariant::DenseDag => self.forward(&mut graph, 10, 0.7),
            LargeVariant::ComplexCycles => {
                self.ring(&mut graph, 0, n - 1);
                for _ in 0..n / 2 {
                    let a = self.rng.gen_range(0..n);
                    let b = self.rng.gen_range(0..n);
                    let c = self.rng.gen_range(0..n);
                    if a != b && b != c && a != c {
                        self.connect(&mut graph, a, b);
                        self.connect(&mut graph, b, c);
                        self.connect(&mut graph, c, a);
                    }
                }
            }
        }
        finish(graph)
    }

    /// A graph with `nodes` vertices and about `edges` distinct edges.
    ///
    /// With `has_cycles` (and at least three vertices) the graph starts from
    /// the triangle `0 → 1 → 2 → 0`. Random edges are added without
    /// duplicates or self-loops until `edges` is reached or the graph holds
    /// 90% of all possible edges.
    pub fn custom(&mut self, nodes: usize, edges: usize, has_cycles: bool) -> Graph {
        let mut graph = Graph::new(nodes, true);
        if has_cycles && nodes >= 3 {
            self.ring(&mut graph, 0, 2);
        }

        let saturation = nodes * nodes.saturating_sub(1) * 9 / 10;
        let target = edges.min(saturation);
        while graph.edge_count() < target {
            let u = self.rng.gen_range(0..nodes);
            let v = self.rng.gen_range(0..nodes);
            if u != v && !graph.edges_of(u).iter().any(|e| e.to == v) {
                self.connect(&mut graph, u, v);
            }
        }
        finish(graph)
    }

    /// The nine standard datasets, `small_1` through `large_3`.
    pub fn standard_datasets(&mut self) -> Vec<(String, Graph)> {
        let mut out = Vec::with_capacity(9);
        for (i, v) in SmallVariant::ALL.into_iter().enumerate() {
            out.push((format!("small_{}", i + 1), self.small(v)));
        }
        for (i, v) in MediumVariant::ALL.into_iter().enumerate() {
            out.push((format!("medium_{}", i + 1), self.medium(v)));
        }
        for (i, v) in LargeVariant::ALL.into_iter().enumerate() {
            out.push((format!("large_{}", i + 1), self.large(v)));
        }
        out
    }

    /// Replace every vertex's metadata with a random task profile.
    ///
    /// Types are drawn from a fixed list, durations from `1.0..=5.0` in whole
    /// units, priorities from `1..=3`.
    pub fn assign_task_metadata(&mut self, graph: &mut Graph) {
        for id in 0..graph.vertex_count() {
            let task_type = TASK_TYPES[self.rng.gen_range(0..TASK_TYPES.len())];
            let duration = f64::from(self.rng.gen_range(1_u8..=5));
            let priority = self.rng.gen_range(1..=3);
            let _ = graph.set_vertex(Vertex::with_task(
                id,
                format!("Task_{id}"),
                task_type,
                duration,
                priority,
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Building blocks
    // -----------------------------------------------------------------------

    fn weight(&mut self) -> f64 {
        f64::from(self.rng.gen_range(1_u8..=10))
    }

    fn connect(&mut self, graph: &mut Graph, u: usize, v: usize) {
        let w = self.weight();
        // Callers only pass indices below `n`.
        let _ = graph.add_edge(u, v, w);
    }

    /// `start → start+1 → … → end → start`.
    fn ring(&mut self, graph: &mut Graph, start: usize, end: usize) {
        for v in start..end {
            self.connect(graph, v, v + 1);
        }
        self.connect(graph, end, start);
    }

    /// Edge `u → v` for `u < v < u + reach` with probability `p`.
    fn forward(&mut self, graph: &mut Graph, reach: usize, p: f64) {
        let n = graph.vertex_count();
        for u in 0..n {
            for v in (u + 1)..(u + reach).min(n) {
                if self.rng.gen_bool(p) {
                    self.connect(graph, u, v);
                }
            }
        }
    }

    /// Edge between every ordered pair of distinct vertices with probability `p`.
    fn noise(&mut self, graph: &mut Graph, p: f64) {
        let n = graph.vertex_count();
        for u in 0..n {
            for v in 0..n {
                if u != v && self.rng.gen_bool(p) {
                    self.connect(graph, u, v);
                }
            }
        }
    }
}

fn finish(mut graph: Graph) -> Graph {
    if graph.vertex_count() > 0 {
        let _ = graph.set_source(Some(0));
    }
    debug!(
        n = graph.vertex_count(),
        edges = graph.edge_count(),
        "generated graph"
    );
    graph
}

/// The fixed 8-vertex assignment graph.
///
/// Ring `1 → 2 → 3 → 1` fed by 0, and the chain `4 → 5 → 6 → 7`. Source is
/// vertex 4.
#[must_use]
pub fn assignment_graph() -> Graph {
    let mut graph = Graph::new(8, true);
    for (u, v, w) in [
        (0, 1, 3.0),
        (1, 2, 2.0),
        (2, 3, 4.0),
        (3, 1, 1.0),
        (4, 5, 2.0),
        (5, 6, 5.0),
        (6, 7, 1.0),
    ] {
        let _ = graph.add_edge(u, v, w);
    }
    let _ = graph.set_source(Some(4));
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::scc::find_components;
    use crate::graph::topo::is_dag;

    fn weights_in_range(g: &Graph) -> bool {
        g.all_edges()
            .all(|e| (1.0..=10.0).contains(&e.weight) && e.weight.fract() == 0.0)
    }

    #[test]
    fn same_seed_same_graphs() {
        let a = DataGenerator::new(7).standard_datasets();
        let b = DataGenerator::new(7).standard_datasets();
        assert_eq!(a.len(), 9);
        for ((name_a, ga), (name_b, gb)) in a.iter().zip(&b) {
            assert_eq!(name_a, name_b);
            assert_eq!(ga.content_hash(), gb.content_hash());
        }
        assert_eq!(a[0].0, "small_1");
        assert_eq!(a[8].0, "large_3");
    }

    #[test]
    fn families_respect_size_ranges() {
        let mut generator = DataGenerator::default();
        for _ in 0..5 {
            for v in SmallVariant::ALL {
                let g = generator.small(v);
                assert!((6..=10).contains(&g.vertex_count()));
                assert!(weights_in_range(&g));
                assert_eq!(g.source(), Some(0));
            }
            for v in MediumVariant::ALL {
                assert!((10..=20).contains(&generator.medium(v).vertex_count()));
            }
            for v in LargeVariant::ALL {
                assert!((20..=50).contains(&generator.large(v).vertex_count()));
            }
        }
    }

    #[test]
    fn dag_variants_are_acyclic() {
        let mut generator = DataGenerator::new(3);
        for _ in 0..10 {
            assert!(is_dag(&generator.small(SmallVariant::PureDag)));
            assert!(is_dag(&generator.large(LargeVariant::SparseDag)));
            assert!(is_dag(&generator.large(LargeVariant::DenseDag)));
        }
    }

    #[test]
    fn cyclic_variants_have_cycles() {
        let mut generator = DataGenerator::new(3);
        assert!(!is_dag(&generator.small(SmallVariant::SimpleCyclic)));
        assert!(!is_dag(&generator.small(SmallVariant::Mixed)));
        assert!(!is_dag(&generator.medium(MediumVariant::MultipleSccs)));
        let big = generator.large(LargeVariant::ComplexCycles);
        assert_eq!(find_components(&big).components.count(), 1, "one big ring");
    }

    #[test]
    fn custom_hits_edge_target_without_duplicates() {
        let mut generator = DataGenerator::default();
        let g = generator.custom(10, 25, true);
        assert_eq!(g.edge_count(), 25);
        assert!(!is_dag(&g));
        for u in 0..10 {
            let mut targets: Vec<_> = g.edges_of(u).iter().map(|e| e.to).collect();
            targets.sort_unstable();
            targets.dedup();
            assert_eq!(targets.len(), g.out_degree(u));
        }

        let saturated = generator.custom(4, 1_000, false);
        assert_eq!(saturated.edge_count(), 4 * 3 * 9 / 10);
        assert_eq!(generator.custom(1, 5, true).edge_count(), 0);
    }

    #[test]
    fn task_metadata_is_assigned() {
        let mut generator = DataGenerator::default();
        let mut g = generator.small(SmallVariant::PureDag);
        generator.assign_task_metadata(&mut g);
        for v in g.vertices() {
            assert!(TASK_TYPES.contains(&v.task_type.as_str()));
            assert!((1.0..=5.0).contains(&v.duration));
            assert!((1..=3).contains(&v.priority));
        }
        assert_eq!(g.task_type_counts().values().sum::<usize>(), g.vertex_count());
    }

    #[test]
    fn assignment_graph_shape() {
        let g = assignment_graph();
        assert_eq!(g.vertex_count(), 8);
        assert_eq!(g.edge_count(), 7);
        assert_eq!(g.source(), Some(4));
        assert_eq!(find_components(&g).components.count(), 6);
    }
}
