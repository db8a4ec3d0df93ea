//! Dependency graph analysis.
//!
//! # Overview
//!
//! A [`Graph`] is built once (vertex count fixed, edges appended) and then
//! only read. Every analysis allocates its own scratch state and returns its
//! own [`Counters`](crate::counters::Counters), so a finished graph can be
//! shared across threads and analysed concurrently.
//!
//! ## Pipeline
//!
//! ```text
//! Graph (possibly cyclic)
//!        ↓  scc::find_components()
//! Components (partition + vertex → component map)
//!        ↓  condense::Condensation::build()
//! Condensation (simple DAG, cheapest crossing weights)
//!        ↓  topo::topological_order()
//! TopoOrder over components
//!        ↓  topo::expand_components()      paths::critical_path()
//! vertex order                             distances / predecessors / path
//! ```
//!
//! The path engine also runs directly on an input graph that is already
//! acyclic, skipping the component stages.
//!
//! ## Typical Usage
//!
//! ```rust
//! use depflow_core::graph::{Condensation, Graph, critical_path, topological_order};
//!
//! let g = Graph::directed_from_edges(
//!     4,
//!     &[(0, 1, 2.0), (1, 0, 1.0), (1, 2, 3.0), (2, 3, 4.0)],
//! )?;
//! let c = Condensation::from_graph(&g);
//! let order = topological_order(c.dag())?;
//! assert_eq!(order.order.len(), 3);
//!
//! let from = c.component_of(0).unwrap_or_default();
//! let to = c.component_of(3).unwrap_or_default();
//! let longest = critical_path(c.dag(), from, Some(to))?;
//! assert_eq!(longest.path.len(), 3);
//! # Ok::<(), depflow_core::GraphError>(())
//! ```

pub mod condense;
pub mod model;
pub mod paths;
pub mod scc;
pub mod stats;
pub mod topo;

pub use condense::{CONDENSATION_WEIGHT_MODEL, Condensation, induced_subgraph};
pub use model::{DEFAULT_WEIGHT_MODEL, Edge, Graph, Vertex};
pub use paths::{PathResult, critical_path, shortest_path};
pub use scc::{Components, SccResult, find_components};
pub use stats::{ComponentStats, GraphStats};
#[cfg(feature = "enumerate")]
pub use topo::all_topological_orders;
pub use topo::{
    TopoOrder, expand_components, is_dag, is_valid_topological_order, sink_vertices,
    source_vertices, topological_order, topological_order_by_degree, vertex_levels,
};
