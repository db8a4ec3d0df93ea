#![forbid(unsafe_code)]
//! depflow-core library.
//!
//! Strongly connected components, condensation, topological ordering and
//! DAG shortest / critical paths over weighted task-dependency graphs.
//!
//! # Conventions
//!
//! - **Errors**: Algorithms return [`GraphError`]; file handling uses
//!   `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Counters**: Every analysis returns its own [`Counters`]; nothing is
//!   shared between runs.

pub mod codec;
pub mod counters;
pub mod error;
pub mod generate;
pub mod graph;

pub use codec::{graph_to_json, load_graph, parse_graph, save_graph};
pub use counters::Counters;
pub use error::{ErrorCode, GraphError};
pub use graph::{Condensation, Edge, Graph, Vertex};
