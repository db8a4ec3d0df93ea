//! Subcommand handlers. Each takes its parsed arguments plus the resolved
//! output mode, builds one serializable report and renders it.

pub mod analyze;
pub mod generate;
pub mod path;
