//! Per-run operation counters.
//!
//! Every analysis returns a fresh [`Counters`] value alongside its result, so
//! nothing is shared between runs and there is nothing to reset. Counts are
//! observational only; no algorithm branches on them.

use std::ops::{Add, AddAssign};

use serde::Serialize;

/// Operation counts collected during one algorithm invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Vertices visited by a traversal (DFS discoveries, topological sweeps).
    pub visits: u64,
    /// Edges examined or relaxed.
    pub edge_relaxations: u64,
    /// Frontier pops (Kahn queue operations).
    pub frontier_ops: u64,
}

impl Counters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visits: 0,
            edge_relaxations: 0,
            frontier_ops: 0,
        }
    }

    pub const fn visit(&mut self) {
        self.visits += 1;
    }

    pub const fn relax(&mut self) {
        self.edge_relaxations += 1;
    }

    pub const fn frontier(&mut self) {
        self.frontier_ops += 1;
    }

    /// Total of all counted operations.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.visits + self.edge_relaxations + self.frontier_ops
    }
}

impl Add for Counters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            visits: self.visits + rhs.visits,
            edge_relaxations: self.edge_relaxations + rhs.edge_relaxations,
            frontier_ops: self.frontier_ops + rhs.frontier_ops,
        }
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
