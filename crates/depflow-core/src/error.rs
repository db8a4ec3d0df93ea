use std::fmt;

/// Machine-readable error codes for scripting against `depflow` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    OutOfRange,
    CycleDetected,
    InvalidGraphFile,
    ConfigParseError,
}

impl ErrorCode {
    pub const ALL: [Self; 4] = [
        Self::OutOfRange,
        Self::CycleDetected,
        Self::InvalidGraphFile,
        Self::ConfigParseError,
    ];

    /// Look a code up by its `E####` identifier.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// The code a message starts with, as in `"E3001 Invalid graph file: …"`.
    #[must_use]
    pub fn from_message_prefix(message: &str) -> Option<Self> {
        message.split_whitespace().next().and_then(Self::from_code)
    }

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::OutOfRange => "E1001",
            Self::ConfigParseError => "E1002",
            Self::CycleDetected => "E2003",
            Self::InvalidGraphFile => "E3001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfRange => "Vertex index out of range",
            Self::ConfigParseError => "Config file parse error",
            Self::CycleDetected => "Graph contains a cycle",
            Self::InvalidGraphFile => "Invalid graph file",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::OutOfRange => Some("Vertex indices must lie in [0, n)."),
            Self::ConfigParseError => Some("Fix syntax in depflow.toml and retry."),
            Self::CycleDetected => {
                Some("Analyse the condensation graph instead; it is always acyclic.")
            }
            Self::InvalidGraphFile => {
                Some("Expected JSON with `n`, `directed`, and `edges` [{u, v, w}].")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures raised by the analysis engine.
///
/// An unreachable target is not an error: it shows up as an infinite
/// distance and an empty path in [`crate::graph::paths::PathResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex index outside `[0, len)` was used.
    #[error("vertex index {index} out of range for graph with {len} vertices")]
    OutOfRange { index: usize, len: usize },

    /// A DAG-only operation ran on a graph that has a cycle.
    #[error("graph contains a cycle: ordered {ordered} of {total} vertices")]
    CycleDetected { ordered: usize, total: usize },
}

impl GraphError {
    /// Map the error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfRange { .. } => ErrorCode::OutOfRange,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
        }
    }
}

/// Fail with [`GraphError::OutOfRange`] unless `index < len`.
///
/// # Errors
///
/// Returns [`GraphError::OutOfRange`] when `index >= len`.
pub const fn check_index(index: usize, len: usize) -> Result<usize, GraphError> {
    if index < len {
        Ok(index)
    } else {
        Err(GraphError::OutOfRange { index, len })
    }
}
