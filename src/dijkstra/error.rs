// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Recommended number of allowed node expansions in [shortest_path](crate::shortest_path)
/// before [PathError::StepLimitExceeded] is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [shortest_path](crate::shortest_path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The start or end nodes don't exist in a graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// The start and end nodes are in different connected components.
    #[error("no path from {from} to {to}")]
    NoPathFound { from: i64, to: i64 },

    /// Route search has exceeded its limit of steps.
    ///
    /// Concluding that no route exists requires traversing the whole component
    /// of the start node, which can result in a denial-of-service on large graphs.
    /// The step limit protects against resource exhaustion.
    #[error("step limit exceeded")]
    StepLimitExceeded,
}
