//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the edge structure is not runnable.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge references a node id that was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// No edge leaves `START`.
    #[error("graph has no entry edge from START")]
    MissingEntry,
    /// A node id collides with `START` or `END`.
    #[error("reserved node id: {0}")]
    ReservedId(String),
    /// A source already has an outgoing edge.
    #[error("node {0} already has an outgoing edge")]
    DuplicateEdge(String),
}
