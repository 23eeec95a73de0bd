//! Graph execution errors.
//!
//! `AgentError`: a node or the runner failed; returned by `CompiledStateGraph::invoke`.

use thiserror::Error;

use crate::graph::CompilationError;
use crate::llm::LlmError;

/// Error raised while running a graph.
///
/// Tool failures are not graph errors: `ToolNode` turns them into failed tool results
/// so the model can react. Only model failures and runner guards end up here.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A node failed; carries the reason.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model client failed.
    #[error("model error: {0}")]
    Llm(#[from] LlmError),

    /// The graph ran more node steps than its recursion limit allows.
    #[error("recursion limit of {0} steps reached")]
    RecursionLimit(usize),

    /// A node routed to an id that is not registered.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The graph could not be compiled.
    #[error("graph compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}
