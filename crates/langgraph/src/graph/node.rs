//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// Nodes receive the full state by value and return it updated. Routing normally
/// comes from the graph edges (`Next::Continue`); a node may override it with
/// `Next::Node(id)` or stop the run with `Next::End`.
///
/// **Interaction**: Registered with `StateGraph::add_node`; run by `CompiledStateGraph::invoke`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"model"`, `"tools"`).
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
