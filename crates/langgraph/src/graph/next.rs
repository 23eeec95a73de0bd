//! Next-step result from a graph node: follow the node's edge, jump to a node, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (fixed or conditional); no edge means end.
/// - **Node(id)**: jump to the given node, ignoring the edge.
/// - **End**: stop and return the current state.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph::invoke`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
