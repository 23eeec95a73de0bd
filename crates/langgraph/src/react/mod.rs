//! Tool-calling conversation graph: model node, tool node and the router between them.
//!
//! ```text
//! START → model ─ tools_condition ─┬→ tools → model
//!                                  └→ END
//! ```
//!
//! `ModelNode` invokes the model (capped at `max_iterations` invocations per run),
//! `tools_condition` routes to `ToolNode` while requests are pending, and `ToolNode`
//! answers every request before control returns to the model.

mod agent;
mod model_node;
mod tool_node;

pub use agent::{build_graph, ReactAgent};
pub use model_node::ModelNode;
pub use tool_node::ToolNode;

use crate::graph::END;
use crate::state::ConversationState;

/// Id of the model node.
pub const MODEL_NODE: &str = "model";
/// Id of the tool node.
pub const TOOLS_NODE: &str = "tools";

/// Routes to `TOOLS_NODE` when the last model turn left tool requests pending, else to `END`.
pub fn tools_condition(state: &ConversationState) -> String {
    if state.tool_calls.is_empty() {
        END.to_string()
    } else {
        TOOLS_NODE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolCall;

    #[test]
    fn routes_to_tools_only_with_pending_calls() {
        let mut s = ConversationState::new("sys", "q");
        assert_eq!(tools_condition(&s), END);
        s.tool_calls.push(ToolCall::new("calculator", "{}"));
        assert_eq!(tools_condition(&s), TOOLS_NODE);
    }
}
