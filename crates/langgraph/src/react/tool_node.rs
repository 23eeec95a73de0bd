//! Tool node: answer every pending tool request, in order, with one tool message each.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Next;
use crate::message::Message;
use crate::state::{ConversationState, Phase, ToolCall, ToolResult};
use crate::tool_source::ToolSource;
use crate::Node;

use super::TOOLS_NODE;

/// Tool node: executes `state.tool_calls` sequentially and appends one
/// `Message::Tool` per request, then clears the pending list.
///
/// A failing tool does not fail the run: the error is recorded as a failed
/// `ToolResult` so the model can retry or report it. Arguments that are not a JSON
/// object are passed to the source as a JSON string.
///
/// **Interaction**: Implements `Node<ConversationState>`; holds `Arc<dyn ToolSource>`.
pub struct ToolNode {
    tools: Arc<dyn ToolSource>,
}

impl ToolNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self { tools }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let raw = call.arguments.trim();
        let args = if raw.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(v @ Value::Object(_)) => v,
                _ => Value::String(raw.to_string()),
            }
        };
        match self.tools.call_tool(&call.name, args).await {
            Ok(content) => {
                debug!(tool = %call.name, "tool call succeeded");
                ToolResult::ok(call.id.clone(), &call.name, content.text)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                ToolResult::failed(call.id.clone(), &call.name, e.to_string())
            }
        }
    }
}

#[async_trait]
impl Node<ConversationState> for ToolNode {
    fn id(&self) -> &str {
        TOOLS_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        if state.tool_calls.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "tool node reached without a pending tool request".into(),
            ));
        }
        let calls = std::mem::take(&mut state.tool_calls);
        for call in &calls {
            let result = self.execute(call).await;
            state.messages.push(Message::Tool(result));
        }
        state.phase = Phase::AwaitingModel;
        Ok((state, Next::Continue))
    }
}
