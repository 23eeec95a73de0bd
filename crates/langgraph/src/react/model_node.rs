//! Model node: call the LLM with the history and tool declarations, record the reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Next;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{ConversationState, Phase, StopReason};
use crate::tool_source::ToolSpec;
use crate::Node;

use super::MODEL_NODE;

/// Model node: one model invocation per run step.
///
/// Before invoking it checks the iteration cap: when `max_iterations` invocations
/// have already happened the run stops with `StopReason::IterationLimitExceeded`
/// instead of calling the model again. A reply without tool calls becomes the final
/// `Message::Assistant`; a reply with tool calls is appended as `Message::ToolCalls`
/// and its requests become pending in `state.tool_calls`.
///
/// **Interaction**: Implements `Node<ConversationState>`; holds `Arc<dyn LlmClient>`
/// and the tool declarations offered on every call.
pub struct ModelNode {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
    max_iterations: usize,
}

impl ModelNode {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Vec<ToolSpec>, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }
}

#[async_trait]
impl Node<ConversationState> for ModelNode {
    fn id(&self) -> &str {
        MODEL_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        if !state.tool_calls.is_empty() {
            return Err(AgentError::ExecutionFailed(format!(
                "model invoked with {} unanswered tool request(s)",
                state.tool_calls.len()
            )));
        }
        if state.model_calls >= self.max_iterations {
            warn!(limit = self.max_iterations, "iteration limit reached, stopping run");
            state.phase = Phase::Done;
            state.stop_reason = Some(StopReason::IterationLimitExceeded {
                limit: self.max_iterations,
            });
            return Ok((state, Next::End));
        }

        let response = self.llm.invoke(&state.messages, &self.tools).await?;
        state.model_calls += 1;

        if response.tool_calls.is_empty() {
            debug!(model_calls = state.model_calls, "model produced final answer");
            state.messages.push(Message::Assistant(response.content));
            state.phase = Phase::Done;
            state.stop_reason = Some(StopReason::FinalAnswer);
        } else {
            let round = state.model_calls;
            let calls: Vec<_> = response
                .tool_calls
                .into_iter()
                .enumerate()
                .map(|(i, mut c)| {
                    if c.id.is_none() {
                        c.id = Some(format!("call-{}-{}", round, i + 1));
                    }
                    c
                })
                .collect();
            debug!(model_calls = round, requests = calls.len(), "model requested tools");
            state.messages.push(Message::ToolCalls {
                content: response.content,
                calls: calls.clone(),
            });
            state.tool_calls = calls;
            state.phase = Phase::AwaitingTool;
        }
        Ok((state, Next::Continue))
    }
}
