//! Ready-made tool-calling agent over the model/tool graph.

use std::sync::Arc;

use tracing::info;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END, START};
use crate::llm::LlmClient;
use crate::state::ConversationState;
use crate::tool_source::{ToolSource, ToolSpec};

use super::{tools_condition, ModelNode, ToolNode, MODEL_NODE, TOOLS_NODE};

/// Builds `START → model ⇄ tools → END` with the model capped at `max_iterations`
/// invocations. The recursion limit leaves room for every model and tool step plus
/// the final cap check.
pub fn build_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    specs: Vec<ToolSpec>,
    max_iterations: usize,
) -> Result<CompiledStateGraph<ConversationState>, CompilationError> {
    let mut graph = StateGraph::<ConversationState>::new();
    graph
        .add_node(MODEL_NODE, Box::new(ModelNode::new(llm, specs, max_iterations)))
        .add_node(TOOLS_NODE, Box::new(ToolNode::new(tools)))
        .add_edge(START, MODEL_NODE)
        .add_conditional_edges(MODEL_NODE, tools_condition, [TOOLS_NODE, END])
        .add_edge(TOOLS_NODE, MODEL_NODE)
        .with_recursion_limit(max_iterations.saturating_mul(2).saturating_add(2));
    graph.compile()
}

/// Tool-calling agent: one compiled graph, a fresh `ConversationState` per run.
///
/// **Interaction**: Built from an `LlmClient` and a `ToolSource`; `run` returns the
/// final state, whose `stop_reason` tells a final answer from an iteration-cap stop.
pub struct ReactAgent {
    graph: CompiledStateGraph<ConversationState>,
    tools: Vec<ToolSpec>,
    max_iterations: usize,
}

impl ReactAgent {
    /// Lists the source's tools once and compiles the graph.
    pub async fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        max_iterations: usize,
    ) -> Result<Self, AgentError> {
        let specs = tools
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("listing tools: {}", e)))?;
        let graph = build_graph(llm, tools, specs.clone(), max_iterations)?;
        Ok(Self {
            graph,
            tools: specs,
            max_iterations,
        })
    }

    /// Runs one conversation from a system prompt and a question.
    pub async fn run(
        &self,
        system: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<ConversationState, AgentError> {
        let state = ConversationState::new(system, question);
        let out = self.graph.invoke(state).await?;
        info!(
            model_calls = out.model_calls,
            messages = out.messages.len(),
            stop_reason = ?out.stop_reason,
            "conversation run finished"
        );
        Ok(out)
    }

    pub fn graph(&self) -> &CompiledStateGraph<ConversationState> {
        &self.graph
    }

    /// Declarations offered to the model.
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}
