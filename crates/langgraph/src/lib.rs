//! Minimal state-graph runtime for tool-calling LLM agents: state in, state out.
//!
//! A `StateGraph<S>` holds async `Node<S>` steps joined by fixed or conditional
//! edges; `compile` validates the structure and `CompiledStateGraph::invoke` runs it.
//! The `react` module wires the usual tool-calling loop on top of it:
//! `ModelNode` (talks to an `LlmClient`) and `ToolNode` (calls a `ToolSource`),
//! routed by `tools_condition` and capped at a fixed number of model invocations.

pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod react;
pub mod state;
pub mod tool_source;

pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
pub use llm::{ChatOllama, LlmClient, LlmError, LlmResponse, MockLlm, OllamaConfig};
pub use message::Message;
pub use react::{build_graph, tools_condition, ModelNode, ReactAgent, ToolNode, MODEL_NODE, TOOLS_NODE};
pub use state::{ConversationState, Phase, StopReason, ToolCall, ToolResult};
pub use tool_source::{check_arguments, MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
