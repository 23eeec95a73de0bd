//! LLM client seam and implementations.
//!
//! - `LlmClient`: message history + tool declarations in, text or tool calls out
//! - `ChatOllama`: locally hosted models through the Ollama chat API
//! - `MockLlm`: scripted responses for tests
//! - `LlmError`: call failures

mod error;
mod mock;
mod ollama;

pub use error::LlmError;
pub use mock::MockLlm;
pub use ollama::{ChatOllama, OllamaConfig, DEFAULT_OLLAMA_BASE_URL};

use async_trait::async_trait;

use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// One model reply: text and zero or more tool requests.
///
/// Empty `tool_calls` means the reply is a final answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Final answer without tool requests.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// Reply requesting a single tool.
    pub fn tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            tool_calls: vec![ToolCall::new(name, arguments)],
        }
    }

    /// Sets tool_calls (builder).
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

/// Chat model client.
///
/// The caller passes the whole history and the declarations of the tools the model
/// may request; the wire format is the implementation's business.
///
/// **Interaction**: Used by `ModelNode`; implemented by `ChatOllama` and `MockLlm`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion over `messages`, offering `tools`.
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, LlmError>;

    /// Model identifier, for logs and agent info.
    fn model_name(&self) -> &str;
}
