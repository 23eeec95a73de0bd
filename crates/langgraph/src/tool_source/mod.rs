//! Tool source abstraction: declare tools and call a tool by name.
//!
//! Graph nodes depend on `ToolSource` instead of a concrete registry; applications
//! implement it over their own tool set, tests use `MockToolSource`.

mod mock;
mod validation;

pub use mock::MockToolSource;
pub use validation::check_arguments;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool declaration offered to the model: name, description and argument schema.
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; passed by `ModelNode` to
/// `LlmClient::invoke`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the model.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub input_schema: Value,
}

/// Text produced by a successful tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from calling a tool.
///
/// **Interaction**: `ToolNode` turns every variant into a failed `ToolResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Execution(String),
}

/// Tool source: list tools and call a tool.
///
/// **Interaction**: Used by `ModelNode` (list_tools, once at build time) and `ToolNode` (call_tool).
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// Declarations of every tool this source can run.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Calls a tool by name with a JSON arguments object.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError>;
}
