//! Mock tool source for tests: fixed replies per tool name, records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{check_arguments, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Tool source with canned replies.
///
/// Each registered tool returns its fixed reply (`Ok(text)` or `Err(message)`);
/// unknown names fail with `ToolSourceError::NotFound`. Arguments are validated
/// against the tool's schema like a real source would.
#[derive(Default)]
pub struct MockToolSource {
    specs: Vec<ToolSpec>,
    replies: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool that takes one required string argument `arg` and returns `reply`.
    pub fn with_tool(mut self, name: &str, arg: &str, reply: impl Into<String>) -> Self {
        self.register(name, arg, Ok(reply.into()));
        self
    }

    /// Registers a tool that always fails with `error`.
    pub fn with_failing_tool(mut self, name: &str, arg: &str, error: impl Into<String>) -> Self {
        self.register(name, arg, Err(error.into()));
        self
    }

    fn register(&mut self, name: &str, arg: &str, reply: Result<String, String>) {
        self.specs.push(ToolSpec {
            name: name.to_string(),
            description: format!("mock tool {}", name),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": { arg: { "type": "string" } },
                "required": [arg]
            }),
        });
        self.replies.insert(name.to_string(), reply);
    }

    /// (name, arguments) of every call so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.specs.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments.clone()));
        }
        let spec = self
            .specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        check_arguments(spec, &arguments)?;
        match self.replies.get(name) {
            Some(Ok(text)) => Ok(ToolCallContent { text: text.clone() }),
            Some(Err(e)) => Err(ToolSourceError::Execution(e.clone())),
            None => Err(ToolSourceError::NotFound(name.to_string())),
        }
    }
}
