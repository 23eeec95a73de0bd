//! Mock LLM for tests and offline runs.
//!
//! Replays a script of replies in order, one per `invoke`, and records the message
//! history it was called with so tests can check what the model saw.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, LlmResponse};
use crate::message::Message;
use crate::tool_source::ToolSpec;

/// One scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Respond(LlmResponse),
    Fail(LlmError),
}

/// Mock LLM: scripted replies.
///
/// With `always` the single reply repeats forever; otherwise the script is consumed
/// in order and an exhausted script fails with `LlmError::ApiError`.
///
/// **Interaction**: Implements `LlmClient`; used by `ModelNode` in tests.
pub struct MockLlm {
    script: Vec<Reply>,
    repeat: bool,
    cursor: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Replies in the given order, one per call.
    pub fn scripted(replies: Vec<LlmResponse>) -> Self {
        Self::from_script(replies.into_iter().map(Reply::Respond).collect(), false)
    }

    /// Returns the same reply on every call.
    pub fn always(reply: LlmResponse) -> Self {
        Self::from_script(vec![Reply::Respond(reply)], true)
    }

    /// Final answer with no tool calls on every call.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::always(LlmResponse::text(content))
    }

    /// Fails every call with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self::from_script(vec![Reply::Fail(error)], true)
    }

    fn from_script(script: Vec<Reply>, repeat: bool) -> Self {
        Self {
            script,
            repeat,
            cursor: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Appends a failing step to the script (builder).
    pub fn then_fail(mut self, error: LlmError) -> Self {
        self.script.push(Reply::Fail(error));
        self
    }

    /// Appends a reply to the script (builder).
    pub fn then(mut self, reply: LlmResponse) -> Self {
        self.script.push(Reply::Respond(reply));
        self
    }

    /// Number of `invoke` calls so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Message histories passed to each call, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<LlmResponse, LlmError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        let n = self.cursor.fetch_add(1, Ordering::SeqCst);
        let reply = if self.repeat {
            self.script.first()
        } else {
            self.script.get(n)
        };
        match reply {
            Some(Reply::Respond(r)) => Ok(r.clone()),
            Some(Reply::Fail(e)) => Err(e.clone()),
            None => Err(LlmError::ApiError(format!(
                "mock script exhausted after {} replies",
                self.script.len()
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
