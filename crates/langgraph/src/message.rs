//! Conversation messages.
//!
//! Roles match the chat APIs: system prompt, user input, assistant reply, an assistant
//! turn that requests tools, and a tool result answering one of those requests.

use crate::state::{ToolCall, ToolResult};

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    /// User input.
    User(String),
    /// Final model reply without tool requests.
    Assistant(String),
    /// Model turn that requested one or more tools. `content` may be empty.
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    /// Result of one tool call.
    Tool(ToolResult),
}

impl Message {
    /// Builds a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Builds a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Builds an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Role label as used by chat APIs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) | Message::ToolCalls { .. } => "assistant",
            Message::Tool(_) => "tool",
        }
    }

    /// Text content of the message. For tool results this is the content on success
    /// and the error text on failure.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) => s,
            Message::ToolCalls { content, .. } => content,
            Message::Tool(r) => r.text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        assert_eq!(Message::system("s").role(), "system");
        assert_eq!(Message::user("u").role(), "user");
        assert_eq!(Message::assistant("a").role(), "assistant");
        let calls = Message::ToolCalls {
            content: String::new(),
            calls: vec![],
        };
        assert_eq!(calls.role(), "assistant");
        assert_eq!(Message::Tool(ToolResult::ok(None, "t", "x")).role(), "tool");
    }

    #[test]
    fn tool_message_content_uses_error_on_failure() {
        let m = Message::Tool(ToolResult::failed(None, "calculator", "division by zero"));
        assert_eq!(m.content(), "Error: division by zero");
    }
}
