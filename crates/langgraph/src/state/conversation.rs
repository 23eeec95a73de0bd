//! Conversation state and tool types.
//!
//! `ToolCall` and `ToolResult` follow the shape of chat-API tool calling: a name and a
//! JSON argument string in, one text result out. `ConversationState` is owned by a
//! single graph run and discarded when the run ends.

use crate::message::Message;

/// A single tool invocation requested by the model.
///
/// Written by `ModelNode` from the model response; consumed by `ToolNode` in the same
/// round. `id` correlates the request with its `ToolResult::call_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCall {
    /// Tool name as declared by the tool source.
    pub name: String,
    /// Arguments as a JSON string. A bare string is accepted too; see `ToolNode`.
    pub arguments: String,
    /// Optional id used to match the result.
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
            id: None,
        }
    }

    /// Sets the call id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result of executing one tool call.
///
/// On failure `content` is `"Error: <error>"` so the text the model sees is always
/// `content`, and `error` keeps the bare message for callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolResult {
    /// Id of the tool call this result answers.
    pub call_id: Option<String>,
    /// Tool name.
    pub name: String,
    /// Whether the tool succeeded.
    pub success: bool,
    /// Text shown to the model.
    pub content: String,
    /// Error message when `success` is false.
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result.
    pub fn ok(call_id: Option<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id,
            name: name.into(),
            success: true,
            content: content.into(),
            error: None,
        }
    }

    /// Failed result; `content` becomes `"Error: <error>"`.
    pub fn failed(call_id: Option<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            call_id,
            name: name.into(),
            success: false,
            content: format!("Error: {}", error),
            error: Some(error),
        }
    }

    /// Text shown to the model.
    pub fn text(&self) -> &str {
        &self.content
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Next step invokes the model.
    #[default]
    AwaitingModel,
    /// At least one tool request is pending.
    AwaitingTool,
    /// Terminal.
    Done,
}

/// Why a run reached `Phase::Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without requesting tools.
    FinalAnswer,
    /// The model-invocation cap was reached with work still outstanding.
    IterationLimitExceeded { limit: usize },
}

/// State for one tool-calling conversation run.
///
/// Messages are only ever appended. `tool_calls` holds the requests of the current
/// round: `ModelNode` fills it, `ToolNode` answers every entry and clears it.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Conversation history in order.
    pub messages: Vec<Message>,
    /// Pending tool requests of the current round.
    pub tool_calls: Vec<ToolCall>,
    /// Number of model invocations so far in this run.
    pub model_calls: usize,
    pub phase: Phase,
    /// Set once the run is done.
    pub stop_reason: Option<StopReason>,
}

impl ConversationState {
    /// Initial state: system prompt followed by the user's question.
    pub fn new(system: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(question)],
            ..Self::default()
        }
    }

    /// Content of the final assistant message when the run ended with an answer.
    pub fn final_answer(&self) -> Option<&str> {
        if self.stop_reason != Some(StopReason::FinalAnswer) {
            return None;
        }
        match self.messages.last() {
            Some(Message::Assistant(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True when the run stopped because of the model-invocation cap.
    pub fn hit_iteration_limit(&self) -> bool {
        matches!(
            self.stop_reason,
            Some(StopReason::IterationLimitExceeded { .. })
        )
    }

    /// All tool results recorded in this run, in order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.messages.iter().filter_map(|m| match m {
            Message::Tool(r) => Some(r),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_system_then_user() {
        let s = ConversationState::new("sys", "question");
        assert_eq!(s.messages.len(), 2);
        assert!(matches!(&s.messages[0], Message::System(x) if x == "sys"));
        assert!(matches!(&s.messages[1], Message::User(x) if x == "question"));
        assert_eq!(s.phase, Phase::AwaitingModel);
        assert!(s.final_answer().is_none());
    }

    #[test]
    fn final_answer_requires_final_answer_stop() {
        let mut s = ConversationState::new("sys", "q");
        s.messages.push(Message::assistant("done"));
        assert!(s.final_answer().is_none());
        s.stop_reason = Some(StopReason::FinalAnswer);
        assert_eq!(s.final_answer(), Some("done"));
    }

    #[test]
    fn tool_results_iterates_tool_messages() {
        let mut s = ConversationState::new("sys", "q");
        s.messages.push(Message::Tool(ToolResult::ok(None, "a", "1")));
        s.messages.push(Message::assistant("x"));
        s.messages.push(Message::Tool(ToolResult::failed(None, "b", "boom")));
        let names: Vec<_> = s.tool_results().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
