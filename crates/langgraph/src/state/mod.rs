//! State types for the tool-calling conversation graph.
//!
//! `ConversationState` holds the message history plus the pending tool requests of
//! the current round; `ModelNode` and `ToolNode` read and write it.

pub mod conversation;

pub use conversation::{ConversationState, Phase, StopReason, ToolCall, ToolResult};
