//! Conversation progress notifications
//!
//! Lets a presentation layer observe the orchestration loop without the use
//! case knowing anything about terminals.

use synapse_domain::{ToolCallRequest, ToolExecutionResult};

/// Callbacks fired as a conversation round progresses.
pub trait ConversationProgress: Send + Sync {
    fn on_prose(&self, _text: &str) {}
    fn on_tool_call(&self, _call: &ToolCallRequest) {}
    fn on_tool_result(&self, _call: &ToolCallRequest, _result: &ToolExecutionResult) {}
    fn on_turn_limit(&self, _limit: usize) {}
}

/// No-op implementation for when progress isn't needed
pub struct NoProgress;

impl ConversationProgress for NoProgress {}
