//! Parsed assistant reply

use serde::{Deserialize, Serialize};

use super::entities::Turn;
use super::usage::TokenUsage;
use crate::tool::entities::ToolCallRequest;

/// One assistant response, already parsed out of the provider's wire shape.
///
/// `turn` is the provider-native assistant turn to append to history;
/// `prose` and `tool_calls` are the adapter's uniform reading of it. Tool
/// calls appear in the order the provider emitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// The assistant turn exactly as it must be recorded in history
    pub turn: Turn,
    /// Concatenated prose content, if any
    pub prose: Option<String>,
    /// Requested tool invocations, in provider emission order
    pub tool_calls: Vec<ToolCallRequest>,
    /// Token usage for this round-trip, when the provider reported it
    pub usage: Option<TokenUsage>,
}

impl AssistantReply {
    /// A reply with neither prose nor tool calls is treated as an empty
    /// final answer, never an error.
    pub fn is_empty(&self) -> bool {
        self.prose.as_deref().is_none_or(str::is_empty) && self.tool_calls.is_empty()
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
