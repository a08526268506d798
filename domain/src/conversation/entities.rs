//! Conversation state entities
//!
//! [`ConversationState`] is the append-only turn history of one session. It
//! is provider-neutral on the outside, but each [`Turn`] stores its content
//! as the JSON value the active provider produced, so re-sending history to
//! that same provider is lossless. Adapters verify convention compatibility
//! before reuse rather than attempting translation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The speaker of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool results reported back to the model. Adapters decide the wire
    /// role: one user turn of result blocks, or one tool turn per result.
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Provider-native content: a plain string for simple text turns, or
    /// whatever structured value the adapter recorded (content block arrays,
    /// tool-call descriptors, result turns).
    pub content: Value,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Value::String(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Value::String(text.into()),
        }
    }

    pub fn assistant(content: Value) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    pub fn tool(content: Value) -> Self {
        Self {
            role: Role::Tool,
            content,
        }
    }

    /// The content as plain text, if it is a simple string turn.
    pub fn as_text(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// Ordered, append-only history of one conversation.
///
/// Always begins with exactly one system turn. Turns are only ever appended;
/// nothing rewrites or reorders recorded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Start a conversation with the given system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(system_prompt)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The system prompt this conversation was started with.
    pub fn system_prompt(&self) -> &str {
        // Invariant: turns[0] is always the system turn.
        self.turns[0].as_text().unwrap_or_default()
    }

    /// Turns after the system prompt, i.e. the dialogue proper.
    pub fn dialogue(&self) -> &[Turn] {
        &self.turns[1..]
    }
}
