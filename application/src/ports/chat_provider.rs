//! Chat provider port
//!
//! Defines the interface the orchestrator uses to talk to a hosted model,
//! independent of which wire convention the provider speaks. Implementations
//! (adapters) live in the infrastructure layer.

use std::str::FromStr;

use async_trait::async_trait;
use synapse_domain::{
    AssistantReply, ConversationState, ToolCallRequest, ToolDescriptor, ToolExecutionResult, Turn,
};
use thiserror::Error;

/// Which hosted provider family an adapter speaks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Messages-style API: system prompt as a top-level parameter, content
    /// block arrays, all tool results batched into one user turn.
    Anthropic,
    /// Chat-completions-style API: system prompt inline in the message list,
    /// nullable assistant content, one tool-role turn per result.
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's API credential.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!(
                "unknown provider '{other}' (expected 'anthropic' or 'openai')"
            )),
        }
    }
}

/// Errors that can occur during a provider round-trip
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network-level failure. Retried with bounded backoff inside the
    /// adapter; surfacing here means the retry budget is exhausted.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider returned a non-success status for a well-formed request.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The recorded history cannot be replayed to this provider, e.g. it was
    /// written under the other wire convention.
    #[error("Malformed history: {0}")]
    MalformedHistory(String),

    /// The response body did not match the provider's documented shape.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Gateway for one conversation's provider traffic.
///
/// The orchestrator stays wire-format agnostic: it hands the adapter the
/// whole history plus the active tool set and gets back a parsed
/// [`AssistantReply`]; it hands back execution results and gets the turns to
/// append. How those map onto the provider's JSON is entirely the adapter's
/// business.
#[async_trait]
pub trait ChatProviderPort: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send the full history (plus tool schemas) and parse the reply.
    async fn send_turn(
        &self,
        state: &ConversationState,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply, ProviderError>;

    /// Render one batch of execution results into history turns.
    ///
    /// Adapters own the batching law: a Messages-style adapter returns a
    /// single user turn carrying every result block; a chat-completions
    /// adapter returns one tool turn per result. Either way the turns cover
    /// every id in `results`, in batch order.
    fn format_tool_results(&self, results: &[(ToolCallRequest, ToolExecutionResult)])
    -> Vec<Turn>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!(
            "Anthropic".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );
        assert_eq!(
            "openai".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenAi
        );
        assert!("gemini".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn credential_env_per_kind() {
        assert_eq!(ProviderKind::Anthropic.credential_env(), "ANTHROPIC_API_KEY");
        assert_eq!(ProviderKind::OpenAi.credential_env(), "OPENAI_API_KEY");
    }
}
