//! Chat-completions-convention provider adapter
//!
//! Speaks the OpenAI chat-completions shape: the system prompt is an inline
//! message, assistant turns are message objects with nullable content plus a
//! `tool_calls` array, and every tool result travels as its own tool-role
//! message keyed by `tool_call_id`. The same pairing law as the Messages
//! adapter applies, checked per result message instead of per block.

use async_trait::async_trait;
use serde_json::{Value, json};
use synapse_application::ports::chat_provider::{ChatProviderPort, ProviderError, ProviderKind};
use synapse_domain::{
    AssistantReply, ConversationState, Role, TokenUsage, ToolCallRequest, ToolDescriptor,
    ToolExecutionResult, Turn,
};
use tracing::debug;

use crate::schema::render;

use super::transport::HttpTransport;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiProvider {
    transport: HttpTransport,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(
        &self,
        state: &ConversationState,
        tools: &[ToolDescriptor],
    ) -> Result<Value, ProviderError> {
        // The system prompt is just the first message on this convention.
        let mut messages = vec![json!({
            "role": "system",
            "content": state.system_prompt(),
        })];
        messages.extend(build_dialogue(state)?);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });

        if !tools.is_empty() {
            let rendered = render::openai_tools(tools)
                .map_err(|e| ProviderError::Protocol(e.to_string()))?;
            body["tools"] = rendered;
        }

        Ok(body)
    }

    fn parse_response(&self, value: &Value) -> Result<AssistantReply, ProviderError> {
        let message = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| ProviderError::Protocol("response has no choices[0].message".into()))?;

        // Nullable content is the normal shape for tool-call replies.
        let prose = message
            .get("content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut tool_calls = Vec::new();
        if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
            for call in calls {
                let id = call.get("id").and_then(Value::as_str).ok_or_else(|| {
                    ProviderError::Protocol("tool call without id".into())
                })?;
                let function = call.get("function").ok_or_else(|| {
                    ProviderError::Protocol("tool call without function".into())
                })?;
                let name = function.get("name").and_then(Value::as_str).ok_or_else(|| {
                    ProviderError::Protocol("tool call without function name".into())
                })?;
                // Arguments arrive pre-serialized on this convention.
                let raw = function
                    .get("arguments")
                    .and_then(Value::as_str)
                    .unwrap_or("{}");
                tool_calls.push(ToolCallRequest::new(id, name, raw));
            }
        }

        let usage = value.get("usage").map(|u| TokenUsage {
            input_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
            output_tokens: u
                .get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            cached_tokens: u
                .get("prompt_tokens_details")
                .and_then(|d| d.get("cached_tokens"))
                .and_then(Value::as_u64)
                .unwrap_or(0),
        });

        debug!(
            tool_calls = tool_calls.len(),
            prose = prose.is_some(),
            "parsed chat-completions reply"
        );

        Ok(AssistantReply {
            turn: Turn::assistant(message.clone()),
            prose,
            tool_calls,
            usage,
        })
    }
}

/// Render the dialogue, verifying the pairing law: every id an assistant
/// turn requested is answered by tool-role messages in the same order before
/// anything else happens.
fn build_dialogue(state: &ConversationState) -> Result<Vec<Value>, ProviderError> {
    let mut messages = Vec::new();
    let mut pending: std::collections::VecDeque<String> = Default::default();

    for turn in state.dialogue() {
        if !pending.is_empty() && turn.role != Role::Tool {
            return Err(ProviderError::MalformedHistory(
                "tool calls recorded without their result messages".into(),
            ));
        }

        match turn.role {
            Role::User => {
                let text = turn.as_text().ok_or_else(|| {
                    ProviderError::MalformedHistory("user turn content is not text".into())
                })?;
                messages.push(json!({ "role": "user", "content": text }));
            }
            Role::Assistant => {
                // Recorded as the provider's message object; a block array
                // means the history came from the other convention.
                if !turn.content.is_object() {
                    return Err(ProviderError::MalformedHistory(
                        "assistant turn is not a message object; history was recorded \
                         under a different wire convention"
                            .into(),
                    ));
                }
                if let Some(calls) = turn.content.get("tool_calls").and_then(Value::as_array) {
                    pending = calls
                        .iter()
                        .filter_map(|c| c.get("id").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect();
                }
                messages.push(turn.content.clone());
            }
            Role::Tool => {
                let id = turn
                    .content
                    .get("tool_call_id")
                    .and_then(Value::as_str)
                    .filter(|_| {
                        turn.content.get("role").and_then(Value::as_str) == Some("tool")
                    })
                    .ok_or_else(|| {
                        ProviderError::MalformedHistory(
                            "tool turn is not a tool-role message".into(),
                        )
                    })?;
                match pending.pop_front() {
                    Some(expected) if expected == id => {}
                    other => {
                        return Err(ProviderError::MalformedHistory(format!(
                            "tool result for '{id}' does not match requested call {other:?}"
                        )));
                    }
                }
                messages.push(turn.content.clone());
            }
            Role::System => {
                return Err(ProviderError::MalformedHistory(
                    "system turn inside dialogue".into(),
                ));
            }
        }
    }

    if !pending.is_empty() {
        return Err(ProviderError::MalformedHistory(
            "history ends with unanswered tool calls".into(),
        ));
    }
    Ok(messages)
}

#[async_trait]
impl ChatProviderPort for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn send_turn(
        &self,
        state: &ConversationState,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply, ProviderError> {
        let body = self.build_request(state, tools)?;
        let headers = [("authorization", format!("Bearer {}", self.api_key))];
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self.transport.post_json(&url, &headers, &body).await?;
        self.parse_response(&response)
    }

    fn format_tool_results(
        &self,
        results: &[(ToolCallRequest, ToolExecutionResult)],
    ) -> Vec<Turn> {
        // Batching law: one tool-role message per result, in batch order.
        results
            .iter()
            .map(|(call, result)| {
                Turn::tool(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": result.to_payload(),
                }))
            })
            .collect()
    }
}
