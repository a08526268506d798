//! Messages-convention provider adapter
//!
//! Speaks the Anthropic Messages API shape: the system prompt rides as a
//! top-level parameter, assistant turns are content block arrays, and every
//! tool result of a batch is reported inside a single user turn of
//! `tool_result` blocks. History recorded by this adapter replays verbatim;
//! history recorded under the other convention, or with result ids that do
//! not match their requesting turn, is rejected before anything is sent.

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

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    transport: HttpTransport,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Assemble the request body for the current history.
    ///
    /// Pure over `state`: calling it twice without new turns yields
    /// byte-identical JSON.
    fn build_request(
        &self,
        state: &ConversationState,
        tools: &[ToolDescriptor],
    ) -> Result<Value, ProviderError> {
        let messages = build_messages(state)?;

        // The system prompt is a top-level parameter, never a message. The
        // ephemeral cache marks keep the static prefix (system + tool
        // schemas) cheap on replay.
        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": [{
                "type": "text",
                "text": state.system_prompt(),
                "cache_control": { "type": "ephemeral" },
            }],
            "messages": messages,
        });

        if !tools.is_empty() {
            let mut rendered = render::anthropic_tools(tools)
                .map_err(|e| ProviderError::Protocol(e.to_string()))?;
            if let Some(last) = rendered.as_array_mut().and_then(|a| a.last_mut()) {
                last["cache_control"] = json!({ "type": "ephemeral" });
            }
            body["tools"] = rendered;
        }

        Ok(body)
    }

    fn parse_response(&self, value: &Value) -> Result<AssistantReply, ProviderError> {
        let content = value
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::Protocol("response has no content array".into()))?;

        let mut prose_parts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in content {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        prose_parts.push(text.to_string());
                    }
                }
                Some("tool_use") => {
                    let id = block
                        .get("id")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            ProviderError::Protocol("tool_use block without id".into())
                        })?;
                    let name = block
                        .get("name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            ProviderError::Protocol("tool_use block without name".into())
                        })?;
                    let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                    let raw = serde_json::to_string(&input)
                        .map_err(|e| ProviderError::Protocol(e.to_string()))?;
                    tool_calls.push(ToolCallRequest::new(id, name, raw));
                }
                // Unknown block types are recorded in history but ignored
                // for dispatch.
                _ => {}
            }
        }

        let usage = value.get("usage").map(|u| TokenUsage {
            input_tokens: u.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
            output_tokens: u.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
            cached_tokens: u
                .get("cache_read_input_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        });

        debug!(
            tool_calls = tool_calls.len(),
            prose = !prose_parts.is_empty(),
            "parsed messages reply"
        );

        Ok(AssistantReply {
            turn: Turn::assistant(Value::Array(content.clone())),
            prose: if prose_parts.is_empty() {
                None
            } else {
                Some(prose_parts.join("\n"))
            },
            tool_calls,
            usage,
        })
    }
}

/// Render the dialogue, verifying the tool-call pairing law as we go: an
/// assistant turn with `tool_use` blocks must be followed by exactly one
/// result turn echoing the same ids in the same order.
fn build_messages(state: &ConversationState) -> Result<Vec<Value>, ProviderError> {
    let mut messages = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for turn in state.dialogue() {
        if !pending.is_empty() && turn.role != Role::Tool {
            return Err(ProviderError::MalformedHistory(
                "tool calls recorded without a following result turn".into(),
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
                let blocks = turn.content.as_array().ok_or_else(|| {
                    ProviderError::MalformedHistory(
                        "assistant turn is not a content block array; history was recorded \
                         under a different wire convention"
                            .into(),
                    )
                })?;
                pending = blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("tool_use"))
                    .filter_map(|b| b.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                messages.push(json!({ "role": "assistant", "content": turn.content }));
            }
            Role::Tool => {
                let blocks = turn.content.as_array().ok_or_else(|| {
                    ProviderError::MalformedHistory("tool turn is not a block array".into())
                })?;
                let result_ids: Vec<&str> = blocks
                    .iter()
                    .map(|b| {
                        if b.get("type").and_then(Value::as_str) != Some("tool_result") {
                            return Err(ProviderError::MalformedHistory(
                                "tool turn contains non-tool_result blocks".into(),
                            ));
                        }
                        b.get("tool_use_id").and_then(Value::as_str).ok_or_else(|| {
                            ProviderError::MalformedHistory(
                                "tool_result block without tool_use_id".into(),
                            )
                        })
                    })
                    .collect::<Result<_, _>>()?;
                if result_ids != pending {
                    return Err(ProviderError::MalformedHistory(format!(
                        "tool results {result_ids:?} do not match requested calls {pending:?}"
                    )));
                }
                pending.clear();
                // Results ride back as a user turn on this convention.
                messages.push(json!({ "role": "user", "content": turn.content }));
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
impl ChatProviderPort for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn send_turn(
        &self,
        state: &ConversationState,
        tools: &[ToolDescriptor],
    ) -> Result<AssistantReply, ProviderError> {
        let body = self.build_request(state, tools)?;
        let headers = [
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", API_VERSION.to_string()),
        ];
        let url = format!("{}/v1/messages", self.base_url);
        let response = self.transport.post_json(&url, &headers, &body).await?;
        self.parse_response(&response)
    }

    fn format_tool_results(
        &self,
        results: &[(ToolCallRequest, ToolExecutionResult)],
    ) -> Vec<Turn> {
        // Batching law: every result of the batch lands in ONE turn, in
        // batch order, one tool_result block per call id.
        let blocks: Vec<Value> = results
            .iter()
            .map(|(call, result)| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": call.id,
                    "content": result.to_payload(),
                })
            })
            .collect();
        vec![Turn::tool(Value::Array(blocks))]
    }
}
