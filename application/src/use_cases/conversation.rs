//! Conversation use case
//!
//! Drives the multi-turn tool-calling loop for one conversation:
//! 1. Append the user message and send the full history to the provider
//! 2. Record the assistant reply; surface prose to the presentation layer
//! 3. If the reply requests tools, dispatch every call in emission order,
//!    report the whole batch back, and go to 1
//! 4. Otherwise the reply is the final answer for this round
//!
//! The loop is wire-format agnostic: everything provider-specific lives
//! behind [`ChatProviderPort`], everything handler-specific behind
//! [`ToolInvokerPort`].

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ports::chat_provider::{ChatProviderPort, ProviderError};
use crate::ports::progress::{ConversationProgress, NoProgress};
use crate::ports::tool_invoker::ToolInvokerPort;
use crate::ports::transcript::{NoTranscript, TranscriptEvent, TranscriptLogger};
use synapse_domain::{ConversationState, ToolDescriptor, Turn, UsageAccumulator};

/// Ceiling on consecutive tool-requesting responses within one round.
///
/// Reaching it terminates the round before the final batch is dispatched,
/// so a looping model cannot trigger unbounded side effects.
pub const DEFAULT_MAX_TOOL_TURNS: usize = 15;

/// Errors that can end a conversation round
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool turn limit ({limit}) exceeded")]
    MaxTurnsExceeded { limit: usize },

    #[error("Cancelled")]
    Cancelled,
}

/// Final outcome of one conversation round.
#[derive(Debug, Clone)]
pub struct ConversationReply {
    /// The assistant's final prose. Empty when the model returned nothing,
    /// which is a valid (if unhelpful) answer.
    pub text: String,
    /// Usage totals across the whole conversation so far
    pub usage: UsageAccumulator,
}

/// One live conversation: owned history plus the collaborators that drive it.
pub struct Conversation {
    provider: Arc<dyn ChatProviderPort>,
    invoker: Arc<dyn ToolInvokerPort>,
    tools: Vec<ToolDescriptor>,
    state: ConversationState,
    usage: UsageAccumulator,
    max_tool_turns: usize,
    progress: Arc<dyn ConversationProgress>,
    transcript: Arc<dyn TranscriptLogger>,
    cancel: CancellationToken,
}

impl Conversation {
    pub fn new(
        provider: Arc<dyn ChatProviderPort>,
        invoker: Arc<dyn ToolInvokerPort>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let tools = invoker.descriptors();
        Self {
            provider,
            invoker,
            tools,
            state: ConversationState::new(system_prompt),
            usage: UsageAccumulator::new(),
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            progress: Arc::new(NoProgress),
            transcript: Arc::new(NoTranscript),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ConversationProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_tool_turns(mut self, limit: usize) -> Self {
        self.max_tool_turns = limit;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn usage(&self) -> UsageAccumulator {
        self.usage
    }

    /// Run one round: send the user message, loop through tool dispatch
    /// until the model answers in prose (or the round errors out).
    ///
    /// History mutations are append-only and survive an error return, so a
    /// failed round leaves everything recorded up to the failure point.
    pub async fn send(&mut self, message: &str) -> Result<ConversationReply, ConversationError> {
        self.state.push(Turn::user(message));
        self.transcript
            .log(TranscriptEvent::new("user_message", json!({ "text": message })));

        let mut tool_rounds = 0usize;

        loop {
            // Cancellation is only honored between round-trips; an in-flight
            // request or a running handler batch always completes.
            if self.cancel.is_cancelled() {
                info!("conversation cancelled before provider round-trip");
                return Err(ConversationError::Cancelled);
            }

            let reply = self.provider.send_turn(&self.state, &self.tools).await?;
            if let Some(usage) = reply.usage {
                self.usage.add(usage);
            }

            if reply.wants_tools() {
                tool_rounds += 1;
                if tool_rounds >= self.max_tool_turns {
                    // The limiting turn is dropped, not recorded: history
                    // must never end on tool calls nothing answered, or the
                    // next round would be unbuildable.
                    warn!(
                        limit = self.max_tool_turns,
                        "tool turn limit reached, dropping pending batch"
                    );
                    self.progress.on_turn_limit(self.max_tool_turns);
                    self.transcript.log(TranscriptEvent::new(
                        "turn_limit",
                        json!({ "limit": self.max_tool_turns }),
                    ));
                    return Err(ConversationError::MaxTurnsExceeded {
                        limit: self.max_tool_turns,
                    });
                }
            }

            self.state.push(reply.turn.clone());
            self.transcript.log(TranscriptEvent::new(
                "assistant_reply",
                json!({
                    "prose": reply.prose,
                    "tool_calls": reply.tool_calls.len(),
                }),
            ));

            if let Some(prose) = reply.prose.as_deref()
                && !prose.is_empty()
            {
                self.progress.on_prose(prose);
            }

            if !reply.wants_tools() {
                debug!(turns = self.state.len(), "round complete");
                return Ok(ConversationReply {
                    text: reply.prose.unwrap_or_default(),
                    usage: self.usage,
                });
            }

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                debug!(tool = %call.name, id = %call.id, "dispatching tool call");
                self.progress.on_tool_call(call);
                self.transcript.log(TranscriptEvent::new(
                    "tool_call",
                    json!({ "id": call.id, "name": call.name, "arguments": call.raw_arguments }),
                ));

                let result = self.invoker.invoke(call).await;

                self.progress.on_tool_result(call, &result);
                self.transcript.log(TranscriptEvent::new(
                    "tool_result",
                    json!({ "id": call.id, "ok": result.ok, "payload": result.to_payload() }),
                ));
                results.push((call.clone(), result));
            }

            for turn in self.provider.format_tool_results(&results) {
                self.state.push(turn);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use synapse_domain::{
        AssistantReply, ParamKind, ParamSpec, Role, TokenUsage, ToolCallRequest,
        ToolExecutionResult,
    };

    fn text_reply(text: &str, usage: Option<TokenUsage>) -> AssistantReply {
        AssistantReply {
            turn: Turn::assistant(json!([{ "type": "text", "text": text }])),
            prose: Some(text.to_string()),
            tool_calls: vec![],
            usage,
        }
    }

    fn tool_reply(calls: Vec<ToolCallRequest>) -> AssistantReply {
        AssistantReply {
            turn: Turn::assistant(json!([{ "type": "tool_use" }])),
            prose: None,
            tool_calls: calls,
            usage: None,
        }
    }

    /// Provider double driven by a prepared script; when the script runs
    /// out it keeps replaying `fallback`.
    struct ScriptedProvider {
        script: Mutex<VecDeque<AssistantReply>>,
        fallback: Option<AssistantReply>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Vec<AssistantReply>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn repeating(reply: AssistantReply) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatProviderPort for ScriptedProvider {
        fn kind(&self) -> crate::ports::chat_provider::ProviderKind {
            crate::ports::chat_provider::ProviderKind::Anthropic
        }

        async fn send_turn(
            &self,
            _state: &ConversationState,
            _tools: &[ToolDescriptor],
        ) -> Result<AssistantReply, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let scripted = self.script.lock().unwrap().pop_front();
            match scripted.or_else(|| self.fallback.clone()) {
                Some(reply) => Ok(reply),
                None => Err(ProviderError::Protocol("script exhausted".into())),
            }
        }

        fn format_tool_results(
            &self,
            results: &[(ToolCallRequest, ToolExecutionResult)],
        ) -> Vec<Turn> {
            let blocks: Vec<_> = results
                .iter()
                .map(|(call, result)| json!({ "id": call.id, "payload": result.to_payload() }))
                .collect();
            vec![Turn::tool(json!(blocks))]
        }
    }

    /// Invoker double: records invocation ids, fails any call named "boom".
    struct RecordingInvoker {
        invoked: Mutex<Vec<String>>,
    }

    impl RecordingInvoker {
        fn new() -> Self {
            Self {
                invoked: Mutex::new(Vec::new()),
            }
        }

        fn invoked_ids(&self) -> Vec<String> {
            self.invoked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolInvokerPort for RecordingInvoker {
        fn descriptors(&self) -> Vec<ToolDescriptor> {
            vec![
                ToolDescriptor::new("list_tasks", "List all open tasks."),
                ToolDescriptor::new("add_task", "Add a task.")
                    .with_param(ParamSpec::new("content", ParamKind::String)),
            ]
        }

        async fn invoke(&self, call: &ToolCallRequest) -> ToolExecutionResult {
            self.invoked.lock().unwrap().push(call.id.clone());
            if call.name == "boom" {
                ToolExecutionResult::handler_error("store unavailable")
            } else {
                ToolExecutionResult::success("ok", None)
            }
        }
    }

    fn conversation(
        provider: Arc<ScriptedProvider>,
        invoker: Arc<RecordingInvoker>,
    ) -> Conversation {
        Conversation::new(provider, invoker, "You are a task assistant.")
    }

    #[tokio::test]
    async fn plain_reply_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_reply(
            "Hello!",
            Some(TokenUsage::new(120, 8)),
        )]));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider.clone(), invoker.clone());

        let reply = conv.send("hi").await.unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(provider.call_count(), 1);
        assert!(invoker.invoked_ids().is_empty());

        let roles: Vec<Role> = conv.state().turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn tool_loop_preserves_emission_order_and_ids() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_reply(vec![
                ToolCallRequest::new("call_b", "list_tasks", "{}"),
                ToolCallRequest::new("call_a", "add_task", r#"{"content":"milk"}"#),
            ]),
            text_reply("Done.", None),
        ]));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider.clone(), invoker.clone());

        let reply = conv.send("add milk to my list").await.unwrap();

        assert_eq!(reply.text, "Done.");
        assert_eq!(provider.call_count(), 2);
        // Dispatch order is emission order, not alphabetical
        assert_eq!(invoker.invoked_ids(), ["call_b", "call_a"]);

        // system, user, assistant(tools), tool results, assistant(final)
        let roles: Vec<Role> = conv.state().turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );

        // Every id from the batch shows up in the results turn
        let results_turn = &conv.state().turns()[3];
        let recorded = serde_json::to_string(&results_turn.content).unwrap();
        assert!(recorded.contains("call_b"));
        assert!(recorded.contains("call_a"));
    }

    #[tokio::test]
    async fn failed_call_does_not_abort_the_batch() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_reply(vec![
                ToolCallRequest::new("call_1", "list_tasks", "{}"),
                ToolCallRequest::new("call_2", "boom", "{}"),
                ToolCallRequest::new("call_3", "add_task", r#"{"content":"eggs"}"#),
            ]),
            text_reply("Recovered.", None),
        ]));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider.clone(), invoker.clone());

        let reply = conv.send("do three things").await.unwrap();

        // The failure in the middle never stopped the rest of the batch
        assert_eq!(invoker.invoked_ids(), ["call_1", "call_2", "call_3"]);
        assert_eq!(reply.text, "Recovered.");

        let recorded =
            serde_json::to_string(&conv.state().turns()[3].content).unwrap();
        assert!(recorded.contains("HandlerError"));
    }

    #[tokio::test]
    async fn turn_limit_stops_before_dispatching_final_batch() {
        let provider = Arc::new(ScriptedProvider::repeating(tool_reply(vec![
            ToolCallRequest::new("call_loop", "list_tasks", "{}"),
        ])));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider.clone(), invoker.clone());

        let err = conv.send("loop forever").await.unwrap_err();

        assert!(matches!(
            err,
            ConversationError::MaxTurnsExceeded { limit: DEFAULT_MAX_TOOL_TURNS }
        ));
        // The limiting response is received but its batch is never dispatched
        assert_eq!(provider.call_count(), DEFAULT_MAX_TOOL_TURNS);
        assert_eq!(invoker.invoked_ids().len(), DEFAULT_MAX_TOOL_TURNS - 1);

        // The limiting turn is not recorded, so the last recorded turn is
        // the results batch that answered round 14.
        assert_eq!(conv.state().turns().last().unwrap().role, Role::Tool);
    }

    #[tokio::test]
    async fn conversation_stays_usable_after_turn_limit() {
        let mut script: Vec<AssistantReply> = (0..DEFAULT_MAX_TOOL_TURNS)
            .map(|n| AssistantReply {
                usage: Some(TokenUsage::new(10, 1)),
                ..tool_reply(vec![ToolCallRequest::new(
                    format!("call_{n}"),
                    "list_tasks",
                    "{}",
                )])
            })
            .collect();
        script.push(text_reply("Back on track.", Some(TokenUsage::new(50, 5))));
        let provider = Arc::new(ScriptedProvider::new(script));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider.clone(), invoker.clone());

        let err = conv.send("loop").await.unwrap_err();
        assert!(matches!(err, ConversationError::MaxTurnsExceeded { .. }));

        // Usage from all 15 round-trips survives the error
        assert_eq!(conv.usage().requests, DEFAULT_MAX_TOOL_TURNS as u64);
        assert_eq!(conv.usage().input_tokens, 10 * DEFAULT_MAX_TOOL_TURNS as u64);

        // History never ends on an unanswered tool batch, so the next round
        // goes through cleanly
        let reply = conv.send("continue").await.unwrap();
        assert_eq!(reply.text, "Back on track.");
        assert_eq!(provider.call_count(), DEFAULT_MAX_TOOL_TURNS + 1);
    }

    #[tokio::test]
    async fn cancellation_checked_before_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_reply("never", None)]));
        let invoker = Arc::new(RecordingInvoker::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut conv =
            conversation(provider.clone(), invoker.clone()).with_cancellation(cancel);

        let err = conv.send("hi").await.unwrap_err();
        assert!(matches!(err, ConversationError::Cancelled));
        assert_eq!(provider.call_count(), 0);
        // The user turn is still recorded
        assert_eq!(conv.state().len(), 2);
    }

    #[tokio::test]
    async fn empty_reply_is_a_valid_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![AssistantReply {
            turn: Turn::assistant(json!([])),
            prose: None,
            tool_calls: vec![],
            usage: None,
        }]));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider, invoker);

        let reply = conv.send("say nothing").await.unwrap();
        assert_eq!(reply.text, "");
    }

    #[tokio::test]
    async fn usage_accumulates_across_round_trips() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            AssistantReply {
                usage: Some(TokenUsage::new(100, 30)),
                ..tool_reply(vec![ToolCallRequest::new("call_1", "list_tasks", "{}")])
            },
            text_reply("Done.", Some(TokenUsage::new(180, 12))),
        ]));
        let invoker = Arc::new(RecordingInvoker::new());
        let mut conv = conversation(provider, invoker);

        let reply = conv.send("count tokens").await.unwrap();

        assert_eq!(reply.usage.requests, 2);
        assert_eq!(reply.usage.input_tokens, 280);
        assert_eq!(reply.usage.output_tokens, 42);
    }
}
