//! Transcript logging port.
//!
//! The orchestrator narrates each round through this port: the user
//! message, every assistant reply, each tool call with its result, and the
//! turn-ceiling event. What a sink does with the stream is its own
//! business; the shipped implementation appends JSONL.
//!
//! Operational diagnostics stay on `tracing`. A transcript is the replayable
//! record of what the model and the tools actually said, not a debug log.

use serde_json::Value;

/// One entry in the conversation transcript.
pub struct TranscriptEvent {
    /// Discriminator such as "user_message" or "tool_result".
    pub event_type: &'static str,
    /// Everything else about the event, shaped per discriminator. Sinks
    /// stamp the record time themselves.
    pub payload: Value,
}

impl TranscriptEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for transcript events.
///
/// `log` takes no `Result` and blocks no async work: a conversation must
/// not fail or stall because its transcript could not be written.
pub trait TranscriptLogger: Send + Sync {
    fn log(&self, event: TranscriptEvent);
}

/// Discards every event. The default when no transcript path is configured.
pub struct NoTranscript;

impl TranscriptLogger for NoTranscript {
    fn log(&self, _event: TranscriptEvent) {}
}
