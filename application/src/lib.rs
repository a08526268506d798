//! Application layer for synapse
//!
//! This crate contains the conversation use case and the port definitions
//! its adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_provider::{ChatProviderPort, ProviderError, ProviderKind},
    progress::{ConversationProgress, NoProgress},
    tool_invoker::ToolInvokerPort,
    transcript::{NoTranscript, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::conversation::{
    Conversation, ConversationError, ConversationReply, DEFAULT_MAX_TOOL_TURNS,
};
