//! Domain layer for synapse
//!
//! This crate contains the core entities and value objects of the
//! tool-calling orchestration engine. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tool
//!
//! A tool is a named, documented, typed operation the model may request.
//! [`ToolDescriptor`] is the provider-neutral intermediate representation of
//! one tool's signature; provider adapters render it into their own wire
//! shape. [`ToolExecutionResult`] is the single return-value contract every
//! tool handler honors, serialized to one JSON string before re-injection.
//!
//! ## Conversation
//!
//! [`ConversationState`] is the ordered, append-only turn history of one
//! conversation. It always begins with exactly one system turn and is owned
//! exclusively by the orchestrator for the conversation's lifetime.

pub mod conversation;
pub mod tool;

// Re-export commonly used types
pub use conversation::{
    entities::{ConversationState, Role, Turn},
    reply::AssistantReply,
    usage::{TokenUsage, UsageAccumulator},
};
pub use tool::{
    entities::{ParamKind, ParamSpec, ToolCallRequest, ToolDescriptor},
    traits::{ArgumentValidator, DefaultArgumentValidator, ValidationError},
    value_objects::{ErrorKind, ToolExecutionResult},
};
