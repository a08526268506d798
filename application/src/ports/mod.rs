//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_provider;
pub mod progress;
pub mod tool_invoker;
pub mod transcript;
