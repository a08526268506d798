//! Infrastructure layer for synapse
//!
//! Adapters behind the application ports: the two provider adapters (one per
//! wire convention), the registry-backed tool invoker, wire schema
//! generation, configuration loading, and the JSONL transcript writer.

pub mod config;
pub mod logging;
pub mod providers;
pub mod schema;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, SessionConfig};
pub use logging::JsonlTranscript;
pub use providers::{AnthropicProvider, OpenAiProvider, build_provider, default_model};
pub use schema::{SchemaError, SchemaGenerator, input_schema};
pub use tools::{RegistryInvoker, ToolHandler, ToolRegistry};
