//! Provider adapters
//!
//! One adapter per wire convention, both behind [`ChatProviderPort`]. The
//! factory picks the adapter from configuration; nothing outside this module
//! knows which JSON shape is in play.

pub mod anthropic;
pub mod openai;
pub mod transport;

use std::sync::Arc;

use synapse_application::ports::chat_provider::{ChatProviderPort, ProviderKind};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use transport::HttpTransport;

/// Default model per provider family, used when the config names none.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Anthropic => "claude-sonnet-4-20250514",
        ProviderKind::OpenAi => "gpt-4o",
    }
}

/// Build the adapter for the configured provider family.
pub fn build_provider(
    kind: ProviderKind,
    api_key: String,
    model: String,
    base_url: Option<String>,
) -> Arc<dyn ChatProviderPort> {
    match kind {
        ProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key, model);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
        ProviderKind::OpenAi => {
            let mut provider = OpenAiProvider::new(api_key, model);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
    }
}
