//! Configuration loading and resolution

pub mod file_config;
pub mod loader;

use std::path::PathBuf;

use synapse_application::ProviderKind;
use thiserror::Error;

pub use file_config::{ConfigValidationError, FileConfig};
pub use loader::ConfigLoader;

use crate::providers::default_model;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),

    #[error("missing API credential: set {0}")]
    MissingCredential(&'static str),
}

/// Fully resolved runtime settings for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: String,
    pub system_prompt: String,
    pub max_tool_turns: usize,
    pub transcript: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolve a validated file config into runtime settings.
    ///
    /// The API credential is read from the provider's environment variable
    /// exactly once, here; it never appears in the config file.
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        file.validate()?;

        let kind: ProviderKind = file
            .provider
            .kind
            .parse()
            .map_err(|_| ConfigValidationError::UnknownProvider(file.provider.kind.clone()))?;

        let api_key = std::env::var(kind.credential_env())
            .map_err(|_| ConfigError::MissingCredential(kind.credential_env()))?;

        Ok(Self {
            kind,
            model: file
                .provider
                .model
                .unwrap_or_else(|| default_model(kind).to_string()),
            base_url: file.provider.base_url,
            api_key,
            system_prompt: file.conversation.system_prompt,
            max_tool_turns: file.conversation.max_tool_turns,
            transcript: file.log.transcript,
        })
    }
}
