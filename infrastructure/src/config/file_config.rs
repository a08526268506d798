//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Validation and resolution into runtime settings happens in
//! [`super::SessionConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("max_tool_turns cannot be 0")]
    InvalidTurnLimit,

    #[error("unknown provider '{0}' (expected 'anthropic' or 'openai')")]
    UnknownProvider(String),
}

/// Raw provider configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Provider family: "anthropic" or "openai"
    pub kind: String,
    /// Model name; defaults per family when omitted
    pub model: Option<String>,
    /// Override the API endpoint (proxies, test servers)
    pub base_url: Option<String>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: "anthropic".to_string(),
            model: None,
            base_url: None,
        }
    }
}

/// Raw conversation configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    pub system_prompt: String,
    /// Ceiling on consecutive tool-requesting responses per round
    pub max_tool_turns: usize,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant with access to a set of tools. \
                            Use them when they help answer the user."
                .to_string(),
            max_tool_turns: 15,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Write a JSONL transcript of every conversation event here
    pub transcript: Option<PathBuf>,
}

/// Complete raw configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: FileProviderConfig,
    pub conversation: FileConversationConfig,
    pub log: FileLogConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.conversation.max_tool_turns == 0 {
            return Err(ConfigValidationError::InvalidTurnLimit);
        }
        if self.provider.kind.parse::<synapse_application::ProviderKind>().is_err() {
            return Err(ConfigValidationError::UnknownProvider(
                self.provider.kind.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.kind, "anthropic");
        assert_eq!(config.conversation.max_tool_turns, 15);
    }

    #[test]
    fn zero_turn_limit_is_rejected() {
        let mut config = FileConfig::default();
        config.conversation.max_tool_turns = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTurnLimit)
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = FileConfig::default();
        config.provider.kind = "gemini".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::UnknownProvider(_))
        ));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [provider]
            kind = "openai"
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.provider.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.conversation.max_tool_turns, 15);
        assert!(config.log.transcript.is_none());
    }
}
