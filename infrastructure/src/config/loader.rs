//! Configuration file loader with multi-source merging

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::file_config::FileConfig;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `SYNAPSE_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./synapse.toml` or `./.synapse.toml`
    /// 4. XDG config: `~/.config/synapse/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // SYNAPSE_PROVIDER__MODEL=... maps to [provider] model
        figment = figment.merge(Env::prefixed("SYNAPSE_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("synapse").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        ["synapse.toml", ".synapse.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [provider]
            kind = "openai"

            [conversation]
            max_tool_turns = 5
            "#
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.conversation.max_tool_turns, 5);
        // Untouched sections keep their defaults
        assert!(config.log.transcript.is_none());
    }

    #[test]
    fn defaults_without_any_file() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.provider.kind, "anthropic");
    }
}
