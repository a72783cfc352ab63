//! Application configuration.
//!
//! Loaded with the `config` crate: an optional YAML file (default
//! `config.yaml` in the working directory) overlaid by
//! `RENAMEGENIE_`-prefixed environment variables using `__` for nesting
//! (e.g. `RENAMEGENIE_LOGGING__LEVEL=debug`). All keys have defaults except
//! the API key, which is only required once the mapping client is built.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory scanned as the workspace root.
    #[serde(default = "default_workspace_path")]
    pub workspace_path: PathBuf,

    /// OpenRouter API key; may come from file or environment.
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    /// Model identifier passed to the mapping provider.
    #[serde(default = "default_model")]
    pub openrouter_model: String,

    /// Base URL of the OpenRouter-compatible API.
    #[serde(default = "default_endpoint")]
    pub openrouter_endpoint: String,

    /// Bound on the remote mapping call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Base names excluded from scans.
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_workspace_path() -> PathBuf {
    PathBuf::from("workspace")
}

fn default_model() -> String {
    "openai/gpt-oss-20b:free".to_string()
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_ignore_files() -> Vec<String> {
    vec![".gitignore".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace_path: default_workspace_path(),
            openrouter_api_key: None,
            openrouter_model: default_model(),
            openrouter_endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            ignore_files: default_ignore_files(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Ignore list as a set of literal base names.
    pub fn ignore_set(&self) -> HashSet<String> {
        self.ignore_files.iter().cloned().collect()
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional YAML file plus environment.
    ///
    /// An explicit `path` must exist; the default `config.yaml` is optional.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ApiError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Yaml)
                    .required(true),
            ),
            None => builder.add_source(File::new("config", FileFormat::Yaml).required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix("RENAMEGENIE")
                .separator("__")
                .try_parsing(true),
        );
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_legacy_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.workspace_path, PathBuf::from("workspace"));
        assert_eq!(config.openrouter_model, "openai/gpt-oss-20b:free");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.ignore_files, vec![".gitignore".to_string()]);
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn loads_yaml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "workspace_path: /srv/files\n\
             openrouter_api_key: sk-test\n\
             ignore_files:\n  - .gitignore\n  - .DS_Store\n\
             logging:\n  level: debug\n",
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.workspace_path, PathBuf::from("/srv/files"));
        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.ignore_files.len(), 2);
        assert_eq!(config.logging.level, "debug");
        // Unset keys fall back to defaults.
        assert_eq!(config.openrouter_model, "openai/gpt-oss-20b:free");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(matches!(
            ConfigLoader::load(Some(&missing)),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[test]
    fn ignore_set_contains_configured_names() {
        let mut config = AppConfig::default();
        config.ignore_files = vec![".git".into(), "target".into()];
        let set = config.ignore_set();
        assert!(set.contains(".git"));
        assert!(set.contains("target"));
        assert!(!set.contains("src"));
    }
}
