//! Application configuration.
//!
//! Configuration is loaded once at process start from environment variables
//! and optional CLI overrides, then passed down immutably. Request handlers
//! never mutate it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AppResult;

/// Name of the state directory created under the workspace root.
pub const STATE_DIR: &str = ".scoperag";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root; index and config live under `.scoperag/` here.
    pub workspace: PathBuf,

    /// Optional explicit config file path
    pub config_file: Option<PathBuf>,

    /// Generator provider (e.g. "ollama", "mock")
    pub provider: String,

    /// Generator model identifier
    pub model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `SCOPERAG_WORKSPACE`: override workspace path
    /// - `SCOPERAG_CONFIG`: path to config file
    /// - `SCOPERAG_PROVIDER`: generator provider
    /// - `SCOPERAG_MODEL`: generator model
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("SCOPERAG_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }
        if let Ok(config_file) = std::env::var("SCOPERAG_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }
        if let Ok(provider) = std::env::var("SCOPERAG_PROVIDER") {
            config.provider = provider;
        }
        if let Ok(model) = std::env::var("SCOPERAG_MODEL") {
            config.model = model;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply CLI flag overrides on top of the environment configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }
        if let Some(provider) = provider {
            self.provider = provider;
        }
        if let Some(model) = model {
            self.model = model;
        }
        if verbose {
            self.log_level = Some("debug".to_string());
        } else if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }
        if no_color {
            self.no_color = true;
        }
        self
    }

    /// Path to the state directory under the workspace.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Create the state directory if it does not exist.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            tracing::debug!("Created state directory at {:?}", dir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert!(!config.verbose);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/ws")),
            None,
            Some("mock".to_string()),
            None,
            None,
            true,
            false,
        );

        assert_eq!(config.workspace, PathBuf::from("/tmp/ws"));
        assert_eq!(config.provider, "mock");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_ensure_state_dir() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..Default::default()
        };

        config.ensure_state_dir().unwrap();
        assert!(temp.path().join(STATE_DIR).is_dir());
    }
}
