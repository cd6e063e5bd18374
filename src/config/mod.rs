//! # Tool Configuration
//!
//! A single optional YAML file controls how stackwright talks to AWS and
//! where it keeps local state.
//!
//! ## Lookup order
//!
//! 1. `--config` flag (or `STACKWRIGHT_CONFIG`)
//! 2. `$HOME/.stackwright/config.yaml` if it exists
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```yaml
//! aws:
//!   profile: default
//! store:
//!   parameter_prefix: /stackwright
//! workspace:
//!   directory_name: stackwright
//! stack:
//!   log_retention_days: 30
//! ```

mod aws;
mod layout;

pub use aws::AwsConfig;
pub use layout::{StackConfig, StoreConfig, WorkspaceConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// Complete tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub stack: StackConfig,
}

impl ToolConfig {
    /// Load configuration from an explicit path, the per-user default, or defaults
    ///
    /// An explicit path that does not exist is an error; a missing per-user
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::from_file(path)?
            }
            None => match Self::user_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// `$HOME/.stackwright/config.yaml`
    fn user_config_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".stackwright").join("config.yaml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.store.parameter_prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "store.parameter_prefix".to_string(),
                value: prefix.clone(),
            });
        }

        let dir = &self.workspace.directory_name;
        if dir.is_empty() || dir.contains('/') || dir.contains('\\') {
            return Err(ConfigError::InvalidValue {
                field: "workspace.directory_name".to_string(),
                value: dir.clone(),
            });
        }

        if self.stack.log_retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stack.log_retention_days".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.store.parameter_prefix, "/stackwright");
        assert_eq!(config.workspace.directory_name, "stackwright");
        assert_eq!(config.workspace.search_depth, 10);
        assert_eq!(config.stack.log_retention_days, 30);
        assert!(config.aws.profile.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ToolConfig::from_yaml("aws:\n  profile: prod\nstack:\n  log_retention_days: 7\n")
            .unwrap();
        assert_eq!(config.aws.profile.as_deref(), Some("prod"));
        assert_eq!(config.stack.log_retention_days, 7);
        assert_eq!(config.store.parameter_prefix, "/stackwright");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = ToolConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.workspace.directory_name, "stackwright");
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let mut config = ToolConfig::default();
        config.store.parameter_prefix = "stackwright".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "store.parameter_prefix"
        ));
    }

    #[test]
    fn test_zero_retention_rejected() {
        let mut config = ToolConfig::default();
        config.stack.log_retention_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = ToolConfig::load(Some(Path::new("/nonexistent/stackwright.yaml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "store:\n  parameter_prefix: /custom").unwrap();

        let config = ToolConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.store.parameter_prefix, "/custom");
    }
}
