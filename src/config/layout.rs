//! Store, workspace and stack rendering settings.

use serde::{Deserialize, Serialize};

/// Metadata store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Parameter path prefix under which projects are recorded
    #[serde(default = "default_parameter_prefix")]
    pub parameter_prefix: String,
}

fn default_parameter_prefix() -> String {
    "/stackwright".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            parameter_prefix: default_parameter_prefix(),
        }
    }
}

/// Local workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Name of the directory holding manifests (e.g., "stackwright")
    #[serde(default = "default_directory_name")]
    pub directory_name: String,

    /// How many parent directories to search for an existing workspace
    #[serde(default = "default_search_depth")]
    pub search_depth: usize,
}

fn default_directory_name() -> String {
    "stackwright".to_string()
}

fn default_search_depth() -> usize {
    10
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            directory_name: default_directory_name(),
            search_depth: default_search_depth(),
        }
    }
}

/// Stack rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    /// Retention applied to every application's log group
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

fn default_log_retention_days() -> u32 {
    30
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            log_retention_days: default_log_retention_days(),
        }
    }
}
