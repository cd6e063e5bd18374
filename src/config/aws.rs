//! AWS CLI configuration.

use serde::{Deserialize, Serialize};

/// How the `aws` CLI is invoked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Named profile passed as `--profile` (AWS_PROFILE is honored by the CLI itself)
    #[serde(default)]
    pub profile: Option<String>,

    /// Default region passed as `--region` when a call is not region-scoped
    #[serde(default)]
    pub region: Option<String>,
}
