//! Application manifest types
//!
//! An application's `manifest.yml` is a closed set of variants selected by its
//! `type` field. Only load balanced web apps are deployable today.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ManifestError;

pub const LB_WEB_APP_TYPE: &str = "Load Balanced Web App";
pub const BACKEND_APP_TYPE: &str = "Backend App";

const DEFAULT_CPU: u32 = 256;
const DEFAULT_MEMORY: u32 = 512;
const DEFAULT_COUNT: u32 = 1;

/// A parsed application manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppManifest {
    #[serde(rename = "Load Balanced Web App")]
    LoadBalancedWebApp(LbWebAppManifest),
    #[serde(rename = "Backend App")]
    BackendApp(BackendAppManifest),
}

impl AppManifest {
    /// Parse raw manifest bytes
    pub fn parse(raw: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_slice(raw)?)
    }

    /// Application name declared in the manifest
    pub fn name(&self) -> &str {
        match self {
            Self::LoadBalancedWebApp(m) => &m.name,
            Self::BackendApp(m) => &m.name,
        }
    }

    /// The manifest's `type` value
    pub fn manifest_type(&self) -> &'static str {
        match self {
            Self::LoadBalancedWebApp(_) => LB_WEB_APP_TYPE,
            Self::BackendApp(_) => BACKEND_APP_TYPE,
        }
    }
}

/// Container image settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Path to the Dockerfile, relative to the workspace root
    #[serde(default)]
    pub build: Option<String>,
    /// Port the container listens on
    #[serde(default)]
    pub port: Option<u16>,
}

/// Load balancer routing for a web app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_path")]
    pub healthcheck: String,
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for RoutingRule {
    fn default() -> Self {
        Self {
            path: default_path(),
            healthcheck: default_path(),
        }
    }
}

/// Per-environment overrides; unset fields inherit the top-level value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOverrides {
    #[serde(default)]
    pub cpu: Option<u32>,
    #[serde(default)]
    pub memory: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
}

/// Manifest of an internet-facing service behind a load balancer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LbWebAppManifest {
    pub name: String,
    pub image: ImageConfig,
    #[serde(default)]
    pub http: RoutingRule,
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    #[serde(default = "default_memory")]
    pub memory: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    #[serde(default)]
    pub environments: BTreeMap<String, TaskOverrides>,
}

fn default_cpu() -> u32 {
    DEFAULT_CPU
}

fn default_memory() -> u32 {
    DEFAULT_MEMORY
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

impl LbWebAppManifest {
    /// Resolve the settings that apply in one environment
    pub fn resolve(&self, env_name: &str, log_retention_days: u32) -> LbWebAppConfig {
        let overrides = self.environments.get(env_name).cloned().unwrap_or_default();

        let mut variables = self.variables.clone();
        variables.extend(overrides.variables);
        let mut secrets = self.secrets.clone();
        secrets.extend(overrides.secrets);

        LbWebAppConfig {
            name: self.name.clone(),
            port: self.image.port,
            path: self.http.path.clone(),
            healthcheck: self.http.healthcheck.clone(),
            cpu: overrides.cpu.unwrap_or(self.cpu),
            memory: overrides.memory.unwrap_or(self.memory),
            count: overrides.count.unwrap_or(self.count),
            variables,
            secrets,
            log_retention_days,
        }
    }
}

/// Web app settings after environment overrides are applied
#[derive(Debug, Clone, PartialEq)]
pub struct LbWebAppConfig {
    pub name: String,
    pub port: Option<u16>,
    pub path: String,
    pub healthcheck: String,
    pub cpu: u32,
    pub memory: u32,
    pub count: u32,
    pub variables: BTreeMap<String, String>,
    pub secrets: BTreeMap<String, String>,
    pub log_retention_days: u32,
}

/// Manifest of a service with no public endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendAppManifest {
    pub name: String,
    pub image: ImageConfig,
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    #[serde(default = "default_memory")]
    pub memory: u32,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONTEND: &str = r#"
name: frontend
type: Load Balanced Web App
image:
  build: frontend/Dockerfile
  port: 80
http:
  path: '/'
cpu: 256
memory: 512
count: 1
variables:
  LOG_LEVEL: info
environments:
  prod:
    count: 3
    variables:
      LOG_LEVEL: warn
"#;

    #[test]
    fn test_parse_lb_web_app() {
        let manifest = AppManifest::parse(FRONTEND.as_bytes()).unwrap();
        assert_eq!(manifest.name(), "frontend");
        assert_eq!(manifest.manifest_type(), LB_WEB_APP_TYPE);

        let AppManifest::LoadBalancedWebApp(web) = manifest else {
            panic!("expected a load balanced web app");
        };
        assert_eq!(web.image.port, Some(80));
        assert_eq!(web.http.healthcheck, "/");
    }

    #[test]
    fn test_environment_overrides() {
        let AppManifest::LoadBalancedWebApp(web) = AppManifest::parse(FRONTEND.as_bytes()).unwrap()
        else {
            panic!("expected a load balanced web app");
        };

        let test = web.resolve("test", 30);
        assert_eq!(test.count, 1);
        assert_eq!(test.variables["LOG_LEVEL"], "info");
        assert_eq!(test.log_retention_days, 30);

        let prod = web.resolve("prod", 30);
        assert_eq!(prod.count, 3);
        assert_eq!(prod.cpu, 256);
        assert_eq!(prod.variables["LOG_LEVEL"], "warn");
    }

    #[test]
    fn test_parse_backend_app() {
        let raw = "name: api\ntype: Backend App\nimage:\n  build: api/Dockerfile\n";
        let manifest = AppManifest::parse(raw.as_bytes()).unwrap();
        assert_eq!(manifest.manifest_type(), BACKEND_APP_TYPE);
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let raw = "name: worker\ntype: Scheduled Job\nimage:\n  build: Dockerfile\n";
        assert!(AppManifest::parse(raw.as_bytes()).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let raw = "name: web\ntype: Load Balanced Web App\nimage:\n  port: 8080\n";
        let AppManifest::LoadBalancedWebApp(web) = AppManifest::parse(raw.as_bytes()).unwrap()
        else {
            panic!("expected a load balanced web app");
        };
        assert_eq!(web.cpu, 256);
        assert_eq!(web.memory, 512);
        assert_eq!(web.count, 1);
        assert_eq!(web.http.path, "/");
    }
}
