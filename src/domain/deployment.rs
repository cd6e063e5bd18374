//! Deployment artifact types
//!
//! Values synthesized or produced while packaging an application. All of them
//! live for a single invocation.

use std::collections::{BTreeMap, HashMap};

use super::manifest::LbWebAppConfig;
use super::project::Environment;

/// Resources already provisioned for a project in one region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInventory {
    /// Image repository URL keyed by application name
    pub repository_urls: HashMap<String, String>,
}

impl ResourceInventory {
    /// Exact-name lookup of an application's repository
    pub fn repository_url(&self, app: &str) -> Option<&str> {
        self.repository_urls.get(app).map(String::as_str)
    }
}

/// Everything the renderer needs to produce a web app stack
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentInput {
    pub app: LbWebAppConfig,
    pub env: Environment,
    pub image_repo_url: String,
    pub image_tag: String,
}

/// A rendered stack template and its parameter file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub template: String,
    pub parameters: String,
}

/// A combined addons template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonsArtifact {
    pub template: String,
}

/// The caller's AWS identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account: String,
    pub arn: String,
}

/// Input for converging a project's shared infrastructure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    pub project: String,
    pub account_id: String,
    pub domain_name: String,
}

/// Parameters and outputs of a deployed stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployedStack {
    pub parameters: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
}

/// A physical resource created by a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResource {
    pub resource_type: String,
    pub physical_id: String,
}

/// Stack name of an application deployed to one environment
///
/// The task definition family shares this name.
pub fn app_stack_name(project: &str, env: &str, app: &str) -> String {
    format!("{}-{}-{}", project, env, app)
}

/// File name of an application's stack template
pub fn stack_template_file_name(app: &str) -> String {
    format!("{}.stack.yml", app)
}

/// File name of an application's parameters for one environment
pub fn stack_params_file_name(app: &str, env: &str) -> String {
    format!("{}-{}.params.json", app, env)
}

/// File name of an application's addons template
pub fn addons_template_file_name(app: &str) -> String {
    format!("{}.addons.stack.yml", app)
}
