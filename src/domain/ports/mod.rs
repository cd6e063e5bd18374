//! Contracts for the collaborators the core consumes
//!
//! Services depend only on these traits. Default implementations live in
//! `crate::infrastructure`; in-memory ones for tests live in [`fakes`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::deployment::{
    Caller, CreateProjectInput, DeployedStack, DeploymentInput, ResourceInventory, StackResource,
};
use super::project::{ApplicationSummary, Environment, Project};
use crate::error::{
    DeployError, DescribeError, IdentityError, InventoryError, RenderError, StoreError,
    WorkspaceError,
};

#[cfg(test)]
pub mod fakes;

/// Remote record of projects, environments and applications
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get_project(&self, name: &str) -> Result<Project, StoreError>;

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Fails with [`StoreError::ProjectAlreadyExists`] when the name is taken
    async fn create_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn get_environment(&self, project: &str, env: &str) -> Result<Environment, StoreError>;

    async fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError>;

    async fn get_application(
        &self,
        project: &str,
        app: &str,
    ) -> Result<ApplicationSummary, StoreError>;

    async fn list_applications(&self, project: &str)
        -> Result<Vec<ApplicationSummary>, StoreError>;
}

/// The workspace's record of which project it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub project: String,
}

/// Local directory holding application manifests
#[async_trait]
pub trait Workspace: Send + Sync {
    async fn read_manifest(&self, app: &str) -> Result<Vec<u8>, WorkspaceError>;

    /// Applications that have a manifest, sorted by name
    async fn app_names(&self) -> Result<Vec<String>, WorkspaceError>;

    /// Bind the workspace to a project; re-binding to the same project is a no-op
    async fn create(&self, project: &str) -> Result<(), WorkspaceError>;

    /// Fails with [`WorkspaceError::NoProject`] when the workspace is unbound
    async fn summary(&self) -> Result<WorkspaceSummary, WorkspaceError>;

    /// `None` only when the workspace is unbound; other failures propagate
    async fn bound_project(&self) -> Result<Option<WorkspaceSummary>, WorkspaceError> {
        match self.summary().await {
            Ok(summary) => Ok(Some(summary)),
            Err(WorkspaceError::NoProject) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Where an application's addons templates are kept
    fn addons_dir(&self, app: &str) -> PathBuf;
}

/// Lookup of resources already provisioned for a project
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn resources_by_region(
        &self,
        project: &Project,
        region: &str,
    ) -> Result<ResourceInventory, InventoryError>;
}

/// A stack ready to be serialized
pub trait StackSerializer {
    fn template(&self) -> Result<String, RenderError>;

    fn serialized_parameters(&self) -> Result<String, RenderError>;
}

/// Turns a deployment input into a stack
pub trait StackRenderer: Send + Sync {
    fn new_stack(
        &self,
        input: DeploymentInput,
        is_https: bool,
    ) -> Result<Box<dyn StackSerializer>, RenderError>;
}

/// Who is calling
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn caller(&self) -> Result<Caller, IdentityError>;
}

/// Applies a project's shared infrastructure
#[async_trait]
pub trait ProjectDeployer: Send + Sync {
    async fn deploy_project(&self, input: &CreateProjectInput) -> Result<(), DeployError>;
}

/// Read access to application stacks that have been deployed
#[async_trait]
pub trait StackDescriber: Send + Sync {
    /// `Ok(None)` when the stack does not exist
    async fn describe_stack(
        &self,
        stack: &str,
        region: &str,
    ) -> Result<Option<DeployedStack>, DescribeError>;

    async fn stack_resources(
        &self,
        stack: &str,
        region: &str,
    ) -> Result<Vec<StackResource>, DescribeError>;

    /// Plain environment variables of `container` in the latest revision of `family`
    async fn task_variables(
        &self,
        family: &str,
        container: &str,
        region: &str,
    ) -> Result<Vec<(String, String)>, DescribeError>;
}

/// Start / end signals for a long-running step
pub trait ProgressReporter: Send + Sync {
    fn start(&self, message: &str);

    fn success(&self, message: &str);

    fn failure(&self, message: &str);
}
