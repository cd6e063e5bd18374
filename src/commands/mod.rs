//! Command implementations
//!
//! Each command runs Validate, then Ask, then Execute, and wires the default
//! adapters into the services.

pub mod app_package;
pub mod app_show;
pub mod project_init;
pub mod project_show;

use anyhow::{Context, Result};

use crate::domain::ports::{MetadataStore, Workspace};
use crate::domain::select_one;

/// The explicit project, else the workspace's, else the only one in the store
async fn ask_project(
    explicit: Option<String>,
    workspace: &dyn Workspace,
    store: &dyn MetadataStore,
) -> Result<String> {
    if let Some(name) = explicit.filter(|p| !p.is_empty()) {
        return Ok(name);
    }
    if let Some(summary) = workspace.bound_project().await.context("read workspace")? {
        return Ok(summary.project);
    }

    let names: Vec<String> = store
        .list_projects()
        .await
        .context("list projects")?
        .into_iter()
        .map(|p| p.name)
        .collect();
    Ok(select_one(None, &names, "project", "--project")?)
}
