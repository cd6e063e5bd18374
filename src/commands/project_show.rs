//! `project show` - describe a project

use anyhow::{Context, Result};

use super::ask_project;
use crate::config::ToolConfig;
use crate::domain::ports::MetadataStore;
use crate::infrastructure::{AwsCli, LocalWorkspace, ParameterStore};
use crate::services::ProjectDescriber;

/// Execute the project show command
pub async fn execute(config: &ToolConfig, project: Option<String>, json: bool) -> Result<()> {
    let store = ParameterStore::new(
        AwsCli::new(&config.aws),
        config.store.parameter_prefix.clone(),
    );
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let workspace = LocalWorkspace::discover(&cwd, &config.workspace);

    // Validate
    let project = project.filter(|p| !p.is_empty());
    if let Some(name) = &project {
        store.get_project(name).await?;
    }

    // Ask
    let project = ask_project(project, &workspace, &store).await?;

    // Execute
    let description = ProjectDescriber::new(&store)
        .describe(&project)
        .await
        .with_context(|| format!("describe project {}", project))?;
    if json {
        print!("{}", description.json_string()?);
    } else {
        print!("{}", description.human_string());
    }

    Ok(())
}
