//! `app show` - describe a deployed application in every environment

use anyhow::{Context, Result};

use super::ask_project;
use crate::config::ToolConfig;
use crate::domain::ports::MetadataStore;
use crate::domain::select_one;
use crate::error::SelectionError;
use crate::infrastructure::{AwsCli, CloudFormationDescriber, LocalWorkspace, ParameterStore};
use crate::services::AppDescriber;
use crate::ui::print_info;

/// The only application, `None` when the project has none
fn choose_app(apps: &[String]) -> Result<Option<String>, SelectionError> {
    if apps.is_empty() {
        return Ok(None);
    }
    select_one(None, apps, "application", "--name").map(Some)
}

/// Execute the app show command
pub async fn execute(
    config: &ToolConfig,
    name: Option<String>,
    project: Option<String>,
    json: bool,
    resources: bool,
) -> Result<()> {
    let cli = AwsCli::new(&config.aws);
    let store = ParameterStore::new(cli.clone(), config.store.parameter_prefix.clone());
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let workspace = LocalWorkspace::discover(&cwd, &config.workspace);

    // Validate
    let project = project.filter(|p| !p.is_empty());
    let name = name.filter(|n| !n.is_empty());
    if let Some(project) = &project {
        store.get_project(project).await?;
        if let Some(app) = &name {
            store.get_application(project, app).await?;
        }
    }

    // Ask
    let project = ask_project(project, &workspace, &store).await?;
    let app = match name {
        Some(app) => app,
        None => {
            let apps: Vec<String> = store
                .list_applications(&project)
                .await
                .context("list applications")?
                .into_iter()
                .map(|a| a.name)
                .collect();
            match choose_app(&apps)? {
                Some(app) => app,
                None => {
                    print_info(&format!("No applications found in project {}.", project));
                    return Ok(());
                }
            }
        }
    };

    // Execute
    let stacks = CloudFormationDescriber::new(cli);
    let description = AppDescriber::new(&store, &stacks)
        .describe(&project, &app, resources)
        .await
        .with_context(|| format!("describe application {}", app))?;
    if json {
        print!("{}", description.json_string()?);
    } else {
        print!("{}", description.human_string());
    }

    Ok(())
}
