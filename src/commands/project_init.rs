//! `project init` - create a project and its shared infrastructure
//!
//! Safe to re-run: an existing project is reused and its infrastructure
//! stack is redeployed.

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::config::ToolConfig;
use crate::domain::ports::{MetadataStore, Workspace, WorkspaceSummary};
use crate::domain::project::validate_project_name;
use crate::domain::{select_one, BootstrapRequest};
use crate::infrastructure::{
    AwsCli, CloudFormationDeployer, LocalWorkspace, ParameterStore, StsIdentity,
};
use crate::services::ProjectBootstrapper;
use crate::ui::{highlight, highlight_code, print_info, print_success, SpinnerProgress};

/// Which project to initialize, and what to tell the user about the choice
#[derive(Debug, PartialEq, Eq)]
struct ProjectChoice {
    name: String,
    notice: Option<String>,
}

/// Pick the project name
///
/// A bound workspace always wins. Otherwise the supplied name is used, then
/// the only existing project.
fn choose_project(
    bound: Option<WorkspaceSummary>,
    requested: Option<&str>,
    existing: &[String],
) -> Result<ProjectChoice> {
    let requested = requested.filter(|n| !n.is_empty());

    if let Some(summary) = bound {
        let notice = match requested {
            Some(name) if name != summary.project => format!(
                "Looks like you are using a workspace that's registered to project {}. We'll use that as your project instead of {}.",
                summary.project, name
            ),
            _ => format!(
                "Looks like you are using a workspace that's registered to project {}. We'll use that as your project.",
                summary.project
            ),
        };
        return Ok(ProjectChoice {
            name: summary.project,
            notice: Some(notice),
        });
    }

    if let Some(name) = requested {
        return Ok(ProjectChoice {
            name: name.to_string(),
            notice: None,
        });
    }

    if existing.is_empty() {
        bail!("Looks like you don't have any existing projects. Pass a name to create one: stackwright project init <name>");
    }
    let name = select_one(None, existing, "project", "a name argument")?;
    Ok(ProjectChoice {
        notice: Some(format!("Using your existing project {}.", name)),
        name,
    })
}

fn recommended_actions() -> Vec<String> {
    vec![
        "Add an application manifest under stackwright/<app>/manifest.yml.".to_string(),
        format!(
            "Run {} to generate its CloudFormation template.",
            highlight_code("stackwright app package")
        ),
    ]
}

/// Execute the project init command
pub async fn execute(config: &ToolConfig, name: Option<String>, domain: String) -> Result<()> {
    // Validate
    if let Some(name) = name.as_deref().filter(|n| !n.is_empty()) {
        validate_project_name(name).map_err(|e| anyhow!(e))?;
    }

    let cli = AwsCli::new(&config.aws);
    let store = ParameterStore::new(cli.clone(), config.store.parameter_prefix.clone());
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let workspace = LocalWorkspace::discover(&cwd, &config.workspace);

    // Ask
    let bound = workspace
        .bound_project()
        .await
        .context("read workspace")?;
    let requested = name.as_deref().filter(|n| !n.is_empty());
    let existing: Vec<String> = if bound.is_none() && requested.is_none() {
        store
            .list_projects()
            .await
            .context("list projects")?
            .into_iter()
            .map(|p| p.name)
            .collect()
    } else {
        Vec::new()
    };
    let choice = choose_project(bound, requested, &existing)?;
    if let Some(notice) = &choice.notice {
        print_info(notice);
    }
    info!("Initializing project {}", choice.name);

    // Execute
    let identity = StsIdentity::new(cli.clone());
    let deployer = CloudFormationDeployer::new(cli);
    let progress = SpinnerProgress::new();
    let report = ProjectBootstrapper::new(&identity, &store, &workspace, &deployer, &progress)
        .execute(&BootstrapRequest {
            project: choice.name.clone(),
            domain,
        })
        .await
        .with_context(|| format!("initialize project {}", choice.name))?;

    if report.already_registered {
        info!("Project {} was already registered", choice.name);
    }
    print_success(&format!(
        "The directory {} will hold application manifests for project {}.",
        highlight(&workspace.dir().display().to_string()),
        highlight(&choice.name)
    ));
    println!();
    print_info("Recommended follow-up actions:");
    for action in recommended_actions() {
        println!("  - {}", action);
    }

    Ok(())
}
