//! `app package` - print or write an application's CloudFormation
//!
//! Without `--output-dir` only the stack template is printed to stdout.
//! With it, `{app}.stack.yml`, `{app}-{env}.params.json` and (when the app
//! has addons) `{app}.addons.stack.yml` are written to that directory.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::config::ToolConfig;
use crate::infrastructure::{
    AwsCli, CloudFormationRenderer, EcrInventory, GitClient, LocalWorkspace, ParameterStore,
};
use crate::services::{ArtifactWriter, Destination, PackageOptions, PackageService};
use crate::ui::print_success;

/// Execute the app package command
pub async fn execute(
    config: &ToolConfig,
    name: Option<String>,
    env: Option<String>,
    tag: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let cli = AwsCli::new(&config.aws);
    let store = ParameterStore::new(cli.clone(), config.store.parameter_prefix.clone());
    let inventory = EcrInventory::new(cli);
    let renderer = CloudFormationRenderer;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let workspace = LocalWorkspace::discover(&cwd, &config.workspace);

    let service = PackageService::new(&workspace, &store, &inventory, &renderer)
        .with_log_retention(config.stack.log_retention_days);
    let opts = PackageOptions {
        app: name,
        env,
        tag,
    };

    // Validate
    let project = service.project().await?;
    service.validate(&project, &opts).await?;

    // Ask
    let fallback_tag = match opts.tag.as_deref() {
        Some(tag) if !tag.is_empty() => None,
        _ => match GitClient::new(workspace.dir()).image_tag().await {
            Ok(sha) => Some(sha),
            Err(e) => {
                debug!("No git SHA for the image tag: {}", e);
                None
            }
        },
    };
    let target = service.ask(&project, &opts, fallback_tag).await?;

    // Execute
    let directory_mode = output_dir.is_some();
    let mut writer = ArtifactWriter::new(
        Destination::from_output_dir(output_dir),
        target.app.clone(),
        target.env.clone(),
    );
    service.execute(&target, &mut writer).await?;

    if directory_mode {
        for path in writer.written_files() {
            print_success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
