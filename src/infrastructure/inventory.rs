//! ECR backed resource inventory
//!
//! Application image repositories are named `{project}/{app}` in the
//! project's account. Each lookup queries the region afresh.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::aws::AwsCli;
use crate::domain::ports::InventoryService;
use crate::domain::{Project, ResourceInventory};
use crate::error::InventoryError;

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(rename = "repositoryName")]
    name: String,
    #[serde(rename = "repositoryUri")]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct DescribeRepositoriesOutput {
    #[serde(default)]
    repositories: Vec<Repository>,
}

pub struct EcrInventory {
    cli: AwsCli,
}

impl EcrInventory {
    pub fn new(cli: AwsCli) -> Self {
        Self { cli }
    }
}

/// Keep the project's repositories, keyed by application name
fn project_repositories(project: &str, repositories: Vec<Repository>) -> ResourceInventory {
    let prefix = format!("{}/", project);
    let repository_urls = repositories
        .into_iter()
        .filter_map(|repo| {
            let app = repo.name.strip_prefix(&prefix)?;
            (!app.is_empty() && !app.contains('/')).then(|| (app.to_string(), repo.uri))
        })
        .collect();
    ResourceInventory { repository_urls }
}

#[async_trait]
impl InventoryService for EcrInventory {
    async fn resources_by_region(
        &self,
        project: &Project,
        region: &str,
    ) -> Result<ResourceInventory, InventoryError> {
        let output: DescribeRepositoriesOutput = self
            .cli
            .run_json(&[
                "ecr",
                "describe-repositories",
                "--registry-id",
                &project.account_id,
                "--region",
                region,
            ])
            .await
            .map_err(|source| InventoryError::Unavailable {
                project: project.name.clone(),
                region: region.to_string(),
                source,
            })?;

        let inventory = project_repositories(&project.name, output.repositories);
        debug!(
            "{} repositor(ies) for project {} in {}",
            inventory.repository_urls.len(),
            project.name,
            region
        );
        Ok(inventory)
    }
}
