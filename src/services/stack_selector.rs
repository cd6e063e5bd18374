//! Stack selector - resolves an application's stack for one environment
//!
//! Reconciles the on-disk manifest, the metadata store and the live resource
//! inventory into a single rendered template and parameter set. Sources are
//! consulted in a fixed order (manifest, store, inventory) so a broken
//! manifest is always reported before a missing repository.

use tracing::{debug, info};

use crate::domain::manifest::AppManifest;
use crate::domain::ports::{InventoryService, MetadataStore, StackRenderer, Workspace};
use crate::domain::{DeploymentInput, RenderedArtifact};
use crate::error::StackError;

/// What to package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTarget {
    pub project: String,
    pub app: String,
    pub env: String,
    pub tag: String,
}

/// Chooses and renders the stack variant for an application
pub struct StackSelector<'a> {
    workspace: &'a dyn Workspace,
    store: &'a dyn MetadataStore,
    inventory: &'a dyn InventoryService,
    renderer: &'a dyn StackRenderer,
    log_retention_days: u32,
}

impl<'a> StackSelector<'a> {
    pub fn new(
        workspace: &'a dyn Workspace,
        store: &'a dyn MetadataStore,
        inventory: &'a dyn InventoryService,
        renderer: &'a dyn StackRenderer,
    ) -> Self {
        Self {
            workspace,
            store,
            inventory,
            renderer,
            log_retention_days: 30,
        }
    }

    /// Builder: set the log retention applied to every app
    pub fn with_log_retention(mut self, days: u32) -> Self {
        self.log_retention_days = days;
        self
    }

    /// Resolve the stack template and parameters for `target`
    pub async fn resolve(&self, target: &PackageTarget) -> Result<RenderedArtifact, StackError> {
        let raw = self
            .workspace
            .read_manifest(&target.app)
            .await
            .map_err(|source| StackError::ManifestRead {
                app: target.app.clone(),
                source,
            })?;
        let manifest = AppManifest::parse(&raw).map_err(|source| StackError::ManifestParse {
            app: target.app.clone(),
            source,
        })?;
        debug!("Loaded {} manifest {}", manifest.manifest_type(), manifest.name());
        if manifest.name() != target.app {
            return Err(StackError::ManifestNameMismatch {
                app: target.app.clone(),
                manifest_name: manifest.name().to_string(),
            });
        }

        let project = self.store.get_project(&target.project).await?;
        let env = self
            .store
            .get_environment(&target.project, &target.env)
            .await?;

        let resources = self
            .inventory
            .resources_by_region(&project, &env.region)
            .await?;
        let repo_url = resources
            .repository_url(&target.app)
            .ok_or_else(|| StackError::RepoNotFound {
                app_name: target.app.clone(),
                env_region: env.region.clone(),
                project_account_id: project.account_id.clone(),
            })?
            .to_string();

        let manifest_type = manifest.manifest_type();
        match manifest {
            AppManifest::LoadBalancedWebApp(web) => {
                let is_https = project.requires_dns_delegation();
                info!(
                    "Rendering {} stack for {} in {}",
                    if is_https { "HTTPS" } else { "HTTP" },
                    target.app,
                    target.env
                );

                let input = DeploymentInput {
                    app: web.resolve(&env.name, self.log_retention_days),
                    env,
                    image_repo_url: repo_url,
                    image_tag: target.tag.clone(),
                };
                let stack = self.renderer.new_stack(input, is_https)?;
                Ok(RenderedArtifact {
                    template: stack.template()?,
                    parameters: stack.serialized_parameters()?,
                })
            }
            AppManifest::BackendApp(_) => Err(StackError::UnsupportedManifestType {
                manifest_type: manifest_type.to_string(),
            }),
        }
    }
}
