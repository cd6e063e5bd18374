//! Project bootstrapper - registers a project and deploys its shared infrastructure
//!
//! Registration is safely repeatable: a project that already exists in the
//! store counts as registered. Convergence runs exactly once per invocation;
//! re-running the command is the recovery path.

use tracing::{debug, info, warn};

use crate::domain::bootstrap::{
    deploy_complete_message, deploy_failed_message, deploy_start_message, BootstrapPhase,
    BootstrapReport, BootstrapRequest,
};
use crate::domain::ports::{
    IdentityService, MetadataStore, ProgressReporter, ProjectDeployer, Workspace,
};
use crate::domain::{CreateProjectInput, Project};
use crate::error::{BootstrapError, StoreError};

/// Orchestrates `project init`
pub struct ProjectBootstrapper<'a> {
    identity: &'a dyn IdentityService,
    store: &'a dyn MetadataStore,
    workspace: &'a dyn Workspace,
    deployer: &'a dyn ProjectDeployer,
    progress: &'a dyn ProgressReporter,
}

impl<'a> ProjectBootstrapper<'a> {
    pub fn new(
        identity: &'a dyn IdentityService,
        store: &'a dyn MetadataStore,
        workspace: &'a dyn Workspace,
        deployer: &'a dyn ProjectDeployer,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            identity,
            store,
            workspace,
            deployer,
            progress,
        }
    }

    /// Register then converge
    pub async fn execute(
        &self,
        request: &BootstrapRequest,
    ) -> Result<BootstrapReport, BootstrapError> {
        debug!("Bootstrapping {} from {:?}", request.project, BootstrapPhase::Uninitialized);

        let (account_id, already_registered) = match self.register(request).await {
            Ok(registered) => registered,
            Err(e) => {
                warn!(
                    "Bootstrap of {} ended in {:?}",
                    request.project,
                    BootstrapPhase::Failed
                );
                return Err(e);
            }
        };
        info!("Project {} is {:?}", request.project, BootstrapPhase::Registered);

        self.progress.start(&deploy_start_message(&request.project));
        let input = CreateProjectInput {
            project: request.project.clone(),
            account_id: account_id.clone(),
            domain_name: request.domain.clone(),
        };
        if let Err(e) = self.deployer.deploy_project(&input).await {
            self.progress.failure(&deploy_failed_message(&request.project));
            warn!(
                "Bootstrap of {} ended in {:?}",
                request.project,
                BootstrapPhase::ConvergenceFailed
            );
            return Err(e.into());
        }
        self.progress
            .success(&deploy_complete_message(&request.project));

        Ok(BootstrapReport {
            phase: BootstrapPhase::Converged,
            account_id,
            already_registered,
        })
    }

    /// Record the project in the store and bind the workspace to it
    ///
    /// Returns the caller's account and whether the project already existed.
    /// A workspace failure does not undo the store write.
    async fn register(&self, request: &BootstrapRequest) -> Result<(String, bool), BootstrapError> {
        let caller = self.identity.caller().await?;

        let project = Project::new(&request.project, &caller.account, &request.domain);
        let already_registered = match self.store.create_project(&project).await {
            Ok(()) => {
                info!(
                    "Registered project {} in account {}",
                    request.project, caller.account
                );
                false
            }
            Err(StoreError::ProjectAlreadyExists { .. }) => {
                info!("Project {} already exists, reusing it", request.project);
                true
            }
            Err(source) => {
                return Err(BootstrapError::Registration {
                    project: request.project.clone(),
                    source,
                })
            }
        };

        self.workspace
            .create(&request.project)
            .await
            .map_err(|source| BootstrapError::Workspace {
                project: request.project.clone(),
                source,
            })?;

        Ok((caller.account, already_registered))
    }
}
