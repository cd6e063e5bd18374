//! CloudFormation deployer for a project's shared infrastructure
//!
//! The roles template ships inside the binary and is written to a temporary
//! file for `aws cloudformation deploy`. Deploying an unchanged stack is a
//! no-op, so re-running `project init` is safe.

use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::aws::AwsCli;
use crate::domain::ports::ProjectDeployer;
use crate::domain::CreateProjectInput;
use crate::error::DeployError;

const PROJECT_TEMPLATE: &str = include_str!("../../templates/project-roles.yml");

/// Name of the stack holding a project's shared infrastructure
pub fn project_stack_name(project: &str) -> String {
    format!("{}-infrastructure-roles", project)
}

pub struct CloudFormationDeployer {
    cli: AwsCli,
}

impl CloudFormationDeployer {
    pub fn new(cli: AwsCli) -> Self {
        Self { cli }
    }
}

fn deploy_args(input: &CreateProjectInput, template: &Path) -> Vec<String> {
    vec![
        "cloudformation".to_string(),
        "deploy".to_string(),
        "--stack-name".to_string(),
        project_stack_name(&input.project),
        "--template-file".to_string(),
        template.display().to_string(),
        "--capabilities".to_string(),
        "CAPABILITY_NAMED_IAM".to_string(),
        "--no-fail-on-empty-changeset".to_string(),
        "--parameter-overrides".to_string(),
        format!("ProjectName={}", input.project),
        format!("AdminAccountId={}", input.account_id),
        format!("DomainName={}", input.domain_name),
        "--tags".to_string(),
        format!("stackwright-project={}", input.project),
    ]
}

#[async_trait]
impl ProjectDeployer for CloudFormationDeployer {
    async fn deploy_project(&self, input: &CreateProjectInput) -> Result<(), DeployError> {
        let mut template = tempfile::Builder::new()
            .prefix("stackwright-project-")
            .suffix(".yml")
            .tempfile()?;
        template.write_all(PROJECT_TEMPLATE.as_bytes())?;
        template.flush()?;

        let stack = project_stack_name(&input.project);
        info!("Deploying stack {}", stack);

        let args = deploy_args(input, template.path());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.cli
            .run(&args)
            .await
            .map_err(|source| DeployError::Stack {
                stack: stack.clone(),
                source,
            })?;

        info!("Stack {} is up to date", stack);
        Ok(())
    }
}
