//! Deployed stack lookups through `aws cloudformation` and `aws ecs`

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::aws::AwsCli;
use crate::domain::ports::StackDescriber;
use crate::domain::{DeployedStack, StackResource};
use crate::error::{AwsCliError, DescribeError};

const VALIDATION_ERROR: &str = "ValidationError";

#[derive(Debug, Deserialize)]
struct DescribeStacksOutput {
    #[serde(rename = "Stacks", default)]
    stacks: Vec<Stack>,
}

#[derive(Debug, Deserialize)]
struct Stack {
    #[serde(rename = "Parameters", default)]
    parameters: Vec<StackParameter>,
    #[serde(rename = "Outputs", default)]
    outputs: Vec<StackOutput>,
}

#[derive(Debug, Deserialize)]
struct StackParameter {
    #[serde(rename = "ParameterKey")]
    key: String,
    #[serde(rename = "ParameterValue", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct StackOutput {
    #[serde(rename = "OutputKey")]
    key: String,
    #[serde(rename = "OutputValue", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct DescribeStackResourcesOutput {
    #[serde(rename = "StackResources", default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    #[serde(rename = "ResourceType")]
    resource_type: String,
    #[serde(rename = "PhysicalResourceId", default)]
    physical_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeTaskDefinitionOutput {
    task_definition: TaskDefinition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDefinition {
    #[serde(default)]
    container_definitions: Vec<ContainerDefinition>,
}

#[derive(Debug, Deserialize)]
struct ContainerDefinition {
    name: String,
    #[serde(default)]
    environment: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    name: String,
    #[serde(default)]
    value: String,
}

pub struct CloudFormationDescriber {
    cli: AwsCli,
}

impl CloudFormationDescriber {
    pub fn new(cli: AwsCli) -> Self {
        Self { cli }
    }
}

/// CloudFormation reports a missing stack as a validation error
fn is_missing_stack(err: &AwsCliError) -> bool {
    match err {
        AwsCliError::Failed { code, stderr, .. } => {
            code.as_deref() == Some(VALIDATION_ERROR) && stderr.contains("does not exist")
        }
        _ => false,
    }
}

fn into_deployed(stack: Stack) -> DeployedStack {
    DeployedStack {
        parameters: stack
            .parameters
            .into_iter()
            .map(|p| (p.key, p.value))
            .collect(),
        outputs: stack.outputs.into_iter().map(|o| (o.key, o.value)).collect(),
    }
}

/// Variables of the named container, or of the only one when no name matches
fn container_variables(
    definition: TaskDefinition,
    container: &str,
) -> Vec<(String, String)> {
    let mut containers = definition.container_definitions;
    let index = containers
        .iter()
        .position(|c| c.name == container)
        .unwrap_or(0);
    if index >= containers.len() {
        return Vec::new();
    }
    containers
        .swap_remove(index)
        .environment
        .into_iter()
        .map(|kv| (kv.name, kv.value))
        .collect()
}

#[async_trait]
impl StackDescriber for CloudFormationDescriber {
    async fn describe_stack(
        &self,
        stack: &str,
        region: &str,
    ) -> Result<Option<DeployedStack>, DescribeError> {
        let result = self
            .cli
            .run_json::<DescribeStacksOutput>(&[
                "cloudformation",
                "describe-stacks",
                "--stack-name",
                stack,
                "--region",
                region,
            ])
            .await;

        match result {
            Ok(output) => Ok(output.stacks.into_iter().next().map(into_deployed)),
            Err(e) if is_missing_stack(&e) => {
                debug!("Stack {} does not exist in {}", stack, region);
                Ok(None)
            }
            Err(source) => Err(DescribeError::Stack {
                stack: stack.to_string(),
                source,
            }),
        }
    }

    async fn stack_resources(
        &self,
        stack: &str,
        region: &str,
    ) -> Result<Vec<StackResource>, DescribeError> {
        let output: DescribeStackResourcesOutput = self
            .cli
            .run_json(&[
                "cloudformation",
                "describe-stack-resources",
                "--stack-name",
                stack,
                "--region",
                region,
            ])
            .await
            .map_err(|source| DescribeError::Stack {
                stack: stack.to_string(),
                source,
            })?;

        Ok(output
            .resources
            .into_iter()
            .map(|r| StackResource {
                resource_type: r.resource_type,
                physical_id: r.physical_id,
            })
            .collect())
    }

    async fn task_variables(
        &self,
        family: &str,
        container: &str,
        region: &str,
    ) -> Result<Vec<(String, String)>, DescribeError> {
        let output: DescribeTaskDefinitionOutput = self
            .cli
            .run_json(&[
                "ecs",
                "describe-task-definition",
                "--task-definition",
                family,
                "--region",
                region,
            ])
            .await
            .map_err(|source| DescribeError::TaskDefinition {
                family: family.to_string(),
                source,
            })?;

        Ok(container_variables(output.task_definition, container))
    }
}
