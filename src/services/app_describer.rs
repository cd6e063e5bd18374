//! App describer - per-environment view of a deployed application
//!
//! Each environment contributes a route, a capacity configuration and the
//! task's environment variables, all read back from the application's stack.
//! Environments the application has not been deployed to are skipped.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::project_describer::row;
use crate::domain::deployment::{app_stack_name, DeployedStack};
use crate::domain::ports::{MetadataStore, StackDescriber};
use crate::error::DescribeError;

const URL_OUTPUT: &str = "URL";
const DNS_OUTPUT: &str = "LoadBalancerDNSName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfiguration {
    pub environment: String,
    pub port: String,
    pub tasks: String,
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRoute {
    pub environment: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppVariable {
    pub environment: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "physicalID")]
    pub physical_id: String,
}

/// Everything `app show` prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppDescription {
    #[serde(rename = "appName")]
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub project: String,
    pub configurations: Vec<AppConfiguration>,
    pub routes: Vec<AppRoute>,
    pub variables: Vec<AppVariable>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Vec<AppResource>>,
}

impl AppDescription {
    pub fn human_string(&self) -> String {
        let mut out = String::from("About\n\n");
        out.push_str(&row(&["Project", &self.project]));
        out.push_str(&row(&["Name", &self.name]));
        out.push_str(&row(&["Type", &self.app_type]));

        out.push_str("\nConfigurations\n\n");
        out.push_str(&row(&["Environment", "Tasks", "CPU (vCPU)", "Memory (MiB)", "Port"]));
        for config in &self.configurations {
            out.push_str(&row(&[
                &config.environment,
                &config.tasks,
                &config.cpu,
                &config.memory,
                &config.port,
            ]));
        }

        out.push_str("\nRoutes\n\n");
        out.push_str(&row(&["Environment", "URL"]));
        for route in &self.routes {
            out.push_str(&row(&[&route.environment, &route.url]));
        }

        out.push_str("\nVariables\n\n");
        out.push_str(&row(&["Name", "Environment", "Value"]));
        for variable in &self.variables {
            out.push_str(&row(&[&variable.name, &variable.environment, &variable.value]));
        }

        if !self.resources.is_empty() {
            out.push_str("\nResources\n");
            for (env, resources) in &self.resources {
                out.push_str(&format!("\n  {}\n", env));
                for resource in resources {
                    out.push_str(&format!(
                        "    {}  {}\n",
                        resource.resource_type, resource.physical_id
                    ));
                }
            }
        }

        out
    }

    /// Single-line JSON followed by a newline
    pub fn json_string(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{}\n", serde_json::to_string(self)?))
    }
}

/// Reads an application's deployed stacks across every environment
pub struct AppDescriber<'a> {
    store: &'a dyn MetadataStore,
    stacks: &'a dyn StackDescriber,
}

impl<'a> AppDescriber<'a> {
    pub fn new(store: &'a dyn MetadataStore, stacks: &'a dyn StackDescriber) -> Self {
        Self { store, stacks }
    }

    pub async fn describe(
        &self,
        project: &str,
        app: &str,
        with_resources: bool,
    ) -> Result<AppDescription, DescribeError> {
        let application = self.store.get_application(project, app).await?;
        let environments = self.store.list_environments(project).await?;

        let mut description = AppDescription {
            name: application.name,
            app_type: application.app_type,
            project: project.to_string(),
            ..Default::default()
        };

        for env in &environments {
            let stack_name = app_stack_name(project, &env.name, app);
            let Some(stack) = self.stacks.describe_stack(&stack_name, &env.region).await? else {
                debug!("{} is not deployed in {}", app, env.name);
                continue;
            };

            description.routes.push(AppRoute {
                environment: env.name.clone(),
                url: route_url(&stack_name, &stack)?,
            });
            description.configurations.push(AppConfiguration {
                environment: env.name.clone(),
                port: parameter(&stack_name, &stack, "ContainerPort")?.to_string(),
                tasks: parameter(&stack_name, &stack, "TaskCount")?.to_string(),
                cpu: vcpu(parameter(&stack_name, &stack, "TaskCPU")?),
                memory: parameter(&stack_name, &stack, "TaskMemory")?.to_string(),
            });

            // The task definition family and the container share the stack and app names
            let variables = self
                .stacks
                .task_variables(&stack_name, app, &env.region)
                .await?;
            description
                .variables
                .extend(variables.into_iter().map(|(name, value)| AppVariable {
                    environment: env.name.clone(),
                    name,
                    value,
                }));

            if with_resources {
                let resources = self.stacks.stack_resources(&stack_name, &env.region).await?;
                description.resources.insert(
                    env.name.clone(),
                    resources
                        .into_iter()
                        .map(|r| AppResource {
                            resource_type: r.resource_type,
                            physical_id: r.physical_id,
                        })
                        .collect(),
                );
            }
        }

        description.variables.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.environment.cmp(&b.environment))
        });
        debug!(
            "{} is deployed in {} of {} environment(s)",
            app,
            description.routes.len(),
            environments.len()
        );
        Ok(description)
    }
}

fn parameter<'s>(
    stack_name: &str,
    stack: &'s DeployedStack,
    key: &'static str,
) -> Result<&'s str, DescribeError> {
    stack
        .parameters
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DescribeError::MissingValue {
            stack: stack_name.to_string(),
            key,
        })
}

/// HTTPS stacks publish their URL; plain ones the load balancer's DNS name
fn route_url(stack_name: &str, stack: &DeployedStack) -> Result<String, DescribeError> {
    if let Some(url) = stack.outputs.get(URL_OUTPUT) {
        return Ok(url.clone());
    }
    let dns = stack
        .outputs
        .get(DNS_OUTPUT)
        .ok_or_else(|| DescribeError::MissingValue {
            stack: stack_name.to_string(),
            key: DNS_OUTPUT,
        })?;
    let path = stack
        .parameters
        .get("RulePath")
        .map(String::as_str)
        .unwrap_or("/");
    Ok(format!("http://{}/{}", dns, path.trim_start_matches('/')))
}

/// CPU units as vCPUs (`256` is `0.25`); unparseable values are shown as is
fn vcpu(units: &str) -> String {
    match units.parse::<f64>() {
        Ok(units) => (units / 1024.0).to_string(),
        Err(_) => units.to_string(),
    }
}
