//! SSM Parameter Store backed metadata store
//!
//! Layout under the configured prefix (default `/stackwright`):
//! - `{prefix}/{project}`: the project record
//! - `{prefix}/{project}/environments/{env}`: one record per environment
//! - `{prefix}/{project}/applications/{app}`: one record per application
//!
//! Every value is a JSON document.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::aws::AwsCli;
use crate::domain::ports::MetadataStore;
use crate::domain::{ApplicationSummary, Environment, Project};
use crate::error::{AwsCliError, StoreError};

const PARAMETER_NOT_FOUND: &str = "ParameterNotFound";
const PARAMETER_ALREADY_EXISTS: &str = "ParameterAlreadyExists";

#[derive(Debug, Deserialize)]
struct Parameter {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct GetParameterOutput {
    #[serde(rename = "Parameter")]
    parameter: Parameter,
}

#[derive(Debug, Deserialize)]
struct GetParametersByPathOutput {
    #[serde(rename = "Parameters", default)]
    parameters: Vec<Parameter>,
}

pub struct ParameterStore {
    cli: AwsCli,
    prefix: String,
}

impl ParameterStore {
    pub fn new(cli: AwsCli, prefix: impl Into<String>) -> Self {
        Self {
            cli,
            prefix: prefix.into(),
        }
    }

    fn project_path(&self, project: &str) -> String {
        format!("{}/{}", self.prefix, project)
    }

    fn environments_path(&self, project: &str) -> String {
        format!("{}/{}/environments", self.prefix, project)
    }

    fn applications_path(&self, project: &str) -> String {
        format!("{}/{}/applications", self.prefix, project)
    }

    /// `Ok(None)` when the parameter does not exist
    async fn get_parameter(&self, name: &str) -> Result<Option<Parameter>, StoreError> {
        match self
            .cli
            .run_json::<GetParameterOutput>(&["ssm", "get-parameter", "--name", name])
            .await
        {
            Ok(output) => Ok(Some(output.parameter)),
            Err(e) if e.code() == Some(PARAMETER_NOT_FOUND) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Direct children of `path`
    async fn get_parameters_by_path(&self, path: &str) -> Result<Vec<Parameter>, StoreError> {
        let output: GetParametersByPathOutput = self
            .cli
            .run_json(&["ssm", "get-parameters-by-path", "--path", path])
            .await?;
        debug!("{} parameter(s) under {}", output.parameters.len(), path);
        Ok(output.parameters)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, StoreError> {
        let mut parameters = self.get_parameters_by_path(path).await?;
        parameters.sort_by(|a, b| a.name.cmp(&b.name));
        parameters.iter().map(decode_record).collect()
    }
}

/// Parse a parameter's JSON value
fn decode_record<T: DeserializeOwned>(parameter: &Parameter) -> Result<T, StoreError> {
    serde_json::from_str(&parameter.value).map_err(|e| StoreError::Corrupt {
        what: parameter.name.clone(),
        message: e.to_string(),
    })
}

/// Map a failed `put-parameter` of a project record
fn classify_create_error(project: &str, err: AwsCliError) -> StoreError {
    if err.code() == Some(PARAMETER_ALREADY_EXISTS) {
        StoreError::ProjectAlreadyExists {
            project: project.to_string(),
        }
    } else {
        StoreError::Transport(err)
    }
}

#[async_trait]
impl MetadataStore for ParameterStore {
    async fn get_project(&self, name: &str) -> Result<Project, StoreError> {
        match self.get_parameter(&self.project_path(name)).await? {
            Some(parameter) => decode_record(&parameter),
            None => Err(StoreError::ProjectNotFound {
                project: name.to_string(),
            }),
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.list(&self.prefix).await
    }

    async fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        let value = serde_json::to_string(project).map_err(|e| StoreError::Corrupt {
            what: project.name.clone(),
            message: e.to_string(),
        })?;
        let path = self.project_path(&project.name);
        let description = format!("stackwright project {}", project.name);

        self.cli
            .run(&[
                "ssm",
                "put-parameter",
                "--name",
                &path,
                "--type",
                "String",
                "--value",
                &value,
                "--description",
                &description,
            ])
            .await
            .map_err(|e| classify_create_error(&project.name, e))?;

        info!("Created project record {}", path);
        Ok(())
    }

    async fn get_environment(&self, project: &str, env: &str) -> Result<Environment, StoreError> {
        let path = format!("{}/{}", self.environments_path(project), env);
        match self.get_parameter(&path).await? {
            Some(parameter) => decode_record(&parameter),
            None => Err(StoreError::EnvironmentNotFound {
                project: project.to_string(),
                environment: env.to_string(),
            }),
        }
    }

    async fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError> {
        self.list(&self.environments_path(project)).await
    }

    async fn get_application(
        &self,
        project: &str,
        app: &str,
    ) -> Result<ApplicationSummary, StoreError> {
        let path = format!("{}/{}", self.applications_path(project), app);
        match self.get_parameter(&path).await? {
            Some(parameter) => decode_record(&parameter),
            None => Err(StoreError::ApplicationNotFound {
                project: project.to_string(),
                application: app.to_string(),
            }),
        }
    }

    async fn list_applications(
        &self,
        project: &str,
    ) -> Result<Vec<ApplicationSummary>, StoreError> {
        self.list(&self.applications_path(project)).await
    }
}
