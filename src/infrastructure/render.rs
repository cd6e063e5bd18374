//! CloudFormation stack rendering for load balanced web apps
//!
//! Templates ship inside the binary. `{{Name}}` placeholders are expanded
//! from the deployment input; everything else is passed as stack parameters.

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::ports::{StackRenderer, StackSerializer};
use crate::domain::DeploymentInput;
use crate::error::RenderError;

const LB_WEB_APP_TEMPLATE: &str = include_str!("../../templates/lb-web-app.yml");
const LB_WEB_APP_HTTPS_TEMPLATE: &str = include_str!("../../templates/lb-web-app-https.yml");

/// Valid Fargate task CPU units
const FARGATE_CPU: &[u32] = &[256, 512, 1024, 2048, 4096];

/// Renderer backed by the embedded templates
#[derive(Debug, Default)]
pub struct CloudFormationRenderer;

impl StackRenderer for CloudFormationRenderer {
    fn new_stack(
        &self,
        input: DeploymentInput,
        is_https: bool,
    ) -> Result<Box<dyn StackSerializer>, RenderError> {
        Ok(Box::new(LbWebAppStack::new(input, is_https)?))
    }
}

#[derive(Serialize)]
struct NameValue<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
}

#[derive(Serialize)]
struct NameValueFrom<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "ValueFrom")]
    value_from: &'a str,
}

#[derive(Serialize)]
struct ParametersFile {
    #[serde(rename = "Parameters")]
    parameters: BTreeMap<&'static str, String>,
    #[serde(rename = "Tags")]
    tags: BTreeMap<&'static str, String>,
}

/// A load balanced web app stack, plain HTTP or HTTPS
pub struct LbWebAppStack {
    input: DeploymentInput,
    port: u16,
    is_https: bool,
}

impl LbWebAppStack {
    pub fn new(input: DeploymentInput, is_https: bool) -> Result<Self, RenderError> {
        let port = input
            .app
            .port
            .ok_or(RenderError::MissingField { field: "image.port" })?;
        if !FARGATE_CPU.contains(&input.app.cpu) {
            return Err(RenderError::InvalidValue {
                field: "cpu",
                value: input.app.cpu.to_string(),
            });
        }
        if input.image_repo_url.is_empty() {
            return Err(RenderError::MissingField {
                field: "image repository",
            });
        }
        Ok(Self {
            input,
            port,
            is_https,
        })
    }

    fn placeholders(&self) -> Result<BTreeMap<&'static str, String>, RenderError> {
        let app = &self.input.app;
        let variables: Vec<NameValue> = app
            .variables
            .iter()
            .map(|(name, value)| NameValue { name, value })
            .collect();
        let secrets: Vec<NameValueFrom> = app
            .secrets
            .iter()
            .map(|(name, value_from)| NameValueFrom { name, value_from })
            .collect();

        let description = format!(
            "CloudFormation template that represents a load balanced web application on Amazon ECS{} ({} in {}).",
            if self.is_https { " with HTTPS" } else { "" },
            app.name,
            self.input.env.name
        );

        // Every value is JSON: strings become quoted scalars and arrays
        // become flow sequences, so names cannot break the YAML
        Ok(BTreeMap::from([
            ("Description", serde_json::to_string(&description)?),
            ("Variables", serde_json::to_string(&variables)?),
            ("Secrets", serde_json::to_string(&secrets)?),
        ]))
    }
}

/// Replace every `{{Name}}` in `template`; unknown names are an error
fn expand(template: &str, values: &BTreeMap<&'static str, String>) -> Result<String, RenderError> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let pattern = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z]+)\s*\}\}").expect("placeholder pattern is valid")
    });

    let mut unknown = None;
    let expanded = pattern.replace_all(template, |caps: &Captures| {
        match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                unknown.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });

    match unknown {
        Some(name) => Err(RenderError::InvalidValue {
            field: "template placeholder",
            value: name,
        }),
        None => Ok(expanded.into_owned()),
    }
}

impl StackSerializer for LbWebAppStack {
    fn template(&self) -> Result<String, RenderError> {
        let template = if self.is_https {
            LB_WEB_APP_HTTPS_TEMPLATE
        } else {
            LB_WEB_APP_TEMPLATE
        };
        expand(template, &self.placeholders()?)
    }

    fn serialized_parameters(&self) -> Result<String, RenderError> {
        let app = &self.input.app;
        let env = &self.input.env;

        let parameters = BTreeMap::from([
            ("ProjectName", env.project.clone()),
            ("EnvName", env.name.clone()),
            ("AppName", app.name.clone()),
            (
                "ContainerImage",
                format!("{}:{}", self.input.image_repo_url, self.input.image_tag),
            ),
            ("ContainerPort", self.port.to_string()),
            ("RulePath", app.path.clone()),
            ("HealthCheckPath", app.healthcheck.clone()),
            ("TaskCPU", app.cpu.to_string()),
            ("TaskMemory", app.memory.to_string()),
            ("TaskCount", app.count.to_string()),
            ("LogRetention", app.log_retention_days.to_string()),
        ]);
        let tags = BTreeMap::from([
            ("stackwright-project", env.project.clone()),
            ("stackwright-environment", env.name.clone()),
            ("stackwright-application", app.name.clone()),
        ]);

        Ok(serde_json::to_string_pretty(&ParametersFile { parameters, tags })?)
    }
}
