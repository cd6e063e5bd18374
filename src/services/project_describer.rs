//! Project describer - renders a project with its environments and applications

use serde::Serialize;
use tracing::debug;

use crate::domain::ports::MetadataStore;
use crate::error::StoreError;

const COLUMN_WIDTH: usize = 18;

/// One indented table line; every cell but the last is padded
pub(super) fn row(cells: &[&str]) -> String {
    let mut line = String::from("  ");
    if let Some((last, padded)) = cells.split_last() {
        for cell in padded {
            line.push_str(&format!("{:<w$}", cell, w = COLUMN_WIDTH));
        }
        line.push_str(last);
    }
    line.push('\n');
    line
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentDescription {
    pub name: String,
    #[serde(rename = "accountID")]
    pub account_id: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
}

/// Everything `project show` prints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescription {
    pub name: String,
    pub uri: String,
    pub environments: Vec<EnvironmentDescription>,
    pub applications: Vec<ApplicationDescription>,
}

impl ProjectDescription {
    /// Aligned columns under About, Environments and Applications headings
    pub fn human_string(&self) -> String {
        let mut out = String::from("About\n\n");
        out.push_str(&row(&["Name", &self.name]));
        out.push_str(&row(&["URI", &self.uri]));

        out.push_str("\nEnvironments\n\n");
        out.push_str(&row(&["Name", "AccountID", "Region"]));
        for env in &self.environments {
            out.push_str(&row(&[&env.name, &env.account_id, &env.region]));
        }

        out.push_str("\nApplications\n\n");
        out.push_str(&row(&["Name", "Type"]));
        for app in &self.applications {
            out.push_str(&row(&[&app.name, &app.app_type]));
        }

        out
    }

    /// Single-line JSON followed by a newline
    pub fn json_string(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{}\n", serde_json::to_string(self)?))
    }
}

/// Collects a project description from the metadata store
pub struct ProjectDescriber<'a> {
    store: &'a dyn MetadataStore,
}

impl<'a> ProjectDescriber<'a> {
    pub fn new(store: &'a dyn MetadataStore) -> Self {
        Self { store }
    }

    pub async fn describe(&self, project: &str) -> Result<ProjectDescription, StoreError> {
        let proj = self.store.get_project(project).await?;
        let environments = self.store.list_environments(project).await?;
        let applications = self.store.list_applications(project).await?;
        debug!(
            "Project {} has {} environment(s) and {} application(s)",
            project,
            environments.len(),
            applications.len()
        );

        Ok(ProjectDescription {
            name: proj.name,
            uri: proj.domain,
            environments: environments
                .into_iter()
                .map(|env| EnvironmentDescription {
                    name: env.name,
                    account_id: env.account_id,
                    region: env.region,
                })
                .collect(),
            applications: applications
                .into_iter()
                .map(|app| ApplicationDescription {
                    name: app.name,
                    app_type: app.app_type,
                })
                .collect(),
        })
    }
}
