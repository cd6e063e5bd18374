//! Centralized error types for stackwright
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.
//! The two sentinel kinds callers are expected to branch on are
//! [`StoreError::ProjectAlreadyExists`] and [`AddonsError::NotDefined`].

use std::path::PathBuf;
use thiserror::Error;

/// Failures from driving the `aws` CLI
#[derive(Error, Debug)]
pub enum AwsCliError {
    #[error("Failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` failed: {stderr}")]
    Failed {
        command: String,
        code: Option<String>,
        stderr: String,
    },

    #[error("Unexpected output from `{command}`: {message}")]
    Decode { command: String, message: String },
}

impl AwsCliError {
    /// The service error code reported by the CLI, e.g. `ParameterNotFound`
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Failed { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Metadata store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("project {project} not found")]
    ProjectNotFound { project: String },

    #[error("environment {environment} not found in project {project}")]
    EnvironmentNotFound {
        project: String,
        environment: String,
    },

    #[error("application {application} not found in project {project}")]
    ApplicationNotFound {
        project: String,
        application: String,
    },

    #[error("project {project} already exists")]
    ProjectAlreadyExists { project: String },

    #[error("decode {what}: {message}")]
    Corrupt { what: String, message: String },

    #[error(transparent)]
    Transport(#[from] AwsCliError),
}

/// Local workspace errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("no project associated with this workspace")]
    NoProject,

    #[error("workspace is already registered to project {existing}")]
    AlreadyBound { existing: String },

    #[error("manifest for application {app} not found at {}", .path.display())]
    ManifestNotFound { app: String, path: PathBuf },

    #[error("read workspace summary {}: {message}", .path.display())]
    Summary { path: PathBuf, message: String },

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Manifest parsing errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("unmarshal manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Resource inventory errors
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("describe resources for project {project} in region {region}: {source}")]
    Unavailable {
        project: String,
        region: String,
        #[source]
        source: AwsCliError,
    },
}

/// Caller identity errors
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("get caller identity: {0}")]
    Unavailable(#[from] AwsCliError),
}

/// Project infrastructure deployment errors
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("write project template: {0}")]
    Template(#[from] std::io::Error),

    #[error("deploy stack {stack}: {source}")]
    Stack {
        stack: String,
        #[source]
        source: AwsCliError,
    },
}

/// Template rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("missing value for {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("serialize parameters: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Stack resolution errors
#[derive(Error, Debug)]
pub enum StackError {
    #[error("read manifest for application {app}: {source}")]
    ManifestRead {
        app: String,
        #[source]
        source: WorkspaceError,
    },

    #[error("parse manifest for application {app}: {source}")]
    ManifestParse {
        app: String,
        #[source]
        source: ManifestError,
    },

    #[error("manifest in directory {app} is named {manifest_name}; the name must match the directory")]
    ManifestNameMismatch { app: String, manifest_name: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InventoryUnavailable(#[from] InventoryError),

    #[error("ECR repository not found for application {app_name} in region {env_region} and account {project_account_id}")]
    RepoNotFound {
        app_name: String,
        env_region: String,
        project_account_id: String,
    },

    #[error("create CloudFormation template for manifest of type {manifest_type}")]
    UnsupportedManifestType { manifest_type: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors reading deployed application stacks
#[derive(Error, Debug)]
pub enum DescribeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("describe stack {stack}: {source}")]
    Stack {
        stack: String,
        #[source]
        source: AwsCliError,
    },

    #[error("describe task definition {family}: {source}")]
    TaskDefinition {
        family: String,
        #[source]
        source: AwsCliError,
    },

    #[error("stack {stack} has no {key}")]
    MissingValue { stack: String, key: &'static str },
}

/// Addons template errors
#[derive(Error, Debug)]
pub enum AddonsError {
    #[error("addons directory for application {app} does not exist: {}", .path.display())]
    NotDefined { app: String, path: PathBuf },

    #[error("read addons {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no addons templates found in {}", .path.display())]
    Empty { path: PathBuf },

    #[error("parse addons template {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("logical ID {logical_id} in section {section} is defined more than once (last seen in {})", .path.display())]
    DuplicateLogicalId {
        section: String,
        logical_id: String,
        path: PathBuf,
    },

    #[error("serialize addons template: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl AddonsError {
    /// Whether this is the "nothing to do" condition rather than a failure
    pub fn is_not_defined(&self) -> bool {
        matches!(self, Self::NotDefined { .. })
    }
}

/// Artifact output errors
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("create file {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Project bootstrap errors
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("register project {project}: {source}")]
    Registration {
        project: String,
        #[source]
        source: StoreError,
    },

    #[error("create workspace for project {project}: {source}")]
    Workspace {
        project: String,
        #[source]
        source: WorkspaceError,
    },

    #[error(transparent)]
    Convergence(#[from] DeployError),
}

/// Git errors
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Failed to get git SHA: {0}")]
    ShaFailed(String),
}

/// Filling in a value the user did not supply
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no {kind} found; create one first or pass {flag}")]
    NoCandidates { kind: &'static str, flag: &'static str },

    #[error("multiple {kind}s found ({}); specify one with {flag}", .candidates.join(", "))]
    Ambiguous {
        kind: &'static str,
        flag: &'static str,
        candidates: Vec<String>,
    },
}

/// Errors from `app package`
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("no project associated with this workspace")]
    NoProjectInWorkspace,

    #[error("read workspace: {0}")]
    Workspace(#[source] WorkspaceError),

    #[error("list applications in workspace: {0}")]
    ListApps(#[source] WorkspaceError),

    #[error("application '{app}' does not exist in the workspace")]
    UnknownApp { app: String },

    #[error("could not determine an image tag from git; specify one with --tag")]
    MissingTag,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("retrieve addons template: {0}")]
    Addons(#[source] AddonsError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_not_found_display() {
        let err = StackError::RepoNotFound {
            app_name: "frontend".to_string(),
            env_region: "us-west-2".to_string(),
            project_account_id: "111111111111".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ECR repository not found for application frontend in region us-west-2 and account 111111111111"
        );
    }

    #[test]
    fn test_addons_sentinel() {
        let err = AddonsError::NotDefined {
            app: "frontend".to_string(),
            path: PathBuf::from("stackwright/frontend/addons"),
        };
        assert!(err.is_not_defined());

        let err = AddonsError::Empty {
            path: PathBuf::from("stackwright/frontend/addons"),
        };
        assert!(!err.is_not_defined());
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::ProjectNotFound {
            project: "test".to_string(),
        };
        let stack_err: StackError = store_err.into();
        assert!(matches!(
            stack_err,
            StackError::Store(StoreError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn test_ambiguous_selection_lists_candidates() {
        let err = SelectionError::Ambiguous {
            kind: "environment",
            flag: "--env",
            candidates: vec!["test".to_string(), "prod".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "multiple environments found (test, prod); specify one with --env"
        );
    }

    #[test]
    fn test_addons_failure_is_wrapped() {
        let err = PackageError::Addons(AddonsError::Empty {
            path: PathBuf::from("addons"),
        });
        assert!(err.to_string().starts_with("retrieve addons template: "));
    }

    #[test]
    fn test_aws_cli_error_code() {
        let err = AwsCliError::Failed {
            command: "aws ssm get-parameter".to_string(),
            code: Some("ParameterNotFound".to_string()),
            stderr: String::new(),
        };
        assert_eq!(err.code(), Some("ParameterNotFound"));
    }
}
